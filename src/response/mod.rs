//! # Response Module
//!
//! [`ResponseFormatter`] renders list data into the envelope each client
//! library expects. The shapes are part of the wire contract:
//!
//! | format | keys |
//! |---|---|
//! | `ag-grid` | `success`, `data`, `lastRow` (null while rows remain) |
//! | `mui` / `mui-datagrid` | `success`, `data`, `rowCount`, `meta.{page (0-based), pageSize, total, hasNextPage, hasPreviousPage}` |
//! | `tanstack-query` / `react-query` | `success`, `data`, `meta`, `links`, `timestamp` (ISO-8601) |
//! | `swr` | `success`, `data`, `meta`, `pagination`, `cache_key` (MD5), `timestamp` (unix) |
//! | `infinite-scroll` | `success`, `data`, `pagination.{hasNextPage, nextCursor, pageSize}`, `meta.{total?, filters, search}` |
//! | `cursor` | `success`, `data`, `pageInfo.{hasNextPage, hasPreviousPage, startCursor, endCursor}`, `meta` |
//! | `standard` (default) | `success`, `data`, `meta`, `pagination` |
//!
//! ```rust
//! use gravitycar::response::{ResponseFormatter, ResponseMeta};
//! use serde_json::json;
//!
//! let meta = ResponseMeta::default().with_total(1);
//! let body = ResponseFormatter::new().format(json!([{"id": 1}]), &meta, "ag-grid");
//! assert_eq!(body["lastRow"], 1);
//! ```

mod formatter;
mod meta;

pub use formatter::{cache_key, decode_cursor, encode_cursor, ResponseFormat, ResponseFormatter};
pub use meta::{PageInfo, ResponseMeta};
