use super::meta::ResponseMeta;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::debug;

/// Envelope shapes the formatter can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    AgGrid,
    Mui,
    TanStackQuery,
    Swr,
    InfiniteScroll,
    Cursor,
    Standard,
}

impl ResponseFormat {
    pub const ALL: [ResponseFormat; 7] = [
        ResponseFormat::AgGrid,
        ResponseFormat::Mui,
        ResponseFormat::TanStackQuery,
        ResponseFormat::Swr,
        ResponseFormat::InfiniteScroll,
        ResponseFormat::Cursor,
        ResponseFormat::Standard,
    ];

    /// Format for a requested name, case-insensitive; unknown names render
    /// the standard envelope.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ag-grid" | "aggrid" => ResponseFormat::AgGrid,
            "mui" | "mui-datagrid" => ResponseFormat::Mui,
            "tanstack-query" | "react-query" => ResponseFormat::TanStackQuery,
            "swr" => ResponseFormat::Swr,
            "infinite-scroll" => ResponseFormat::InfiniteScroll,
            "cursor" => ResponseFormat::Cursor,
            _ => ResponseFormat::Standard,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::AgGrid => "ag-grid",
            ResponseFormat::Mui => "mui",
            ResponseFormat::TanStackQuery => "tanstack-query",
            ResponseFormat::Swr => "swr",
            ResponseFormat::InfiniteScroll => "infinite-scroll",
            ResponseFormat::Cursor => "cursor",
            ResponseFormat::Standard => "standard",
        }
    }
}

/// Renders list data into the envelope a client library expects.
///
/// Rendering depends only on the inputs, except for the `timestamp` that
/// TanStack Query and SWR envelopes carry. [`ResponseFormatter::at`] pins it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter {
    now: Option<DateTime<Utc>>,
}

impl ResponseFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter whose timestamps are always `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Render `data` (a JSON array of rows) in the named format.
    #[must_use]
    pub fn format(&self, data: Value, meta: &ResponseMeta, format: &str) -> Value {
        let format = ResponseFormat::from_name(format);
        debug!(format = format.as_str(), "Rendering response envelope");
        self.render(data, meta, format)
    }

    #[must_use]
    pub fn render(&self, data: Value, meta: &ResponseMeta, format: ResponseFormat) -> Value {
        let rows = data.as_array().map_or(0, Vec::len);
        match format {
            ResponseFormat::AgGrid => ag_grid(data, meta, rows),
            ResponseFormat::Mui => mui(data, meta, rows),
            ResponseFormat::TanStackQuery => self.tanstack_query(data, meta, rows),
            ResponseFormat::Swr => self.swr(data, meta, rows),
            ResponseFormat::InfiniteScroll => infinite_scroll(data, meta, rows),
            ResponseFormat::Cursor => cursor(data, meta, rows),
            ResponseFormat::Standard => standard(data, meta, rows),
        }
    }

    fn tanstack_query(&self, data: Value, meta: &ResponseMeta, rows: usize) -> Value {
        json!({
            "success": true,
            "data": data,
            "meta": comprehensive_meta(meta, rows),
            "links": links(meta, rows),
            "timestamp": self.now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    fn swr(&self, data: Value, meta: &ResponseMeta, rows: usize) -> Value {
        let p = &meta.pagination;
        json!({
            "success": true,
            "data": data,
            "meta": comprehensive_meta(meta, rows),
            "pagination": {
                "page": p.page,
                "pageSize": p.page_size,
                "total": p.total,
                "totalPages": p.total_pages(),
                "hasMore": p.has_next_page(rows),
            },
            "cache_key": cache_key(meta),
            "timestamp": self.now().timestamp(),
        })
    }
}

/// MD5 of the canonical JSON of pagination, filters, sorting and search.
#[must_use]
pub fn cache_key(meta: &ResponseMeta) -> String {
    // serde_json maps are key-sorted, so the rendering is canonical.
    let canonical = json!({
        "pagination": {
            "page": meta.pagination.page,
            "pageSize": meta.pagination.page_size,
        },
        "filters": meta.filters,
        "sorting": meta.sorting,
        "search": meta.search,
    });
    format!("{:x}", md5::compute(canonical.to_string().as_bytes()))
}

/// Opaque cursor for the row at `offset`.
#[must_use]
pub fn encode_cursor(offset: u64) -> String {
    URL_SAFE_NO_PAD.encode(format!("offset:{offset}"))
}

/// Row offset of a cursor produced by [`encode_cursor`].
#[must_use]
pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let bytes = URL_SAFE_NO_PAD.decode(cursor.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix("offset:")?.parse().ok()
}

fn ag_grid(data: Value, meta: &ResponseMeta, rows: usize) -> Value {
    let p = &meta.pagination;
    let fetched_to = p.offset.saturating_add(rows as u64);
    // null while more rows remain, the final row count once exhausted
    let last_row = match p.total {
        Some(total) if fetched_to >= total => json!(total),
        Some(_) => Value::Null,
        None if (rows as u64) < p.page_size => json!(fetched_to),
        None => Value::Null,
    };
    json!({
        "success": true,
        "data": data,
        "lastRow": last_row,
    })
}

fn mui(data: Value, meta: &ResponseMeta, rows: usize) -> Value {
    let p = &meta.pagination;
    let total = p.total.unwrap_or(p.offset.saturating_add(rows as u64));
    json!({
        "success": true,
        "data": data,
        "rowCount": total,
        "meta": {
            "page": p.page.saturating_sub(1),
            "pageSize": p.page_size,
            "total": total,
            "hasNextPage": p.has_next_page(rows),
            "hasPreviousPage": p.has_previous_page(),
        },
    })
}

fn infinite_scroll(data: Value, meta: &ResponseMeta, rows: usize) -> Value {
    let p = &meta.pagination;
    let has_next = p.has_next_page(rows);
    let next_cursor = has_next.then(|| encode_cursor(p.offset.saturating_add(rows as u64)));

    let mut scroll_meta = json!({
        "filters": meta.filters,
        "search": meta.search,
    });
    if let (Some(total), Some(obj)) = (p.total, scroll_meta.as_object_mut()) {
        obj.insert("total".to_string(), json!(total));
    }

    json!({
        "success": true,
        "data": data,
        "pagination": {
            "hasNextPage": has_next,
            "nextCursor": next_cursor,
            "pageSize": p.page_size,
        },
        "meta": scroll_meta,
    })
}

fn cursor(data: Value, meta: &ResponseMeta, rows: usize) -> Value {
    let p = &meta.pagination;
    let (start, end) = if rows == 0 {
        (None, None)
    } else {
        (
            Some(encode_cursor(p.offset)),
            Some(encode_cursor(p.offset.saturating_add(rows as u64 - 1))),
        )
    };
    json!({
        "success": true,
        "data": data,
        "pageInfo": {
            "hasNextPage": p.has_next_page(rows),
            "hasPreviousPage": p.has_previous_page(),
            "startCursor": start,
            "endCursor": end,
        },
        "meta": {
            "total": p.total,
            "pageSize": p.page_size,
            "filters": meta.filters,
            "sorting": meta.sorting,
            "search": meta.search,
        },
    })
}

fn standard(data: Value, meta: &ResponseMeta, rows: usize) -> Value {
    json!({
        "success": true,
        "data": data,
        "meta": comprehensive_meta(meta, rows),
        "pagination": pagination_block(meta, rows),
    })
}

fn pagination_block(meta: &ResponseMeta, rows: usize) -> Value {
    let p = &meta.pagination;
    let (from, to) = if rows == 0 {
        (Value::Null, Value::Null)
    } else {
        (json!(p.offset.saturating_add(1)), json!(p.offset.saturating_add(rows as u64)))
    };
    json!({
        "page": p.page,
        "pageSize": p.page_size,
        "total": p.total,
        "totalPages": p.total_pages(),
        "hasNextPage": p.has_next_page(rows),
        "hasPreviousPage": p.has_previous_page(),
        "from": from,
        "to": to,
    })
}

fn comprehensive_meta(meta: &ResponseMeta, rows: usize) -> Value {
    json!({
        "pagination": pagination_block(meta, rows),
        "filters": meta.filters,
        "sorting": meta.sorting,
        "search": meta.search,
        "count": rows,
    })
}

fn links(meta: &ResponseMeta, rows: usize) -> Value {
    let p = &meta.pagination;
    let base = meta.path.as_deref().unwrap_or("");
    let link = |page: u64| {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &page.to_string())
            .append_pair("pageSize", &p.page_size.to_string())
            .finish();
        format!("{base}?{query}")
    };
    json!({
        "self": link(p.page),
        "first": link(1),
        "last": p.total_pages().map(|last| link(last.max(1))),
        "next": p.has_next_page(rows).then(|| link(p.page.saturating_add(1))),
        "prev": (p.page > 1).then(|| link(p.page - 1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::meta::PageInfo;
    use chrono::TimeZone;

    fn meta(page: u64, total: Option<u64>) -> ResponseMeta {
        ResponseMeta {
            pagination: PageInfo {
                page,
                page_size: 2,
                offset: (page - 1) * 2,
                total,
            },
            ..ResponseMeta::default()
        }
    }

    fn rows(n: usize) -> Value {
        Value::Array((0..n).map(|i| json!({"id": i})).collect())
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ResponseFormat::from_name("AgGrid"), ResponseFormat::AgGrid);
        assert_eq!(ResponseFormat::from_name("mui-datagrid"), ResponseFormat::Mui);
        assert_eq!(ResponseFormat::from_name("react-query"), ResponseFormat::TanStackQuery);
        assert_eq!(ResponseFormat::from_name("xml"), ResponseFormat::Standard);
    }

    #[test]
    fn test_ag_grid_last_row_sentinel() {
        let f = ResponseFormatter::new();
        let body = f.format(rows(2), &meta(1, Some(5)), "ag-grid");
        assert_eq!(body["lastRow"], Value::Null);
        let body = f.format(rows(1), &meta(3, Some(5)), "ag-grid");
        assert_eq!(body["lastRow"], 5);
        let body = f.format(rows(1), &meta(2, None), "ag-grid");
        assert_eq!(body["lastRow"], 3);
    }

    #[test]
    fn test_mui_zero_based_page() {
        let body = ResponseFormatter::new().format(rows(2), &meta(2, Some(5)), "mui");
        assert_eq!(body["rowCount"], 5);
        assert_eq!(body["meta"]["page"], 1);
        assert_eq!(body["meta"]["hasNextPage"], true);
        assert_eq!(body["meta"]["hasPreviousPage"], true);
    }

    #[test]
    fn test_tanstack_links_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let m = meta(2, Some(5)).with_path("/Users");
        let body = ResponseFormatter::at(now).format(rows(2), &m, "tanstack-query");
        assert_eq!(body["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(body["links"]["next"], "/Users?page=3&pageSize=2");
        assert_eq!(body["links"]["prev"], "/Users?page=1&pageSize=2");
        assert_eq!(body["links"]["last"], "/Users?page=3&pageSize=2");
        assert_eq!(body["meta"]["pagination"]["totalPages"], 3);
    }

    #[test]
    fn test_swr_cache_key_is_stable() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let f = ResponseFormatter::at(now);
        let a = f.format(rows(2), &meta(1, None), "swr");
        let b = f.format(rows(1), &meta(1, Some(9)), "swr");
        assert_eq!(a["cache_key"], b["cache_key"]);
        assert_eq!(a["cache_key"].as_str().unwrap().len(), 32);
        assert_eq!(a["timestamp"], now.timestamp());
        let c = f.format(rows(2), &meta(2, None), "swr");
        assert_ne!(a["cache_key"], c["cache_key"]);
    }

    #[test]
    fn test_infinite_scroll_and_cursor() {
        let f = ResponseFormatter::new();
        let body = f.format(rows(2), &meta(1, None), "infinite-scroll");
        let next = body["pagination"]["nextCursor"].as_str().unwrap();
        assert_eq!(decode_cursor(next), Some(2));
        assert!(body["meta"].get("total").is_none());

        let body = f.format(rows(2), &meta(2, Some(4)), "cursor");
        assert_eq!(body["pageInfo"]["hasNextPage"], false);
        let end = body["pageInfo"]["endCursor"].as_str().unwrap();
        assert_eq!(decode_cursor(end), Some(3));
    }

    #[test]
    fn test_standard_is_default() {
        let body = ResponseFormatter::new().format(rows(0), &meta(1, Some(0)), "unknown");
        assert_eq!(body["success"], true);
        assert_eq!(body["pagination"]["from"], Value::Null);
        assert_eq!(body["meta"]["count"], 0);
    }
}
