//! # Request Parameter Parsing
//!
//! One backend serves several data-grid front ends, each with its own query
//! convention. [`RequestParameterParser`] detects which convention a request
//! uses and normalizes it into [`ParsedParams`]:
//!
//! ```text
//! { pagination: {page, pageSize, offset, limit, ...extras},
//!   sorting:    [{field, direction, priority}],
//!   filters:    [{field, operator, value}],
//!   search:     {term, fields, operator},
//!   responseFormat, options, meta }
//! ```
//!
//! ## Detection
//!
//! Strategies are tried in a declared priority order and the first whose
//! [`FormatParser::can_handle`] accepts the request wins:
//!
//! | priority | strategy | signature |
//! |---|---|---|
//! | 1 | [`AgGridRequestParser`] | `startRow` and `endRow` |
//! | 2 | [`MuiDataGridRequestParser`] | `filterModel` / `sortModel`, or `format=mui` |
//! | 3 | [`AdvancedRequestParser`] | `per_page`, `search_fields`, `include_*`, `sort=field:dir`, `filter[...]` |
//! | 4 | [`SimpleRequestParser`] | anything |
//!
//! Signatures overlap (an AG-Grid request may also carry `filterModel`), so
//! the order decides, not specificity. The simple strategy accepts every
//! request, so parsing never fails for lack of a parser.
//!
//! ## Example
//!
//! ```rust
//! use gravitycar::request::params::RequestParameterParser;
//! use serde_json::json;
//!
//! let parser = RequestParameterParser::default();
//! let raw = json!({"startRow": 20, "endRow": 40});
//! let parsed = parser.parse(raw.as_object().unwrap());
//! assert_eq!(parsed.meta.detected_format, "ag-grid");
//! assert_eq!(parsed.pagination.page, 2);
//! ```

mod advanced;
mod ag_grid;
mod common;
mod mui;
mod simple;
mod types;

pub use advanced::AdvancedRequestParser;
pub use ag_grid::{map_ag_grid_operator, AgGridRequestParser};
pub use common::{sanitize_field_name, PageLimits};
pub use mui::{map_mui_operator, MuiDataGridRequestParser};
pub use simple::{SimpleRequestParser, RESERVED_PARAMS};
pub use types::{
    FilterSpec, Pagination, ParseMeta, ParseOptions, ParsedParams, RawParams, SearchOperator,
    SearchSpec, SortDirection, SortSpec,
};

use crate::runtime_config::RuntimeConfig;
use tracing::debug;

/// Response format used when neither the request nor its format implies one.
pub const DEFAULT_RESPONSE_FORMAT: &str = "standard";

/// One client-library query convention.
pub trait FormatParser: Send + Sync {
    /// Stable name reported in `meta.detectedFormat`.
    fn format_name(&self) -> &'static str;

    /// Whether the request carries this format's signature.
    fn can_handle(&self, raw: &RawParams) -> bool;

    /// Normalize the request. Never fails: unusable parts are skipped and
    /// listed in `meta.ignored`.
    fn parse(&self, raw: &RawParams) -> ParsedParams;
}

/// Ordered set of [`FormatParser`]s.
pub struct RequestParameterParser {
    parsers: Vec<Box<dyn FormatParser>>,
    fallback: SimpleRequestParser,
}

impl Default for RequestParameterParser {
    fn default() -> Self {
        Self::new(PageLimits::default())
    }
}

impl RequestParameterParser {
    /// Standard priority order: AG-Grid, MUI, Advanced, Simple.
    pub fn new(limits: PageLimits) -> Self {
        Self::with_parsers(
            vec![
                Box::new(AgGridRequestParser::new(limits)),
                Box::new(MuiDataGridRequestParser::new(limits)),
                Box::new(AdvancedRequestParser::new(limits)),
                Box::new(SimpleRequestParser::new(limits)),
            ],
            limits,
        )
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(PageLimits::from(config))
    }

    /// Custom priority order. A simple parser on `limits` is used when no
    /// listed parser accepts a request.
    pub fn with_parsers(parsers: Vec<Box<dyn FormatParser>>, limits: PageLimits) -> Self {
        Self {
            parsers,
            fallback: SimpleRequestParser::new(limits),
        }
    }

    /// Names of the registered strategies, in priority order.
    #[must_use]
    pub fn format_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.format_name()).collect()
    }

    fn select(&self, raw: &RawParams) -> &dyn FormatParser {
        self.parsers
            .iter()
            .find(|p| p.can_handle(raw))
            .map(|p| p.as_ref())
            .unwrap_or(&self.fallback)
    }

    /// Name of the strategy that would handle `raw`.
    #[must_use]
    pub fn detect_format(&self, raw: &RawParams) -> &'static str {
        self.select(raw).format_name()
    }

    /// Detect, normalize and pick the response format.
    #[must_use]
    pub fn parse(&self, raw: &RawParams) -> ParsedParams {
        let parser = self.select(raw);
        let mut parsed = parser.parse(raw);
        parsed.meta.detected_format = parser.format_name().to_string();
        parsed.meta.raw_param_count = raw.len();
        parsed.response_format = response_format_for(raw, parser.format_name());

        debug!(
            format = parser.format_name(),
            response_format = %parsed.response_format,
            filters = parsed.filters.len(),
            sorts = parsed.sorting.len(),
            page = parsed.pagination.page,
            page_size = parsed.pagination.page_size,
            "Request parameters normalized"
        );
        parsed
    }
}

/// Explicit `responseFormat`/`format` wins; otherwise grid formats answer in
/// their own shape and everything else gets the standard envelope.
#[must_use]
pub fn response_format_for(raw: &RawParams, detected: &str) -> String {
    if let Some(hint) = common::format_hint(raw) {
        return hint;
    }
    match detected {
        "ag-grid" => "ag-grid".to_string(),
        "mui" => "mui".to_string(),
        _ => DEFAULT_RESPONSE_FORMAT.to_string(),
    }
}
