//! Pagination request and response model
//!
//! [`PaginationRequest`] carries the client's paging, search and sort input.
//! Every field fails closed: malformed values are replaced by safe defaults
//! instead of rejecting the request.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{DEFAULT_PER_PAGE, PaginationConfig};
use crate::params::QueryParams;

/// Sort direction
///
/// Parsing never fails: anything other than exactly `desc` is `asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Lenient parse: `desc` is descending, everything else ascending
    pub fn parse(s: &str) -> Self {
        Self::parse_strict(s).unwrap_or_default()
    }

    /// Parse exactly `asc` or `desc`; case and padding variants are rejected
    pub fn parse_strict(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SortOrder {
    fn from(s: String) -> Self {
        SortOrder::parse(&s)
    }
}

impl From<&str> for SortOrder {
    fn from(s: &str) -> Self {
        SortOrder::parse(s)
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.as_str().to_string()
    }
}

/// Client paging, search and sort input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationRequest {
    /// 1-based page index
    pub page: i64,
    /// Page size
    pub per_page: i64,
    /// Free-text search term
    pub search: String,
    /// Column to sort by; only used if it passes the sort-field validator
    pub sort: String,
    /// Sort direction
    pub order: SortOrder,
    /// Return every matching row as a single page
    pub is_disabled: bool,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            search: String::new(),
            sort: String::new(),
            order: SortOrder::Asc,
            is_disabled: false,
        }
    }
}

impl PaginationRequest {
    /// Create a request for the given page and page size
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            ..Self::default()
        }
    }

    /// Set the search term
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set the sort field and direction
    pub fn with_sort(mut self, sort: impl Into<String>, order: SortOrder) -> Self {
        self.sort = sort.into();
        self.order = order;
        self
    }

    /// Enable or disable paging
    pub fn disabled(mut self, is_disabled: bool) -> Self {
        self.is_disabled = is_disabled;
        self
    }

    /// Number of rows to skip: `(page - 1) * limit`, with page clamped to 1
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }

    /// Page size, or the default of 10 when not positive
    pub fn limit(&self) -> i64 {
        if self.per_page <= 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }

    /// Clamp page and page size into their valid ranges
    pub fn validate(&mut self) {
        if self.page <= 0 {
            self.page = 1;
        }
        if self.per_page <= 0 {
            self.per_page = DEFAULT_PER_PAGE;
        }
    }

    /// Bind from request parameters using the default configuration
    pub fn from_params(params: &QueryParams) -> Self {
        Self::from_params_with(params, &PaginationConfig::default())
    }

    /// Bind from request parameters
    ///
    /// `page` must be a positive integer, `per_page` a positive integer (clamped
    /// to `config.max_per_page`), `order` exactly `asc` or `desc`. Anything else
    /// keeps the configured default.
    pub fn from_params_with(params: &QueryParams, config: &PaginationConfig) -> Self {
        let mut request = Self {
            per_page: config.default_per_page,
            order: config.default_order,
            ..Self::default()
        };

        if let Some(page) = params
            .get_non_empty("page")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|p| *p > 0)
        {
            request.page = page;
        }

        if let Some(per_page) = params
            .get_non_empty("per_page")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|p| *p > 0)
        {
            request.per_page = per_page.min(config.max_per_page);
        }

        request.search = params.get("search").unwrap_or_default().to_string();
        request.sort = params.get("sort").unwrap_or_default().to_string();

        if let Some(order) = params.get("order").and_then(SortOrder::parse_strict) {
            request.order = order;
        }

        if let Some(flag) = params.get_non_empty("is_disabled") {
            request.is_disabled = parse_bool_flag(flag);
        }

        request.validate();
        request
    }
}

/// Interpret a bool-ish flag: `1`, `true`, `yes`, `y`, `on` (case-insensitive)
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// Split a comma-separated include list, trimming entries and dropping empty ones
pub fn parse_includes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Page metadata returned alongside the rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub page: i64,
    pub per_page: i64,
    pub max_page: i64,
    pub total: i64,
    pub is_disabled: bool,
}

impl PaginationResponse {
    /// Compute page metadata from the request and the total row count
    pub fn calculate(request: &PaginationRequest, total: i64) -> Self {
        let total = total.max(0);

        if request.is_disabled {
            return Self {
                page: 1,
                per_page: total,
                max_page: 1,
                total,
                is_disabled: true,
            };
        }

        let per_page = request.limit();
        let max_page = (total / per_page + i64::from(total % per_page != 0)).max(1);

        Self {
            page: request.page.max(1),
            per_page,
            max_page,
            total,
            is_disabled: false,
        }
    }
}

/// Compute page metadata from the request and the total row count
pub fn calculate_pagination(request: &PaginationRequest, total: i64) -> PaginationResponse {
    PaginationResponse::calculate(request, total)
}
