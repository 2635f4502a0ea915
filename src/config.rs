//! Configuration for request binding
//!
//! Provides a builder pattern for the defaults and limits applied when a
//! [`PaginationRequest`](crate::PaginationRequest) is bound from request parameters.

use crate::pagination::SortOrder;

/// Page size used when the client sends none, zero or a negative value
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Upper bound on the page size a client may request
pub const MAX_PER_PAGE: i64 = 100;

/// Defaults and limits for binding pagination parameters
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// Page size when the request has none (default: 10)
    pub default_per_page: i64,
    /// Largest accepted page size; larger values are clamped (default: 100)
    pub max_per_page: i64,
    /// Sort direction when the request has none (default: asc)
    pub default_order: SortOrder,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            default_order: SortOrder::Asc,
        }
    }
}

impl PaginationConfig {
    /// Create a new configuration builder
    pub fn builder() -> PaginationConfigBuilder {
        PaginationConfigBuilder::new()
    }
}

/// Builder for PaginationConfig
#[derive(Debug)]
pub struct PaginationConfigBuilder {
    default_per_page: i64,
    max_per_page: i64,
    default_order: SortOrder,
}

impl Default for PaginationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationConfigBuilder {
    /// Create a new builder with the standard defaults
    pub fn new() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            default_order: SortOrder::Asc,
        }
    }

    /// Set the page size used when the client sends none (default: 10)
    pub fn default_per_page(mut self, per_page: i64) -> Self {
        self.default_per_page = per_page;
        self
    }

    /// Set the largest page size a client may request (default: 100)
    pub fn max_per_page(mut self, per_page: i64) -> Self {
        self.max_per_page = per_page;
        self
    }

    /// Set the sort direction used when the client sends none (default: asc)
    pub fn default_order(mut self, order: SortOrder) -> Self {
        self.default_order = order;
        self
    }

    /// Build the configuration
    ///
    /// Non-positive sizes fall back to the standard defaults and the default
    /// page size never exceeds the maximum.
    pub fn build(self) -> PaginationConfig {
        let max_per_page = if self.max_per_page > 0 {
            self.max_per_page
        } else {
            MAX_PER_PAGE
        };
        let default_per_page = if self.default_per_page > 0 {
            self.default_per_page.min(max_per_page)
        } else {
            DEFAULT_PER_PAGE.min(max_per_page)
        };

        PaginationConfig {
            default_per_page,
            max_per_page,
            default_order: self.default_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = PaginationConfig::default();

        assert_eq!(config.default_per_page, 10);
        assert_eq!(config.max_per_page, 100);
        assert_eq!(config.default_order, SortOrder::Asc);
    }

    #[test]
    fn test_builder_matches_default() {
        let built = PaginationConfig::builder().build();
        let default = PaginationConfig::default();

        assert_eq!(built.default_per_page, default.default_per_page);
        assert_eq!(built.max_per_page, default.max_per_page);
        assert_eq!(built.default_order, default.default_order);
    }

    // =========================================================================
    // Builder Tests
    // =========================================================================

    #[test]
    fn test_custom_config() {
        let config = PaginationConfig::builder()
            .default_per_page(25)
            .max_per_page(50)
            .default_order(SortOrder::Desc)
            .build();

        assert_eq!(config.default_per_page, 25);
        assert_eq!(config.max_per_page, 50);
        assert_eq!(config.default_order, SortOrder::Desc);
    }

    #[test]
    fn test_default_never_exceeds_max() {
        let config = PaginationConfig::builder()
            .default_per_page(40)
            .max_per_page(20)
            .build();

        assert_eq!(config.default_per_page, 20);
    }

    #[test]
    fn test_non_positive_sizes_fall_back() {
        let config = PaginationConfig::builder()
            .default_per_page(0)
            .max_per_page(-3)
            .build();

        assert_eq!(config.default_per_page, DEFAULT_PER_PAGE);
        assert_eq!(config.max_per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_builder_order_independence() {
        let config1 = PaginationConfig::builder()
            .max_per_page(30)
            .default_per_page(15)
            .build();
        let config2 = PaginationConfig::builder()
            .default_per_page(15)
            .max_per_page(30)
            .build();

        assert_eq!(config1.default_per_page, config2.default_per_page);
        assert_eq!(config1.max_per_page, config2.max_per_page);
    }
}
