//! # query-pager
//!
//! Dialect-aware filtered, searched and paginated read queries over sqlx.
//!
//! API handlers describe *what* to read with a filter strategy and hand the
//! client's paging input to the executor, which builds parameterized SQL,
//! counts the matching rows, fetches one page and preloads any requested
//! relations. Client input never becomes SQL text: search terms and filter
//! values are bound parameters, while sort fields and relation names must pass
//! an identifier allow-list and are silently dropped otherwise.
//!
//! ## Features
//!
//! - **Four filter strategies**: [`SimpleQueryBuilder`], [`ChainableQueryBuilder`],
//!   [`DynamicFilter`] and hand-written [`Filterable`] implementations
//! - **Dialect rendering**: placeholders, identifier quoting, `LIKE`/`ILIKE` and
//!   limit/offset syntax for MySQL, PostgreSQL, SQLite and SQL Server
//! - **Fail-closed binding**: malformed paging parameters fall back to defaults
//! - **Relation preloading**: allow-listed includes loaded with one `IN` query per level
//! - **Response envelope**: [`PaginatedResponse`] with page metadata
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use query_pager::{Dialect, QueryParams, SimpleQueryBuilder, paginate};
//! use sqlx::SqlitePool;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = SqlitePool::connect("sqlite://app.db").await?;
//!
//!     let users = SimpleQueryBuilder::new("users")
//!         .with_search_fields(["name", "email"])
//!         .with_default_sort("name asc")
//!         .with_dialect(Dialect::SQLite);
//!
//!     // Usually decoded from the request's query string
//!     let params: QueryParams = [("page", "2"), ("per_page", "20"), ("search", "john")]
//!         .into_iter()
//!         .collect();
//!
//!     let (rows, pagination) = paginate(&pool, &params, &users).await?;
//!     println!("{} of {} users", rows.len(), pagination.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Binding limits are configured with [`PaginationConfig`]:
//!
//! ```rust
//! use query_pager::{PaginationConfig, SortOrder};
//!
//! let config = PaginationConfig::builder()
//!     .default_per_page(25)   // Page size when none is sent (default: 10)
//!     .max_per_page(50)       // Larger requests are clamped (default: 100)
//!     .default_order(SortOrder::Desc)
//!     .build();
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events (rendered SQL at `debug`, unregistered
//! includes at `warn`) and never installs a subscriber.

pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod filter;
pub mod helpers;
pub mod pagination;
pub mod params;
pub mod relation;
pub mod response;
pub mod sql;
pub mod store;

// Re-export main types for convenience
pub use config::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PaginationConfig, PaginationConfigBuilder};
pub use dialect::Dialect;
pub use error::{PagerError, Result};
pub use executor::{paginated_query, paginated_query_as, paginated_query_with_includable};
pub use filter::{
    BaseFilter, BindQuery, ChainableQueryBuilder, DynamicFilter, Filterable,
    IncludableQueryBuilder, SimpleQueryBuilder,
};
pub use helpers::{
    bind_and_validate_filter, create_searchable_filter, paginate, paginate_with_custom_filter,
    paginated_api_response, paginated_api_response_with_custom_filter,
    paginated_api_response_with_query_layer, paginated_query_with_query_layer,
};
pub use pagination::{
    PaginationRequest, PaginationResponse, SortOrder, calculate_pagination, parse_bool_flag,
    parse_includes,
};
pub use params::QueryParams;
pub use relation::{Relation, RelationKind, RelationSet};
pub use response::PaginatedResponse;
pub use sql::{FilterCondition, FilterOperator, Logic, Predicate, Query};
pub use store::{Row, Store};
