//! Building blocks for user-defined filters
//!
//! A custom filter is a plain struct that embeds a [`BaseFilter`] for paging
//! and includes, adds its own typed parameters, and implements
//! [`Filterable`](crate::Filterable) by hand, usually together with
//! [`IncludableQueryBuilder`](crate::IncludableQueryBuilder) and [`BindQuery`]. It is
//! free to add joins and computed columns in `apply_filters`.
//!
//! ```
//! use std::collections::HashMap;
//! use query_pager::{
//!     BaseFilter, BindQuery, Filterable, IncludableQueryBuilder, PaginationRequest, Query,
//!     QueryParams, Relation, RelationSet, Result,
//! };
//!
//! struct AthleteFilter {
//!     base: BaseFilter,
//!     province_id: Option<i64>,
//!     event_id: Option<i64>,
//!     relations: RelationSet,
//! }
//!
//! impl Filterable for AthleteFilter {
//!     fn apply_filters(&self, mut query: Query) -> Query {
//!         if let Some(id) = self.province_id {
//!             query = query.where_clause("athletes.province_id = ?", [id]);
//!         }
//!         if let Some(id) = self.event_id {
//!             query = query
//!                 .select(["athletes.*"])
//!                 .join("JOIN players_events pe ON pe.player_id = athletes.id AND pe.player_type = 'athlete'")
//!                 .where_clause("pe.event_id = ?", [id]);
//!         }
//!         query
//!     }
//!     fn search_fields(&self) -> Vec<String> { vec!["athletes.name".to_string()] }
//!     fn table_name(&self) -> &str { "athletes" }
//!     fn default_sort(&self) -> &str { "athletes.id asc" }
//!     fn pagination(&self) -> PaginationRequest { self.base.pagination.clone() }
//!     fn relations(&self) -> &RelationSet { &self.relations }
//! }
//!
//! impl IncludableQueryBuilder for AthleteFilter {
//!     fn includes(&self) -> Vec<String> { self.base.includes.clone() }
//!     fn allowed_includes(&self) -> HashMap<String, bool> {
//!         HashMap::from([("Province".to_string(), true)])
//!     }
//!     fn set_includes(&mut self, includes: Vec<String>) { self.base.includes = includes; }
//! }
//!
//! impl BindQuery for AthleteFilter {
//!     fn base_mut(&mut self) -> &mut BaseFilter { &mut self.base }
//!     fn bind_fields(&mut self, params: &QueryParams) -> Result<()> {
//!         self.province_id = params.parse("province_id")?;
//!         self.event_id = params.parse("event_id")?;
//!         Ok(())
//!     }
//! }
//!
//! let mut filter = AthleteFilter {
//!     base: BaseFilter::default(),
//!     province_id: None,
//!     event_id: None,
//!     relations: RelationSet::new()
//!         .with(Relation::belongs_to("Province", "provinces", "province_id")),
//! };
//! let params = QueryParams::new()
//!     .with("page", "2")
//!     .with("province_id", "3")
//!     .with("includes", "Province,Secret");
//!
//! filter.bind_query(&params).unwrap();
//! filter.validate();
//!
//! assert_eq!(filter.pagination().page, 2);
//! assert_eq!(filter.province_id, Some(3));
//! assert_eq!(filter.includes(), vec!["Province".to_string()]);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::Result;
use crate::pagination::{PaginationRequest, parse_includes};
use crate::params::QueryParams;

/// Paging and include state shared by custom filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseFilter {
    pub pagination: PaginationRequest,
    pub includes: Vec<String>,
}

impl BaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind pagination and the `includes` list from request parameters
    pub fn bind(&mut self, params: &QueryParams) {
        self.bind_with(params, &PaginationConfig::default());
    }

    /// [`bind`](Self::bind) with explicit limits
    pub fn bind_with(&mut self, params: &QueryParams, config: &PaginationConfig) {
        self.pagination = PaginationRequest::from_params_with(params, config);
        self.includes = params.get("includes").map(parse_includes).unwrap_or_default();
    }
}

/// Binding of a custom filter from request parameters
///
/// The embedded [`BaseFilter`] is bound first and never fails; filter-specific
/// fields follow and may reject malformed values with
/// [`PagerError::Binding`](crate::PagerError::Binding).
pub trait BindQuery {
    /// The embedded base filter
    fn base_mut(&mut self) -> &mut BaseFilter;

    /// Bind filter-specific parameters
    fn bind_fields(&mut self, _params: &QueryParams) -> Result<()> {
        Ok(())
    }

    fn bind_query(&mut self, params: &QueryParams) -> Result<()> {
        self.base_mut().bind(params);
        self.bind_fields(params)
    }
}

impl BindQuery for BaseFilter {
    fn base_mut(&mut self) -> &mut BaseFilter {
        self
    }
}
