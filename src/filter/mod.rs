//! Filter strategies
//!
//! A strategy decides *what* to read: which table, which predicates, which
//! columns are searchable, the fallback ordering and which relations may be
//! preloaded. The executor decides *how*. Four strategies ship with the crate:
//!
//! - [`SimpleQueryBuilder`] - table, search fields, default sort and one predicate function
//! - [`ChainableQueryBuilder`] - same, with any number of predicate functions applied in order
//! - [`DynamicFilter`] - an ordered list of [`FilterCondition`](crate::sql::FilterCondition)s
//! - custom filters - any type implementing [`Filterable`], usually embedding a [`BaseFilter`]

use std::collections::HashMap;

use crate::dialect::Dialect;
use crate::pagination::PaginationRequest;
use crate::relation::RelationSet;
use crate::sql::query::Query;
use crate::sql::sanitize::is_valid_include;

pub mod chainable;
pub mod custom;
pub mod dynamic;
pub mod simple;

pub use chainable::ChainableQueryBuilder;
pub use custom::{BaseFilter, BindQuery};
pub use dynamic::DynamicFilter;
pub use simple::SimpleQueryBuilder;

/// Predicate function applied to the query of a builder
pub type FilterFn = std::sync::Arc<dyn Fn(Query) -> Query + Send + Sync>;

/// What to read, independent of how it is executed
pub trait Filterable: Send + Sync {
    /// Add this filter's predicates (and joins) to `query`
    fn apply_filters(&self, query: Query) -> Query;

    /// Columns matched by the free-text search, in order
    fn search_fields(&self) -> Vec<String>;

    fn table_name(&self) -> &str;

    /// ORDER BY expression used when the request has no valid sort field
    fn default_sort(&self) -> &str;

    fn pagination(&self) -> PaginationRequest;

    fn dialect(&self) -> Dialect {
        Dialect::default()
    }

    /// Relations available to includes
    fn relations(&self) -> &RelationSet {
        RelationSet::empty()
    }
}

/// A filter that carries its own include list and allow-list
pub trait IncludableQueryBuilder: Filterable {
    fn includes(&self) -> Vec<String>;

    /// Relation names mapped to whether clients may request them
    fn allowed_includes(&self) -> HashMap<String, bool>;

    fn set_includes(&mut self, includes: Vec<String>);

    /// Replace the includes with the allowed, well-formed subset
    fn validate(&mut self) {
        let includes = resolve_includes(&self.includes(), &self.allowed_includes());
        self.set_includes(includes);
    }
}

/// Keep the requested includes that are allow-listed and well-formed
///
/// Request order is preserved. Anything else is dropped without error.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use query_pager::filter::resolve_includes;
///
/// let allowed = HashMap::from([("Province".to_string(), true), ("Sport".to_string(), true)]);
/// let requested = vec!["Province".to_string(), "Secret".to_string()];
/// assert_eq!(resolve_includes(&requested, &allowed), vec!["Province".to_string()]);
/// ```
pub fn resolve_includes(requested: &[String], allowed: &HashMap<String, bool>) -> Vec<String> {
    requested
        .iter()
        .filter(|include| {
            let keep = allowed.get(include.as_str()).copied().unwrap_or(false)
                && is_valid_include(include);
            if !keep {
                tracing::debug!(include = %include, "dropping include not in allow-list");
            }
            keep
        })
        .cloned()
        .collect()
}
