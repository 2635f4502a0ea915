//! Table-name query builder

use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::filter::{FilterFn, Filterable};
use crate::pagination::PaginationRequest;
use crate::relation::{Relation, RelationSet};
use crate::sql::query::Query;

/// Filter over a single table with an optional predicate function
///
/// # Example
/// ```
/// use query_pager::{Dialect, Filterable, Query, SimpleQueryBuilder};
///
/// let builder = SimpleQueryBuilder::new("users")
///     .with_search_fields(["name", "email"])
///     .with_default_sort("name asc")
///     .with_dialect(Dialect::PostgreSQL)
///     .with_filters(|q: Query| q.where_clause("active = ?", [true]));
///
/// assert_eq!(builder.search_operator(), "ILIKE");
/// assert_eq!(builder.table_name(), "users");
/// ```
#[derive(Clone)]
pub struct SimpleQueryBuilder {
    table_name: String,
    search_fields: Vec<String>,
    default_sort: String,
    dialect: Dialect,
    filter: Option<FilterFn>,
    pagination: PaginationRequest,
    relations: RelationSet,
}

impl SimpleQueryBuilder {
    /// Create a builder for `table_name`, sorted by `id asc` unless overridden
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            search_fields: Vec::new(),
            default_sort: "id asc".to_string(),
            dialect: Dialect::default(),
            filter: None,
            pagination: PaginationRequest::default(),
            relations: RelationSet::new(),
        }
    }

    pub fn with_search_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_sort(mut self, sort: impl Into<String>) -> Self {
        self.default_sort = sort.into();
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the predicate function, replacing any previous one
    pub fn with_filters<F>(mut self, filter: F) -> Self
    where
        F: Fn(Query) -> Query + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationRequest) -> Self {
        self.pagination = pagination;
        self
    }

    /// Register a relation that includes may preload
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.insert(relation);
        self
    }

    pub fn search_operator(&self) -> &'static str {
        self.dialect.search_operator()
    }
}

impl fmt::Debug for SimpleQueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleQueryBuilder")
            .field("table_name", &self.table_name)
            .field("search_fields", &self.search_fields)
            .field("default_sort", &self.default_sort)
            .field("dialect", &self.dialect)
            .field("has_filter", &self.filter.is_some())
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

impl Filterable for SimpleQueryBuilder {
    fn apply_filters(&self, query: Query) -> Query {
        match &self.filter {
            Some(filter) => filter(query),
            None => query,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        self.search_fields.clone()
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn default_sort(&self) -> &str {
        &self.default_sort
    }

    fn pagination(&self) -> PaginationRequest {
        self.pagination.clone()
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn relations(&self) -> &RelationSet {
        &self.relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let builder = SimpleQueryBuilder::new("users");

        assert_eq!(builder.table_name(), "users");
        assert_eq!(builder.default_sort(), "id asc");
        assert_eq!(builder.dialect(), Dialect::MySQL);
        assert!(builder.search_fields().is_empty());
        assert!(builder.relations().is_empty());
    }

    #[test]
    fn test_search_operator_follows_dialect() {
        let builder = SimpleQueryBuilder::new("users").with_search_fields(["name", "email"]);

        assert_eq!(builder.clone().with_dialect(Dialect::MySQL).search_operator(), "LIKE");
        assert_eq!(
            builder.clone().with_dialect(Dialect::PostgreSQL).search_operator(),
            "ILIKE"
        );
        assert_eq!(builder.with_dialect(Dialect::SQLite).search_operator(), "LIKE");
    }

    #[test]
    fn test_without_filter_query_is_unchanged() {
        let builder = SimpleQueryBuilder::new("users");

        let query = builder.apply_filters(Query::new("users", Dialect::SQLite));

        assert!(query.predicates().is_empty());
    }

    #[test]
    fn test_with_filters_replaces_previous() {
        let builder = SimpleQueryBuilder::new("users")
            .with_filters(|q: Query| q.where_clause("age > ?", [30]))
            .with_filters(|q: Query| q.where_clause("age < ?", [20]));

        let query = builder.apply_filters(Query::new("users", Dialect::SQLite));

        assert_eq!(query.predicates().len(), 1);
        assert_eq!(query.predicates()[0].sql(), "age < ?");
        assert_eq!(query.predicates()[0].params(), &[json!(20)]);
    }

    #[test]
    fn test_with_relation() {
        let builder = SimpleQueryBuilder::new("athletes")
            .with_relation(Relation::belongs_to("Province", "provinces", "province_id"));

        assert!(builder.relations().get("Province").is_some());
    }
}
