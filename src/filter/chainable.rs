//! Fluent query builder with stacked predicate functions

use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::filter::{FilterFn, Filterable};
use crate::pagination::PaginationRequest;
use crate::relation::{Relation, RelationSet};
use crate::sql::query::Query;

/// Like [`SimpleQueryBuilder`](crate::SimpleQueryBuilder), but every
/// [`with_filters`](Self::with_filters) call adds a predicate function.
/// Functions run in registration order.
#[derive(Clone)]
pub struct ChainableQueryBuilder {
    table_name: String,
    search_fields: Vec<String>,
    default_sort: String,
    dialect: Dialect,
    filters: Vec<FilterFn>,
    pagination: PaginationRequest,
    relations: RelationSet,
}

impl ChainableQueryBuilder {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            search_fields: Vec::new(),
            default_sort: "id asc".to_string(),
            dialect: Dialect::default(),
            filters: Vec::new(),
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

    /// Append a predicate function
    pub fn with_filters<F>(mut self, filter: F) -> Self
    where
        F: Fn(Query) -> Query + Send + Sync + 'static,
    {
        self.add_filter(filter);
        self
    }

    /// Append a predicate function in place
    pub fn add_filter<F>(&mut self, filter: F)
    where
        F: Fn(Query) -> Query + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
    }

    pub fn with_pagination(mut self, pagination: PaginationRequest) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.insert(relation);
        self
    }

    pub fn search_operator(&self) -> &'static str {
        self.dialect.search_operator()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}

impl fmt::Debug for ChainableQueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainableQueryBuilder")
            .field("table_name", &self.table_name)
            .field("search_fields", &self.search_fields)
            .field("default_sort", &self.default_sort)
            .field("dialect", &self.dialect)
            .field("filters", &self.filters.len())
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

impl Filterable for ChainableQueryBuilder {
    fn apply_filters(&self, query: Query) -> Query {
        self.filters.iter().fold(query, |query, filter| filter(query))
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
