//! Condition-list filter

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::filter::Filterable;
use crate::pagination::PaginationRequest;
use crate::sql::condition::{FilterCondition, build_condition_chain};
use crate::sql::query::Query;

/// Filter described by an ordered list of conditions
///
/// Conditions are compiled left to right into one predicate. Conditions on
/// invalid field names are dropped; unknown operators never get this far
/// because [`FilterCondition`] rejects them when it is built or deserialized.
///
/// Only `filters` and `pagination` are read when deserializing. The table,
/// search fields and default sort are written into the SQL verbatim, so they
/// stay server-side: set them on the deserialized value.
///
/// ```
/// use query_pager::{DynamicFilter, Filterable};
///
/// let body = r#"{"table_name": "secrets", "filters": [{"field": "age", "operator": ">=", "value": 18}]}"#;
/// let filter = DynamicFilter {
///     table_name: "users".to_string(),
///     ..serde_json::from_str(body).unwrap()
/// };
///
/// assert_eq!(filter.table_name(), "users");
/// assert_eq!(filter.conditions().len(), 1);
/// ```
///
/// # Example
/// ```
/// use query_pager::{DynamicFilter, Filterable};
///
/// let filter = DynamicFilter::new("users")
///     .with_search_fields(["name", "email"])
///     .where_condition("age", ">", 30)
///     .unwrap();
///
/// assert_eq!(filter.conditions().len(), 1);
/// assert!(DynamicFilter::new("users").where_condition("age", "BETWEEN", 30).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicFilter {
    #[serde(skip_deserializing)]
    pub table_name: String,
    #[serde(skip_deserializing)]
    pub search_fields: Vec<String>,
    #[serde(skip_deserializing)]
    pub default_sort: String,
    pub filters: Vec<FilterCondition>,
    pub pagination: PaginationRequest,
    #[serde(skip)]
    pub dialect: Dialect,
}

impl Default for DynamicFilter {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            search_fields: Vec::new(),
            default_sort: "id asc".to_string(),
            filters: Vec::new(),
            pagination: PaginationRequest::default(),
            dialect: Dialect::default(),
        }
    }
}

impl DynamicFilter {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
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

    pub fn with_pagination(mut self, pagination: PaginationRequest) -> Self {
        self.pagination = pagination;
        self
    }

    /// Append an already built condition
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Append `field operator value`, failing on an unknown operator
    pub fn where_condition(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        Ok(self.with_condition(FilterCondition::new(field, operator, value)?))
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.filters
    }
}

impl Filterable for DynamicFilter {
    fn apply_filters(&self, query: Query) -> Query {
        match build_condition_chain(&self.filters) {
            Some(predicate) => query.where_predicate(predicate),
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
}
