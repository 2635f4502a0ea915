//! Free-text search predicate

use crate::dialect::Dialect;
use crate::sql::query::{Predicate, Query};

/// Build a search predicate across `fields`
///
/// Every field is matched against the same `%term%` parameter with the
/// dialect's search operator. Returns `None` when there is nothing to search
/// (no fields, or an empty term). Whitespace is a real term.
///
/// # Example
/// ```
/// use query_pager::Dialect;
/// use query_pager::sql::build_search_clause;
///
/// let fields = vec!["name".to_string(), "email".to_string()];
/// let predicate = build_search_clause(&fields, "john", Dialect::PostgreSQL).unwrap();
/// assert_eq!(predicate.sql(), "(name ILIKE ? OR email ILIKE ?)");
/// assert_eq!(predicate.params().len(), 2);
/// ```
pub fn build_search_clause(fields: &[String], term: &str, dialect: Dialect) -> Option<Predicate> {
    if fields.is_empty() || term.is_empty() {
        return None;
    }

    let operator = dialect.search_operator();
    let pattern = format!("%{}%", term);

    let sql = match fields {
        [field] => format!("{} {} ?", field, operator),
        _ => {
            let parts: Vec<String> = fields
                .iter()
                .map(|field| format!("{} {} ?", field, operator))
                .collect();
            format!("({})", parts.join(" OR "))
        }
    };

    Some(Predicate::new(sql, fields.iter().map(|_| pattern.clone())))
}

/// AND a search predicate into `query`, using the query's own dialect
pub fn apply_search(query: Query, fields: &[String], term: &str) -> Query {
    match build_search_clause(fields, term, query.dialect()) {
        Some(predicate) => query.where_predicate(predicate),
        None => query,
    }
}
