//! Query context threaded through filter strategies
//!
//! Filters append parameterized predicates written with `?` placeholders; the
//! query renders them into dialect-specific SQL with the parameters in bind
//! order. Values never enter the SQL text.

use serde_json::Value;

use crate::dialect::Dialect;
use crate::sql::condition::Logic;
use crate::sql::sanitize::is_valid_sort_field;

/// A parameterized SQL boolean expression
///
/// `sql` uses `?` for every parameter, in the same order as `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    sql: String,
    params: Vec<Value>,
}

impl Predicate {
    pub fn new<V: Into<Value>>(sql: impl Into<String>, params: impl IntoIterator<Item = V>) -> Self {
        Self {
            sql: sql.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// A predicate without parameters
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Combine with `other`, grouping everything so far on the left
    pub fn join(mut self, logic: Logic, other: Predicate) -> Predicate {
        self.sql = format!("({}) {} ({})", self.sql, logic, other.sql);
        self.params.extend(other.params);
        self
    }
}

/// The read query being shaped for one request
#[derive(Debug, Clone)]
pub struct Query {
    dialect: Dialect,
    table: String,
    columns: Vec<String>,
    joins: Vec<String>,
    predicates: Vec<Predicate>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Query {
    /// Start a query against `table`
    ///
    /// Plain or dotted table names are quoted for the dialect; anything else
    /// (an aliased table, a subquery) is used verbatim.
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            dialect,
            table: table.into(),
            columns: Vec::new(),
            joins: Vec::new(),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn page(&self) -> (Option<i64>, Option<i64>) {
        (self.limit, self.offset)
    }

    /// Restrict the selected columns (default: `*`)
    pub fn select<C: Into<String>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append a raw join clause, e.g. `JOIN players_events pe ON pe.player_id = athletes.id`
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// AND a parameterized condition into the WHERE clause
    ///
    /// ```
    /// use query_pager::{Dialect, Query};
    ///
    /// let query = Query::new("users", Dialect::PostgreSQL).where_clause("age > ?", [30]);
    /// let (sql, params) = query.count_sql();
    /// assert_eq!(sql, "SELECT COUNT(*) FROM \"users\" WHERE (age > $1)");
    /// assert_eq!(params, vec![serde_json::json!(30)]);
    /// ```
    ///
    /// Every `?` outside a single-quoted literal or double-quoted identifier is
    /// a parameter. A `?` inside an SQL comment, or PostgreSQL's JSONB `?`
    /// operator, is renumbered too on PostgreSQL and SQL Server; use
    /// `jsonb_exists(col, ?)` instead of `col ? ?`.
    pub fn where_clause<V: Into<Value>>(
        self,
        sql: impl Into<String>,
        params: impl IntoIterator<Item = V>,
    ) -> Self {
        self.where_predicate(Predicate::new(sql, params))
    }

    /// AND a predicate into the WHERE clause
    pub fn where_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Set the ORDER BY expression (without the keyword)
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.order_by = if clause.trim().is_empty() {
            None
        } else {
            Some(clause)
        };
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Drop ordering and paging, keeping the filtered row set
    pub fn unpaged(mut self) -> Self {
        self.order_by = None;
        self.limit = None;
        self.offset = None;
        self
    }

    /// Render `SELECT COUNT(*)` over the filtered rows
    pub fn count_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.from_clause());
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params);
        (self.number_placeholders(&sql), params)
    }

    /// Render the bounded SELECT
    ///
    /// The page clause is emitted only when a limit is set. SQL Server needs an
    /// ORDER BY for `OFFSET ... FETCH`, so `ORDER BY (SELECT NULL)` stands in
    /// when none was given.
    pub fn select_sql(&self) -> (String, Vec<Value>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", columns, self.from_clause());
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params);

        match (&self.order_by, self.limit, self.dialect) {
            (Some(order), _, _) => {
                sql.push_str(" ORDER BY ");
                sql.push_str(order);
            }
            (None, Some(_), Dialect::SQLServer) => sql.push_str(" ORDER BY (SELECT NULL)"),
            _ => {}
        }

        if let Some(limit) = self.limit {
            let offset = self.offset.unwrap_or(0);
            if self.dialect == Dialect::SQLServer {
                sql.push_str(" OFFSET ? ROWS FETCH NEXT ? ROWS ONLY");
                params.push(Value::from(offset));
                params.push(Value::from(limit));
            } else {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(Value::from(limit));
                params.push(Value::from(offset));
            }
        }

        (self.number_placeholders(&sql), params)
    }

    fn from_clause(&self) -> String {
        let table = if is_valid_sort_field(&self.table) {
            self.dialect.quote_identifier(&self.table)
        } else {
            self.table.clone()
        };

        if self.joins.is_empty() {
            table
        } else {
            format!("{} {}", table, self.joins.join(" "))
        }
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<Value>) {
        if self.predicates.is_empty() {
            return;
        }

        let clauses: Vec<String> = self
            .predicates
            .iter()
            .map(|p| format!("({})", p.sql))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));

        for predicate in &self.predicates {
            params.extend(predicate.params.iter().cloned());
        }
    }

    /// Rewrite `?` into the dialect's placeholders, skipping quoted literals and identifiers
    fn number_placeholders(&self, sql: &str) -> String {
        if !matches!(self.dialect, Dialect::PostgreSQL | Dialect::SQLServer) {
            return sql.to_string();
        }

        let mut out = String::with_capacity(sql.len() + 8);
        let mut index = 0;
        let mut quote: Option<char> = None;

        for c in sql.chars() {
            match c {
                '\'' | '"' => {
                    quote = match quote {
                        None => Some(c),
                        Some(open) if open == c => None,
                        other => other,
                    };
                    out.push(c);
                }
                '?' if quote.is_none() => {
                    index += 1;
                    out.push_str(&self.dialect.placeholder(index));
                }
                _ => out.push(c),
            }
        }

        out
    }
}
