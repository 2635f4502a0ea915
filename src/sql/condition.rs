//! Condition building for dynamic filters
//!
//! Compiles an ordered list of [`FilterCondition`]s into a single parameterized
//! WHERE predicate. Conditions are joined strictly left to right: the `logic`
//! of each condition decides how the next one attaches to everything before it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{PagerError, Result};
use crate::sql::query::Predicate;
use crate::sql::sanitize::is_valid_sort_field;

/// Comparison operators accepted in a dynamic filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl FilterOperator {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Like => "LIKE",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for FilterOperator {
    type Err = PagerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "=" => Ok(FilterOperator::Eq),
            "!=" => Ok(FilterOperator::Ne),
            ">" => Ok(FilterOperator::Gt),
            ">=" => Ok(FilterOperator::Gte),
            "<" => Ok(FilterOperator::Lt),
            "<=" => Ok(FilterOperator::Lte),
            other if other.eq_ignore_ascii_case("like") => Ok(FilterOperator::Like),
            other => Err(PagerError::invalid_filter(format!(
                "Unknown operator '{}'. Must be one of =, !=, >, >=, <, <=, LIKE.",
                other
            ))),
        }
    }
}

impl TryFrom<String> for FilterOperator {
    type Error = PagerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_sql().to_string()
    }
}

/// How a condition joins the one that follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Logic {
    type Err = PagerError;

    /// `AND` or `OR`, case-insensitive; an empty string means `AND`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("and") {
            Ok(Logic::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Logic::Or)
        } else {
            Err(PagerError::invalid_filter(format!(
                "Unknown logic '{}'. Must be AND or OR.",
                s
            )))
        }
    }
}

impl TryFrom<String> for Logic {
    type Error = PagerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Logic> for String {
    fn from(logic: Logic) -> Self {
        logic.as_sql().to_string()
    }
}

/// One `field operator value` comparison in a dynamic filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
    /// Joins this condition to the next one (default: AND)
    #[serde(default)]
    pub logic: Logic,
}

impl FilterCondition {
    /// Create a condition from an operator string
    ///
    /// Fails with [`PagerError::InvalidFilter`] when the operator is not in the
    /// supported set. The field name is checked later, when the filter is
    /// compiled; conditions on invalid fields are skipped.
    pub fn new(field: impl Into<String>, operator: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(Self::with(field, operator.parse()?, value))
    }

    /// Create a condition from a typed operator
    pub fn with(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            logic: Logic::And,
        }
    }

    /// Set how this condition joins the next one
    pub fn logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Join the next condition with OR
    pub fn or(self) -> Self {
        self.logic(Logic::Or)
    }

    /// Compile to a predicate, or `None` when the field name is not a safe identifier
    pub fn to_predicate(&self) -> Option<Predicate> {
        if !is_valid_sort_field(&self.field) {
            return None;
        }

        if self.value.is_null() {
            match self.operator {
                FilterOperator::Eq => {
                    return Some(Predicate::raw(format!("{} IS NULL", self.field)));
                }
                FilterOperator::Ne => {
                    return Some(Predicate::raw(format!("{} IS NOT NULL", self.field)));
                }
                _ => {}
            }
        }

        Some(Predicate::new(
            format!("{} {} ?", self.field, self.operator),
            [self.value.clone()],
        ))
    }
}

/// Compile conditions into one predicate, left to right
///
/// Returns `None` when no condition survives field validation. A skipped
/// condition takes its logic with it: the next surviving condition joins using
/// the logic of the last surviving one before it.
///
/// # Example
/// ```
/// use query_pager::sql::{FilterCondition, build_condition_chain};
///
/// let conditions = vec![
///     FilterCondition::new("age", ">", 30).unwrap().or(),
///     FilterCondition::new("name", "LIKE", "J%").unwrap(),
/// ];
/// let predicate = build_condition_chain(&conditions).unwrap();
/// assert_eq!(predicate.sql(), "(age > ?) OR (name LIKE ?)");
/// ```
pub fn build_condition_chain(conditions: &[FilterCondition]) -> Option<Predicate> {
    let mut chain: Option<(Predicate, Logic)> = None;

    for condition in conditions {
        let Some(predicate) = condition.to_predicate() else {
            tracing::debug!(field = %condition.field, "dropping filter condition on invalid field");
            continue;
        };

        chain = Some(match chain {
            None => (predicate, condition.logic),
            Some((acc, logic)) => (acc.join(logic, predicate), condition.logic),
        });
    }

    chain.map(|(predicate, _)| predicate)
}
