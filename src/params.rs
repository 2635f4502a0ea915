//! Raw request parameters
//!
//! The HTTP layer decodes the query string; this crate only sees the resulting
//! name/value pairs.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{PagerError, Result};

/// Decoded query-string parameters of a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value of a parameter, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Raw value of a parameter, treating an empty value as absent
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Parse a typed parameter
    ///
    /// Absent or empty parameters yield `Ok(None)`; a present value that does
    /// not parse is a [`PagerError::Binding`].
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get_non_empty(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                PagerError::binding(format!("Invalid value '{}' for '{}': {}", raw, key, e))
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let params: QueryParams = [("page", "2"), ("search", "john")].into_iter().collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("search"), Some("john"));
        assert_eq!(params.get("sort"), None);
    }

    #[test]
    fn test_empty_value_is_absent_for_parsing() {
        let params = QueryParams::new().with("province_id", "");

        assert_eq!(params.get("province_id"), Some(""));
        assert_eq!(params.get_non_empty("province_id"), None);
        assert_eq!(params.parse::<i64>("province_id").unwrap(), None);
    }

    #[test]
    fn test_parse_typed() {
        let params = QueryParams::new().with("sport_id", " 7 ").with("active", "true");

        assert_eq!(params.parse::<i64>("sport_id").unwrap(), Some(7));
        assert_eq!(params.parse::<bool>("active").unwrap(), Some(true));
    }

    #[test]
    fn test_parse_failure_is_binding_error() {
        let params = QueryParams::new().with("sport_id", "abc");

        let err = params.parse::<i64>("sport_id").unwrap_err();
        assert!(matches!(err, PagerError::Binding(_)));
        assert!(err.to_string().contains("sport_id"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut params = QueryParams::new();
        params.insert("order", "asc");
        params.insert("order", "desc");

        assert_eq!(params.get("order"), Some("desc"));
        assert!(!params.is_empty());
    }
}
