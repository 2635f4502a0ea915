//! Field and include name validation
//!
//! Allow-list checks for the two pieces of client input that end up as SQL
//! text rather than bound parameters: the sort column and relation names.
//! Names that fail are dropped by the caller, never reported as errors.

use regex::Regex;
use std::sync::LazyLock;

/// Identifier, optionally dotted for qualified references (`users.name`)
static IDENTIFIER_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.]*$").expect("identifier pattern is valid")
});

/// Check whether a client-supplied sort field is safe to place in ORDER BY
///
/// # Example
/// ```
/// use query_pager::sql::is_valid_sort_field;
///
/// assert!(is_valid_sort_field("created_at"));
/// assert!(is_valid_sort_field("user.name"));
/// assert!(!is_valid_sort_field("name; DROP TABLE users;"));
/// assert!(!is_valid_sort_field(""));
/// ```
pub fn is_valid_sort_field(field: &str) -> bool {
    IDENTIFIER_PATH.is_match(field)
}

/// Check whether a relation name (or dotted nested path) is well-formed
///
/// # Example
/// ```
/// use query_pager::sql::is_valid_include;
///
/// assert!(is_valid_include("Posts"));
/// assert!(is_valid_include("User.Profile"));
/// assert!(!is_valid_include("Posts; DROP TABLE"));
/// ```
pub fn is_valid_include(include: &str) -> bool {
    !include.is_empty() && IDENTIFIER_PATH.is_match(include)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // is_valid_sort_field Valid Cases
    // =========================================================================

    #[test]
    fn test_sort_field_simple() {
        assert!(is_valid_sort_field("name"));
        assert!(is_valid_sort_field("created_at"));
        assert!(is_valid_sort_field("_private"));
        assert!(is_valid_sort_field("Age2"));
    }

    #[test]
    fn test_sort_field_qualified() {
        assert!(is_valid_sort_field("user.name"));
        assert!(is_valid_sort_field("public.users.id"));
    }

    // =========================================================================
    // is_valid_sort_field Invalid Cases
    // =========================================================================

    #[test]
    fn test_sort_field_injection() {
        assert!(!is_valid_sort_field("name; DROP TABLE users;"));
        assert!(!is_valid_sort_field("name' OR '1'='1"));
        assert!(!is_valid_sort_field("name--"));
        assert!(!is_valid_sort_field("name/**/desc"));
        assert!(!is_valid_sort_field("(SELECT 1)"));
    }

    #[test]
    fn test_sort_field_empty() {
        assert!(!is_valid_sort_field(""));
    }

    #[test]
    fn test_sort_field_whitespace() {
        assert!(!is_valid_sort_field("name desc"));
        assert!(!is_valid_sort_field(" name"));
        assert!(!is_valid_sort_field("name\n"));
    }

    #[test]
    fn test_sort_field_starts_with_digit() {
        assert!(!is_valid_sort_field("1name"));
        assert!(!is_valid_sort_field(".name"));
    }

    #[test]
    fn test_sort_field_quotes() {
        assert!(!is_valid_sort_field("\"name\""));
        assert!(!is_valid_sort_field("`name`"));
    }

    // =========================================================================
    // is_valid_include Tests
    // =========================================================================

    #[test]
    fn test_include_valid() {
        assert!(is_valid_include("Posts"));
        assert!(is_valid_include("User.Profile"));
        assert!(is_valid_include("Profile.Address.Country"));
        assert!(is_valid_include("players_events"));
    }

    #[test]
    fn test_include_invalid() {
        assert!(!is_valid_include("Posts; DROP TABLE"));
        assert!(!is_valid_include(""));
        assert!(!is_valid_include("Posts,Comments"));
        assert!(!is_valid_include("Posts "));
        assert!(!is_valid_include("9Lives"));
    }
}
