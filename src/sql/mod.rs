//! SQL generation for paginated reads
//!
//! Query context, search and condition predicates, and identifier validation.

pub mod condition;
pub mod query;
pub mod sanitize;
pub mod search;

pub use condition::{FilterCondition, FilterOperator, Logic, build_condition_chain};
pub use query::{Predicate, Query};
pub use sanitize::{is_valid_include, is_valid_sort_field};
pub use search::{apply_search, build_search_clause};
