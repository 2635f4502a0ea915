//! SQL dialect of the target store
//!
//! The dialect is configured on each filter strategy rather than detected from
//! a live connection, so SQL generation can be exercised without a database.

use std::fmt;
use std::str::FromStr;

/// SQL variant of the target store
///
/// Drives the search operator, placeholder syntax, identifier quoting and
/// the shape of the limit/offset clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// MySQL / MariaDB - `?` placeholders, backtick quoting
    #[default]
    MySQL,
    /// PostgreSQL - `$1, $2, ...` placeholders, case-insensitive `ILIKE`
    PostgreSQL,
    /// SQLite - `?` placeholders
    SQLite,
    /// Microsoft SQL Server - `@p1, @p2, ...` placeholders, bracket quoting
    SQLServer,
}

impl Dialect {
    /// Operator used for free-text search
    ///
    /// PostgreSQL gets `ILIKE`; everything else uses `LIKE` and inherits the
    /// case sensitivity of the column collation.
    pub const fn search_operator(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "ILIKE",
            _ => "LIKE",
        }
    }

    /// Placeholder for the parameter at `index` (1-based)
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::PostgreSQL => format!("${}", index),
            Dialect::SQLServer => format!("@p{}", index),
            Dialect::MySQL | Dialect::SQLite => "?".to_string(),
        }
    }

    /// Quote an identifier, one segment at a time for dotted names
    ///
    /// `public.users` becomes `"public"."users"` on PostgreSQL and
    /// `` `public`.`users` `` on MySQL. Embedded quote characters are doubled.
    pub fn quote_identifier(&self, identifier: &str) -> String {
        identifier
            .split('.')
            .map(|segment| self.quote_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_segment(&self, segment: &str) -> String {
        match self {
            Dialect::MySQL => format!("`{}`", segment.replace('`', "``")),
            Dialect::SQLServer => format!("[{}]", segment.replace(']', "]]")),
            Dialect::PostgreSQL | Dialect::SQLite => {
                format!("\"{}\"", segment.replace('"', "\"\""))
            }
        }
    }

    /// Parse a dialect name (case-insensitive, common aliases accepted)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::MySQL),
            "postgresql" | "postgres" | "pg" => Some(Dialect::PostgreSQL),
            "sqlite" | "sqlite3" => Some(Dialect::SQLite),
            "sqlserver" | "mssql" => Some(Dialect::SQLServer),
            _ => None,
        }
    }

    /// Lowercase dialect name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySQL => "mysql",
            Dialect::PostgreSQL => "postgresql",
            Dialect::SQLite => "sqlite",
            Dialect::SQLServer => "sqlserver",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or_else(|| format!("Unknown SQL dialect: '{}'", s))
    }
}
