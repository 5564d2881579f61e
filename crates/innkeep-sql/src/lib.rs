//! SQL statement rendering.
//!
//! Entity stores describe what they want as a small statement value
//! ([`SelectStmt`], [`InsertStmt`], [`UpdateStmt`], [`DeleteStmt`]) and
//! render it to a string with `$1, $2, ...` placeholders. Identifiers are
//! always quoted, so table names like `user` or `order` are safe.

use std::fmt;

mod render;
pub use render::*;

mod stmt;
pub use stmt::*;

/// A statement ready to hand to `tokio_postgres`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSql {
    pub sql: String,

    /// How many `$n` placeholders `sql` contains; callers pass exactly
    /// this many parameters.
    pub param_count: usize,
}

impl fmt::Display for RenderedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Displays a table or column name as a quoted identifier.
///
/// ```
/// use innkeep_sql::Ident;
/// assert_eq!(Ident("app_user").to_string(), r#""app_user""#);
/// assert_eq!(Ident(r#"odd"name"#).to_string(), r#""odd""name""#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Ident<'a>(pub &'a str);

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        let mut parts = self.0.split('"');
        if let Some(first) = parts.next() {
            f.write_str(first)?;
        }
        for part in parts {
            f.write_str("\"\"")?;
            f.write_str(part)?;
        }
        f.write_str("\"")
    }
}

pub fn quote_ident(name: &str) -> String {
    Ident(name).to_string()
}

/// Name of the index on `table` over `columns`: `idx_<table>_<col>_<col>`.
///
/// ```
/// assert_eq!(
///     innkeep_sql::index_name("room_setup", &["property_id"]),
///     "idx_room_setup_property_id"
/// );
/// ```
pub fn index_name(table: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .fold(format!("idx_{table}"), |name, col| name + "_" + col)
}

#[cfg(test)]
mod tests;
