//! Identifier validation for table and column names spliced into generated SQL.
//!
//! Identifiers are never quoted; instead they must match
//! `[A-Za-z_][A-Za-z0-9_]*`, optionally dotted once (`schema.table`,
//! `table.column`). Column names used as condition keys must be plain
//! (undotted) because they double as placeholder names.

use crate::result::{AccessError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// Regex compiled once as a lazy static for performance
static PLAIN_IDENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
static QUALIFIED_IDENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap()
});

/// Validate a table name, allowing one `schema.` qualifier
pub fn validate_table(name: &str) -> Result<()> {
    if QUALIFIED_IDENT_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(AccessError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate a column name that will also be used as a placeholder name
pub fn validate_column(name: &str) -> Result<()> {
    if PLAIN_IDENT_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(AccessError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate a column reference that may be table-qualified (`t.col`)
pub fn validate_column_ref(name: &str) -> Result<()> {
    validate_table(name)
}
