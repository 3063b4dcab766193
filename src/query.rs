mod select;
mod statement;

pub use select::{Fields, Limit, Order, SelectQuery};
pub use statement::{Scope, build_delete, build_insert, build_update};

use crate::{
    cursor::{CursorKind, FetchMode},
    value::Value,
};

/// Prefix that keeps WHERE placeholders of an UPDATE apart from its SET placeholders
pub const CONDITION_PLACEHOLDER_PREFIX: &str = "D";

/// SQL text with `:name` placeholders and the values bound to them.
///
/// Built per call and consumed by the driver; never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    /// Placeholder names without the leading `:`, in binding order
    pub params: Vec<(String, Value)>,
    pub cursor: CursorKind,
    /// `None` defers to the accessor's buffering mode
    pub fetch_mode: Option<FetchMode>,
}

impl PreparedQuery {
    pub fn new(sql: String, params: Vec<(String, Value)>) -> Self {
        PreparedQuery {
            sql,
            params,
            cursor: CursorKind::ForwardOnly,
            fetch_mode: None,
        }
    }

    pub fn with_cursor(mut self, cursor: CursorKind) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = Some(fetch_mode);
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(param_name, _)| param_name == name)
            .map(|(_, value)| value)
    }
}

/// Join `column<sep>:placeholder` pairs, e.g. `a = :a AND b = :b`
pub(crate) fn placeholder_list<'a>(
    columns: impl Iterator<Item = &'a str>,
    assign: &str,
    prefix: &str,
    separator: &str,
) -> String {
    columns
        .map(|column| format!("{column}{assign}:{prefix}{column}"))
        .collect::<Vec<_>>()
        .join(separator)
}
