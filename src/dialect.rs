use crate::{query::PreparedQuery, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL flavour a driver speaks.
///
/// Generated statements are identical across dialects except for the
/// insert-ignore keyword and primary-key introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    /// Statement prefix for an insert, with or without duplicate skipping
    pub fn insert_prefix(&self, ignore: bool) -> &'static str {
        match (self, ignore) {
            (_, false) => "INSERT INTO",
            (Dialect::MySql, true) => "INSERT IGNORE INTO",
            (Dialect::Sqlite, true) => "INSERT OR IGNORE INTO",
        }
    }

    /// Query listing the primary-key columns of `table`, in key order.
    ///
    /// `table` must already be validated: MySQL cannot bind it. A `schema.`
    /// qualifier is passed to SQLite as the pragma's schema argument.
    pub fn primary_key_query(&self, table: &str) -> PreparedQuery {
        match self {
            Dialect::MySql => PreparedQuery::new(
                format!("SHOW KEYS FROM {table} WHERE Key_name = 'PRIMARY'"),
                Vec::new(),
            ),
            Dialect::Sqlite => match table.split_once('.') {
                Some((schema, name)) => PreparedQuery::new(
                    "SELECT name FROM pragma_table_info(:table, :schema) WHERE pk > 0 ORDER BY pk"
                        .to_string(),
                    vec![
                        ("table".to_string(), Value::from(name)),
                        ("schema".to_string(), Value::from(schema)),
                    ],
                ),
                None => PreparedQuery::new(
                    "SELECT name FROM pragma_table_info(:table) WHERE pk > 0 ORDER BY pk"
                        .to_string(),
                    vec![("table".to_string(), Value::from(table))],
                ),
            },
        }
    }

    /// Result column of [`Dialect::primary_key_query`] holding the column name
    pub fn primary_key_column(&self) -> &'static str {
        match self {
            Dialect::MySql => "Column_name",
            Dialect::Sqlite => "name",
        }
    }

    /// Statements run right after connecting
    pub fn default_init_statements(&self) -> Vec<String> {
        match self {
            Dialect::MySql => vec!["SET NAMES utf8mb4 COLLATE utf8mb4_unicode_ci".to_string()],
            Dialect::Sqlite => vec![
                "PRAGMA encoding = 'UTF-8'".to_string(),
                "PRAGMA foreign_keys = ON".to_string(),
            ],
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        };
        write!(f, "{s}")
    }
}
