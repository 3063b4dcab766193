//! Table-oriented CRUD over a single SQL connection.
//!
//! [`TableAccessor`] builds parameterized `SELECT`, `INSERT`, `UPDATE` and
//! `DELETE` statements from a table name and ordered [`Conditions`], executes
//! them through a [`Driver`] and returns rows, affected counts or generated
//! ids. Hand-written SQL goes through [`ManualQuery`].
//!
//! ```
//! use tableaccess::{AccessorConfig, Conditions, SelectQuery, TableAccessor};
//!
//! let mut db = TableAccessor::connect(&AccessorConfig::in_memory()).unwrap();
//! db.driver()
//!     .connection()
//!     .execute_batch("CREATE TABLE categories (id INTEGER PRIMARY KEY, name TEXT, parent_id INTEGER)")
//!     .unwrap();
//!
//! let id = db
//!     .insert("categories", &Conditions::new().eq("name", "Vehicles").eq("parent_id", 1))
//!     .unwrap();
//! let rows = db
//!     .select(&SelectQuery::from_table("categories").where_eq("id", id))
//!     .unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

pub mod accessor;
pub mod conditions;
pub mod config;
pub mod cursor;
pub mod dialect;
pub mod driver;
#[cfg(feature = "sqlite")]
pub mod driver_sqlite;
pub mod ident;
pub mod parameters;
pub mod query;
pub mod result;
pub mod str_utils;
pub mod value;

// Re-export types for convenience
pub use accessor::{ConnectionState, TableAccessor};
pub use conditions::Conditions;
pub use config::{AccessorConfig, Buffering};
pub use cursor::{CursorKind, FetchMode, RowCursor, RowSource};
pub use dialect::Dialect;
pub use driver::Driver;
pub use parameters::{ManualQuery, TypeHint};
pub use query::{Fields, Limit, Order, PreparedQuery, Scope, SelectQuery};
pub use result::{AccessError, Result};
pub use value::{Row, Value};

#[cfg(feature = "sqlite")]
pub use driver_sqlite::SqliteDriver;

// Re-export third-party types used in the public API to provide fallback for dependency conflicts
pub use serde_json::Value as JsonValue;

#[cfg(feature = "sqlite")]
pub use rusqlite::Connection as SqliteConnection;

#[cfg(feature = "sqlite")]
pub type SqliteAccessor = TableAccessor<SqliteDriver>;
