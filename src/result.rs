use thiserror::Error;

/// Main error type for table access operations
#[derive(Error, Debug)]
pub enum AccessError {
    /// The connection could not be opened or initialised. Only the driver's
    /// message is kept.
    #[error("Connection to '{target}' failed: {reason}")]
    Connection { target: String, reason: String },
    #[error("Transaction state error: {0}")]
    TransactionState(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Table '{0}' has no primary key")]
    NoPrimaryKey(String),
    #[error("Malformed query '{sql}': {reason}")]
    MalformedQuery { sql: String, reason: String },
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("{operation} on '{table}' needs at least one column")]
    EmptyColumnList {
        operation: &'static str,
        table: String,
    },
    #[error("{operation} on '{table}' without conditions; use the explicit whole-table variant")]
    UnscopedMutation {
        operation: &'static str,
        table: String,
    },
    #[error("Placeholder ':{0}' is used by both the SET and WHERE clauses")]
    PlaceholderCollision(String),
    #[error("Parameter count mismatch: {names} names, {values} values")]
    ParameterCountMismatch { names: usize, values: usize },
    #[error("Parameter type mismatch: expected {expected}, got {got}")]
    ParameterTypeMismatch { expected: String, got: String },
    #[error("Parameter not found in query: {0}")]
    UnknownParameter(String),
    #[error("Parameter not provided: {0}")]
    ParameterNotProvided(String),
    #[error("Cursor is forward-only; {0} needs a scrollable cursor")]
    CursorNotScrollable(&'static str),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl AccessError {
    pub fn new_parameter_type_mismatch(
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        AccessError::ParameterTypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn new_malformed_query(sql: impl Into<String>, reason: impl ToString) -> Self {
        AccessError::MalformedQuery {
            sql: sql.into(),
            reason: reason.to_string(),
        }
    }
}

/// Type alias for Results using AccessError
pub type Result<T> = std::result::Result<T, AccessError>;
