use crate::{
    config::AccessorConfig,
    cursor::RowSource,
    dialect::Dialect,
    driver::Driver,
    result::{AccessError, Result},
    value::{Row, Value},
};
use rusqlite::{
    Connection, ErrorCode, OpenFlags,
    types::{ToSql, ToSqlOutput, ValueRef},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// Bind values the way SQLite stores them; booleans become 0/1 integers
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*b as i64)),
            Value::Int(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Int(i),
            ValueRef::Real(r) => Value::Float(r),
            ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).to_string()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

/// Named parameters in rusqlite format: (":name", value)
fn named_params(params: &[(String, Value)]) -> Vec<(String, &dyn ToSql)> {
    params
        .iter()
        .map(|(name, value)| (format!(":{name}"), value as &dyn ToSql))
        .collect()
}

/// Translate a rusqlite failure raised while running `sql`
fn classify_error(sql: &str, err: rusqlite::Error) -> AccessError {
    debug!(sql = %sql, error = %err, "statement failed");
    match &err {
        rusqlite::Error::SqliteFailure(ffi_err, message)
            if ffi_err.code == ErrorCode::ConstraintViolation =>
        {
            AccessError::ConstraintViolation(message.clone().unwrap_or_else(|| err.to_string()))
        }
        rusqlite::Error::InvalidParameterName(name) => {
            AccessError::UnknownParameter(name.trim_start_matches(':').to_string())
        }
        _ => AccessError::Sqlite(err),
    }
}

/// Failures while preparing mean the engine refused the SQL text itself
fn classify_prepare_error(sql: &str, err: rusqlite::Error) -> AccessError {
    match &err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            AccessError::new_malformed_query(sql, message)
        }
        _ => AccessError::new_malformed_query(sql, &err),
    }
}

/// Rows of an executing statement, converted as they are stepped
struct SqliteRows<'stmt> {
    rows: rusqlite::Rows<'stmt>,
    columns: Arc<[String]>,
    sql: &'stmt str,
}

impl RowSource for SqliteRows<'_> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        let row = match self.rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(e) => return Err(classify_error(self.sql, e)),
        };
        let mut values = Vec::with_capacity(self.columns.len());
        for idx in 0..self.columns.len() {
            let value = row.get_ref(idx).map_err(|e| classify_error(self.sql, e))?;
            values.push(Value::from(value));
        }
        Ok(Some(Row::new(self.columns.clone(), values)))
    }
}

/// [`Driver`] over a single rusqlite connection
pub struct SqliteDriver {
    conn: Connection,
}

impl SqliteDriver {
    /// Open the database named by `config.database` (a path, a `file:` URI or
    /// `:memory:`) and run the configured init statements.
    pub fn connect(config: &AccessorConfig) -> Result<Self> {
        let connection_error = |reason: String| AccessError::Connection {
            target: config.database.clone(),
            reason,
        };

        if config.host.is_some() || config.user.is_some() || config.password.is_some() {
            debug!(
                database = %config.database,
                "sqlite ignores host and credentials"
            );
        }

        let opened = if config.database == ":memory:" {
            Connection::open_in_memory()
        } else {
            let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            if config.create_if_missing {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
            Connection::open_with_flags(&config.database, flags)
        };
        let conn = opened.map_err(|e| connection_error(e.to_string()))?;

        if let Some(ms) = config.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(ms))
                .map_err(|e| connection_error(e.to_string()))?;
        }

        let init_statements = config
            .init_statements
            .clone()
            .unwrap_or_else(|| Dialect::Sqlite.default_init_statements());
        for statement in &init_statements {
            conn.execute_batch(statement)
                .map_err(|e| connection_error(format!("init statement '{statement}': {e}")))?;
        }

        info!(database = %config.database, "sqlite connection opened");
        Ok(SqliteDriver { conn })
    }

    /// Wrap an already opened connection; no init statements are run
    pub fn from_connection(conn: Connection) -> Self {
        SqliteDriver { conn }
    }

    /// Direct access to the underlying connection, e.g. for schema setup
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Driver for SqliteDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&mut self, sql: &str, params: &[(String, Value)]) -> Result<u64> {
        debug!(sql = %sql, params = params.len(), "executing statement");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| classify_prepare_error(sql, e))?;
        let named = named_params(params);
        let named: Vec<(&str, &dyn ToSql)> = named
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        let affected = stmt
            .execute(&named[..])
            .map_err(|e| classify_error(sql, e))?;
        Ok(affected as u64)
    }

    fn stream<T>(
        &mut self,
        sql: &str,
        params: &[(String, Value)],
        visit: impl FnOnce(&mut dyn RowSource) -> Result<T>,
    ) -> Result<T> {
        debug!(sql = %sql, params = params.len(), "running query");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| classify_prepare_error(sql, e))?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .into();
        let named = named_params(params);
        let named: Vec<(&str, &dyn ToSql)> = named
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        let rows = stmt
            .query(&named[..])
            .map_err(|e| classify_error(sql, e))?;
        let mut source = SqliteRows { rows, columns, sql };
        visit(&mut source)
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn begin(&mut self) -> Result<()> {
        debug!("BEGIN");
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        debug!("COMMIT");
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| classify_error("COMMIT", e))
    }

    fn rollback(&mut self) -> Result<()> {
        debug!("ROLLBACK");
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
