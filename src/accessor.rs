use crate::{
    conditions::Conditions,
    config::Buffering,
    cursor::{FetchMode, RowCursor},
    driver::Driver,
    ident,
    parameters::ManualQuery,
    query::{self, PreparedQuery, Scope, SelectQuery},
    result::{AccessError, Result},
    value::{Row, Value},
};
use tracing::{debug, warn};

#[cfg(feature = "sqlite")]
use crate::{config::AccessorConfig, driver_sqlite::SqliteDriver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    InTransaction,
}

/// Table-oriented CRUD over one owned database connection.
///
/// Every call blocks until the database answers. The accessor is not shared
/// between threads; open one per worker.
pub struct TableAccessor<D: Driver> {
    driver: D,
    buffering: Buffering,
    state: ConnectionState,
}

#[cfg(feature = "sqlite")]
impl TableAccessor<SqliteDriver> {
    /// Open a SQLite-backed accessor from `config`.
    ///
    /// Any failure is reported as [`AccessError::Connection`].
    pub fn connect(config: &AccessorConfig) -> Result<Self> {
        let driver = SqliteDriver::connect(config)?;
        Ok(Self::with_driver(driver, config.buffering))
    }
}

impl<D: Driver> TableAccessor<D> {
    pub fn with_driver(driver: D, buffering: Buffering) -> Self {
        TableAccessor {
            driver,
            buffering,
            state: ConnectionState::Idle,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn buffering(&self) -> Buffering {
        self.buffering
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn in_transaction(&self) -> bool {
        self.state == ConnectionState::InTransaction
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction() {
            return Err(AccessError::TransactionState(
                "a transaction is already active".to_string(),
            ));
        }
        self.driver.begin()?;
        self.state = ConnectionState::InTransaction;
        Ok(())
    }

    /// Commit the active transaction. On failure the transaction stays open so
    /// it can still be rolled back.
    pub fn commit(&mut self) -> Result<()> {
        self.require_transaction("commit")?;
        self.driver.commit()?;
        self.state = ConnectionState::Idle;
        Ok(())
    }

    /// Roll back the active transaction. On failure the state is left as
    /// reported by the driver: still in a transaction.
    pub fn rollback(&mut self) -> Result<()> {
        self.require_transaction("rollback")?;
        self.driver.rollback()?;
        self.state = ConnectionState::Idle;
        Ok(())
    }

    fn require_transaction(&self, operation: &str) -> Result<()> {
        if self.in_transaction() {
            Ok(())
        } else {
            Err(AccessError::TransactionState(format!(
                "{operation} without an active transaction"
            )))
        }
    }

    /// Run `f` inside a transaction: commit when it returns `Ok`, roll back
    /// when it returns `Err`.
    pub fn with_transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                if self.in_transaction() {
                    if let Err(rollback_err) = self.rollback() {
                        warn!(error = %rollback_err, "rollback after failed transaction body failed");
                    }
                }
                Err(err)
            }
        }
    }

    /// Materialize every row matched by `query`
    pub fn select(&mut self, query: &SelectQuery) -> Result<Vec<Row>> {
        let prepared = query.build_parameterized()?;
        self.driver.fetch_all(&prepared.sql, &prepared.params)
    }

    /// First row matched by `query`, if any
    pub fn select_one(&mut self, query: &SelectQuery) -> Result<Option<Row>> {
        let prepared = query.build_parameterized()?;
        self.driver
            .stream(&prepared.sql, &prepared.params, |rows| rows.next_row())
    }

    /// Run `query` and let `f` drive the cursor. The cursor is closed when
    /// `f` returns, whether it succeeds or fails.
    pub fn select_with<T>(
        &mut self,
        query: &SelectQuery,
        f: impl FnOnce(&mut RowCursor<'_>) -> Result<T>,
    ) -> Result<T> {
        let prepared = query.build_parameterized()?;
        self.query_with(&prepared, f)
    }

    /// Run any prepared query through a cursor, resolving the fetch mode
    /// against the accessor's buffering when the query does not set one
    pub fn query_with<T>(
        &mut self,
        prepared: &PreparedQuery,
        f: impl FnOnce(&mut RowCursor<'_>) -> Result<T>,
    ) -> Result<T> {
        let fetch_mode = prepared
            .fetch_mode
            .unwrap_or_else(|| self.buffering.default_fetch_mode());
        match fetch_mode {
            FetchMode::Materialized => {
                let rows = self.driver.fetch_all(&prepared.sql, &prepared.params)?;
                f(&mut RowCursor::materialized(rows))
            }
            FetchMode::Streaming => {
                let kind = prepared.cursor;
                self.driver
                    .stream(&prepared.sql, &prepared.params, move |source| {
                        f(&mut RowCursor::streaming(source, kind))
                    })
            }
        }
    }

    /// Insert one row and return the id the database generated for it
    pub fn insert(&mut self, table: &str, values: &Conditions) -> Result<i64> {
        let prepared = query::build_insert(self.driver.dialect(), table, values, false)?;
        self.driver.execute(&prepared.sql, &prepared.params)?;
        Ok(self.driver.last_insert_id())
    }

    /// Insert one row unless it violates a uniqueness constraint.
    /// Returns `None` when the row was skipped.
    pub fn insert_ignore(&mut self, table: &str, values: &Conditions) -> Result<Option<i64>> {
        let prepared = query::build_insert(self.driver.dialect(), table, values, true)?;
        let affected = self.driver.execute(&prepared.sql, &prepared.params)?;
        if affected == 0 {
            debug!(table, "insert skipped by duplicate key");
            return Ok(None);
        }
        Ok(Some(self.driver.last_insert_id()))
    }

    /// Update rows matching `conditions`; returns the affected row count.
    /// An empty `conditions` is rejected, see [`TableAccessor::update_all`].
    pub fn update(&mut self, table: &str, set: &Conditions, conditions: &Conditions) -> Result<u64> {
        let prepared = query::build_update(table, set, Scope::Matching(conditions))?;
        self.driver.execute(&prepared.sql, &prepared.params)
    }

    /// Update every row of `table`
    pub fn update_all(&mut self, table: &str, set: &Conditions) -> Result<u64> {
        let prepared = query::build_update(table, set, Scope::AllRows)?;
        self.driver.execute(&prepared.sql, &prepared.params)
    }

    /// Delete rows matching `conditions`; returns the affected row count.
    /// An empty `conditions` is rejected, see [`TableAccessor::delete_all`].
    pub fn delete(&mut self, table: &str, conditions: &Conditions) -> Result<u64> {
        let prepared = query::build_delete(table, Scope::Matching(conditions))?;
        self.driver.execute(&prepared.sql, &prepared.params)
    }

    /// Delete every row of `table`
    pub fn delete_all(&mut self, table: &str) -> Result<u64> {
        let prepared = query::build_delete(table, Scope::AllRows)?;
        self.driver.execute(&prepared.sql, &prepared.params)
    }

    /// Name of the first primary-key column of `table`
    pub fn primary_key(&mut self, table: &str) -> Result<String> {
        ident::validate_table(table)?;
        let dialect = self.driver.dialect();
        let prepared = dialect.primary_key_query(table);
        let first = self
            .driver
            .stream(&prepared.sql, &prepared.params, |rows| rows.next_row())?;

        match first
            .as_ref()
            .and_then(|row| row.get(dialect.primary_key_column()))
        {
            Some(Value::Text(column)) => Ok(column.clone()),
            _ => Err(AccessError::NoPrimaryKey(table.to_string())),
        }
    }

    /// Run a hand-written SELECT and materialize its rows
    pub fn manual_select(&mut self, query: &ManualQuery) -> Result<Vec<Row>> {
        let prepared = query.to_prepared()?;
        self.driver.fetch_all(&prepared.sql, &prepared.params)
    }

    /// Run a hand-written SELECT through a cursor
    pub fn manual_select_with<T>(
        &mut self,
        query: &ManualQuery,
        f: impl FnOnce(&mut RowCursor<'_>) -> Result<T>,
    ) -> Result<T> {
        let prepared = query.to_prepared()?;
        self.query_with(&prepared, f)
    }

    /// Run a hand-written data-modifying statement; returns the affected row count
    pub fn manual_update(&mut self, query: &ManualQuery) -> Result<u64> {
        let prepared = query.to_prepared()?;
        self.driver.execute(&prepared.sql, &prepared.params)
    }
}

impl<D: Driver> Drop for TableAccessor<D> {
    fn drop(&mut self) {
        if self.in_transaction() {
            warn!("table accessor dropped inside a transaction; rolling back");
            if let Err(e) = self.driver.rollback() {
                warn!(error = %e, "rollback on drop failed");
            }
        }
    }
}
