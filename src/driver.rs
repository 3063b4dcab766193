use crate::{
    cursor::RowSource,
    dialect::Dialect,
    result::Result,
    value::{Row, Value},
};

/// The SQL client capability a [`crate::TableAccessor`] needs: execute
/// statements with named `:placeholder` bindings, fetch rows, report the last
/// insert id and drive transactions.
///
/// Implementations translate their own failures into
/// [`crate::AccessError`], mapping unique/foreign-key failures to
/// `ConstraintViolation` and statements the engine refuses to prepare to
/// `MalformedQuery`.
pub trait Driver {
    fn dialect(&self) -> Dialect;

    /// Execute a statement that returns no rows; returns the affected row count
    fn execute(&mut self, sql: &str, params: &[(String, Value)]) -> Result<u64>;

    /// Run a query and hand its rows to `visit` one at a time.
    /// The statement is finalized when `visit` returns.
    fn stream<T>(
        &mut self,
        sql: &str,
        params: &[(String, Value)],
        visit: impl FnOnce(&mut dyn RowSource) -> Result<T>,
    ) -> Result<T>;

    /// Run a query and collect every row
    fn fetch_all(&mut self, sql: &str, params: &[(String, Value)]) -> Result<Vec<Row>> {
        self.stream(sql, params, |rows| {
            let mut result = Vec::new();
            while let Some(row) = rows.next_row()? {
                result.push(row);
            }
            Ok(result)
        })
    }

    /// Row id generated by the most recent successful insert
    fn last_insert_id(&self) -> i64;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}
