use std::collections::VecDeque;
use std::sync::Arc;
use tableaccess::{
    AccessError, Buffering, Conditions, ConnectionState, Dialect, Driver, Result, Row, RowSource,
    SelectQuery, TableAccessor, Value,
};

/// Records every statement and answers from canned results
#[derive(Default)]
struct RecordingDriver {
    statements: Vec<(String, Vec<(String, Value)>)>,
    affected: VecDeque<u64>,
    results: VecDeque<Vec<Row>>,
    next_id: i64,
    fail_rollback: bool,
}

impl RecordingDriver {
    fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

impl Driver for RecordingDriver {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn execute(&mut self, sql: &str, params: &[(String, Value)]) -> Result<u64> {
        self.statements.push((sql.to_string(), params.to_vec()));
        let affected = self.affected.pop_front().unwrap_or(1);
        if affected > 0 && sql.starts_with("INSERT") {
            self.next_id += 1;
        }
        Ok(affected)
    }

    fn stream<T>(
        &mut self,
        sql: &str,
        params: &[(String, Value)],
        visit: impl FnOnce(&mut dyn RowSource) -> Result<T>,
    ) -> Result<T> {
        self.statements.push((sql.to_string(), params.to_vec()));
        let mut rows = self.results.pop_front().unwrap_or_default().into_iter();
        visit(&mut rows)
    }

    fn last_insert_id(&self) -> i64 {
        self.next_id
    }

    fn begin(&mut self) -> Result<()> {
        self.statements.push(("START TRANSACTION".to_string(), Vec::new()));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.statements.push(("COMMIT".to_string(), Vec::new()));
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.statements.push(("ROLLBACK".to_string(), Vec::new()));
        if self.fail_rollback {
            return Err(AccessError::TransactionState("server went away".to_string()));
        }
        Ok(())
    }
}

fn key_row(column: &str) -> Row {
    let columns: Arc<[String]> = vec![
        "Table".to_string(),
        "Key_name".to_string(),
        "Column_name".to_string(),
    ]
    .into();
    Row::new(
        columns,
        vec![
            Value::from("users"),
            Value::from("PRIMARY"),
            Value::from(column),
        ],
    )
}

fn accessor(driver: RecordingDriver) -> TableAccessor<RecordingDriver> {
    TableAccessor::with_driver(driver, Buffering::Buffered)
}

#[test]
fn test_insert_ignore_uses_mysql_keyword() {
    let mut driver = RecordingDriver::default();
    driver.affected.extend([1, 0]);
    let mut db = accessor(driver);

    let values = Conditions::new().eq("email", "a@example.com").eq("name", "A");
    assert_eq!(db.insert_ignore("users", &values).unwrap(), Some(1));
    assert_eq!(db.insert_ignore("users", &values).unwrap(), None);

    assert_eq!(
        db.driver().sql(),
        vec![
            "INSERT IGNORE INTO users(email,name) VALUES (:email,:name)",
            "INSERT IGNORE INTO users(email,name) VALUES (:email,:name)",
        ]
    );
}

#[test]
fn test_primary_key_reads_show_keys() {
    let mut driver = RecordingDriver::default();
    driver.results.push_back(vec![key_row("user_id"), key_row("role_id")]);
    driver.results.push_back(Vec::new());
    let mut db = accessor(driver);

    assert_eq!(db.primary_key("user_roles").unwrap(), "user_id");
    assert!(matches!(
        db.primary_key("audit_log"),
        Err(AccessError::NoPrimaryKey(table)) if table == "audit_log"
    ));
    assert!(matches!(
        db.primary_key("users WHERE 1=1"),
        Err(AccessError::InvalidIdentifier(_))
    ));

    assert_eq!(
        db.driver().sql(),
        vec![
            "SHOW KEYS FROM user_roles WHERE Key_name = 'PRIMARY'",
            "SHOW KEYS FROM audit_log WHERE Key_name = 'PRIMARY'",
        ]
    );
}

#[test]
fn test_generated_statements_and_bindings() {
    let mut db = accessor(RecordingDriver::default());

    db.select(
        &SelectQuery::from_table("users")
            .where_eq("status", "active")
            .where_eq("role", 2)
            .limit(10),
    )
    .unwrap();
    db.update(
        "users",
        &Conditions::new().eq("status", "banned"),
        &Conditions::new().eq("id", 7),
    )
    .unwrap();
    db.delete("users", &Conditions::new().eq("id", 7).eq("status", "banned"))
        .unwrap();

    let statements = &db.driver().statements;
    assert_eq!(
        statements[0].0,
        "SELECT * FROM users WHERE status = :status AND role = :role LIMIT 10"
    );
    assert_eq!(statements[1].0, "UPDATE users SET status=:status WHERE id=:Did");
    assert_eq!(
        statements[1].1,
        vec![
            ("status".to_string(), Value::from("banned")),
            ("Did".to_string(), Value::Int(7)),
        ]
    );
    assert_eq!(statements[2].0, "DELETE FROM users WHERE id=:id AND status=:status");
}

#[test]
fn test_transaction_calls_reach_driver() {
    let mut db = accessor(RecordingDriver::default());
    db.with_transaction(|tx| tx.insert("users", &Conditions::new().eq("name", "B")))
        .unwrap();
    let _ = db.with_transaction(|tx| -> Result<()> {
        tx.delete_all("users")?;
        Err(AccessError::TransactionState("abort".to_string()))
    });

    assert_eq!(
        db.driver().sql(),
        vec![
            "START TRANSACTION",
            "INSERT INTO users(name) VALUES (:name)",
            "COMMIT",
            "START TRANSACTION",
            "DELETE FROM users",
            "ROLLBACK",
        ]
    );
}

#[test]
fn test_failed_rollback_keeps_transaction_open() {
    let mut db = accessor(RecordingDriver {
        fail_rollback: true,
        ..Default::default()
    });
    db.begin_transaction().unwrap();
    assert!(db.rollback().is_err());
    assert_eq!(db.state(), ConnectionState::InTransaction);
    assert!(matches!(
        db.begin_transaction(),
        Err(AccessError::TransactionState(_))
    ));

    db.driver_mut().fail_rollback = false;
    db.rollback().unwrap();
    assert_eq!(db.state(), ConnectionState::Idle);
    assert_eq!(
        db.driver().sql(),
        vec!["START TRANSACTION", "ROLLBACK", "ROLLBACK"]
    );
}
