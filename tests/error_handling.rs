use tableaccess::{
    AccessError, AccessorConfig, Conditions, SelectQuery, SqliteAccessor, TableAccessor,
};

fn setup_db() -> SqliteAccessor {
    let db = TableAccessor::connect(&AccessorConfig::in_memory()).unwrap();
    db.driver()
        .connection()
        .execute_batch(
            "CREATE TABLE parents (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE children (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parents(id));",
        )
        .unwrap();
    db
}

#[test]
fn test_connection_error_for_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("db.sqlite");
    let config = AccessorConfig::new(path.to_string_lossy().to_string());

    match TableAccessor::connect(&config) {
        Err(AccessError::Connection { target, reason }) => {
            assert!(target.ends_with("db.sqlite"));
            assert!(!reason.is_empty());
        }
        Err(other) => panic!("Expected Connection error, got: {other:?}"),
        Ok(_) => panic!("Expected connection to fail"),
    }
}

#[test]
fn test_connection_error_without_create() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AccessorConfig::new(dir.path().join("absent.db").to_string_lossy().to_string());
    config.create_if_missing = false;
    assert!(matches!(
        TableAccessor::connect(&config),
        Err(AccessError::Connection { .. })
    ));
}

#[test]
fn test_connection_error_for_failing_init_statement() {
    let config = AccessorConfig::in_memory()
        .with_init_statements(vec!["INSERT INTO no_such_table VALUES (1)".to_string()]);
    match TableAccessor::connect(&config) {
        Err(AccessError::Connection { reason, .. }) => {
            assert!(reason.contains("init statement"));
        }
        Err(other) => panic!("Expected Connection error, got: {other:?}"),
        Ok(_) => panic!("Expected init statement to fail"),
    }
}

#[test]
fn test_connect_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.db");
    let config_path = dir.path().join("db.json");
    let json = serde_json::json!({
        "host": "ignored-by-sqlite",
        "database": db_path.to_string_lossy(),
        "user": "app",
        "password": "secret",
        "buffering": "unbuffered",
        "busy_timeout_ms": 100
    });
    std::fs::write(&config_path, json.to_string()).unwrap();

    let config = AccessorConfig::from_file(config_path.to_str().unwrap()).unwrap();
    let db = TableAccessor::connect(&config).unwrap();
    assert_eq!(db.buffering(), tableaccess::Buffering::Unbuffered);
    assert!(db_path.exists());
}

#[test]
fn test_missing_config_file_is_io_error() {
    assert!(matches!(
        AccessorConfig::from_file("non_existent_config.json"),
        Err(AccessError::Io(_))
    ));
}

#[test]
fn test_foreign_key_violation_is_constraint_violation() {
    let mut db = setup_db();
    let result = db.insert("children", &Conditions::new().eq("parent_id", 99));
    assert!(matches!(result, Err(AccessError::ConstraintViolation(_))));
}

#[test]
fn test_not_null_violation_on_update() {
    let mut db = setup_db();
    let id = db.insert("parents", &Conditions::new().eq("name", "p")).unwrap();
    let result = db.update(
        "parents",
        &Conditions::new().eq("name", tableaccess::Value::Null),
        &Conditions::new().eq("id", id),
    );
    assert!(matches!(result, Err(AccessError::ConstraintViolation(_))));
}

#[test]
fn test_unknown_table_and_column_are_malformed() {
    let mut db = setup_db();
    assert!(matches!(
        db.select(&SelectQuery::from_table("orphans")),
        Err(AccessError::MalformedQuery { .. })
    ));
    assert!(matches!(
        db.insert("parents", &Conditions::new().eq("nickname", "x")),
        Err(AccessError::MalformedQuery { .. })
    ));
}

#[test]
fn test_reserved_word_column_is_malformed() {
    let mut db = setup_db();
    let result = db.select(&SelectQuery::from_table("parents").where_eq("order", 1));
    match result {
        Err(AccessError::MalformedQuery { sql, .. }) => {
            assert_eq!(sql, "SELECT * FROM parents WHERE order = :order");
        }
        other => panic!("Expected MalformedQuery, got: {other:?}"),
    }
}

#[test]
fn test_empty_column_lists() {
    let mut db = setup_db();
    assert!(matches!(
        db.insert("parents", &Conditions::new()),
        Err(AccessError::EmptyColumnList { .. })
    ));
    assert!(matches!(
        db.update_all("parents", &Conditions::new()),
        Err(AccessError::EmptyColumnList { .. })
    ));
}
