//! End-to-end scripts driven through the public interpreter API.
//!
//! Each test runs one or more scripts against a fresh catalog rooted in a
//! temporary directory and checks the rendered SELECT output, the on-disk
//! state, or both.

use minnow_core::{csv, DiskStorage, Error, Interpreter};
use tempfile::TempDir;

/// Runs a script and returns the rendered SELECT output alongside the
/// execution result. The interpreter is closed either way, so the current
/// database reaches the disk exactly as the CLI driver would leave it.
fn run(dir: &TempDir, script: &str) -> (String, minnow_core::Result<()>) {
    let mut interpreter = Interpreter::new(DiskStorage::new(dir.path()));
    let result = interpreter.execute(script);
    let rendered = csv::render_results(interpreter.outputs());
    interpreter.close().expect("closing the interpreter failed");
    (rendered, result)
}

fn run_ok(dir: &TempDir, script: &str) -> String {
    let (rendered, result) = run(dir, script);
    result.expect("script failed");
    rendered
}

const SETUP: &str = "CREATE DATABASE shop; \
     USE DATABASE shop; \
     CREATE TABLE users (id INTEGER, name TEXT, balance FLOAT); \
     INSERT INTO users VALUES (1, 'Alice', 100.50); \
     INSERT INTO users VALUES (2, 'Bob', 200.75); ";

#[test]
fn test_create_insert_select() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("{SETUP} SELECT * FROM users;");
    assert_eq!(
        run_ok(&dir, &script),
        "id,name,balance\n\
         1,'Alice',100.50\n\
         2,'Bob',200.75\n\
         ---\n"
    );
}

#[test]
fn test_where_filters_and_projects() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         SELECT name FROM users WHERE balance > 150; \
         SELECT * FROM users WHERE id = 1;"
    );
    assert_eq!(
        run_ok(&dir, &script),
        "name\n\
         'Bob'\n\
         ---\n\
         id,name,balance\n\
         1,'Alice',100.50\n\
         ---\n"
    );
}

#[test]
fn test_inner_join_on_keys() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         CREATE TABLE orders (user_id INTEGER, product TEXT, amount FLOAT); \
         INSERT INTO orders VALUES (1, 'Book', 29.99); \
         INSERT INTO orders VALUES (1, 'Pen', 5.99); \
         INSERT INTO orders VALUES (2, 'Notebook', 15.99); \
         SELECT users.name, orders.product, orders.amount FROM users \
         INNER JOIN orders ON users.id = orders.user_id;"
    );
    assert_eq!(
        run_ok(&dir, &script),
        "users.name,orders.product,orders.amount\n\
         'Alice','Book',29.99\n\
         'Alice','Pen',5.99\n\
         'Bob','Notebook',15.99\n\
         ---\n"
    );
}

#[test]
fn test_bare_join_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         CREATE TABLE orders (user_id INTEGER, product TEXT); \
         INSERT INTO orders VALUES (2, 'Notebook'); \
         SELECT users.name FROM users JOIN orders ON users.id = orders.user_id;"
    );
    assert_eq!(run_ok(&dir, &script), "users.name\n'Bob'\n---\n");
}

#[test]
fn test_join_with_where() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         CREATE TABLE orders (user_id INTEGER, amount FLOAT); \
         INSERT INTO orders VALUES (1, 29.99); \
         INSERT INTO orders VALUES (2, 5.99); \
         SELECT users.name FROM users INNER JOIN orders \
         ON users.id = orders.user_id WHERE orders.amount > 10;"
    );
    assert_eq!(run_ok(&dir, &script), "users.name\n'Alice'\n---\n");
}

#[test]
fn test_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         UPDATE users SET balance = 150.00 WHERE id = 1; \
         SELECT * FROM users WHERE id = 1; \
         DELETE FROM users WHERE id = 2; \
         SELECT * FROM users;"
    );
    let rendered = run_ok(&dir, &script);
    assert_eq!(
        rendered,
        "id,name,balance\n\
         1,'Alice',150.00\n\
         ---\n\
         id,name,balance\n\
         1,'Alice',150.00\n\
         ---\n"
    );
    assert!(!rendered.contains("Bob"));
}

#[test]
fn test_update_without_where_hits_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         UPDATE users SET balance = balance + 10; \
         SELECT * FROM users;"
    );
    let rendered = run_ok(&dir, &script);
    assert!(rendered.contains("1,'Alice',110.50"));
    assert!(rendered.contains("2,'Bob',210.75"));
}

#[test]
fn test_update_expressions_read_the_row() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         UPDATE users SET balance = balance * 2 WHERE name = 'Alice'; \
         SELECT balance FROM users WHERE id = 1;"
    );
    assert_eq!(run_ok(&dir, &script), "balance\n201.00\n---\n");
}

#[test]
fn test_condition_with_and() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         SELECT name FROM users WHERE balance > 50 AND id < 2;"
    );
    assert_eq!(run_ok(&dir, &script), "name\n'Alice'\n---\n");
}

#[test]
fn test_persistence_across_interpreters() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(&dir, SETUP);

    // A separate interpreter sees what the first one saved on close.
    let rendered = run_ok(
        &dir,
        "USE DATABASE shop; SELECT name FROM users WHERE id = 2;",
    );
    assert_eq!(rendered, "name\n'Bob'\n---\n");
}

#[test]
fn test_persisted_file_uses_storage_dialect() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(&dir, SETUP);
    let contents = std::fs::read_to_string(dir.path().join("shop").join("users.csv")).unwrap();
    assert_eq!(
        contents,
        "id,name,balance\n\
         INTEGER,TEXT,FLOAT\n\
         1,Alice,100.50\n\
         2,Bob,200.75\n"
    );
}

#[test]
fn test_drop_database_removes_directory() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(&dir, "CREATE DATABASE scratch;");
    assert!(dir.path().join("scratch").is_dir());
    run_ok(&dir, "DROP DATABASE scratch;");
    assert!(!dir.path().join("scratch").exists());
}

#[test]
fn test_syntax_error_reports_and_keeps_earlier_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("{SETUP} SELECT name FROM users; SELEC * FORM users;");
    let (rendered, result) = run(&dir, &script);
    assert!(matches!(result, Err(Error::UnexpectedToken { .. })));
    // Output produced before the failing statement is preserved.
    assert_eq!(rendered, "name\n'Alice'\n'Bob'\n---\n");
}

#[test]
fn test_division_by_zero_aborts_the_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("{SETUP} UPDATE users SET balance = balance / 0;");
    let (_, result) = run(&dir, &script);
    assert!(matches!(result, Err(Error::DivisionByZero)));
}

#[test]
fn test_unknown_table_is_a_catalog_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("{SETUP} SELECT * FROM ghosts;");
    let (_, result) = run(&dir, &script);
    assert!(matches!(result, Err(Error::TableNotFound(_))));
}

#[test]
fn test_duplicate_create_table_fails() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("{SETUP} CREATE TABLE users (id INTEGER);");
    let (_, result) = run(&dir, &script);
    assert!(matches!(result, Err(Error::TableExists(_))));
}

#[test]
fn test_quoted_literals_keep_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let script = "CREATE DATABASE d; USE DATABASE d; \
         CREATE TABLE notes (body TEXT); \
         INSERT INTO notes VALUES ('hello wide world'); \
         SELECT * FROM notes;";
    assert_eq!(run_ok(&dir, script), "body\n'hello wide world'\n---\n");
}

#[test]
fn test_arithmetic_in_projection_predicates() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        "{SETUP} \
         SELECT name FROM users WHERE balance * 2 > 300;"
    );
    assert_eq!(run_ok(&dir, &script), "name\n'Bob'\n---\n");
}
