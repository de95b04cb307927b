//! # minnow-core
//!
//! A minimal SQL engine. Scripts of SQL-like statements drive an in-memory
//! relational store with typed columns; databases persist as directories of
//! per-table CSV files, and SELECT results render as CSV.
//!
//! The pipeline: the tokenizer normalizes and lexes the script, the
//! interpreter parses statements and precedence-aware expressions, and the
//! relational operators (filter, project, inner join, append, conditional
//! update/delete) execute them against the catalog on disk.
//!
//! ```
//! use minnow_core::{DiskStorage, Interpreter};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut interpreter = Interpreter::new(DiskStorage::new(dir.path()));
//! interpreter
//!     .execute(
//!         "CREATE DATABASE demo; \
//!          USE DATABASE demo; \
//!          CREATE TABLE pets (id INTEGER, name TEXT); \
//!          INSERT INTO pets VALUES (1, 'Rex'); \
//!          SELECT name FROM pets;",
//!     )
//!     .unwrap();
//! assert_eq!(interpreter.outputs().len(), 1);
//! interpreter.close().unwrap();
//! ```

pub mod csv;
pub mod database;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod lexer;
pub mod named;
pub mod schema;
pub mod storage;
pub mod table;
pub mod value;

pub use database::Database;
pub use error::{Error, Result};
pub use expr::{col, lit, BinaryOp, Expr, UnaryOp};
pub use interpreter::Interpreter;
pub use lexer::{Keyword, Token};
pub use named::NamedVec;
pub use schema::{Row, Schema};
pub use storage::DiskStorage;
pub use table::Table;
pub use value::{Cell, DataType};
