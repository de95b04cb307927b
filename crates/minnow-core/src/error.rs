//! Error types for the engine.

use crate::value::DataType;

/// Errors that can occur while lexing, parsing, or executing a script.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A string literal was opened but never closed.
    #[error("Unterminated string literal")]
    UnterminatedString,

    /// The parser found something other than what the grammar requires.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the grammar required at this point.
        expected: String,
        /// The token actually found.
        found: String,
    },

    /// The token stream ended mid-statement.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// An expression position contained no tokens.
    #[error("Empty expression")]
    EmptyExpression,

    /// An expression range could not be reduced to a term.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A literal could not be parsed at the required type.
    #[error("Cannot convert '{text}' to {target}")]
    Conversion {
        /// The offending literal text.
        text: String,
        /// The type the text was parsed at.
        target: DataType,
    },

    /// Division by zero, integer or float.
    #[error("Division by zero")]
    DivisionByZero,

    /// A column name that no schema in scope defines.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// A schema was built with the same column name twice.
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A row's schema does not match the table it was appended to.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A value list whose length does not match the schema.
    #[error("Expected {expected} values, found {found}")]
    ColumnCount {
        /// Number of columns in the schema.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// CREATE TABLE with a name already in the database.
    #[error("Table '{0}' already exists")]
    TableExists(String),

    /// A statement referenced a table the database does not contain.
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// USE or DROP of a database with no directory on disk.
    #[error("Database '{0}' not found")]
    DatabaseNotFound(String),

    /// A table-level statement ran before any USE DATABASE.
    #[error("No database selected")]
    NoDatabaseSelected,

    /// A CSV file that does not have the expected shape.
    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    /// Reading or writing the catalog failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
