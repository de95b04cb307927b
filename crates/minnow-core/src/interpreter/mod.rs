//! The SQL interpreter: statement parsing and execution.
//!
//! One statement executes completely before the next begins. Schema-changing
//! statements (CREATE TABLE, DROP TABLE) persist the current database
//! immediately; row changes reach the disk when the interpreter switches
//! databases or closes.

mod expr;

use tracing::{debug, warn};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::lexer::{tokenize, Keyword, Token};
use crate::named::NamedVec;
use crate::schema::{Row, Schema};
use crate::storage::DiskStorage;
use crate::table::Table;
use crate::value::{Cell, DataType};

/// The database currently selected by USE DATABASE.
struct CurrentDatabase {
    name: String,
    database: Database,
}

/// Executes SQL scripts against a disk-backed catalog.
///
/// SELECT results accumulate in an ordered output buffer that the caller
/// renders; everything else mutates the current database in place.
pub struct Interpreter {
    tokens: Vec<Token>,
    pos: usize,
    storage: DiskStorage,
    current: Option<CurrentDatabase>,
    outputs: Vec<Table>,
}

impl Interpreter {
    /// Creates an interpreter over the given catalog.
    #[must_use]
    pub fn new(storage: DiskStorage) -> Self {
        Self {
            tokens: Vec::new(),
            pos: 0,
            storage,
            current: None,
            outputs: Vec::new(),
        }
    }

    /// Executes a script, statement by statement.
    ///
    /// Clears the output buffer, then runs until the tokens are exhausted
    /// or a statement fails. Side effects of statements before a failure
    /// remain in place.
    ///
    /// # Errors
    ///
    /// Returns the first lexing, parsing, or execution error.
    pub fn execute(&mut self, script: &str) -> Result<()> {
        self.outputs.clear();
        self.tokens = tokenize(script)?;
        self.pos = 0;

        while !self.at_end() {
            let token = self.next_token("a statement keyword")?;
            let Some(keyword) = token.as_keyword() else {
                return Err(Error::UnexpectedToken {
                    expected: String::from("a statement keyword"),
                    found: token.to_string(),
                });
            };
            match keyword {
                Keyword::Create => self.exec_create()?,
                Keyword::Use => self.exec_use()?,
                Keyword::Drop => self.exec_drop()?,
                Keyword::Insert => self.exec_insert()?,
                Keyword::Select => self.exec_select()?,
                Keyword::Update => self.exec_update()?,
                Keyword::Delete => self.exec_delete()?,
                other => {
                    return Err(Error::UnexpectedToken {
                        expected: String::from("a statement keyword"),
                        found: other.as_str().to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// The SELECT results of the last `execute`, in statement order.
    #[must_use]
    pub fn outputs(&self) -> &[Table] {
        &self.outputs
    }

    /// Takes the SELECT results, leaving the buffer empty.
    pub fn take_outputs(&mut self) -> Vec<Table> {
        std::mem::take(&mut self.outputs)
    }

    /// Saves the current database and releases it.
    ///
    /// # Errors
    ///
    /// Returns an error when the save fails.
    pub fn close(&mut self) -> Result<()> {
        self.flush_current()
    }

    fn flush_current(&mut self) -> Result<()> {
        if let Some(current) = self.current.take() {
            self.storage.save_database(&current.database, &current.name)?;
        }
        Ok(())
    }

    // ---- statements ----

    fn exec_create(&mut self) -> Result<()> {
        let token = self.next_token("DATABASE or TABLE")?;
        match token.as_keyword() {
            Some(Keyword::Database) => {
                let name = self.expect_identifier()?;
                self.expect_punct(';')?;
                // Creates the directory without switching to it.
                self.storage.create_database(&name)?;
                debug!(database = %name, "created database");
            }
            Some(Keyword::Table) => {
                let name = self.expect_identifier()?;
                let schema = self.read_schema()?;
                self.expect_punct(';')?;
                let current = self.current.as_mut().ok_or(Error::NoDatabaseSelected)?;
                current.database.create_table(&name, schema)?;
                self.storage
                    .save_database(&current.database, &current.name)?;
                debug!(table = %name, "created table");
            }
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: String::from("DATABASE or TABLE"),
                    found: token.to_string(),
                })
            }
        }
        Ok(())
    }

    fn exec_use(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Database)?;
        let name = self.expect_identifier()?;
        self.expect_punct(';')?;

        self.flush_current()?;
        let database = self.storage.load_database(&name)?;
        debug!(database = %name, tables = database.len(), "selected database");
        self.current = Some(CurrentDatabase { name, database });
        Ok(())
    }

    fn exec_drop(&mut self) -> Result<()> {
        let token = self.next_token("DATABASE or TABLE")?;
        match token.as_keyword() {
            Some(Keyword::Database) => {
                let name = self.expect_identifier()?;
                self.expect_punct(';')?;
                self.storage.delete_database(&name)?;
            }
            Some(Keyword::Table) => {
                let name = self.expect_identifier()?;
                self.expect_punct(';')?;
                let current = self.current.as_mut().ok_or(Error::NoDatabaseSelected)?;
                current.database.drop_table(&name)?;
                self.storage
                    .save_database(&current.database, &current.name)?;
                debug!(table = %name, "dropped table");
            }
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: String::from("DATABASE or TABLE"),
                    found: token.to_string(),
                })
            }
        }
        Ok(())
    }

    fn exec_insert(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Into)?;
        let name = self.expect_identifier()?;
        self.expect_keyword(Keyword::Values)?;
        let values = self.read_values()?;
        self.expect_punct(';')?;

        let table = self.current_db_mut()?.get_table_mut(&name)?;
        if values.len() != table.schema().len() {
            return Err(Error::ColumnCount {
                expected: table.schema().len(),
                found: values.len(),
            });
        }
        let row = Row::from_cells(table.schema().clone(), values)?;
        table.append(row)?;
        debug!(table = %name, "inserted row");
        Ok(())
    }

    fn exec_select(&mut self) -> Result<()> {
        let columns = self.read_select_columns()?;
        self.expect_keyword(Keyword::From)?;
        let base_name = self.expect_identifier()?;

        let join = if self.check_keyword(Keyword::Inner) {
            self.bump();
            self.expect_keyword(Keyword::Join)?;
            Some(self.read_join_clause()?)
        } else if self.check_keyword(Keyword::Join) {
            self.bump();
            Some(self.read_join_clause()?)
        } else {
            None
        };

        let where_clause = if self.check_keyword(Keyword::Where) {
            self.bump();
            Some(self.read_condition()?)
        } else {
            None
        };
        self.expect_punct(';')?;

        let database = self.current_db()?;
        let base = database.get_table(&base_name)?;
        let mut result = match &join {
            Some((other_name, on)) => {
                let other = database.get_table(other_name)?;
                base.inner_join(other)?.filter(on)?
            }
            None => base.clone(),
        };
        if let Some(condition) = &where_clause {
            result = result.filter(condition)?;
        }
        let output = match &columns {
            Some(names) => result.project(names)?,
            None => result,
        };
        debug!(table = %base_name, rows = output.len(), "select");
        self.outputs.push(output);
        Ok(())
    }

    fn exec_update(&mut self) -> Result<()> {
        let name = self.expect_identifier()?;
        self.expect_keyword(Keyword::Set)?;
        let assignments = self.read_assignments()?;
        let predicate = self.read_optional_where()?;
        self.expect_punct(';')?;

        let table = self.current_db_mut()?.get_table_mut(&name)?;
        let updated = table.update_where(&predicate, &assignments)?;
        debug!(table = %name, rows = updated, "updated rows");
        Ok(())
    }

    fn exec_delete(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::From)?;
        let name = self.expect_identifier()?;
        let predicate = self.read_optional_where()?;
        self.expect_punct(';')?;

        let table = self.current_db_mut()?.get_table_mut(&name)?;
        let removed = table.delete_where(&predicate)?;
        debug!(table = %name, rows = removed, "deleted rows");
        Ok(())
    }

    // ---- clause readers ----

    /// Reads `( col TYPE, ... )`.
    fn read_schema(&mut self) -> Result<Schema> {
        self.expect_punct('(')?;
        let mut schema = Schema::new();
        loop {
            let column = self.expect_identifier()?;
            let token = self.next_token("a column type")?;
            let ty = match token.as_keyword() {
                Some(Keyword::Integer) => DataType::Integer,
                Some(Keyword::Float) => DataType::Float,
                Some(Keyword::Text) => DataType::Text,
                _ => {
                    return Err(Error::UnexpectedToken {
                        expected: String::from("INTEGER, FLOAT, or TEXT"),
                        found: token.to_string(),
                    })
                }
            };
            schema.push(column, ty)?;
            if self.read_list_separator()? {
                continue;
            }
            return Ok(schema);
        }
    }

    /// Reads `( literal, ... )`, inferring a cell per literal.
    fn read_values(&mut self) -> Result<Vec<Cell>> {
        self.expect_punct('(')?;
        let mut values = Vec::new();
        loop {
            let token = self.next_token("a literal value")?;
            let cell = match token {
                Token::Number(text) => Cell::infer(&text),
                Token::Text(text) => Cell::Text(text),
                other => {
                    return Err(Error::UnexpectedToken {
                        expected: String::from("a literal value"),
                        found: other.to_string(),
                    })
                }
            };
            values.push(cell);
            if self.read_list_separator()? {
                continue;
            }
            return Ok(values);
        }
    }

    /// Consumes `,` (returning true) or `)` (returning false) inside a
    /// parenthesized list.
    fn read_list_separator(&mut self) -> Result<bool> {
        let token = self.next_token("',' or ')'")?;
        match token {
            Token::Punct(',') => Ok(true),
            Token::Punct(')') => Ok(false),
            other => Err(Error::UnexpectedToken {
                expected: String::from("',' or ')'"),
                found: other.to_string(),
            }),
        }
    }

    /// Reads `*` (as None) or a comma-separated column list.
    fn read_select_columns(&mut self) -> Result<Option<Vec<String>>> {
        if self.check_operator('*') {
            self.bump();
            return Ok(None);
        }
        let mut columns = vec![self.expect_identifier()?];
        while self.check_punct(',') {
            self.bump();
            columns.push(self.expect_identifier()?);
        }
        Ok(Some(columns))
    }

    /// Reads `<table> ON <condition>` after a JOIN keyword.
    fn read_join_clause(&mut self) -> Result<(String, Expr)> {
        let table = self.expect_identifier()?;
        self.expect_keyword(Keyword::On)?;
        let condition = self.read_condition()?;
        Ok((table, condition))
    }

    /// Reads `col = expr, ...` after SET.
    fn read_assignments(&mut self) -> Result<NamedVec<Expr>> {
        let mut assignments = NamedVec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect_operator('=')?;
            let expr = self.read_expression()?;
            assignments.insert(column, expr);
            if self.check_punct(',') {
                self.bump();
                continue;
            }
            return Ok(assignments);
        }
    }

    /// Reads an optional WHERE clause; without one, every row matches.
    fn read_optional_where(&mut self) -> Result<Expr> {
        if self.check_keyword(Keyword::Where) {
            self.bump();
            self.read_condition()
        } else {
            Ok(Expr::Literal(Cell::Int(1)))
        }
    }

    // ---- cursor helpers ----

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn next_token(&mut self, expected: &str) -> Result<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| Error::UnexpectedEof(expected.to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(Token::Keyword(k)) if *k == keyword)
    }

    fn check_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|token| token.is_punct(c))
    }

    fn check_operator(&self, c: char) -> bool {
        self.peek().is_some_and(|token| token.is_operator(c))
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        let token = self.next_token(keyword.as_str())?;
        if token.as_keyword() == Some(keyword) {
            Ok(())
        } else {
            Err(Error::UnexpectedToken {
                expected: keyword.as_str().to_string(),
                found: token.to_string(),
            })
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        let token = self.next_token(&format!("'{c}'"))?;
        if token.is_punct(c) {
            Ok(())
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("'{c}'"),
                found: token.to_string(),
            })
        }
    }

    fn expect_operator(&mut self, c: char) -> Result<()> {
        let token = self.next_token(&format!("'{c}'"))?;
        if token.is_operator(c) {
            Ok(())
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("'{c}'"),
                found: token.to_string(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let token = self.next_token("an identifier")?;
        match token {
            Token::Identifier(name) => Ok(name),
            other => Err(Error::UnexpectedToken {
                expected: String::from("an identifier"),
                found: other.to_string(),
            }),
        }
    }

    fn current_db(&self) -> Result<&Database> {
        self.current
            .as_ref()
            .map(|current| &current.database)
            .ok_or(Error::NoDatabaseSelected)
    }

    fn current_db_mut(&mut self) -> Result<&mut Database> {
        self.current
            .as_mut()
            .map(|current| &mut current.database)
            .ok_or(Error::NoDatabaseSelected)
    }
}

impl Drop for Interpreter {
    /// Best-effort flush; `close` is the checked path.
    fn drop(&mut self) {
        if let Err(error) = self.flush_current() {
            warn!(%error, "failed to save current database on shutdown");
        }
    }
}
