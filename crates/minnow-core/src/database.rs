//! A database: an ordered collection of named tables.

use crate::error::{Error, Result};
use crate::named::NamedVec;
use crate::schema::Schema;
use crate::table::Table;

/// An ordered mapping from table names to tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Database {
    tables: NamedVec<Table>,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: NamedVec::new(),
        }
    }

    /// Creates a table.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is already taken.
    pub fn create_table(&mut self, name: impl Into<String>, schema: Schema) -> Result<&mut Table> {
        let name = name.into();
        if self.tables.contains(&name) {
            return Err(Error::TableExists(name));
        }
        let table = Table::new(name.clone(), schema);
        Ok(self.tables.insert(name, table))
    }

    /// Looks up a table.
    ///
    /// # Errors
    ///
    /// Returns an error when no table has this name.
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Looks up a table mutably, so INSERT/UPDATE/DELETE reach the stored
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error when no table has this name.
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Returns true when a table with this name exists.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    /// Removes a table.
    ///
    /// # Errors
    ///
    /// Returns an error when no table has this name.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Adds an already-built table, replacing any table of the same name.
    /// Used by the loader.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Iterates tables in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true when the database holds no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
