//! The on-disk catalog: one directory per database, one CSV file per table.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::csv::{self, CsvOptions};
use crate::database::Database;
use crate::error::{Error, Result};

/// Maps databases to sub-directories of a root and tables to `.csv` files
/// named by their table.
///
/// Writes are whole-file overwrites per table; there is no journaling and
/// no partial-write recovery.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Creates a storage handle rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The catalog root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn database_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Ensures the database directory exists and returns an empty database.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn create_database(&self, name: &str) -> Result<Database> {
        fs::create_dir_all(self.database_path(name))?;
        debug!(database = name, "created database directory");
        Ok(Database::new())
    }

    /// Loads every `.csv` file of a database directory as a table.
    ///
    /// Files load in name order so the table order does not depend on the
    /// directory iteration order.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory is missing or a table file does
    /// not parse.
    pub fn load_database(&self, name: &str) -> Result<Database> {
        let path = self.database_path(name);
        if !path.is_dir() {
            return Err(Error::DatabaseNotFound(name.to_string()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&path)? {
            let file = entry?.path();
            if file.extension().is_some_and(|ext| ext == "csv") {
                files.push(file);
            }
        }
        files.sort();

        let mut database = Database::new();
        for file in files {
            let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let contents = fs::read_to_string(&file)?;
            let table = csv::parse(&contents, stem, CsvOptions::STORAGE)?;
            debug!(database = name, table = stem, rows = table.len(), "loaded table");
            database.insert_table(table);
        }
        Ok(database)
    }

    /// Writes every table of a database as `<table>.csv`, removing table
    /// files that no longer have a table.
    ///
    /// # Errors
    ///
    /// Returns an error when a file cannot be written.
    pub fn save_database(&self, database: &Database, name: &str) -> Result<()> {
        let path = self.database_path(name);
        fs::create_dir_all(&path)?;

        for table in database.tables() {
            debug!(
                database = name,
                table = table.name(),
                rows = table.len(),
                "saving table"
            );
            let file = path.join(format!("{}.csv", table.name()));
            fs::write(file, csv::dump(table, CsvOptions::STORAGE))?;
        }

        // Dropped tables must not resurrect on the next load.
        for entry in fs::read_dir(&path)? {
            let file = entry?.path();
            if file.extension().is_some_and(|ext| ext == "csv") {
                let stale = file
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| !database.has_table(stem));
                if stale {
                    fs::remove_file(&file)?;
                }
            }
        }
        Ok(())
    }

    /// Recursively removes a database directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory is missing or cannot be removed.
    pub fn delete_database(&self, name: &str) -> Result<()> {
        let path = self.database_path(name);
        if !path.is_dir() {
            return Err(Error::DatabaseNotFound(name.to_string()));
        }
        fs::remove_dir_all(path)?;
        debug!(database = name, "deleted database");
        Ok(())
    }

    /// Lists database names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error when the root cannot be created or read.
    pub fn list_databases(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.root)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl Default for DiskStorage {
    fn default() -> Self {
        Self::new("dbs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Row, Schema};
    use crate::value::{Cell, DataType};

    fn sample_database() -> Database {
        let schema = Schema::from_columns([
            ("id", DataType::Integer),
            ("name", DataType::Text),
        ])
        .unwrap();
        let mut database = Database::new();
        let table = database.create_table("users", schema.clone()).unwrap();
        table
            .append(Row::from_cells(schema, vec![Cell::Int(1), Cell::from("Alice")]).unwrap())
            .unwrap();
        database
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        let database = sample_database();

        storage.save_database(&database, "crm").unwrap();
        let loaded = storage.load_database("crm").unwrap();
        assert_eq!(loaded, database);
    }

    #[test]
    fn test_load_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        assert!(matches!(
            storage.load_database("ghost"),
            Err(Error::DatabaseNotFound(_))
        ));
    }

    #[test]
    fn test_create_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        storage.create_database("beta").unwrap();
        storage.create_database("alpha").unwrap();
        assert_eq!(storage.list_databases().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_delete_database() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        storage.create_database("tmp").unwrap();
        storage.delete_database("tmp").unwrap();
        assert!(storage.list_databases().unwrap().is_empty());
        assert!(matches!(
            storage.delete_database("tmp"),
            Err(Error::DatabaseNotFound(_))
        ));
    }

    #[test]
    fn test_save_removes_stale_table_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        let mut database = sample_database();
        storage.save_database(&database, "crm").unwrap();

        database.drop_table("users").unwrap();
        storage.save_database(&database, "crm").unwrap();

        let loaded = storage.load_database("crm").unwrap();
        assert!(loaded.is_empty());
    }
}
