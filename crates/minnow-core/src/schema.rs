//! Column schemas and rows.

use crate::error::{Error, Result};
use crate::named::NamedVec;
use crate::value::{Cell, DataType};

/// The ordered column-name → type contract of a table.
///
/// Column names are unique and keep their insertion order, which fixes the
/// column order of every row serialization. Immutable once built; whole
/// schemas are assigned and cloned freely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: NamedVec<DataType>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: NamedVec::new(),
        }
    }

    /// Builds a schema from (name, type) pairs.
    ///
    /// # Errors
    ///
    /// Returns an error when a column name repeats.
    pub fn from_columns<N: Into<String>>(
        columns: impl IntoIterator<Item = (N, DataType)>,
    ) -> Result<Self> {
        let mut schema = Self::new();
        for (name, ty) in columns {
            schema.push(name, ty)?;
        }
        Ok(schema)
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is already taken.
    pub fn push(&mut self, name: impl Into<String>, ty: DataType) -> Result<()> {
        let name = name.into();
        if self.columns.contains(&name) {
            return Err(Error::DuplicateColumn(name));
        }
        self.columns.insert(name, ty);
        Ok(())
    }

    /// Looks up a column type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<DataType> {
        self.columns.get(name).copied()
    }

    /// Returns true when the schema defines this column.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates column names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.names()
    }

    /// Iterates (name, type) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.columns.iter().map(|(name, ty)| (name, *ty))
    }
}

/// A single record: a schema plus one cell per column.
///
/// Cell keys equal the schema's column names, in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    schema: Schema,
    cells: NamedVec<Cell>,
}

impl Row {
    /// Creates a row with every cell zero-initialised for its column type.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        let mut cells = NamedVec::new();
        for (name, ty) in schema.iter() {
            cells.insert(name, Cell::default_for(ty));
        }
        Self { schema, cells }
    }

    /// Creates a row from cells assigned by position to the schema columns.
    ///
    /// The cells keep their own tags; they are not reparsed through the
    /// declared column types.
    ///
    /// # Errors
    ///
    /// Returns an error when the value count does not match the schema.
    pub fn from_cells(schema: Schema, values: Vec<Cell>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(Error::ColumnCount {
                expected: schema.len(),
                found: values.len(),
            });
        }
        let mut cells = NamedVec::new();
        for ((name, _), value) in schema.iter().zip(values) {
            cells.insert(name, value);
        }
        Ok(Self { schema, cells })
    }

    /// The schema this row conforms to.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Looks up a cell by column name.
    ///
    /// # Errors
    ///
    /// Returns an error for a column the schema does not define.
    pub fn get(&self, name: &str) -> Result<&Cell> {
        self.cells
            .get(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// Assigns a cell to a named column.
    ///
    /// # Errors
    ///
    /// Returns an error for a column the schema does not define.
    pub fn set(&mut self, name: &str, cell: Cell) -> Result<()> {
        match self.cells.get_mut(name) {
            Some(slot) => {
                *slot = cell;
                Ok(())
            }
            None => Err(Error::UnknownColumn(name.to_string())),
        }
    }

    /// Iterates cells in column order.
    pub fn values(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }
}
