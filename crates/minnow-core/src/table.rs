//! Tables and the relational operators over them.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::named::NamedVec;
use crate::schema::{Row, Schema};
use crate::value::Cell;

/// A named, ordered collection of rows over one schema.
///
/// Tables carry no primary key and allow duplicate rows. The `joined` flag
/// marks a table whose columns were already prefixed by a join, so a second
/// join leaves them alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
    joined: bool,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            joined: false,
        }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The rows, in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true when this table is the product of a join.
    #[must_use]
    pub const fn is_joined(&self) -> bool {
        self.joined
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns an error unless the row's schema equals the table's, column
    /// for column.
    pub fn append(&mut self, row: Row) -> Result<()> {
        if row.schema() != &self.schema {
            return Err(Error::SchemaMismatch(format!(
                "row does not fit table '{}'",
                self.name
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns a new table holding the rows that satisfy the predicate.
    ///
    /// Row order is preserved; the schema and joined flag carry over.
    ///
    /// # Errors
    ///
    /// Propagates predicate evaluation errors.
    pub fn filter(&self, predicate: &Expr) -> Result<Self> {
        let mut result = Self {
            name: format!("{}_filtered", self.name),
            schema: self.schema.clone(),
            rows: Vec::new(),
            joined: self.joined,
        };
        for row in &self.rows {
            if predicate.truthy(row)? {
                result.rows.push(row.clone());
            }
        }
        Ok(result)
    }

    /// Returns a new table narrowed to the named columns.
    ///
    /// The projected schema lists the columns in the requested order with
    /// their source types; row order is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error for a column the source schema does not define.
    pub fn project(&self, columns: &[String]) -> Result<Self> {
        let mut schema = Schema::new();
        for name in columns {
            let ty = self
                .schema
                .get(name)
                .ok_or_else(|| Error::UnknownColumn(name.clone()))?;
            schema.push(name.clone(), ty)?;
        }
        let mut result = Self::new(format!("{}_projected", self.name), schema);
        for row in &self.rows {
            let mut projected = Row::new(result.schema.clone());
            for name in columns {
                projected.set(name, row.get(name)?.clone())?;
            }
            result.rows.push(projected);
        }
        Ok(result)
    }

    /// Removes the rows that satisfy the predicate, in place.
    ///
    /// Surviving rows keep their relative order. Returns the removed count.
    ///
    /// # Errors
    ///
    /// Propagates predicate evaluation errors; on error no row is removed.
    pub fn delete_where(&mut self, predicate: &Expr) -> Result<usize> {
        let mut keep = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            keep.push(!predicate.truthy(row)?);
        }
        let before = self.rows.len();
        let mut flags = keep.into_iter();
        self.rows.retain(|_| flags.next().unwrap_or(false));
        Ok(before - self.rows.len())
    }

    /// Applies the assignments to every row that satisfies the predicate.
    ///
    /// Within one row the assignments run in list order, so a later
    /// expression sees the values written by an earlier one. Returns the
    /// updated row count.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors and unknown assignment targets.
    pub fn update_where(&mut self, predicate: &Expr, assignments: &NamedVec<Expr>) -> Result<usize> {
        let mut updated = 0;
        for row in &mut self.rows {
            if !predicate.truthy(row)? {
                continue;
            }
            for (column, expr) in assignments.iter() {
                let value = expr.evaluate(row)?;
                row.set(column, value)?;
            }
            updated += 1;
        }
        Ok(updated)
    }

    /// Returns the unconditional Cartesian product of two tables.
    ///
    /// Columns of a side that has not been joined before are renamed
    /// `<table>.<column>`; columns of an already-joined side keep their
    /// names, so chained joins do not stack prefixes. Filtering the product
    /// down to an ON predicate is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error when the renamed column sets collide.
    pub fn inner_join(&self, other: &Self) -> Result<Self> {
        let mut schema = Schema::new();
        for (name, ty) in self.schema.iter() {
            schema.push(self.qualified(name), ty)?;
        }
        for (name, ty) in other.schema.iter() {
            schema.push(other.qualified(name), ty)?;
        }

        let mut result = Self {
            name: format!("{}_{}", self.name, other.name),
            schema,
            rows: Vec::new(),
            joined: true,
        };
        for left_row in &self.rows {
            for right_row in &other.rows {
                let mut values: Vec<Cell> = left_row.values().cloned().collect();
                values.extend(right_row.values().cloned());
                result
                    .rows
                    .push(Row::from_cells(result.schema.clone(), values)?);
            }
        }
        Ok(result)
    }

    fn qualified(&self, column: &str) -> String {
        if self.joined {
            column.to_string()
        } else {
            format!("{}.{}", self.name, column)
        }
    }
}
