//! CSV serialization for tables.
//!
//! The engine speaks two fixed dialects of the same shape: the persistence
//! dialect (a type row, unquoted text) and the result dialect shown to
//! users (no type row, single-quoted text). Neither implements RFC-4180:
//! fields may not contain commas or newlines, and quoting never goes beyond
//! stripping one pair of surrounding quotes.

use crate::error::{Error, Result};
use crate::schema::{Row, Schema};
use crate::table::Table;
use crate::value::{Cell, DataType};

/// Serialization options for one CSV dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Emit (and expect) a second line of column types.
    pub with_types: bool,
    /// Quote TEXT cells on output and strip surrounding quotes on input.
    pub quoted_text: bool,
}

impl CsvOptions {
    /// The persistence dialect: type row, unquoted text.
    pub const STORAGE: Self = Self {
        with_types: true,
        quoted_text: false,
    };

    /// The user-visible result dialect: no type row, single-quoted text.
    pub const DISPLAY: Self = Self {
        with_types: false,
        quoted_text: true,
    };
}

/// Serializes a table, one line per row, newline after every line.
#[must_use]
pub fn dump(table: &Table, options: CsvOptions) -> String {
    let mut out = String::new();
    let names: Vec<&str> = table.schema().names().collect();
    out.push_str(&names.join(","));
    out.push('\n');

    if options.with_types {
        let types: Vec<&str> = table.schema().iter().map(|(_, ty)| ty.as_str()).collect();
        out.push_str(&types.join(","));
        out.push('\n');
    }

    for row in table.rows() {
        let mut first = true;
        for cell in row.values() {
            if !first {
                out.push(',');
            }
            first = false;
            match cell {
                Cell::Text(text) if options.quoted_text => {
                    out.push('\'');
                    out.push_str(text);
                    out.push('\'');
                }
                other => out.push_str(&other.to_text()),
            }
        }
        out.push('\n');
    }
    out
}

/// Parses CSV into a table with the given name.
///
/// The first line is the header. The second line becomes the type row iff
/// every field names a type and the count matches the header; otherwise all
/// columns default to TEXT and the line is data. Empty lines are skipped.
///
/// # Errors
///
/// Returns an error for a missing header, a field count that does not match
/// the header, or a field that does not parse at its column type.
pub fn parse(input: &str, table_name: &str, options: CsvOptions) -> Result<Table> {
    let lines: Vec<&str> = input.lines().collect();
    let Some(header) = lines.first() else {
        return Err(Error::InvalidCsv(String::from("missing header line")));
    };
    let headers: Vec<&str> = header.split(',').collect();

    let mut schema = Schema::new();
    let mut data_start = 1;
    let types = lines.get(1).and_then(|line| {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() == headers.len() {
            fields.iter().map(|f| DataType::parse(f)).collect::<Option<Vec<_>>>()
        } else {
            None
        }
    });
    match types {
        Some(types) => {
            for (name, ty) in headers.iter().zip(types) {
                schema.push(*name, ty)?;
            }
            data_start = 2;
        }
        None => {
            for name in &headers {
                schema.push(*name, DataType::Text)?;
            }
        }
    }

    let mut table = Table::new(table_name, schema.clone());
    for line in &lines[data_start..] {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != schema.len() {
            return Err(Error::ColumnCount {
                expected: schema.len(),
                found: fields.len(),
            });
        }
        let mut values = Vec::with_capacity(fields.len());
        for (field, (_, ty)) in fields.iter().zip(schema.iter()) {
            let text = if options.quoted_text && ty == DataType::Text {
                strip_quotes(field)
            } else {
                *field
            };
            values.push(Cell::from_literal(ty, text)?);
        }
        table.append(Row::from_cells(schema.clone(), values)?)?;
    }
    Ok(table)
}

/// Renders SELECT results for the user: each table in the display dialect,
/// followed by a separator line.
#[must_use]
pub fn render_results(tables: &[Table]) -> String {
    let mut out = String::new();
    for table in tables {
        out.push_str(&dump(table, CsvOptions::DISPLAY));
        out.push_str("---\n");
    }
    out
}

fn strip_quotes(field: &str) -> &str {
    let bytes = field.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &field[1..field.len() - 1];
        }
    }
    field
}
