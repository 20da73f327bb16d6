// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The immutable table type and its row view.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::{Column, TableError, Value};

/// An immutable, column-oriented table.
///
/// Column names are unique and every column has `row_count` values. Column
/// order matters for display only; row order is preserved by every operation
/// that does not explicitly reorder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table from columns.
    ///
    /// Fails with [`TableError::DuplicateColumn`] on repeated names and with
    /// [`TableError::RowCountMismatch`] when column lengths differ.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self, TableError> {
        let columns: Vec<Column> = columns.into_iter().collect();
        let row_count = columns.first().map_or(0, Column::len);
        {
            let mut seen = HashSet::with_capacity(columns.len());
            for c in &columns {
                if !seen.insert(c.name()) {
                    return Err(TableError::DuplicateColumn(c.name().into()));
                }
                if c.len() != row_count {
                    return Err(TableError::RowCountMismatch {
                        expected: row_count,
                        found: c.len(),
                    });
                }
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// The columns, in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consumes the table, returning its columns.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Column names, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Returns `true` if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| TableError::UnknownColumn(name.into()))
    }

    /// Returns the cell at (`row`, `name`).
    pub fn get(&self, row: usize, name: &str) -> Result<&Value, TableError> {
        let column = self.column(name)?;
        column.get(row).ok_or(TableError::RowCountMismatch {
            expected: self.row_count,
            found: row,
        })
    }

    /// A view of one row (`index` must be in bounds).
    pub fn row(&self, index: usize) -> Row<'_> {
        debug_assert!(index < self.row_count, "row {index} out of bounds");
        Row { table: self, index }
    }

    /// Iterates over all rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.row_count).map(move |index| Row { table: self, index })
    }

    /// Gathers the rows at `indices`, in the given order.
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            row_count: indices.len(),
        }
    }

    /// Returns a copy with `column` added, or replacing the column of the
    /// same name in place.
    pub fn with_column(&self, column: Column) -> Result<Self, TableError> {
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(TableError::RowCountMismatch {
                expected: self.row_count,
                found: column.len(),
            });
        }
        let mut columns = self.columns.clone();
        match self.column_index(column.name()) {
            Some(i) => columns[i] = column,
            None => columns.push(column),
        }
        let row_count = columns.first().map_or(0, Column::len);
        Ok(Self { columns, row_count })
    }

    /// Returns a copy keeping only the named columns, in the given order.
    pub fn project(&self, names: &[String]) -> Result<Self, TableError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.column(name)?.clone());
        }
        if columns.is_empty() {
            return Ok(Self {
                columns,
                row_count: self.row_count,
            });
        }
        Self::new(columns)
    }
}

/// A borrowed view of a single table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Position of this row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The value of column `name` in this row.
    pub fn get(&self, name: &str) -> Result<&'a Value, TableError> {
        self.table.get(self.index, name)
    }

    /// Iterates over `(column name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let index = self.index;
        self.table
            .columns
            .iter()
            .map(move |c| (c.name(), &c.values()[index]))
    }
}
