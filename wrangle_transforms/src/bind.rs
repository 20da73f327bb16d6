// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking tables by rows or by columns.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use wrangle_core::{Column, DataType, Table, TableError, Value};

/// Stacks tables vertically.
///
/// The output has the union of the input columns in first-appearance order;
/// tables lacking a column contribute missing values. A column's type must
/// agree across inputs (a column of only missing values agrees with
/// anything), otherwise this fails with [`TableError::IncompatibleBind`].
///
/// ```
/// use wrangle_core::{table, Value};
/// use wrangle_transforms::bind_rows;
///
/// let a = table! { "a" => ["x"], "b" => [2] }.unwrap();
/// let b = table! { "a" => ["y"] }.unwrap();
/// let out = bind_rows([&a, &b]).unwrap();
/// assert_eq!(out.row_count(), 2);
/// assert_eq!(out.get(1, "b").unwrap(), &Value::Missing);
/// ```
pub fn bind_rows<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Result<Table, TableError> {
    let tables: Vec<&Table> = tables.into_iter().collect();
    let mut names: Vec<String> = Vec::new();
    let mut types: Vec<DataType> = Vec::new();
    for table in &tables {
        for column in table.columns() {
            match names.iter().position(|n| n == column.name()) {
                Some(i) => {
                    types[i] = types[i].exact_supertype(column.dtype()).ok_or_else(|| {
                        TableError::IncompatibleBind {
                            column: column.name().into(),
                            left: types[i],
                            right: column.dtype(),
                        }
                    })?;
                }
                None => {
                    names.push(column.name().into());
                    types.push(column.dtype());
                }
            }
        }
    }

    let total: usize = tables.iter().map(|t| t.row_count()).sum();
    let mut columns = Vec::with_capacity(names.len());
    for (name, dtype) in names.into_iter().zip(types) {
        let mut values = Vec::with_capacity(total);
        for table in &tables {
            match table.column(&name) {
                Ok(column) => values.extend_from_slice(column.values()),
                Err(_) => values.extend((0..table.row_count()).map(|_| Value::Missing)),
            }
        }
        columns.push(Column::typed(name, dtype, values)?);
    }
    Table::new(columns)
}

/// Places tables side by side.
///
/// Every input must have the same number of rows
/// ([`TableError::RowCountMismatch`]) and column names must be unique across
/// inputs ([`TableError::DuplicateColumn`]).
pub fn bind_cols<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Result<Table, TableError> {
    let mut columns: Vec<Column> = Vec::new();
    let mut rows: Option<usize> = None;
    for table in tables {
        match rows {
            Some(expected) if expected != table.row_count() => {
                return Err(TableError::RowCountMismatch {
                    expected,
                    found: table.row_count(),
                });
            }
            _ => rows = Some(table.row_count()),
        }
        columns.extend(table.columns().iter().cloned());
    }
    Table::new(columns)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::table;

    use super::*;

    #[test]
    fn pads_missing_columns() {
        let a = table! { "a" => ["x"], "b" => [2] }.unwrap();
        let b = table! { "a" => ["y"] }.unwrap();
        let out = bind_rows([&a, &b]).unwrap();
        assert_eq!(out.column_names(), vec!["a", "b"]);
        assert_eq!(
            out.column("a").unwrap().values(),
            [Value::from("x"), Value::from("y")]
        );
        assert_eq!(
            out.column("b").unwrap().values(),
            [Value::Int(2), Value::Missing]
        );
        assert_eq!(out.column("b").unwrap().dtype(), DataType::Int);
    }

    #[test]
    fn column_order_is_first_appearance() {
        let a = table! { "b" => [1] }.unwrap();
        let b = table! { "a" => [2], "b" => [3] }.unwrap();
        assert_eq!(bind_rows([&a, &b]).unwrap().column_names(), vec!["b", "a"]);
    }

    #[test]
    fn mismatched_types_fail() {
        let a = table! { "x" => [1] }.unwrap();
        let b = table! { "x" => ["1"] }.unwrap();
        assert_eq!(
            bind_rows([&a, &b]).unwrap_err(),
            TableError::IncompatibleBind {
                column: "x".into(),
                left: DataType::Int,
                right: DataType::Str,
            }
        );
    }

    #[test]
    fn all_missing_columns_unify() {
        let a = table! { "x" => [None::<i64>] }.unwrap();
        let b = table! { "x" => [1.5] }.unwrap();
        let out = bind_rows([&a, &b]).unwrap();
        assert_eq!(out.column("x").unwrap().dtype(), DataType::Float);
    }

    #[test]
    fn bind_cols_checks_shape_and_names() {
        let a = table! { "a" => [1, 2] }.unwrap();
        let b = table! { "b" => [3, 4] }.unwrap();
        let c = table! { "c" => [5] }.unwrap();
        assert_eq!(bind_cols([&a, &b]).unwrap().column_names(), vec!["a", "b"]);
        assert_eq!(
            bind_cols([&a, &c]).unwrap_err(),
            TableError::RowCountMismatch {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            bind_cols([&a, &a]).unwrap_err(),
            TableError::DuplicateColumn("a".into())
        );
    }
}
