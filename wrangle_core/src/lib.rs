// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable in-memory tables.
//!
//! This crate holds the data model shared by the wrangle crates:
//! - [`Value`] cells and their [`DataType`]s,
//! - typed [`Column`]s and the [`Table`] built from them, and
//! - the [`TableError`] every table operation reports.
//!
//! Tables are value objects. Nothing here mutates a table in place; the verbs
//! in `wrangle_transforms` all return new tables.

#![no_std]

extern crate alloc;

mod column;
mod error;
mod table;
mod value;

pub use column::Column;
pub use error::TableError;
pub use table::{Row, Table};
pub use value::{DataType, Value};

/// Identifies a table inside a transform program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u64);

/// Builds a [`Table`] from `name => values` pairs.
///
/// Evaluates to `Result<Table, TableError>`. Values may be anything that
/// converts into [`Value`], including `Option`s for missing cells.
///
/// ```
/// use wrangle_core::{table, Value};
///
/// let t = table! {
///     "g" => [1, 1, 2],
///     "x" => [Some(3.0), None, Some(1.0)],
/// }
/// .unwrap();
/// assert_eq!(t.row_count(), 3);
/// assert_eq!(t.get(1, "x").unwrap(), &Value::Missing);
/// ```
#[macro_export]
macro_rules! table {
    ($($name:expr => $values:expr),* $(,)?) => {
        (|| -> ::core::result::Result<$crate::Table, $crate::TableError> {
            $crate::Table::new([$($crate::Column::from_values($name, $values)?),*])
        })()
    };
}
