// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The error type shared by every table operation.

extern crate alloc;

use alloc::string::String;
use core::fmt;

use crate::DataType;

/// Errors returned by table construction and table verbs.
///
/// Tables are immutable, so a failed operation never leaves a half-built
/// result behind: the caller either gets a new table or one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A referenced column does not exist.
    UnknownColumn(String),
    /// An operation was applied to values of an incompatible type.
    TypeMismatch {
        /// The operation that rejected the input.
        op: &'static str,
        /// The offending type.
        found: DataType,
    },
    /// Columns (or tables) that must have equal lengths do not.
    RowCountMismatch {
        /// The length established first.
        expected: usize,
        /// The length that disagreed.
        found: usize,
    },
    /// Two output columns would share a name.
    DuplicateColumn(String),
    /// `bind_rows` found the same column with two different types.
    IncompatibleBind {
        /// The column name.
        column: String,
        /// Type seen in an earlier table.
        left: DataType,
        /// Type seen in a later table.
        right: DataType,
    },
    /// An argument is outside the domain of the operation.
    InvalidArgument(String),
    /// A `summarize` expression produced more than one value for a group.
    NonScalarSummary {
        /// The output column name.
        name: String,
        /// Number of values produced.
        len: usize,
    },
    /// `pivot_wider` found two input rows for the same output cell.
    DuplicatePivotCell {
        /// The output column that received two values.
        column: String,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownColumn(name) => write!(f, "unknown column `{name}`"),
            Self::TypeMismatch { op, found } => {
                write!(f, "`{op}` cannot be applied to {found} values")
            }
            Self::RowCountMismatch { expected, found } => {
                write!(f, "row count mismatch: expected {expected}, found {found}")
            }
            Self::DuplicateColumn(name) => write!(f, "duplicate column `{name}`"),
            Self::IncompatibleBind {
                column,
                left,
                right,
            } => write!(f, "cannot bind column `{column}`: {left} vs {right}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::NonScalarSummary { name, len } => {
                write!(f, "summary `{name}` must be a single value, got {len}")
            }
            Self::DuplicatePivotCell { column } => {
                write!(f, "values are not uniquely identified for column `{column}`")
            }
        }
    }
}

impl core::error::Error for TableError {}
