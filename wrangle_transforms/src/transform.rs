// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR types.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use wrangle_core::TableId;

use crate::arrange::SortKey;
use crate::expr::Expr;
use crate::join::{JoinKey, JoinKind, JoinOptions};
use crate::pivot::{PivotLongerSpec, PivotWiderSpec};
use crate::select::Selector;

/// Sorting order for [`Transform::Arrange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// A table verb as data, from input table(s) to an output table.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Keep a subset of columns.
    Select {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Columns to keep, in output order.
        columns: Vec<Selector>,
    },
    /// Rename columns in place.
    Rename {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// `(new, old)` pairs.
        renames: Vec<(String, String)>,
    },
    /// Keep rows for which every predicate is true.
    ///
    /// With a non-empty `group_by`, aggregates in the predicates are computed
    /// per group.
    Filter {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Grouping columns.
        group_by: Vec<String>,
        /// Predicates, all of which must hold.
        predicates: Vec<Expr>,
    },
    /// Add or replace columns.
    Mutate {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Grouping columns.
        group_by: Vec<String>,
        /// `(name, expr)` pairs, evaluated in order.
        assignments: Vec<(String, Expr)>,
    },
    /// Reorder rows.
    Arrange {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Sort keys, most significant first.
        keys: Vec<SortKey>,
    },
    /// Keep the first row of each distinct combination of columns.
    Distinct {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Columns to compare; empty means all.
        columns: Vec<String>,
    },
    /// Group rows and compute one row per group.
    ///
    /// Output columns are `group_by` (in order) followed by the aggregations.
    Summarize {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Group-by key columns.
        group_by: Vec<String>,
        /// `(name, expr)` pairs; each must reduce a group to one value.
        aggregations: Vec<(String, Expr)>,
    },
    /// Join two tables.
    Join {
        /// Left input table.
        left: TableId,
        /// Right input table.
        right: TableId,
        /// Output table.
        output: TableId,
        /// Join flavour.
        kind: JoinKind,
        /// Key pairs; empty means a natural join.
        by: Vec<JoinKey>,
        /// Suffix and missing-key behaviour.
        options: JoinOptions,
    },
    /// Stack tables vertically.
    BindRows {
        /// Input tables, in stacking order.
        inputs: Vec<TableId>,
        /// Output table.
        output: TableId,
    },
    /// Stack columns into name/value pairs.
    PivotLonger {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Reshape options.
        spec: PivotLongerSpec,
    },
    /// Spread name/value pairs into columns.
    PivotWider {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Reshape options.
        spec: PivotWiderSpec,
    },
}

impl Transform {
    /// The tables this transform reads, in argument order.
    pub fn inputs(&self) -> Vec<TableId> {
        match self {
            Self::Select { input, .. }
            | Self::Rename { input, .. }
            | Self::Filter { input, .. }
            | Self::Mutate { input, .. }
            | Self::Arrange { input, .. }
            | Self::Distinct { input, .. }
            | Self::Summarize { input, .. }
            | Self::PivotLonger { input, .. }
            | Self::PivotWider { input, .. } => vec![*input],
            Self::Join { left, right, .. } => vec![*left, *right],
            Self::BindRows { inputs, .. } => inputs.clone(),
        }
    }

    /// The table this transform writes.
    pub fn output(&self) -> TableId {
        match self {
            Self::Select { output, .. }
            | Self::Rename { output, .. }
            | Self::Filter { output, .. }
            | Self::Mutate { output, .. }
            | Self::Arrange { output, .. }
            | Self::Distinct { output, .. }
            | Self::Summarize { output, .. }
            | Self::Join { output, .. }
            | Self::BindRows { output, .. }
            | Self::PivotLonger { output, .. }
            | Self::PivotWider { output, .. } => *output,
        }
    }
}
