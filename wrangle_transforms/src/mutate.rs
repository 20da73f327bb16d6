// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row filtering and column computation, per group.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use wrangle_core::{Column, DataType, Row, Table, TableError, Value};

use crate::eval::{Frame, evaluate_predicate};
use crate::expr::Expr;

/// Row positions of a table split into groups.
///
/// An ungrouped table is a single group holding every row.
pub(crate) fn whole_table(table: &Table) -> Vec<Vec<usize>> {
    vec![(0..table.row_count()).collect()]
}

/// Keeps the rows for which every predicate is `true` within its group.
///
/// Kept rows stay in input order.
pub(crate) fn filter_groups(
    table: &Table,
    groups: &[Vec<usize>],
    predicates: &[Expr],
) -> Result<Table, TableError> {
    let mut keep = vec![true; table.row_count()];
    for rows in groups {
        let frame = Frame::new(table, rows);
        for predicate in predicates {
            let mask = evaluate_predicate(predicate, &frame)?;
            for (&row, ok) in rows.iter().zip(mask) {
                keep[row] &= ok;
            }
        }
    }
    if groups.is_empty() {
        // Still type-check the predicates.
        let frame = Frame::new(table, &[]);
        for predicate in predicates {
            evaluate_predicate(predicate, &frame)?;
        }
    }
    let kept: Vec<usize> = (0..table.row_count()).filter(|&i| keep[i]).collect();
    Ok(table.take(&kept))
}

/// Keeps the rows for which `predicate` returns `Some(true)`.
pub(crate) fn filter_rows<F>(table: &Table, mut predicate: F) -> Result<Table, TableError>
where
    F: FnMut(Row<'_>) -> Result<Option<bool>, TableError>,
{
    let mut kept = Vec::new();
    for row in table.rows() {
        if predicate(row)? == Some(true) {
            kept.push(row.index());
        }
    }
    Ok(table.take(&kept))
}

/// Evaluates each assignment over every group and writes it back as a
/// column. Later assignments see earlier ones.
pub(crate) fn mutate_groups(
    table: &Table,
    groups: &[Vec<usize>],
    assignments: &[(String, Expr)],
) -> Result<Table, TableError> {
    let mut current = table.clone();
    let rows = current.row_count();
    for (name, expr) in assignments {
        let mut values = vec![Value::Missing; rows];
        let mut dtype = DataType::Null;
        if groups.is_empty() {
            dtype = expr.evaluate(&Frame::new(&current, &[]))?.dtype();
        }
        for group in groups {
            let evaluated = expr.evaluate(&Frame::new(&current, group))?;
            if let Some(len) = evaluated.column_len()
                && len != group.len()
            {
                return Err(TableError::RowCountMismatch {
                    expected: group.len(),
                    found: len,
                });
            }
            dtype = dtype
                .supertype(evaluated.dtype())
                .ok_or(TableError::TypeMismatch {
                    op: "mutate",
                    found: evaluated.dtype(),
                })?;
            for (i, &row) in group.iter().enumerate() {
                values[row] = evaluated.value_at(i).clone();
            }
        }
        current = current.with_column(Column::typed(name.as_str(), dtype, values)?)?;
    }
    Ok(current)
}

/// Like [`mutate_groups`] but keeps only `keep` followed by the assigned
/// columns.
pub(crate) fn transmute_groups(
    table: &Table,
    groups: &[Vec<usize>],
    keep: &[String],
    assignments: &[(String, Expr)],
) -> Result<Table, TableError> {
    let mutated = mutate_groups(table, groups, assignments)?;
    let mut names: Vec<String> = keep.to_vec();
    for (name, _) in assignments {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    mutated.project(&names)
}

/// Collects `(name, expr)` pairs with owned names.
pub(crate) fn owned_assignments<N: Into<String>>(
    assignments: impl IntoIterator<Item = (N, Expr)>,
) -> Vec<(String, Expr)> {
    assignments
        .into_iter()
        .map(|(name, expr)| (name.into(), expr))
        .collect()
}
