// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row ordering, de-duplication and slicing.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashSet;
use smallvec::SmallVec;
use wrangle_core::{Column, Table, TableError, Value};

use crate::transform::SortOrder;

/// One key of an [`arrange`](crate::TableVerbs::arrange) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Column to sort by.
    pub column: String,
    /// Sort direction.
    pub order: SortOrder,
}

/// Ascending sort key.
pub fn asc(column: &str) -> SortKey {
    SortKey {
        column: column.into(),
        order: SortOrder::Asc,
    }
}

/// Descending sort key.
pub fn desc(column: &str) -> SortKey {
    SortKey {
        column: column.into(),
        order: SortOrder::Desc,
    }
}

impl From<&str> for SortKey {
    fn from(column: &str) -> Self {
        asc(column)
    }
}

/// Compares two cells; missing is last in either direction.
fn compare(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match order {
            SortOrder::Asc => a.total_cmp(b),
            SortOrder::Desc => b.total_cmp(a),
        },
    }
}

pub(crate) fn arrange(table: &Table, keys: &[SortKey]) -> Result<Table, TableError> {
    let mut columns: Vec<(&Column, SortOrder)> = Vec::with_capacity(keys.len());
    for key in keys {
        columns.push((table.column(&key.column)?, key.order));
    }
    let mut order: Vec<usize> = (0..table.row_count()).collect();
    // `sort_by` is stable, so equal keys keep input order.
    order.sort_by(|&a, &b| {
        columns
            .iter()
            .map(|(c, o)| compare(&c.values()[a], &c.values()[b], *o))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(table.take(&order))
}

pub(crate) fn distinct(table: &Table, columns: &[String]) -> Result<Table, TableError> {
    let projected = if columns.is_empty() {
        table.clone()
    } else {
        table.project(columns)?
    };
    let mut seen: HashSet<SmallVec<[Value; 4]>> = HashSet::new();
    let mut kept = Vec::new();
    for row in projected.rows() {
        let key: SmallVec<[Value; 4]> = row.iter().map(|(_, v)| v.clone()).collect();
        if seen.insert(key) {
            kept.push(row.index());
        }
    }
    Ok(projected.take(&kept))
}

pub(crate) fn slice_head(table: &Table, n: usize) -> Table {
    let rows: Vec<usize> = (0..table.row_count().min(n)).collect();
    table.take(&rows)
}
