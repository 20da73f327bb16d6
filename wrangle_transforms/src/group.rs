// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping and per-group summaries.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;
use smallvec::SmallVec;
use wrangle_core::{Column, DataType, Table, TableError, Value};

use crate::eval::Frame;
use crate::expr::Expr;
use crate::mutate::{filter_groups, mutate_groups, owned_assignments, transmute_groups};

type GroupKey = SmallVec<[Value; 4]>;

/// A table partitioned into groups by the values of its key columns.
///
/// Groups are ordered by ascending key with missing values last; rows inside
/// a group keep table order. With no keys there is exactly one group holding
/// every row.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedTable {
    table: Table,
    keys: Vec<String>,
    groups: Vec<Vec<usize>>,
}

fn compare_keys(a: &GroupKey, b: &GroupKey) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl GroupedTable {
    pub(crate) fn new(table: Table, keys: Vec<String>) -> Result<Self, TableError> {
        let mut key_columns = Vec::with_capacity(keys.len());
        for key in &keys {
            key_columns.push(table.column(key)?);
        }
        if key_columns.is_empty() {
            let groups = vec![(0..table.row_count()).collect()];
            return Ok(Self {
                table,
                keys,
                groups,
            });
        }

        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut found: Vec<(GroupKey, Vec<usize>)> = Vec::new();
        for row in 0..table.row_count() {
            let key: GroupKey = key_columns
                .iter()
                .map(|c| c.values()[row].clone())
                .collect();
            match index.get(&key) {
                Some(&g) => found[g].1.push(row),
                None => {
                    index.insert(key.clone(), found.len());
                    found.push((key, vec![row]));
                }
            }
        }
        found.sort_by(|a, b| compare_keys(&a.0, &b.0));
        let groups = found.into_iter().map(|(_, rows)| rows).collect();
        Ok(Self {
            table,
            keys,
            groups,
        })
    }

    /// The grouping key column names.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Row indices of each group, in group order.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// The underlying table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Drops the grouping.
    pub fn ungroup(self) -> Table {
        self.table
    }

    /// One row per group: the key columns followed by one column per
    /// aggregation.
    ///
    /// Every aggregation must reduce its group to a single value; anything
    /// else fails with [`TableError::NonScalarSummary`].
    pub fn summarize<N: Into<String>>(
        &self,
        aggregations: impl IntoIterator<Item = (N, Expr)>,
    ) -> Result<Table, TableError> {
        summarize_groups(
            &self.table,
            &self.keys,
            &self.groups,
            &owned_assignments(aggregations),
        )
    }

    /// Row count per group, in a column named `n` (or `nn`, ... when a key
    /// already uses that name).
    pub fn tally(&self) -> Result<Table, TableError> {
        let mut name = String::from("n");
        while self.keys.contains(&name) {
            name.push('n');
        }
        self.summarize([(name, Expr::Count)])
    }

    /// Computes columns per group, keeping the grouping.
    pub fn mutate<N: Into<String>>(
        &self,
        assignments: impl IntoIterator<Item = (N, Expr)>,
    ) -> Result<Self, TableError> {
        let table = mutate_groups(&self.table, &self.groups, &owned_assignments(assignments))?;
        Self::new(table, self.keys.clone())
    }

    /// Computes columns per group, keeping only the keys and the assigned
    /// columns.
    pub fn transmute<N: Into<String>>(
        &self,
        assignments: impl IntoIterator<Item = (N, Expr)>,
    ) -> Result<Self, TableError> {
        let table = transmute_groups(
            &self.table,
            &self.groups,
            &self.keys,
            &owned_assignments(assignments),
        )?;
        Self::new(table, self.keys.clone())
    }

    /// Keeps the rows for which every predicate holds within its group.
    pub fn filter(&self, predicates: impl IntoIterator<Item = Expr>) -> Result<Self, TableError> {
        let predicates: Vec<Expr> = predicates.into_iter().collect();
        let table = filter_groups(&self.table, &self.groups, &predicates)?;
        Self::new(table, self.keys.clone())
    }
}

pub(crate) fn summarize_groups(
    table: &Table,
    keys: &[String],
    groups: &[Vec<usize>],
    aggregations: &[(String, Expr)],
) -> Result<Table, TableError> {
    let firsts: Vec<usize> = groups
        .iter()
        .map(|rows| rows.first().copied())
        .collect::<Option<Vec<usize>>>()
        .unwrap_or_default();
    let mut columns = Vec::with_capacity(keys.len() + aggregations.len());
    for key in keys {
        columns.push(table.column(key)?.take(&firsts));
    }

    for (name, expr) in aggregations {
        let mut dtype = DataType::Null;
        let mut values = Vec::with_capacity(groups.len());
        if groups.is_empty() {
            dtype = expr.evaluate(&Frame::new(table, &[]))?.dtype();
        }
        for rows in groups {
            let evaluated = expr.evaluate(&Frame::new(table, rows))?;
            match evaluated.column_len() {
                None | Some(1) => {}
                Some(len) => {
                    return Err(TableError::NonScalarSummary {
                        name: name.clone(),
                        len,
                    });
                }
            }
            dtype = dtype
                .supertype(evaluated.dtype())
                .ok_or(TableError::TypeMismatch {
                    op: "summarize",
                    found: evaluated.dtype(),
                })?;
            values.push(evaluated.value_at(0).clone());
        }
        columns.push(Column::typed(name.as_str(), dtype, values)?);
    }
    Table::new(columns)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use wrangle_core::table;

    use super::*;
    use crate::{col, lit, n};

    fn values(t: &Table, name: &str) -> Vec<Value> {
        t.column(name).unwrap().values().to_vec()
    }

    #[test]
    fn count_per_group() {
        let t = table! { "g" => [1, 1, 2], "x" => [3, 4, 1] }.unwrap();
        let g = GroupedTable::new(t, vec!["g".into()]).unwrap();
        let out = g.summarize([("n", n())]).unwrap();
        assert_eq!(out.column_names(), vec!["g", "n"]);
        assert_eq!(values(&out, "g"), [Value::Int(1), Value::Int(2)]);
        assert_eq!(values(&out, "n"), [Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn groups_sort_with_missing_last() {
        let t = table! { "g" => [None, Some("b"), Some("a"), None] }.unwrap();
        let g = GroupedTable::new(t, vec!["g".into()]).unwrap();
        assert_eq!(g.groups(), [vec![2], vec![1], vec![0, 3]]);
    }

    #[test]
    fn zero_keys_is_one_group() {
        let t = table! { "x" => [1.0, 2.0, 3.0] }.unwrap();
        let g = GroupedTable::new(t, vec![]).unwrap();
        assert_eq!(g.group_count(), 1);
        let out = g.summarize([("avg", col("x").mean())]).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(values(&out, "avg"), [Value::Float(2.0)]);
    }

    #[test]
    fn non_scalar_summary_fails() {
        let t = table! { "g" => [1, 1], "x" => [1, 2] }.unwrap();
        let g = GroupedTable::new(t, vec!["g".into()]).unwrap();
        assert_eq!(
            g.summarize([("x", col("x") + lit(1))]).unwrap_err(),
            TableError::NonScalarSummary {
                name: "x".into(),
                len: 2
            }
        );
    }

    #[test]
    fn tally_avoids_key_name() {
        let t = table! { "n" => ["a", "a", "b"] }.unwrap();
        let g = GroupedTable::new(t, vec!["n".into()]).unwrap();
        let out = g.tally().unwrap();
        assert_eq!(out.column_names(), vec!["n", "nn"]);
        assert_eq!(values(&out, "nn"), [Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn grouped_filter_uses_group_aggregates() {
        let t = table! {
            "g" => ["a", "a", "b", "b"],
            "x" => [1, 5, 10, 20],
        }
        .unwrap();
        let g = GroupedTable::new(t, vec!["g".into()]).unwrap();
        let kept = g.filter([col("x").gt(col("x").mean())]).unwrap();
        assert_eq!(kept.group_count(), 2);
        assert_eq!(
            values(kept.table(), "x"),
            [Value::Int(5), Value::Int(20)]
        );
    }

    #[test]
    fn grouped_transmute_keeps_keys() {
        let t = table! { "g" => [1, 1, 2], "x" => [3, 4, 1] }.unwrap();
        let g = GroupedTable::new(t, vec!["g".into()]).unwrap();
        let out = g
            .transmute([("r", col("x").min_rank())])
            .unwrap()
            .ungroup();
        assert_eq!(out.column_names(), vec!["g", "r"]);
        assert_eq!(values(&out, "r"), [Value::Int(1), Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn grouped_lag_and_lead_stop_at_group_edges() {
        let t = table! { "g" => [1, 2, 1, 2], "x" => [10, 20, 11, 21] }.unwrap();
        let g = GroupedTable::new(t, vec!["g".into()]).unwrap();
        let out = g
            .mutate([("prev", col("x").lag(1)), ("next", col("x").lead(1))])
            .unwrap()
            .ungroup();
        assert_eq!(
            values(&out, "prev"),
            [Value::Missing, Value::Missing, Value::Int(10), Value::Int(20)]
        );
        assert_eq!(
            values(&out, "next"),
            [Value::Int(11), Value::Int(21), Value::Missing, Value::Missing]
        );
    }

    #[test]
    fn regrouping_sums_counts() {
        let t = table! {
            "year" => [2013, 2013, 2013, 2014],
            "month" => [1, 1, 2, 1],
        }
        .unwrap();
        let fine = GroupedTable::new(t.clone(), vec!["year".into(), "month".into()])
            .unwrap()
            .tally()
            .unwrap();
        let coarse = GroupedTable::new(fine, vec!["year".into()])
            .unwrap()
            .summarize([("n", col("n").sum())])
            .unwrap();
        let direct = GroupedTable::new(t, vec!["year".into()])
            .unwrap()
            .tally()
            .unwrap();
        assert_eq!(coarse, direct);
    }
}
