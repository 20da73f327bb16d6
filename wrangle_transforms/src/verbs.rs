// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-table verbs as an extension trait.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use wrangle_core::{Row, Table, TableError, Value};

use crate::arrange::{self, SortKey};
use crate::expr::Expr;
use crate::group::{GroupedTable, summarize_groups};
use crate::mutate::{
    filter_groups, filter_rows, mutate_groups, owned_assignments, transmute_groups, whole_table,
};
use crate::select::{self, Selector};

/// Borrows a [`Table`]; the hook for the verb extension traits.
pub trait AsTable {
    /// The table the verbs operate on.
    fn as_table(&self) -> &Table;
}

impl AsTable for Table {
    fn as_table(&self) -> &Table {
        self
    }
}

/// The single-table verbs.
///
/// Every verb leaves its input untouched and returns a new table.
///
/// ```
/// use wrangle_core::{table, Value};
/// use wrangle_transforms::{TableVerbs, col, desc, lit};
///
/// let flights = table! {
///     "carrier" => ["UA", "AA", "UA"],
///     "dep_delay" => [12.0, -3.0, 40.0],
/// }
/// .unwrap();
/// let late = flights
///     .filter([col("dep_delay").gt(lit(0))])
///     .and_then(|t| t.arrange([desc("dep_delay")]))
///     .unwrap();
/// assert_eq!(late.get(0, "dep_delay").unwrap(), &Value::Float(40.0));
/// ```
pub trait TableVerbs: AsTable {
    /// Keeps the selected columns, in selector order.
    fn select<S: Into<Selector>>(
        &self,
        selectors: impl IntoIterator<Item = S>,
    ) -> Result<Table, TableError> {
        let selectors: Vec<Selector> = selectors.into_iter().map(Into::into).collect();
        select::select(self.as_table(), &selectors)
    }

    /// Renames columns given as `(new, old)` pairs, keeping their position.
    fn rename<'a>(
        &self,
        renames: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Table, TableError> {
        let renames: Vec<(&str, &str)> = renames.into_iter().collect();
        select::rename(self.as_table(), &renames)
    }

    /// The values of one column.
    fn pull(&self, name: &str) -> Result<&[Value], TableError> {
        Ok(self.as_table().column(name)?.values())
    }

    /// Keeps the rows for which every predicate is true. Missing counts as
    /// false.
    fn filter(&self, predicates: impl IntoIterator<Item = Expr>) -> Result<Table, TableError> {
        let table = self.as_table();
        let predicates: Vec<Expr> = predicates.into_iter().collect();
        filter_groups(table, &whole_table(table), &predicates)
    }

    /// Keeps the rows for which `predicate` returns `Some(true)`.
    fn filter_rows<F>(&self, predicate: F) -> Result<Table, TableError>
    where
        F: FnMut(Row<'_>) -> Result<Option<bool>, TableError>,
    {
        filter_rows(self.as_table(), predicate)
    }

    /// Adds or replaces columns. Assignments run left to right and see the
    /// results of earlier ones.
    fn mutate<N: Into<String>>(
        &self,
        assignments: impl IntoIterator<Item = (N, Expr)>,
    ) -> Result<Table, TableError> {
        let table = self.as_table();
        mutate_groups(table, &whole_table(table), &owned_assignments(assignments))
    }

    /// Like [`TableVerbs::mutate`], keeping only the assigned columns.
    fn transmute<N: Into<String>>(
        &self,
        assignments: impl IntoIterator<Item = (N, Expr)>,
    ) -> Result<Table, TableError> {
        let table = self.as_table();
        transmute_groups(
            table,
            &whole_table(table),
            &[],
            &owned_assignments(assignments),
        )
    }

    /// Sorts rows by the keys, most significant first. Stable; missing
    /// values sort last in either direction.
    fn arrange<K: Into<SortKey>>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        let keys: Vec<SortKey> = keys.into_iter().map(Into::into).collect();
        arrange::arrange(self.as_table(), &keys)
    }

    /// First row of each distinct combination of `columns`, keeping only
    /// those columns. No columns means all of them.
    fn distinct<N: Into<String>>(
        &self,
        columns: impl IntoIterator<Item = N>,
    ) -> Result<Table, TableError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        arrange::distinct(self.as_table(), &columns)
    }

    /// The first `n` rows.
    fn slice_head(&self, n: usize) -> Table {
        arrange::slice_head(self.as_table(), n)
    }

    /// Groups rows by the key columns.
    fn group_by<N: Into<String>>(
        &self,
        keys: impl IntoIterator<Item = N>,
    ) -> Result<GroupedTable, TableError> {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        GroupedTable::new(self.as_table().clone(), keys)
    }

    /// Collapses the whole table to one row.
    fn summarize<N: Into<String>>(
        &self,
        aggregations: impl IntoIterator<Item = (N, Expr)>,
    ) -> Result<Table, TableError> {
        let table = self.as_table();
        summarize_groups(
            table,
            &[],
            &whole_table(table),
            &owned_assignments(aggregations),
        )
    }

    /// Row counts per distinct combination of `columns`.
    fn count<N: Into<String>>(
        &self,
        columns: impl IntoIterator<Item = N>,
    ) -> Result<Table, TableError> {
        self.group_by(columns)?.tally()
    }
}

impl<T: AsTable> TableVerbs for T {}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::{DataType, table};

    use super::*;
    use crate::{asc, col, desc, lit, n};

    fn flights() -> Table {
        table! {
            "year" => [2013, 2013, 2013, 2013],
            "month" => [1, 1, 2, 2],
            "carrier" => ["UA", "AA", "UA", "UA"],
            "dep_delay" => [Some(2.0), Some(-4.0), None, Some(30.0)],
            "distance" => [1400, 1416, 1089, 1576],
            "air_time" => [227.0, 227.0, 160.0, 183.0],
        }
        .unwrap()
    }

    #[test]
    fn chained_verbs() {
        let out = flights()
            .filter([col("month").eq(lit(2))])
            .and_then(|t| {
                t.mutate([
                    ("gain", col("dep_delay") - lit(10)),
                    ("speed", col("distance") / col("air_time") * lit(60)),
                ])
            })
            .and_then(|t| t.select(["carrier", "gain", "speed"]))
            .unwrap();
        assert_eq!(out.column_names(), vec!["carrier", "gain", "speed"]);
        assert_eq!(
            out.pull("gain").unwrap(),
            [Value::Missing, Value::Float(20.0)]
        );
        assert_eq!(out.column("speed").unwrap().dtype(), DataType::Float);
    }

    #[test]
    fn input_is_not_modified() {
        let t = flights();
        let _ = t.mutate([("year", lit(0))]).unwrap();
        assert_eq!(t, flights());
    }

    #[test]
    fn whole_table_summary() {
        let out = flights()
            .summarize([
                ("delay", col("dep_delay").mean().skip_missing()),
                ("flights", n()),
            ])
            .unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.pull("flights").unwrap(), [Value::Int(4)]);
        assert_eq!(
            out.pull("delay").unwrap(),
            [Value::Float(28.0 / 3.0)]
        );
    }

    #[test]
    fn count_and_group_summaries() {
        let counts = flights().count(["carrier"]).unwrap();
        assert_eq!(counts.column_names(), vec!["carrier", "n"]);
        assert_eq!(counts.pull("n").unwrap(), [Value::Int(1), Value::Int(3)]);

        let by_month = flights()
            .group_by(["year", "month"])
            .and_then(|g| g.summarize([("max_delay", col("dep_delay").max().skip_missing())]))
            .unwrap();
        assert_eq!(
            by_month.pull("max_delay").unwrap(),
            [Value::Float(2.0), Value::Float(30.0)]
        );
    }

    #[test]
    fn rename_arrange_distinct_head() {
        let t = flights()
            .rename([("delay", "dep_delay")])
            .and_then(|t| t.arrange([asc("carrier"), desc("delay")]))
            .unwrap();
        assert_eq!(t.pull("delay").unwrap()[0], Value::Float(-4.0));
        assert_eq!(t.pull("delay").unwrap()[3], Value::Missing);
        assert_eq!(t.distinct(["carrier"]).unwrap().row_count(), 2);
        assert_eq!(t.distinct(Vec::<String>::new()).unwrap().row_count(), 4);
        assert_eq!(t.slice_head(1).row_count(), 1);
    }

    #[test]
    fn transmute_and_filter_rows() {
        let t = flights()
            .transmute([("hours", col("air_time") / lit(60))])
            .unwrap();
        assert_eq!(t.column_names(), vec!["hours"]);
        let long = flights()
            .filter_rows(|row| Ok(row.get("distance")?.as_i64().map(|d| d > 1400)))
            .unwrap();
        assert_eq!(long.row_count(), 2);
    }
}
