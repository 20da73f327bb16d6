// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reshaping between wide and long layouts.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;
use wrangle_core::{Column, DataType, Table, TableError, Value};

use crate::select::{Selector, resolve};
use crate::verbs::AsTable;

/// Options for [`PivotOps::pivot_longer`].
#[derive(Debug, Clone)]
pub struct PivotLongerSpec {
    /// Columns to stack.
    pub columns: Vec<Selector>,
    /// Name of the output column holding the stacked column names.
    pub names_to: String,
    /// Name of the output column holding the stacked values.
    pub values_to: String,
    /// Prefix stripped from stacked column names.
    pub names_prefix: Option<String>,
    /// Drops output rows whose value is missing.
    pub drop_missing: bool,
}

impl PivotLongerSpec {
    /// Stacks the selected columns into `name` / `value`.
    pub fn new<S: Into<Selector>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            names_to: "name".into(),
            values_to: "value".into(),
            names_prefix: None,
            drop_missing: false,
        }
    }

    /// Sets the names column.
    pub fn with_names_to(mut self, names_to: &str) -> Self {
        self.names_to = names_to.into();
        self
    }

    /// Sets the values column.
    pub fn with_values_to(mut self, values_to: &str) -> Self {
        self.values_to = values_to.into();
        self
    }

    /// Strips `prefix` from stacked column names.
    pub fn with_names_prefix(mut self, prefix: &str) -> Self {
        self.names_prefix = Some(prefix.into());
        self
    }

    /// Drops rows with a missing value.
    pub fn with_drop_missing(mut self, drop_missing: bool) -> Self {
        self.drop_missing = drop_missing;
        self
    }
}

/// Options for [`PivotOps::pivot_wider`].
#[derive(Debug, Clone, PartialEq)]
pub struct PivotWiderSpec {
    /// Columns identifying an output row. `None` means every column except
    /// `names_from` and `values_from`.
    pub id_columns: Option<Vec<String>>,
    /// Column whose values become output column names.
    pub names_from: String,
    /// Column whose values fill the new columns.
    pub values_from: String,
    /// Value for cells with no input row.
    pub values_fill: Value,
    /// Prefix prepended to new column names.
    pub names_prefix: Option<String>,
}

impl PivotWiderSpec {
    /// Spreads `values_from` across one column per distinct `names_from`.
    pub fn new(names_from: &str, values_from: &str) -> Self {
        Self {
            id_columns: None,
            names_from: names_from.into(),
            values_from: values_from.into(),
            values_fill: Value::Missing,
            names_prefix: None,
        }
    }

    /// Sets the id columns explicitly.
    pub fn with_id_columns<N: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = N>,
    ) -> Self {
        self.id_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the fill value for absent cells.
    pub fn with_values_fill(mut self, fill: impl Into<Value>) -> Self {
        self.values_fill = fill.into();
        self
    }

    /// Prepends `prefix` to new column names.
    pub fn with_names_prefix(mut self, prefix: &str) -> Self {
        self.names_prefix = Some(prefix.into());
        self
    }
}

pub(crate) fn pivot_longer(table: &Table, spec: &PivotLongerSpec) -> Result<Table, TableError> {
    let stacked = resolve(table, &spec.columns)?;
    if stacked.is_empty() {
        return Err(TableError::InvalidArgument(
            "pivot_longer: no columns selected".into(),
        ));
    }
    let ids: Vec<&Column> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| !stacked.contains(i))
        .map(|(_, c)| c)
        .collect();
    for name in [&spec.names_to, &spec.values_to] {
        if ids.iter().any(|c| c.name() == name.as_str()) {
            return Err(TableError::DuplicateColumn(name.clone()));
        }
    }

    let stacked: Vec<&Column> = stacked.iter().map(|&i| &table.columns()[i]).collect();
    let mut dtype = DataType::Null;
    for column in &stacked {
        dtype = dtype
            .exact_supertype(column.dtype())
            .ok_or(TableError::TypeMismatch {
                op: "pivot_longer",
                found: column.dtype(),
            })?;
    }
    let labels: Vec<Value> = stacked
        .iter()
        .map(|c| {
            let name = c.name();
            let stripped = spec
                .names_prefix
                .as_deref()
                .and_then(|p| name.strip_prefix(p))
                .unwrap_or(name);
            Value::from(stripped)
        })
        .collect();

    let mut source_rows = Vec::new();
    let mut names = Vec::new();
    let mut values = Vec::new();
    for row in 0..table.row_count() {
        for (column, label) in stacked.iter().zip(&labels) {
            let value = &column.values()[row];
            if spec.drop_missing && value.is_missing() {
                continue;
            }
            source_rows.push(row);
            names.push(label.clone());
            values.push(value.clone());
        }
    }

    let mut columns: Vec<Column> = ids.iter().map(|c| c.take(&source_rows)).collect();
    columns.push(Column::typed(spec.names_to.as_str(), DataType::Str, names)?);
    columns.push(Column::typed(spec.values_to.as_str(), dtype, values)?);
    Table::new(columns)
}

pub(crate) fn pivot_wider(table: &Table, spec: &PivotWiderSpec) -> Result<Table, TableError> {
    let names_col = table.column(&spec.names_from)?;
    let values_col = table.column(&spec.values_from)?;
    let id_names: Vec<String> = match &spec.id_columns {
        Some(ids) => ids.clone(),
        None => table
            .column_names()
            .into_iter()
            .filter(|n| *n != spec.names_from && *n != spec.values_from)
            .map(String::from)
            .collect(),
    };
    let mut ids = Vec::with_capacity(id_names.len());
    for name in &id_names {
        ids.push(table.column(name)?);
    }
    let dtype = values_col
        .dtype()
        .exact_supertype(spec.values_fill.dtype())
        .ok_or(TableError::TypeMismatch {
            op: "pivot_wider",
            found: spec.values_fill.dtype(),
        })?;

    let mut name_index: HashMap<&Value, usize> = HashMap::new();
    let mut labels: Vec<String> = Vec::new();
    let mut row_index: HashMap<SmallVec<[Value; 4]>, usize> = HashMap::new();
    let mut first_rows: Vec<usize> = Vec::new();
    // (output row, output column) of every input row.
    let mut cells: Vec<(usize, usize)> = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let name = &names_col.values()[row];
        let col = *name_index.entry(name).or_insert_with(|| {
            let prefix = spec.names_prefix.as_deref().unwrap_or("");
            labels.push(format!("{prefix}{}", name.to_label()));
            labels.len() - 1
        });
        let key: SmallVec<[Value; 4]> = ids.iter().map(|c| c.values()[row].clone()).collect();
        let out_row = *row_index.entry(key).or_insert_with(|| {
            first_rows.push(row);
            first_rows.len() - 1
        });
        cells.push((out_row, col));
    }

    let mut grid: Vec<Vec<Option<Value>>> = vec![vec![None; first_rows.len()]; labels.len()];
    for (row, &(out_row, col)) in cells.iter().enumerate() {
        let cell = &mut grid[col][out_row];
        if cell.is_some() {
            return Err(TableError::DuplicatePivotCell {
                column: labels[col].clone(),
            });
        }
        *cell = Some(values_col.values()[row].clone());
    }

    let mut columns: Vec<Column> = ids.iter().map(|c| c.take(&first_rows)).collect();
    for (label, cells) in labels.into_iter().zip(grid) {
        let values = cells
            .into_iter()
            .map(|v| v.unwrap_or_else(|| spec.values_fill.clone()))
            .collect();
        columns.push(Column::typed(label, dtype, values)?);
    }
    if columns.is_empty() {
        return Ok(Table::default());
    }
    Table::new(columns)
}

/// Reshaping verbs.
///
/// Implemented for everything that is [`AsTable`].
pub trait PivotOps: AsTable {
    /// Stacks columns into name/value pairs: one output row per input row
    /// and stacked column.
    ///
    /// ```
    /// use wrangle_core::{table, Value};
    /// use wrangle_transforms::{PivotLongerSpec, PivotOps};
    ///
    /// let wide = table! {
    ///     "country" => ["A", "B"],
    ///     "1999" => [10, 20],
    ///     "2000" => [11, 21],
    /// }
    /// .unwrap();
    /// let long = wide
    ///     .pivot_longer(&PivotLongerSpec::new(["1999", "2000"]).with_names_to("year"))
    ///     .unwrap();
    /// assert_eq!(long.row_count(), 4);
    /// assert_eq!(long.get(1, "year").unwrap(), &Value::from("2000"));
    /// ```
    fn pivot_longer(&self, spec: &PivotLongerSpec) -> Result<Table, TableError> {
        pivot_longer(self.as_table(), spec)
    }

    /// Spreads name/value pairs into columns.
    fn pivot_wider(&self, spec: &PivotWiderSpec) -> Result<Table, TableError> {
        pivot_wider(self.as_table(), spec)
    }
}

impl<T: AsTable> PivotOps for T {}

#[cfg(test)]
mod tests {
    extern crate std;

    use wrangle_core::table;

    use super::*;

    fn wide() -> Table {
        table! {
            "country" => ["A", "B"],
            "y1999" => [Some(10), None],
            "y2000" => [Some(11), Some(21)],
        }
        .unwrap()
    }

    #[test]
    fn longer_is_row_major_and_strips_prefix() {
        let spec = PivotLongerSpec::new([Selector::starts_with("y")])
            .with_names_to("year")
            .with_values_to("cases")
            .with_names_prefix("y");
        let long = wide().pivot_longer(&spec).unwrap();
        assert_eq!(long.column_names(), vec!["country", "year", "cases"]);
        assert_eq!(
            long.column("year").unwrap().values(),
            [
                Value::from("1999"),
                Value::from("2000"),
                Value::from("1999"),
                Value::from("2000")
            ]
        );
        assert_eq!(long.get(2, "cases").unwrap(), &Value::Missing);

        let dropped = wide()
            .pivot_longer(&spec.clone().with_drop_missing(true))
            .unwrap();
        assert_eq!(dropped.row_count(), 3);
    }

    #[test]
    fn longer_rejects_bad_input() {
        assert!(matches!(
            wide().pivot_longer(&PivotLongerSpec::new(Vec::<Selector>::new())),
            Err(TableError::InvalidArgument(_))
        ));
        assert_eq!(
            wide()
                .pivot_longer(&PivotLongerSpec::new(["y1999"]).with_names_to("country"))
                .unwrap_err(),
            TableError::DuplicateColumn("country".into())
        );
        assert!(matches!(
            wide().pivot_longer(&PivotLongerSpec::new(["country", "y1999"])),
            Err(TableError::TypeMismatch {
                op: "pivot_longer",
                ..
            })
        ));
    }

    #[test]
    fn wider_undoes_longer() {
        let long = wide()
            .pivot_longer(&PivotLongerSpec::new(["y1999", "y2000"]))
            .unwrap();
        let back = long
            .pivot_wider(&PivotWiderSpec::new("name", "value"))
            .unwrap();
        assert_eq!(back, wide());
    }

    #[test]
    fn wider_fills_absent_cells() {
        let long = table! {
            "id" => [1, 1, 2],
            "key" => ["a", "b", "a"],
            "val" => [1.0, 2.0, 3.0],
        }
        .unwrap();
        let out = long
            .pivot_wider(
                &PivotWiderSpec::new("key", "val")
                    .with_values_fill(0.0)
                    .with_names_prefix("k_"),
            )
            .unwrap();
        assert_eq!(out.column_names(), vec!["id", "k_a", "k_b"]);
        assert_eq!(out.get(1, "k_b").unwrap(), &Value::Float(0.0));
        assert!(matches!(
            long.pivot_wider(&PivotWiderSpec::new("key", "val").with_values_fill("x")),
            Err(TableError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn wider_rejects_duplicate_cells() {
        let long = table! {
            "id" => [1, 1],
            "key" => ["a", "a"],
            "val" => [1, 2],
        }
        .unwrap();
        assert_eq!(
            long.pivot_wider(&PivotWiderSpec::new("key", "val"))
                .unwrap_err(),
            TableError::DuplicatePivotCell {
                column: "a".into()
            }
        );
    }
}
