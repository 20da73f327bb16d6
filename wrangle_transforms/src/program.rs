// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full-recompute executor for transform programs.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use wrangle_core::{Table, TableError, TableId};

use crate::group::GroupedTable;
use crate::join::join;
use crate::mutate::{filter_groups, mutate_groups};
use crate::transform::Transform;
use crate::{arrange, bind, group, pivot, select};

/// Errors returned by [`Program::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A transform reads a table that is neither an input nor produced by an
    /// earlier transform.
    MissingInput(TableId),
    /// A transform failed.
    Step {
        /// Position of the transform in the program.
        index: usize,
        /// The underlying error.
        err: TableError,
    },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(id) => write!(f, "missing input table {}", id.0),
            Self::Step { index, err } => write!(f, "transform {index} failed: {err}"),
        }
    }
}

impl core::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::MissingInput(_) => None,
            Self::Step { err, .. } => Some(err),
        }
    }
}

/// Tables produced by a program run, keyed by output id.
#[derive(Debug, Clone, Default)]
pub struct ProgramOutput {
    /// Every table written by a transform. A table written twice holds the
    /// last result.
    pub tables: HashMap<TableId, Table>,
}

impl ProgramOutput {
    /// The table produced for `id`, if any.
    pub fn get(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }
}

/// An ordered list of transforms.
#[derive(Debug, Clone, Default)]
pub struct Program {
    transforms: Vec<Transform>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Appends a transform, builder style.
    pub fn with(mut self, transform: Transform) -> Self {
        self.push(transform);
        self
    }

    /// The transforms, in execution order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Tables that must be supplied to [`Program::execute`]: those read
    /// before any transform produces them. Sorted by id.
    pub fn required_inputs(&self) -> Vec<TableId> {
        let mut required: HashSet<TableId> = HashSet::new();
        let mut produced: HashSet<TableId> = HashSet::new();
        for t in &self.transforms {
            for input in t.inputs() {
                if !produced.contains(&input) {
                    required.insert(input);
                }
            }
            produced.insert(t.output());
        }
        let mut out: Vec<TableId> = required.into_iter().collect();
        out.sort();
        out
    }

    /// Runs every transform in order against `inputs`.
    ///
    /// Later transforms see the outputs of earlier ones; a produced table
    /// shadows an input with the same id.
    pub fn execute(
        &self,
        inputs: &HashMap<TableId, Table>,
    ) -> Result<ProgramOutput, ExecutionError> {
        if let Some(&id) = self
            .required_inputs()
            .iter()
            .find(|id| !inputs.contains_key(*id))
        {
            return Err(ExecutionError::MissingInput(id));
        }
        let mut out = ProgramOutput::default();
        for (index, transform) in self.transforms.iter().enumerate() {
            let table = run(transform, |id| {
                out.tables
                    .get(&id)
                    .or_else(|| inputs.get(&id))
                    .ok_or(ExecutionError::MissingInput(id))
            })
            .map_err(|e| match e {
                Failure::Missing(err) => err,
                Failure::Table(err) => ExecutionError::Step { index, err },
            })?;
            out.tables.insert(transform.output(), table);
        }
        Ok(out)
    }
}

enum Failure {
    Missing(ExecutionError),
    Table(TableError),
}

impl From<TableError> for Failure {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

fn grouped(table: &Table, keys: &[String]) -> Result<GroupedTable, TableError> {
    GroupedTable::new(table.clone(), keys.to_vec())
}

fn run<'a>(
    transform: &Transform,
    lookup: impl Fn(TableId) -> Result<&'a Table, ExecutionError>,
) -> Result<Table, Failure> {
    let get = |id| lookup(id).map_err(Failure::Missing);
    Ok(match transform {
        Transform::Select { input, columns, .. } => select::select(get(*input)?, columns)?,
        Transform::Rename { input, renames, .. } => {
            let pairs: Vec<(&str, &str)> = renames
                .iter()
                .map(|(new, old)| (new.as_str(), old.as_str()))
                .collect();
            select::rename(get(*input)?, &pairs)?
        }
        Transform::Filter {
            input,
            group_by,
            predicates,
            ..
        } => {
            let g = grouped(get(*input)?, group_by)?;
            filter_groups(g.table(), g.groups(), predicates)?
        }
        Transform::Mutate {
            input,
            group_by,
            assignments,
            ..
        } => {
            let g = grouped(get(*input)?, group_by)?;
            mutate_groups(g.table(), g.groups(), assignments)?
        }
        Transform::Arrange { input, keys, .. } => arrange::arrange(get(*input)?, keys)?,
        Transform::Distinct { input, columns, .. } => arrange::distinct(get(*input)?, columns)?,
        Transform::Summarize {
            input,
            group_by,
            aggregations,
            ..
        } => {
            let g = grouped(get(*input)?, group_by)?;
            group::summarize_groups(g.table(), g.keys(), g.groups(), aggregations)?
        }
        Transform::Join {
            left,
            right,
            kind,
            by,
            options,
            ..
        } => join(get(*left)?, get(*right)?, by, *kind, options)?,
        Transform::BindRows { inputs, .. } => {
            let mut tables = Vec::with_capacity(inputs.len());
            for id in inputs {
                tables.push(get(*id)?);
            }
            bind::bind_rows(tables)?
        }
        Transform::PivotLonger { input, spec, .. } => pivot::pivot_longer(get(*input)?, spec)?,
        Transform::PivotWider { input, spec, .. } => pivot::pivot_wider(get(*input)?, spec)?,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::{Value, table};

    use super::*;
    use crate::{JoinKind, JoinOptions, col, desc, lit, n};

    fn names(pairs: &[&str]) -> Vec<String> {
        pairs.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn pipeline_of_verbs() {
        let flights = TableId(1);
        let delayed = TableId(2);
        let by_carrier = TableId(3);
        let ranked = TableId(4);

        let program = Program::new()
            .with(Transform::Filter {
                input: flights,
                output: delayed,
                group_by: vec![],
                predicates: vec![col("delay").gt(lit(0))],
            })
            .with(Transform::Summarize {
                input: delayed,
                output: by_carrier,
                group_by: names(&["carrier"]),
                aggregations: vec![("n".into(), n()), ("avg".into(), col("delay").mean())],
            })
            .with(Transform::Arrange {
                input: by_carrier,
                output: ranked,
                keys: vec![desc("n")],
            });
        assert_eq!(program.required_inputs(), [flights]);

        let mut inputs = HashMap::new();
        inputs.insert(
            flights,
            table! {
                "carrier" => ["UA", "AA", "UA", "AA", "UA"],
                "delay" => [5.0, -1.0, 15.0, 20.0, 1.0],
            }
            .unwrap(),
        );
        let out = program.execute(&inputs).unwrap();
        assert_eq!(out.tables.len(), 3);
        let ranked = out.get(ranked).unwrap();
        assert_eq!(ranked.column_names(), vec!["carrier", "n", "avg"]);
        assert_eq!(
            ranked.column("carrier").unwrap().values(),
            [Value::from("UA"), Value::from("AA")]
        );
        assert_eq!(ranked.get(0, "avg").unwrap(), &Value::Float(7.0));
    }

    #[test]
    fn joins_and_binds_read_several_inputs() {
        let a = TableId(1);
        let b = TableId(2);
        let both = TableId(3);
        let joined = TableId(4);
        let program = Program::new()
            .with(Transform::BindRows {
                inputs: vec![a, b],
                output: both,
            })
            .with(Transform::Join {
                left: both,
                right: b,
                output: joined,
                kind: JoinKind::Semi,
                by: vec!["k".into()],
                options: JoinOptions::default(),
            });
        assert_eq!(program.required_inputs(), [a, b]);

        let mut inputs = HashMap::new();
        inputs.insert(a, table! { "k" => [1, 2] }.unwrap());
        inputs.insert(b, table! { "k" => [2, 3] }.unwrap());
        let out = program.execute(&inputs).unwrap();
        assert_eq!(out.get(both).unwrap().row_count(), 4);
        assert_eq!(out.get(joined).unwrap().row_count(), 3);
    }

    #[test]
    fn reports_missing_inputs_and_failing_steps() {
        let program = Program::new().with(Transform::Select {
            input: TableId(1),
            output: TableId(2),
            columns: vec!["nope".into()],
        });
        assert_eq!(
            program.execute(&HashMap::new()).unwrap_err(),
            ExecutionError::MissingInput(TableId(1))
        );

        let mut inputs = HashMap::new();
        inputs.insert(TableId(1), table! { "x" => [1] }.unwrap());
        assert_eq!(
            program.execute(&inputs).unwrap_err(),
            ExecutionError::Step {
                index: 0,
                err: TableError::UnknownColumn("nope".into()),
            }
        );
    }
}
