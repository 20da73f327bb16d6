// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column selection.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops;

use wrangle_core::{DataType, Table, TableError};

/// Chooses columns by name, position range, name pattern or type.
///
/// Negate a selector with `!` to drop the columns it matches.
#[derive(Debug, Clone)]
pub enum Selector {
    /// A single column.
    Name(String),
    /// All columns from one name to another (inclusive, in table order).
    Range(String, String),
    /// Columns whose name starts with the prefix.
    StartsWith(String),
    /// Columns whose name ends with the suffix.
    EndsWith(String),
    /// Columns whose name contains the substring.
    Contains(String),
    /// Columns whose name matches the regular expression.
    #[cfg(feature = "regex")]
    Matches(regex::Regex),
    /// Columns of the given type.
    OfType(DataType),
    /// Every column.
    Everything,
    /// Removes the columns matched by the inner selector.
    Not(Box<Self>),
}

impl Selector {
    /// All columns from `from` to `to`, inclusive.
    pub fn range(from: &str, to: &str) -> Self {
        Self::Range(from.into(), to.into())
    }

    /// Columns whose name starts with `prefix`.
    pub fn starts_with(prefix: &str) -> Self {
        Self::StartsWith(prefix.into())
    }

    /// Columns whose name ends with `suffix`.
    pub fn ends_with(suffix: &str) -> Self {
        Self::EndsWith(suffix.into())
    }

    /// Columns whose name contains `needle`.
    pub fn contains(needle: &str) -> Self {
        Self::Contains(needle.into())
    }

    /// Columns whose name matches `pattern`.
    #[cfg(feature = "regex")]
    pub fn matches(pattern: &str) -> Result<Self, TableError> {
        regex::Regex::new(pattern)
            .map(Self::Matches)
            .map_err(|e| TableError::InvalidArgument(alloc::format!("{e}")))
    }

    /// Columns of type `dtype`.
    pub fn of_type(dtype: DataType) -> Self {
        Self::OfType(dtype)
    }

    /// Every column.
    pub fn everything() -> Self {
        Self::Everything
    }

    fn is_negated(&self) -> bool {
        matches!(self, Self::Not(_))
    }

    /// Column positions matched by this selector, in table order (or range
    /// order).
    fn matches_in(&self, table: &Table) -> Result<Vec<usize>, TableError> {
        let names = table.column_names();
        let by_name = |f: &dyn Fn(&str) -> bool| -> Vec<usize> {
            names
                .iter()
                .enumerate()
                .filter(|(_, n)| f(n))
                .map(|(i, _)| i)
                .collect()
        };
        let index_of = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| TableError::UnknownColumn(name.into()))
        };
        Ok(match self {
            Self::Name(name) => alloc::vec![index_of(name)?],
            Self::Range(from, to) => {
                let (a, b) = (index_of(from)?, index_of(to)?);
                if a <= b {
                    (a..=b).collect()
                } else {
                    (b..=a).rev().collect()
                }
            }
            Self::StartsWith(p) => by_name(&|n| n.starts_with(p.as_str())),
            Self::EndsWith(s) => by_name(&|n| n.ends_with(s.as_str())),
            Self::Contains(s) => by_name(&|n| n.contains(s.as_str())),
            #[cfg(feature = "regex")]
            Self::Matches(re) => by_name(&|n| re.is_match(n)),
            Self::OfType(dtype) => (0..names.len())
                .filter(|&i| table.columns()[i].dtype() == *dtype)
                .collect(),
            Self::Everything => (0..names.len()).collect(),
            Self::Not(inner) => inner.matches_in(table)?,
        })
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl ops::Not for Selector {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

/// Resolves selectors to column positions.
///
/// Positive selectors append their matches (each column at most once);
/// negative selectors remove theirs. A leading negative selector starts from
/// every column.
pub(crate) fn resolve(table: &Table, selectors: &[Selector]) -> Result<Vec<usize>, TableError> {
    let mut picked: Vec<usize> = match selectors.first() {
        Some(s) if s.is_negated() => (0..table.column_count()).collect(),
        _ => Vec::new(),
    };
    for selector in selectors {
        let matched = selector.matches_in(table)?;
        if selector.is_negated() {
            picked.retain(|i| !matched.contains(i));
        } else {
            for i in matched {
                if !picked.contains(&i) {
                    picked.push(i);
                }
            }
        }
    }
    Ok(picked)
}

/// Resolves selectors to column names.
pub(crate) fn resolve_names(
    table: &Table,
    selectors: &[Selector],
) -> Result<Vec<String>, TableError> {
    let names = table.column_names();
    Ok(resolve(table, selectors)?
        .into_iter()
        .map(|i| String::from(names[i]))
        .collect())
}

pub(crate) fn select(table: &Table, selectors: &[Selector]) -> Result<Table, TableError> {
    table.project(&resolve_names(table, selectors)?)
}

pub(crate) fn rename(table: &Table, renames: &[(&str, &str)]) -> Result<Table, TableError> {
    let mut columns = table.columns().to_vec();
    for &(new, old) in renames {
        let i = table
            .column_index(old)
            .ok_or_else(|| TableError::UnknownColumn(old.into()))?;
        columns[i] = columns[i].clone().renamed(new);
    }
    if columns.is_empty() {
        return Ok(table.clone());
    }
    Table::new(columns)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::table;

    use super::*;

    fn flights() -> Table {
        table! {
            "year" => [2013, 2013],
            "month" => [1, 2],
            "day" => [1, 5],
            "dep_delay" => [Some(2.0), None],
            "arr_delay" => [11.0, -3.0],
            "carrier" => ["UA", "AA"],
        }
        .unwrap()
    }

    fn names(t: &Table) -> Vec<&str> {
        t.column_names()
    }

    #[test]
    fn selects_in_request_order() {
        let t = select(&flights(), &["carrier".into(), "year".into()]).unwrap();
        assert_eq!(names(&t), vec!["carrier", "year"]);
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn ranges_patterns_and_negation() {
        let f = flights();
        let t = select(&f, &[Selector::range("year", "day")]).unwrap();
        assert_eq!(names(&t), vec!["year", "month", "day"]);

        let t = select(&f, &[!Selector::range("year", "day")]).unwrap();
        assert_eq!(names(&t), vec!["dep_delay", "arr_delay", "carrier"]);

        let t = select(&f, &[Selector::ends_with("delay")]).unwrap();
        assert_eq!(names(&t), vec!["dep_delay", "arr_delay"]);

        let t = select(&f, &["carrier".into(), Selector::everything()]).unwrap();
        assert_eq!(names(&t)[0], "carrier");
        assert_eq!(t.column_count(), 6);

        let t = select(&f, &[Selector::of_type(DataType::Float)]).unwrap();
        assert_eq!(names(&t), vec!["dep_delay", "arr_delay"]);
    }

    #[test]
    fn unknown_columns_fail() {
        assert_eq!(
            select(&flights(), &["nope".into()]).unwrap_err(),
            TableError::UnknownColumn("nope".into())
        );
    }

    #[cfg(feature = "regex")]
    #[test]
    fn regex_selector() {
        let t = select(&flights(), &[Selector::matches("^(dep|arr)_").unwrap()]).unwrap();
        assert_eq!(names(&t), vec!["dep_delay", "arr_delay"]);
    }

    #[test]
    fn rename_keeps_position_and_rejects_collisions() {
        let t = rename(&flights(), &[("yr", "year")]).unwrap();
        assert_eq!(names(&t)[0], "yr");
        assert_eq!(
            rename(&flights(), &[("month", "year")]).unwrap_err(),
            TableError::DuplicateColumn("month".into())
        );
    }
}
