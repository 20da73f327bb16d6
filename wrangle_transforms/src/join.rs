// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relational joins.
//!
//! Matching is a hash join on the key tuple. Output columns are the left
//! columns (keys named after the left side) followed by the right non-key
//! columns; clashing non-key names get [`JoinOptions::suffix`].

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use wrangle_core::{Column, Table, TableError, Value};

use crate::verbs::AsTable;

/// The flavour of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Matching pairs only.
    Inner,
    /// Every left row; unmatched rows padded with missing.
    Left,
    /// Every right row, in right order; unmatched rows padded with missing.
    Right,
    /// Left join rows, then the right rows nothing matched.
    Full,
    /// Left rows with at least one match (left columns only).
    Semi,
    /// Left rows with no match (left columns only).
    Anti,
}

/// A pair of key columns, one from each side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    /// Key column in the left table.
    pub left: String,
    /// Key column in the right table.
    pub right: String,
}

impl From<&str> for JoinKey {
    fn from(name: &str) -> Self {
        Self {
            left: name.into(),
            right: name.into(),
        }
    }
}

impl From<(&str, &str)> for JoinKey {
    fn from((left, right): (&str, &str)) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Join behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOptions {
    /// Appended to clashing non-key names from the left and right side.
    pub suffix: (String, String),
    /// Whether missing keys match each other.
    pub missing_matches: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            suffix: (".x".into(), ".y".into()),
            missing_matches: true,
        }
    }
}

impl JoinOptions {
    /// Sets the left and right suffixes.
    pub fn with_suffix(mut self, left: &str, right: &str) -> Self {
        self.suffix = (left.into(), right.into());
        self
    }

    /// Sets whether missing keys match each other.
    pub fn with_missing_matches(mut self, missing_matches: bool) -> Self {
        self.missing_matches = missing_matches;
        self
    }
}

type KeyTuple = SmallVec<[Value; 4]>;

/// Resolved key columns of one side.
struct KeySide<'a> {
    columns: Vec<&'a Column>,
}

impl KeySide<'_> {
    fn key(&self, row: usize, missing_matches: bool) -> Option<KeyTuple> {
        let key: KeyTuple = self
            .columns
            .iter()
            .map(|c| c.values()[row].clone())
            .collect();
        if !missing_matches && key.iter().any(Value::is_missing) {
            return None;
        }
        Some(key)
    }

    fn index(&self, rows: usize, missing_matches: bool) -> HashMap<KeyTuple, Vec<usize>> {
        let mut index: HashMap<KeyTuple, Vec<usize>> = HashMap::new();
        for row in 0..rows {
            if let Some(key) = self.key(row, missing_matches) {
                index.entry(key).or_default().push(row);
            }
        }
        index
    }
}

fn natural_keys(left: &Table, right: &Table) -> Result<Vec<JoinKey>, TableError> {
    let keys: Vec<JoinKey> = left
        .column_names()
        .into_iter()
        .filter(|name| right.contains(name))
        .map(JoinKey::from)
        .collect();
    if keys.is_empty() {
        return Err(TableError::InvalidArgument(
            "natural join: no common columns".into(),
        ));
    }
    Ok(keys)
}

fn matched_rows<'a>(
    probe: &KeySide<'_>,
    probe_rows: usize,
    index: &'a HashMap<KeyTuple, Vec<usize>>,
    missing_matches: bool,
) -> Vec<&'a [usize]> {
    (0..probe_rows)
        .map(|row| {
            probe
                .key(row, missing_matches)
                .and_then(|k| index.get(&k))
                .map_or(&[][..], Vec::as_slice)
        })
        .collect()
}

pub(crate) fn join(
    left: &Table,
    right: &Table,
    by: &[JoinKey],
    kind: JoinKind,
    options: &JoinOptions,
) -> Result<Table, TableError> {
    let by = if by.is_empty() {
        natural_keys(left, right)?
    } else {
        by.to_vec()
    };
    let mut lkeys = KeySide {
        columns: Vec::with_capacity(by.len()),
    };
    let mut rkeys = KeySide {
        columns: Vec::with_capacity(by.len()),
    };
    for key in &by {
        let l = left.column(&key.left)?;
        let r = right.column(&key.right)?;
        if l.dtype().exact_supertype(r.dtype()).is_none() {
            return Err(TableError::TypeMismatch {
                op: "join",
                found: r.dtype(),
            });
        }
        lkeys.columns.push(l);
        rkeys.columns.push(r);
    }
    let missing_matches = options.missing_matches;

    // Row pairs, in output order.
    let mut pairs: Vec<(Option<usize>, Option<usize>)> = Vec::new();
    match kind {
        JoinKind::Semi | JoinKind::Anti => {
            let index = rkeys.index(right.row_count(), missing_matches);
            let matches = matched_rows(&lkeys, left.row_count(), &index, missing_matches);
            let want = kind == JoinKind::Semi;
            let kept: Vec<usize> = (0..left.row_count())
                .filter(|&row| matches[row].is_empty() != want)
                .collect();
            return Ok(left.take(&kept));
        }
        JoinKind::Inner | JoinKind::Left | JoinKind::Full => {
            let index = rkeys.index(right.row_count(), missing_matches);
            let matches = matched_rows(&lkeys, left.row_count(), &index, missing_matches);
            let mut right_used = HashSet::new();
            for (l, rows) in matches.iter().enumerate() {
                if rows.is_empty() && kind != JoinKind::Inner {
                    pairs.push((Some(l), None));
                }
                for &r in *rows {
                    right_used.insert(r);
                    pairs.push((Some(l), Some(r)));
                }
            }
            if kind == JoinKind::Full {
                pairs.extend(
                    (0..right.row_count())
                        .filter(|r| !right_used.contains(r))
                        .map(|r| (None, Some(r))),
                );
            }
        }
        JoinKind::Right => {
            let index = lkeys.index(left.row_count(), missing_matches);
            let matches = matched_rows(&rkeys, right.row_count(), &index, missing_matches);
            for (r, rows) in matches.iter().enumerate() {
                if rows.is_empty() {
                    pairs.push((None, Some(r)));
                }
                for &l in *rows {
                    pairs.push((Some(l), Some(r)));
                }
            }
        }
    }

    let left_rows: Vec<Option<usize>> = pairs.iter().map(|p| p.0).collect();
    let right_rows: Vec<Option<usize>> = pairs.iter().map(|p| p.1).collect();
    let right_key_names: Vec<&str> = by.iter().map(|k| k.right.as_str()).collect();
    let left_key_names: Vec<&str> = by.iter().map(|k| k.left.as_str()).collect();
    let right_rest: Vec<&Column> = right
        .columns()
        .iter()
        .filter(|c| !right_key_names.contains(&c.name()))
        .collect();

    let mut columns = Vec::with_capacity(left.column_count() + right_rest.len());
    for column in left.columns() {
        if let Some(k) = left_key_names.iter().position(|&n| n == column.name()) {
            columns.push(coalesce_key(column, rkeys.columns[k], &pairs)?);
        } else if right_rest.iter().any(|c| c.name() == column.name()) {
            let name = format!("{}{}", column.name(), options.suffix.0);
            columns.push(column.take_opt(&left_rows).renamed(name));
        } else {
            columns.push(column.take_opt(&left_rows));
        }
    }
    for column in right_rest {
        let taken = column.take_opt(&right_rows);
        if left.contains(column.name()) {
            let name = format!("{}{}", column.name(), options.suffix.1);
            columns.push(taken.renamed(name));
        } else {
            columns.push(taken);
        }
    }
    if columns.is_empty() {
        return Ok(Table::default());
    }
    Table::new(columns)
}

/// Key column values taken from whichever side of the pair is present.
fn coalesce_key(
    left: &Column,
    right: &Column,
    pairs: &[(Option<usize>, Option<usize>)],
) -> Result<Column, TableError> {
    let dtype = left
        .dtype()
        .exact_supertype(right.dtype())
        .unwrap_or(left.dtype());
    let values = pairs
        .iter()
        .map(|&(l, r)| match (l, r) {
            (Some(l), _) => left.values()[l].clone(),
            (None, Some(r)) => right.values()[r].clone(),
            (None, None) => Value::Missing,
        })
        .collect();
    Column::typed(left.name(), dtype, values)
}

/// Joins with another table.
///
/// Implemented for everything that is [`AsTable`].
pub trait JoinOps: AsTable {
    /// Joins `self` (left) with `right` on `by`.
    ///
    /// An empty `by` joins on every column name the two tables share.
    fn join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
        kind: JoinKind,
        options: &JoinOptions,
    ) -> Result<Table, TableError> {
        let by: Vec<JoinKey> = by.into_iter().map(Into::into).collect();
        join(self.as_table(), right, &by, kind, options)
    }

    /// Joins on every shared column name.
    fn natural_join(&self, right: &Table, kind: JoinKind) -> Result<Table, TableError> {
        join(self.as_table(), right, &[], kind, &JoinOptions::default())
    }

    /// Matching row pairs.
    fn inner_join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        self.join(right, by, JoinKind::Inner, &JoinOptions::default())
    }

    /// Every left row, with right columns where a match exists.
    fn left_join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        self.join(right, by, JoinKind::Left, &JoinOptions::default())
    }

    /// Every right row, with left columns where a match exists.
    fn right_join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        self.join(right, by, JoinKind::Right, &JoinOptions::default())
    }

    /// Every row of both sides.
    fn full_join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        self.join(right, by, JoinKind::Full, &JoinOptions::default())
    }

    /// Left rows that have a match.
    fn semi_join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        self.join(right, by, JoinKind::Semi, &JoinOptions::default())
    }

    /// Left rows that have no match.
    fn anti_join<K: Into<JoinKey>>(
        &self,
        right: &Table,
        by: impl IntoIterator<Item = K>,
    ) -> Result<Table, TableError> {
        self.join(right, by, JoinKind::Anti, &JoinOptions::default())
    }
}

impl<T: AsTable> JoinOps for T {}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::{DataType, table};

    use super::*;

    fn flights() -> Table {
        table! {
            "flight" => [1, 2, 3, 4],
            "carrier" => [Some("UA"), Some("AA"), Some("ZZ"), None],
        }
        .unwrap()
    }

    fn airlines() -> Table {
        table! {
            "carrier" => [Some("AA"), Some("UA"), Some("UA"), None],
            "name" => ["American", "United", "United (dup)", "Unknown"],
        }
        .unwrap()
    }

    fn flight_ids(t: &Table) -> Vec<Value> {
        t.column("flight").unwrap().values().to_vec()
    }

    fn ids(xs: &[Option<i64>]) -> Vec<Value> {
        xs.iter().map(|&x| Value::from(x)).collect()
    }

    #[test]
    fn inner_join_duplicates_matches() {
        let out = flights().inner_join(&airlines(), ["carrier"]).unwrap();
        assert_eq!(out.column_names(), vec!["flight", "carrier", "name"]);
        assert_eq!(flight_ids(&out), ids(&[Some(1), Some(1), Some(2), Some(4)]));
    }

    #[test]
    fn left_join_keeps_unmatched_rows() {
        let out = flights().left_join(&airlines(), ["carrier"]).unwrap();
        assert_eq!(
            flight_ids(&out),
            ids(&[Some(1), Some(1), Some(2), Some(3), Some(4)])
        );
        assert_eq!(out.get(3, "name").unwrap(), &Value::Missing);
        assert!(out.row_count() >= flights().row_count());
    }

    #[test]
    fn missing_keys_can_be_made_unmatchable() {
        let options = JoinOptions::default().with_missing_matches(false);
        let out = flights()
            .join(&airlines(), ["carrier"], JoinKind::Inner, &options)
            .unwrap();
        assert_eq!(flight_ids(&out), ids(&[Some(1), Some(1), Some(2)]));
    }

    #[test]
    fn right_join_follows_right_order() {
        let out = flights().right_join(&airlines(), ["carrier"]).unwrap();
        assert_eq!(out.column_names(), vec!["flight", "carrier", "name"]);
        assert_eq!(flight_ids(&out), ids(&[Some(2), Some(1), Some(1), Some(4)]));
    }

    #[test]
    fn full_join_appends_unmatched_right_rows_with_coalesced_keys() {
        let left = table! { "k" => [1, 2], "a" => ["p", "q"] }.unwrap();
        let right = table! { "k" => [2, 3], "b" => [true, false] }.unwrap();
        let out = left.full_join(&right, ["k"]).unwrap();
        assert_eq!(
            out.column("k").unwrap().values(),
            [Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        assert_eq!(
            out.column("a").unwrap().values(),
            [Value::from("p"), Value::from("q"), Value::Missing]
        );
        assert_eq!(
            out.column("b").unwrap().values(),
            [Value::Missing, Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn semi_and_anti_partition_left_rows() {
        let semi = flights().semi_join(&airlines(), ["carrier"]).unwrap();
        let anti = flights().anti_join(&airlines(), ["carrier"]).unwrap();
        assert_eq!(semi.column_names(), vec!["flight", "carrier"]);
        assert_eq!(flight_ids(&semi), ids(&[Some(1), Some(2), Some(4)]));
        assert_eq!(flight_ids(&anti), ids(&[Some(3)]));
    }

    #[test]
    fn clashing_columns_get_suffixes() {
        let left = table! { "k" => [1], "v" => [10] }.unwrap();
        let right = table! { "k" => [1], "v" => [20] }.unwrap();
        let out = left.inner_join(&right, ["k"]).unwrap();
        assert_eq!(out.column_names(), vec!["k", "v.x", "v.y"]);
        let options = JoinOptions::default().with_suffix("_l", "_r");
        let out = left
            .join(&right, ["k"], JoinKind::Left, &options)
            .unwrap();
        assert_eq!(out.column_names(), vec!["k", "v_l", "v_r"]);
    }

    #[test]
    fn differently_named_keys() {
        let left = table! { "dest" => ["LAX", "SFO"] }.unwrap();
        let right = table! { "faa" => ["SFO"], "alt" => [13] }.unwrap();
        let out = left.left_join(&right, [("dest", "faa")]).unwrap();
        assert_eq!(out.column_names(), vec!["dest", "alt"]);
        assert_eq!(out.get(1, "alt").unwrap(), &Value::Int(13));
    }

    #[test]
    fn natural_join_uses_common_names() {
        let out = flights().natural_join(&airlines(), JoinKind::Inner).unwrap();
        assert_eq!(out.row_count(), 4);
        let unrelated = table! { "z" => [1] }.unwrap();
        assert!(matches!(
            flights().natural_join(&unrelated, JoinKind::Inner),
            Err(TableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn key_types_must_agree() {
        let left = table! { "k" => [1] }.unwrap();
        let right = table! { "k" => ["1"] }.unwrap();
        assert_eq!(
            left.inner_join(&right, ["k"]).unwrap_err(),
            TableError::TypeMismatch {
                op: "join",
                found: DataType::Str
            }
        );
    }
}
