// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression evaluation.
//!
//! Expressions are evaluated against a [`Frame`]: a table plus the row indices
//! of one group. A result is either a scalar (aggregates, literals) or one
//! value per frame row; scalars broadcast when combined with columns.
//!
//! Result types are computed from input types before any value is touched, so
//! a type error surfaces even for empty groups.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashSet;
use wrangle_core::{DataType, Table, TableError, Value};

use crate::expr::{AggFunc, BinaryOp, Expr, UnaryOp, WindowFunc};
#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::window::{self, number};

/// A table restricted to the rows of one group.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame<'a> {
    table: &'a Table,
    rows: &'a [usize],
}

impl<'a> Frame<'a> {
    pub(crate) fn new(table: &'a Table, rows: &'a [usize]) -> Self {
        Self { table, rows }
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone)]
enum Data {
    Scalar(Value),
    Column(Vec<Value>),
}

/// The typed result of evaluating an expression over a frame.
#[derive(Debug, Clone)]
pub(crate) struct Evaluated {
    dtype: DataType,
    data: Data,
}

impl Evaluated {
    fn scalar(dtype: DataType, value: Value) -> Self {
        Self {
            dtype,
            data: Data::Scalar(value.cast(dtype)),
        }
    }

    fn column(dtype: DataType, values: Vec<Value>) -> Self {
        Self {
            dtype,
            data: Data::Column(values.into_iter().map(|v| v.cast(dtype)).collect()),
        }
    }

    /// Builds a scalar if every input was scalar, else a column of `len`.
    fn from_parts(
        dtype: DataType,
        all_scalar: bool,
        len: usize,
        mut f: impl FnMut(usize) -> Value,
    ) -> Self {
        if all_scalar {
            Self::scalar(dtype, f(0))
        } else {
            Self::column(dtype, (0..len).map(f).collect())
        }
    }

    pub(crate) fn dtype(&self) -> DataType {
        self.dtype
    }

    fn is_scalar(&self) -> bool {
        matches!(self.data, Data::Scalar(_))
    }

    /// Number of values, if this is a column.
    pub(crate) fn column_len(&self) -> Option<usize> {
        match &self.data {
            Data::Scalar(_) => None,
            Data::Column(values) => Some(values.len()),
        }
    }

    /// The value for frame row `i`; scalars answer every row.
    pub(crate) fn value_at(&self, i: usize) -> &Value {
        match &self.data {
            Data::Scalar(v) => v,
            Data::Column(values) => &values[i],
        }
    }

    /// The values, broadcasting a scalar to `len` rows.
    pub(crate) fn into_values(self, len: usize) -> Vec<Value> {
        match self.data {
            Data::Scalar(v) => vec![v; len],
            Data::Column(values) => values,
        }
    }

    /// The values as evaluated: a scalar is a single value.
    fn into_raw(self) -> Vec<Value> {
        match self.data {
            Data::Scalar(v) => vec![v],
            Data::Column(values) => values,
        }
    }
}

fn mismatch(op: &'static str, found: DataType) -> TableError {
    TableError::TypeMismatch { op, found }
}

fn require_bool(op: &'static str, dtype: DataType) -> Result<(), TableError> {
    match dtype {
        DataType::Bool | DataType::Null => Ok(()),
        other => Err(mismatch(op, other)),
    }
}

fn require_numeric(op: &'static str, dtype: DataType) -> Result<(), TableError> {
    match dtype {
        DataType::Int | DataType::Float | DataType::Null => Ok(()),
        other => Err(mismatch(op, other)),
    }
}

/// Folds `supertype` over the given types.
fn unify(
    op: &'static str,
    types: impl IntoIterator<Item = DataType>,
) -> Result<DataType, TableError> {
    let mut acc = DataType::Null;
    for t in types {
        acc = acc.supertype(t).ok_or(mismatch(op, t))?;
    }
    Ok(acc)
}

fn binary_type(op: BinaryOp, left: DataType, right: DataType) -> Result<DataType, TableError> {
    let sym = op.symbol();
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::IntDiv | BinaryOp::Rem => {
            require_numeric(sym, left)?;
            require_numeric(sym, right)?;
            unify(sym, [left, right])
        }
        BinaryOp::Div => {
            require_numeric(sym, left)?;
            require_numeric(sym, right)?;
            Ok(DataType::Float)
        }
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => {
            unify(sym, [left, right])?;
            Ok(DataType::Bool)
        }
        BinaryOp::And | BinaryOp::Or => {
            require_bool(sym, left)?;
            require_bool(sym, right)?;
            Ok(DataType::Bool)
        }
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn floor_rem(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

/// IEEE comparison of two non-missing values; `None` if either is NaN.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => Some(a.total_cmp(b)),
        },
    }
}

fn binary_value(op: BinaryOp, a: &Value, b: &Value) -> Value {
    match op {
        BinaryOp::And => {
            return match (a.as_bool(), b.as_bool()) {
                (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                (Some(true), Some(true)) => Value::Bool(true),
                _ => Value::Missing,
            };
        }
        BinaryOp::Or => {
            return match (a.as_bool(), b.as_bool()) {
                (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                (Some(false), Some(false)) => Value::Bool(false),
                _ => Value::Missing,
            };
        }
        _ => {}
    }
    if a.is_missing() || b.is_missing() {
        return Value::Missing;
    }
    // NaN is unordered and compares as missing.
    let ord = compare(a, b);
    let outcome = match op {
        BinaryOp::Eq => Some(ord.map(Ordering::is_eq)),
        BinaryOp::NotEq => Some(ord.map(Ordering::is_ne)),
        BinaryOp::Lt => Some(ord.map(Ordering::is_lt)),
        BinaryOp::LtEq => Some(ord.map(Ordering::is_le)),
        BinaryOp::Gt => Some(ord.map(Ordering::is_gt)),
        BinaryOp::GtEq => Some(ord.map(Ordering::is_ge)),
        _ => None,
    };
    if let Some(outcome) = outcome {
        return outcome.map_or(Value::Missing, Value::Bool);
    }
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        let (x, y) = (*x, *y);
        let out = match op {
            BinaryOp::Add => x.checked_add(y),
            BinaryOp::Sub => x.checked_sub(y),
            BinaryOp::Mul => x.checked_mul(y),
            BinaryOp::IntDiv => floor_div(x, y),
            BinaryOp::Rem => floor_rem(x, y),
            BinaryOp::Div => return Value::Float(x as f64 / y as f64),
            _ => None,
        };
        return out.map_or(Value::Missing, Value::Int);
    }
    let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
        return Value::Missing;
    };
    Value::Float(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => x / y,
        BinaryOp::IntDiv => (x / y).floor(),
        BinaryOp::Rem => x - (x / y).floor() * y,
        _ => return Value::Missing,
    })
}

fn unary_value(op: UnaryOp, v: &Value) -> Value {
    match (op, v) {
        (UnaryOp::IsMissing, v) => Value::Bool(v.is_missing()),
        (_, Value::Missing) => Value::Missing,
        (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map_or(Value::Missing, Value::Int),
        (UnaryOp::Neg, Value::Float(x)) => Value::Float(-x),
        (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
        _ => Value::Missing,
    }
}

fn aggregate_type(func: AggFunc, dtype: DataType) -> Result<DataType, TableError> {
    match func {
        AggFunc::Sum => match dtype {
            DataType::Float => Ok(DataType::Float),
            DataType::Int | DataType::Bool | DataType::Null => Ok(DataType::Int),
            DataType::Str => Err(mismatch(func.name(), dtype)),
        },
        AggFunc::Mean | AggFunc::Median | AggFunc::Sd | AggFunc::Var => match dtype {
            DataType::Str => Err(mismatch(func.name(), dtype)),
            _ => Ok(DataType::Float),
        },
        AggFunc::Min | AggFunc::Max | AggFunc::First | AggFunc::Last => Ok(dtype),
        AggFunc::NDistinct => Ok(DataType::Int),
    }
}

fn mean_of(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

fn variance_of(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let mean = mean_of(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();
    Some(ss / (xs.len() - 1) as f64)
}

fn median_of(mut xs: Vec<f64>) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(f64::total_cmp);
    let mid = xs.len() / 2;
    Some(if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    })
}

/// Collapses `values` with `func`. `out` is the already-checked output type.
fn aggregate_values(func: AggFunc, out: DataType, values: &[Value], skip_missing: bool) -> Value {
    match func {
        AggFunc::NDistinct => {
            let distinct: HashSet<&Value> = values.iter().filter(|v| !v.is_missing()).collect();
            return Value::Int(i64::try_from(distinct.len()).unwrap_or(i64::MAX));
        }
        AggFunc::First | AggFunc::Last => {
            let mut present = values.iter().filter(|v| !skip_missing || !v.is_missing());
            let picked = if func == AggFunc::First {
                present.next()
            } else {
                present.last()
            };
            return picked.cloned().unwrap_or_default();
        }
        _ => {}
    }
    if !skip_missing && values.iter().any(Value::is_missing) {
        return Value::Missing;
    }
    let present = values.iter().filter(|v| !v.is_missing());
    match func {
        AggFunc::Sum if out == DataType::Int => {
            let mut acc = Some(0_i64);
            for v in present {
                let x = match v {
                    Value::Bool(b) => i64::from(*b),
                    v => v.as_i64().unwrap_or_default(),
                };
                acc = acc.and_then(|a| a.checked_add(x));
            }
            acc.map_or(Value::Missing, Value::Int)
        }
        AggFunc::Sum => Value::Float(present.filter_map(number).sum()),
        AggFunc::Min => present
            .min_by(|a, b| a.total_cmp(b))
            .cloned()
            .unwrap_or_default(),
        AggFunc::Max => present
            .max_by(|a, b| a.total_cmp(b))
            .cloned()
            .unwrap_or_default(),
        AggFunc::Mean | AggFunc::Median | AggFunc::Sd | AggFunc::Var => {
            let xs: Vec<f64> = present.filter_map(number).collect();
            let result = match func {
                AggFunc::Mean => mean_of(&xs),
                AggFunc::Median => median_of(xs),
                AggFunc::Var => variance_of(&xs),
                _ => variance_of(&xs).map(|v| v.sqrt()),
            };
            result.map_or(Value::Missing, Value::Float)
        }
        AggFunc::NDistinct | AggFunc::First | AggFunc::Last => Value::Missing,
    }
}

fn window_type(func: WindowFunc, dtype: DataType) -> Result<DataType, TableError> {
    match func {
        WindowFunc::RowNumber
        | WindowFunc::MinRank
        | WindowFunc::DenseRank
        | WindowFunc::Ntile(_) => Ok(DataType::Int),
        WindowFunc::PercentRank | WindowFunc::CumeDist => Ok(DataType::Float),
        WindowFunc::Lag(_) | WindowFunc::Lead(_) => Ok(dtype),
        WindowFunc::CumSum => {
            aggregate_type(AggFunc::Sum, dtype).map_err(|_| mismatch("cumsum", dtype))
        }
        WindowFunc::CumMean => {
            aggregate_type(AggFunc::Mean, dtype).map_err(|_| mismatch("cummean", dtype))
        }
    }
}

fn window_values(func: WindowFunc, values: &[Value]) -> Result<Vec<Value>, TableError> {
    Ok(match func {
        WindowFunc::RowNumber => window::row_number(values),
        WindowFunc::MinRank => window::min_rank(values),
        WindowFunc::DenseRank => window::dense_rank(values),
        WindowFunc::PercentRank => window::percent_rank(values),
        WindowFunc::CumeDist => window::cume_dist(values),
        WindowFunc::Ntile(buckets) => window::ntile(values, buckets)?,
        WindowFunc::Lag(k) => window::lag(values, k),
        WindowFunc::Lead(k) => window::lead(values, k),
        WindowFunc::CumSum => window::cumsum(values),
        WindowFunc::CumMean => window::cummean(values),
    })
}

impl Expr {
    /// Evaluates this expression over one group.
    pub(crate) fn evaluate(&self, frame: &Frame<'_>) -> Result<Evaluated, TableError> {
        let len = frame.len();
        match self {
            Self::Column(name) => {
                let column = frame.table.column(name)?;
                let values = frame
                    .rows
                    .iter()
                    .map(|&r| column.values()[r].clone())
                    .collect();
                Ok(Evaluated::column(column.dtype(), values))
            }
            Self::Literal(v) => Ok(Evaluated::scalar(v.dtype(), v.clone())),
            Self::Binary { op, left, right } => {
                let l = left.evaluate(frame)?;
                let r = right.evaluate(frame)?;
                let dtype = binary_type(*op, l.dtype, r.dtype)?;
                let all_scalar = l.is_scalar() && r.is_scalar();
                Ok(Evaluated::from_parts(dtype, all_scalar, len, |i| {
                    binary_value(*op, l.value_at(i), r.value_at(i))
                }))
            }
            Self::Unary { op, input } => {
                let v = input.evaluate(frame)?;
                let dtype = match op {
                    UnaryOp::Neg => {
                        require_numeric("-", v.dtype)?;
                        v.dtype
                    }
                    UnaryOp::Not => {
                        require_bool("!", v.dtype)?;
                        DataType::Bool
                    }
                    UnaryOp::IsMissing => DataType::Bool,
                };
                Ok(Evaluated::from_parts(dtype, v.is_scalar(), len, |i| {
                    unary_value(*op, v.value_at(i))
                }))
            }
            Self::Count => Ok(Evaluated::scalar(
                DataType::Int,
                Value::Int(i64::try_from(len).unwrap_or(i64::MAX)),
            )),
            Self::Aggregate {
                func,
                input,
                skip_missing,
            } => {
                let v = input.evaluate(frame)?;
                let dtype = aggregate_type(*func, v.dtype)?;
                let values = v.into_raw();
                Ok(Evaluated::scalar(
                    dtype,
                    aggregate_values(*func, dtype, &values, *skip_missing),
                ))
            }
            Self::Window { func, input: None } => {
                let positions: Vec<Value> = (0..len).map(|i| Value::Int(i as i64)).collect();
                let dtype = window_type(*func, DataType::Int)?;
                Ok(Evaluated::column(dtype, window_values(*func, &positions)?))
            }
            Self::Window {
                func,
                input: Some(input),
            } => {
                let v = input.evaluate(frame)?;
                let dtype = window_type(*func, v.dtype)?;
                let values = v.into_values(len);
                Ok(Evaluated::column(dtype, window_values(*func, &values)?))
            }
            Self::IfElse {
                condition,
                then,
                otherwise,
            } => {
                let c = condition.evaluate(frame)?;
                require_bool("if_else", c.dtype)?;
                let t = then.evaluate(frame)?;
                let f = otherwise.evaluate(frame)?;
                let dtype = unify("if_else", [t.dtype, f.dtype])?;
                let all_scalar = c.is_scalar() && t.is_scalar() && f.is_scalar();
                Ok(Evaluated::from_parts(dtype, all_scalar, len, |i| {
                    match c.value_at(i) {
                        Value::Bool(true) => t.value_at(i).clone(),
                        Value::Bool(false) => f.value_at(i).clone(),
                        _ => Value::Missing,
                    }
                }))
            }
            Self::CaseWhen { branches, default } => {
                let mut evaluated = Vec::with_capacity(branches.len());
                for (condition, value) in branches {
                    let c = condition.evaluate(frame)?;
                    require_bool("case_when", c.dtype)?;
                    evaluated.push((c, value.evaluate(frame)?));
                }
                let d = default.evaluate(frame)?;
                let dtype = unify(
                    "case_when",
                    evaluated.iter().map(|(_, v)| v.dtype).chain([d.dtype]),
                )?;
                let all_scalar = d.is_scalar()
                    && evaluated.iter().all(|(c, v)| c.is_scalar() && v.is_scalar());
                Ok(Evaluated::from_parts(dtype, all_scalar, len, |i| {
                    evaluated
                        .iter()
                        .find(|(c, _)| matches!(c.value_at(i), Value::Bool(true)))
                        .map_or_else(|| d.value_at(i).clone(), |(_, v)| v.value_at(i).clone())
                }))
            }
            Self::Recode {
                input,
                mapping,
                default,
            } => {
                let v = input.evaluate(frame)?;
                let replacements = mapping.iter().map(|(_, to)| to.dtype());
                let dtype = match default {
                    Some(d) => unify("recode", replacements.chain([d.dtype()]))?,
                    None => unify("recode", replacements.chain([v.dtype]))?,
                };
                Ok(Evaluated::from_parts(dtype, v.is_scalar(), len, |i| {
                    let x = v.value_at(i);
                    match mapping.iter().find(|(from, _)| from == x) {
                        Some((_, to)) => to.clone(),
                        None if x.is_missing() => Value::Missing,
                        None => default.clone().unwrap_or_else(|| x.clone()),
                    }
                }))
            }
            Self::IsIn { input, values } => {
                let v = input.evaluate(frame)?;
                unify("is_in", values.iter().map(Value::dtype).chain([v.dtype]))?;
                Ok(Evaluated::from_parts(DataType::Bool, v.is_scalar(), len, |i| {
                    let x = v.value_at(i);
                    Value::Bool(values.iter().any(|s| {
                        if x.is_missing() || s.is_missing() {
                            x.is_missing() && s.is_missing()
                        } else {
                            compare(x, s).is_some_and(Ordering::is_eq)
                        }
                    }))
                }))
            }
            Self::Coalesce(exprs) => {
                let mut parts = Vec::with_capacity(exprs.len());
                for e in exprs {
                    parts.push(e.evaluate(frame)?);
                }
                let dtype = unify("coalesce", parts.iter().map(|p| p.dtype))?;
                let all_scalar = parts.iter().all(Evaluated::is_scalar);
                Ok(Evaluated::from_parts(dtype, all_scalar, len, |i| {
                    parts
                        .iter()
                        .map(|p| p.value_at(i))
                        .find(|v| !v.is_missing())
                        .cloned()
                        .unwrap_or_default()
                }))
            }
        }
    }
}

/// Evaluates a predicate over one group, returning the frame positions for
/// which it is `true`. Missing counts as false.
pub(crate) fn evaluate_predicate(
    predicate: &Expr,
    frame: &Frame<'_>,
) -> Result<Vec<bool>, TableError> {
    let v = predicate.evaluate(frame)?;
    require_bool("filter", v.dtype)?;
    Ok((0..frame.len())
        .map(|i| matches!(v.value_at(i), Value::Bool(true)))
        .collect())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use wrangle_core::{Column, table};

    use super::*;
    use crate::{case_when, col, if_else, lit, n, row_number};

    fn eval(table: &Table, expr: &Expr) -> Result<Vec<Value>, TableError> {
        let rows: Vec<usize> = (0..table.row_count()).collect();
        let frame = Frame::new(table, &rows);
        Ok(expr.evaluate(&frame)?.into_values(rows.len()))
    }

    #[test]
    fn arithmetic_types_and_missing_propagation() {
        let t = table! { "x" => [Some(1), None, Some(3)], "y" => [0.5, 1.0, 2.0] }.unwrap();
        assert_eq!(
            eval(&t, &(col("x") * lit(2))).unwrap(),
            [Value::Int(2), Value::Missing, Value::Int(6)]
        );
        assert_eq!(
            eval(&t, &(col("x") + col("y"))).unwrap(),
            [Value::Float(1.5), Value::Missing, Value::Float(5.0)]
        );
        assert_eq!(
            eval(&t, &(col("x") / lit(2))).unwrap(),
            [Value::Float(0.5), Value::Missing, Value::Float(1.5)]
        );
    }

    #[test]
    fn floored_division_and_modulo() {
        let t = table! { "x" => [-7, 7, 5] }.unwrap();
        assert_eq!(
            eval(&t, &col("x").int_div(lit(2))).unwrap(),
            [Value::Int(-4), Value::Int(3), Value::Int(2)]
        );
        assert_eq!(
            eval(&t, &(col("x") % lit(2))).unwrap(),
            [Value::Int(1), Value::Int(1), Value::Int(1)]
        );
        assert_eq!(
            eval(&t, &col("x").int_div(lit(0))).unwrap(),
            [Value::Missing, Value::Missing, Value::Missing]
        );
    }

    #[test]
    fn string_arithmetic_is_a_type_error_even_when_empty() {
        let t = Table::new([Column::full_missing("s", DataType::Str, 0)]).unwrap();
        assert_eq!(
            eval(&t, &(col("s") + lit(1))).unwrap_err(),
            TableError::TypeMismatch {
                op: "+",
                found: DataType::Str
            }
        );
    }

    #[test]
    fn kleene_logic() {
        let t = table! {
            "a" => [Some(true), Some(false), None, None],
            "b" => [None, None, Some(false), Some(true)],
        }
        .unwrap();
        assert_eq!(
            eval(&t, &col("a").and(col("b"))).unwrap(),
            [
                Value::Missing,
                Value::Bool(false),
                Value::Bool(false),
                Value::Missing
            ]
        );
        assert_eq!(
            eval(&t, &col("a").or(col("b"))).unwrap(),
            [
                Value::Bool(true),
                Value::Missing,
                Value::Missing,
                Value::Bool(true)
            ]
        );
    }

    #[test]
    fn aggregates_broadcast_against_rows() {
        let t = table! { "x" => [1.0, 2.0, 6.0] }.unwrap();
        assert_eq!(
            eval(&t, &col("x").gt(col("x").mean())).unwrap(),
            [Value::Bool(false), Value::Bool(false), Value::Bool(true)]
        );
        assert_eq!(eval(&t, &n()).unwrap(), vec![Value::Int(3); 3]);
    }

    #[test]
    fn aggregates_respect_skip_missing() {
        let t = table! { "x" => [Some(1), None, Some(3)] }.unwrap();
        assert_eq!(eval(&t, &col("x").sum()).unwrap()[0], Value::Missing);
        assert_eq!(
            eval(&t, &col("x").sum().skip_missing()).unwrap()[0],
            Value::Int(4)
        );
        assert_eq!(
            eval(&t, &col("x").mean().skip_missing()).unwrap()[0],
            Value::Float(2.0)
        );
        assert_eq!(
            eval(&t, &col("x").median().skip_missing()).unwrap()[0],
            Value::Float(2.0)
        );
        assert_eq!(eval(&t, &col("x").n_distinct()).unwrap()[0], Value::Int(2));
        assert_eq!(eval(&t, &col("x").last()).unwrap()[0], Value::Int(3));
        assert_eq!(
            eval(&t, &col("x").sd().skip_missing()).unwrap()[0],
            Value::Float(core::f64::consts::SQRT_2)
        );
    }

    #[test]
    fn boolean_sums_count_trues() {
        let t = table! { "x" => [5, -1, 7] }.unwrap();
        assert_eq!(
            eval(&t, &col("x").gt(lit(0)).sum()).unwrap()[0],
            Value::Int(2)
        );
    }

    #[test]
    fn conditionals() {
        let t = table! { "x" => [Some(1), Some(5), None] }.unwrap();
        assert_eq!(
            eval(&t, &if_else(col("x").gt(lit(2)), lit("big"), lit("small"))).unwrap(),
            [Value::from("small"), Value::from("big"), Value::Missing]
        );
        let cw = case_when(
            [
                (col("x").lt(lit(2)), lit(1.5)),
                (col("x").lt(lit(10)), lit(2)),
            ],
            lit(0),
        );
        assert_eq!(
            eval(&t, &cw).unwrap(),
            [Value::Float(1.5), Value::Float(2.0), Value::Float(0.0)]
        );
        assert_eq!(
            eval(&t, &col("x").recode([(1, 10)], None)).unwrap(),
            [Value::Int(10), Value::Int(5), Value::Missing]
        );
        assert_eq!(
            eval(&t, &col("x").fill_missing(0)).unwrap(),
            [Value::Int(1), Value::Int(5), Value::Int(0)]
        );
        assert_eq!(
            eval(&t, &col("x").is_in([5, 6])).unwrap(),
            [Value::Bool(false), Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn recode_default_replaces_unmatched_values() {
        let t = table! { "x" => [Some(1), Some(5), None] }.unwrap();
        assert_eq!(
            eval(&t, &col("x").recode([(1, "one")], Some(Value::from("other")))).unwrap(),
            [Value::from("one"), Value::from("other"), Value::Missing]
        );
    }

    #[test]
    fn signed_zeros_compare_equal() {
        let t = table! { "x" => [-0.0, 0.0, 1.0] }.unwrap();
        let expected = [Value::Bool(true), Value::Bool(true), Value::Bool(false)];
        assert_eq!(eval(&t, &col("x").eq(lit(0.0))).unwrap(), expected);
        assert_eq!(eval(&t, &col("x").eq(lit(0))).unwrap(), expected);
        assert_eq!(eval(&t, &col("x").is_in([0.0])).unwrap(), expected);
    }

    #[test]
    fn nan_comparisons_are_missing() {
        let t = table! { "x" => [f64::NAN, 1.0] }.unwrap();
        assert_eq!(
            eval(&t, &col("x").gt(lit(0.0))).unwrap(),
            [Value::Missing, Value::Bool(true)]
        );
        assert_eq!(
            eval(&t, &col("x").eq(col("x"))).unwrap(),
            [Value::Missing, Value::Bool(true)]
        );
        let rows = [0, 1];
        let frame = Frame::new(&t, &rows);
        assert_eq!(
            evaluate_predicate(&col("x").gt(lit(0.0)), &frame).unwrap(),
            [false, true]
        );
    }

    #[test]
    fn if_else_rejects_incompatible_branches() {
        let t = table! { "x" => [1] }.unwrap();
        assert!(matches!(
            eval(&t, &if_else(col("x").gt(lit(0)), lit("a"), lit(1))),
            Err(TableError::TypeMismatch { op: "if_else", .. })
        ));
    }

    #[test]
    fn plain_row_number_counts_rows() {
        let t = table! { "x" => ["a", "b", "c"] }.unwrap();
        assert_eq!(
            eval(&t, &row_number()).unwrap(),
            [Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn filter_predicate_must_be_boolean() {
        let t = table! { "x" => [1, 2] }.unwrap();
        let rows = [0, 1];
        let frame = Frame::new(&t, &rows);
        assert!(evaluate_predicate(&col("x"), &frame).is_err());
        assert_eq!(
            evaluate_predicate(&col("x").gt(lit(1)), &frame).unwrap(),
            [false, true]
        );
    }
}
