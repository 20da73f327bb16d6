// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ranking, offset and running-total primitives.
//!
//! These are plain functions over a slice of values, in the slice's order.
//! The window expressions ([`Expr::min_rank`](crate::Expr::min_rank) and
//! friends) call them once per group.
//!
//! Missing inputs get missing outputs and do not count towards `n`.
//!
//! ```
//! use wrangle_core::Value;
//! use wrangle_transforms::window::{dense_rank, min_rank};
//!
//! let x: Vec<Value> = [3, 4, 1, 3, 1].into_iter().map(Value::from).collect();
//! let ints = |v: Vec<Value>| v.iter().map(|v| v.as_i64().unwrap()).collect::<Vec<_>>();
//! assert_eq!(ints(min_rank(&x)), [3, 5, 1, 3, 1]);
//! assert_eq!(ints(dense_rank(&x)), [2, 3, 1, 2, 1]);
//! ```

extern crate alloc;

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use wrangle_core::{TableError, Value};

/// Indices of the non-missing values, stably sorted by value.
fn sorted_present(values: &[Value]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len())
        .filter(|&i| !values[i].is_missing())
        .collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// Calls `f(start, end)` for each run of tied values in `order`
/// (`end` exclusive).
fn for_each_tie_run(values: &[Value], order: &[usize], mut f: impl FnMut(usize, usize)) {
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]].total_cmp(&values[order[start]]).is_eq() {
            end += 1;
        }
        f(start, end);
        start = end;
    }
}

fn rank_value(rank: usize) -> Value {
    Value::Int(i64::try_from(rank).unwrap_or(i64::MAX))
}

/// 1-based position in sorted order; ties keep their original order.
pub fn row_number(values: &[Value]) -> Vec<Value> {
    let mut out = vec![Value::Missing; values.len()];
    for (pos, &i) in sorted_present(values).iter().enumerate() {
        out[i] = rank_value(pos + 1);
    }
    out
}

/// Rank where ties share the lowest rank; gaps follow ties.
pub fn min_rank(values: &[Value]) -> Vec<Value> {
    let order = sorted_present(values);
    let mut out = vec![Value::Missing; values.len()];
    for_each_tie_run(values, &order, |start, end| {
        for &i in &order[start..end] {
            out[i] = rank_value(start + 1);
        }
    });
    out
}

/// Rank where ties share a rank and ranks have no gaps.
pub fn dense_rank(values: &[Value]) -> Vec<Value> {
    let order = sorted_present(values);
    let mut out = vec![Value::Missing; values.len()];
    let mut rank = 0;
    for_each_tie_run(values, &order, |start, end| {
        rank += 1;
        for &i in &order[start..end] {
            out[i] = rank_value(rank);
        }
    });
    out
}

/// `(min_rank - 1) / (n - 1)`; a lone value gets `0.0`.
pub fn percent_rank(values: &[Value]) -> Vec<Value> {
    let order = sorted_present(values);
    let n = order.len();
    let mut out = vec![Value::Missing; values.len()];
    for_each_tie_run(values, &order, |start, end| {
        let pct = if n <= 1 {
            0.0
        } else {
            start as f64 / (n - 1) as f64
        };
        for &i in &order[start..end] {
            out[i] = Value::Float(pct);
        }
    });
    out
}

/// Fraction of values less than or equal to each value.
pub fn cume_dist(values: &[Value]) -> Vec<Value> {
    let order = sorted_present(values);
    let n = order.len() as f64;
    let mut out = vec![Value::Missing; values.len()];
    for_each_tie_run(values, &order, |start, end| {
        for &i in &order[start..end] {
            out[i] = Value::Float(end as f64 / n);
        }
    });
    out
}

/// Splits the values into `buckets` groups of (nearly) equal size, in sorted
/// order. Earlier buckets take the extra rows.
pub fn ntile(values: &[Value], buckets: usize) -> Result<Vec<Value>, TableError> {
    if buckets == 0 {
        return Err(TableError::InvalidArgument(
            "ntile needs at least one bucket".to_string(),
        ));
    }
    let order = sorted_present(values);
    let len = order.len();
    let n_larger = len % buckets;
    let smaller_size = len / buckets;
    let larger_size = if n_larger > 0 {
        smaller_size + 1
    } else {
        smaller_size
    };
    let larger_threshold = larger_size * n_larger;

    let mut out = vec![Value::Missing; values.len()];
    for (pos, &i) in order.iter().enumerate() {
        let x = pos + 1;
        let bucket = if x <= larger_threshold {
            x.div_ceil(larger_size)
        } else {
            (x - larger_threshold).div_ceil(smaller_size) + n_larger
        };
        out[i] = rank_value(bucket);
    }
    Ok(out)
}

/// The value `k` positions earlier; missing for the first `k` rows.
pub fn lag(values: &[Value], k: usize) -> Vec<Value> {
    (0..values.len())
        .map(|i| {
            i.checked_sub(k)
                .map_or(Value::Missing, |j| values[j].clone())
        })
        .collect()
}

/// The value `k` positions later; missing for the last `k` rows.
pub fn lead(values: &[Value], k: usize) -> Vec<Value> {
    (0..values.len())
        .map(|i| {
            i.checked_add(k)
                .and_then(|j| values.get(j))
                .cloned()
                .unwrap_or(Value::Missing)
        })
        .collect()
}

/// Running sum. Integers (and booleans) stay integers unless a float is
/// present; everything after the first missing value is missing.
pub fn cumsum(values: &[Value]) -> Vec<Value> {
    let floats = values.iter().any(|v| matches!(v, Value::Float(_)));
    let mut out = Vec::with_capacity(values.len());
    let mut int_acc = Some(0_i64);
    let mut float_acc = 0.0;
    let mut poisoned = false;
    for v in values {
        poisoned |= v.is_missing();
        if poisoned {
            out.push(Value::Missing);
            continue;
        }
        if floats {
            float_acc += number(v).unwrap_or(f64::NAN);
            out.push(Value::Float(float_acc));
        } else {
            let x = match v {
                Value::Bool(b) => i64::from(*b),
                v => v.as_i64().unwrap_or_default(),
            };
            int_acc = int_acc.and_then(|acc| acc.checked_add(x));
            out.push(int_acc.map_or(Value::Missing, Value::Int));
        }
    }
    out
}

/// Running mean; everything after the first missing value is missing.
pub fn cummean(values: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(values.len());
    let mut acc = 0.0;
    let mut poisoned = false;
    for (i, v) in values.iter().enumerate() {
        poisoned |= v.is_missing();
        if poisoned {
            out.push(Value::Missing);
            continue;
        }
        acc += number(v).unwrap_or(f64::NAN);
        out.push(Value::Float(acc / (i + 1) as f64));
    }
    out
}

/// Numeric view of a value; booleans count as 0 and 1.
pub(crate) fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        v => v.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    fn floats(values: &[f64]) -> Vec<Value> {
        values.iter().copied().map(Value::Float).collect()
    }

    #[test]
    fn ranks_of_tied_values() {
        let x = ints(&[3, 4, 1, 3, 1]);
        assert_eq!(min_rank(&x), ints(&[3, 5, 1, 3, 1]));
        assert_eq!(dense_rank(&x), ints(&[2, 3, 1, 2, 1]));
        assert_eq!(row_number(&x), ints(&[3, 5, 1, 4, 2]));
        assert_eq!(percent_rank(&x), floats(&[0.5, 1.0, 0.0, 0.5, 0.0]));
        assert_eq!(cume_dist(&x), floats(&[0.8, 1.0, 0.4, 0.8, 0.4]));
    }

    #[test]
    fn missing_values_are_not_ranked() {
        let x = [Value::Int(2), Value::Missing, Value::Int(1)];
        assert_eq!(
            min_rank(&x),
            [Value::Int(2), Value::Missing, Value::Int(1)]
        );
        assert_eq!(
            percent_rank(&x),
            [Value::Float(1.0), Value::Missing, Value::Float(0.0)]
        );
    }

    #[test]
    fn ntile_puts_extra_rows_in_early_buckets() {
        let x = ints(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(ntile(&x, 3).unwrap(), ints(&[1, 1, 1, 2, 2, 3, 3]));
        assert_eq!(ntile(&x, 7).unwrap(), ints(&[1, 2, 3, 4, 5, 6, 7]));
        assert_eq!(ntile(&ints(&[1, 2]), 4).unwrap(), ints(&[1, 2]));
        assert!(ntile(&x, 0).is_err());
    }

    #[test]
    fn lag_and_lead_pad_with_missing() {
        let x = ints(&[1, 2, 3]);
        assert_eq!(lag(&x, 1), [Value::Missing, Value::Int(1), Value::Int(2)]);
        assert_eq!(lead(&x, 2), [Value::Int(3), Value::Missing, Value::Missing]);
        assert_eq!(lag(&x, 0), x);
    }

    #[test]
    fn running_totals_stop_at_missing() {
        let x = [Value::Int(1), Value::Int(2), Value::Missing, Value::Int(4)];
        assert_eq!(
            cumsum(&x),
            [Value::Int(1), Value::Int(3), Value::Missing, Value::Missing]
        );
        assert_eq!(cummean(&ints(&[1, 3])), floats(&[1.0, 2.0]));
    }
}
