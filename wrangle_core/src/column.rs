// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named, typed columns.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::{DataType, TableError, Value};

/// A named column of values sharing one [`DataType`].
///
/// Every non-missing value in `values` has type `dtype`. A column of only
/// missing values may carry any type; columns built by inference use `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DataType,
    values: Vec<Value>,
}

impl Column {
    /// Builds a column, inferring its type from the values.
    ///
    /// Integers mixed with floats are widened to floats. Any other mix of
    /// types fails with [`TableError::TypeMismatch`].
    pub fn from_values<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, TableError> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let mut dtype = DataType::Null;
        for v in &values {
            dtype = dtype
                .supertype(v.dtype())
                .ok_or(TableError::TypeMismatch {
                    op: "column",
                    found: v.dtype(),
                })?;
        }
        Self::typed(name, dtype, values)
    }

    /// Builds a column with an explicit type.
    ///
    /// Integers are widened when `dtype` is `Float`; any other value whose type
    /// differs from `dtype` fails with [`TableError::TypeMismatch`].
    pub fn typed(
        name: impl Into<String>,
        dtype: DataType,
        values: Vec<Value>,
    ) -> Result<Self, TableError> {
        let mut out = Vec::with_capacity(values.len());
        for v in values {
            let v = v.cast(dtype);
            let found = v.dtype();
            if found != DataType::Null && found != dtype {
                return Err(TableError::TypeMismatch {
                    op: "column",
                    found,
                });
            }
            out.push(v);
        }
        Ok(Self {
            name: name.into(),
            dtype,
            values: out,
        })
    }

    /// A column of `len` missing values of type `dtype`.
    pub fn full_missing(name: impl Into<String>, dtype: DataType, len: usize) -> Self {
        Self {
            name: name.into(),
            dtype,
            values: vec![Value::Missing; len],
        }
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column type.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// The values, in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the column, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `row`.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Returns the same column under a new name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Gathers the values at `indices` (which must be in bounds).
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            dtype: self.dtype,
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }

    /// Gathers the values at `indices`, producing missing for `None`.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> Self {
        Self {
            name: self.name.clone(),
            dtype: self.dtype,
            values: indices
                .iter()
                .map(|i| i.map_or(Value::Missing, |i| self.values[i].clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn infers_and_widens() {
        let c = Column::from_values("x", [Value::Int(1), Value::Float(2.5)]).unwrap();
        assert_eq!(c.dtype(), DataType::Float);
        assert_eq!(c.values(), &[Value::Float(1.0), Value::Float(2.5)]);

        let c = Column::from_values("x", [None::<i64>, None]).unwrap();
        assert_eq!(c.dtype(), DataType::Null);
        assert_eq!(c.missing_count(), 2);
    }

    #[test]
    fn rejects_mixed_strings_and_numbers() {
        let err = Column::from_values("x", [Value::from("a"), Value::Int(1)]).unwrap_err();
        assert_eq!(
            err,
            TableError::TypeMismatch {
                op: "column",
                found: DataType::Int
            }
        );
    }

    #[test]
    fn take_opt_pads_with_missing() {
        let c = Column::from_values("x", [1, 2, 3]).unwrap();
        let t = c.take_opt(&[Some(2), None, Some(0)]);
        assert_eq!(t.values(), &[Value::Int(3), Value::Missing, Value::Int(1)]);
        assert_eq!(t.dtype(), DataType::Int);
    }
}
