// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column expressions.
//!
//! An [`Expr`] describes how to compute a column (or a single summary value)
//! from the columns of a table. Expressions are evaluated per group: in an
//! ungrouped table the whole table is one group.
//!
//! ```
//! use wrangle_transforms::{col, lit};
//!
//! // Minutes late, relative to the group average.
//! let e = col("arr_delay") - col("arr_delay").mean().skip_missing();
//! let p = col("month").eq(lit(1)).and(col("day").eq(lit(1)));
//! # let _ = (e, p);
//! ```

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops;

use wrangle_core::Value;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (always produces floats)
    Div,
    /// Floored integer division (`%/%`).
    IntDiv,
    /// Floored modulo (`%%`).
    Rem,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// Three-valued logical and.
    And,
    /// Three-valued logical or.
    Or,
}

impl BinaryOp {
    /// A short symbol used in error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::IntDiv => "%/%",
            Self::Rem => "%%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&",
            Self::Or => "|",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Three-valued logical not.
    Not,
    /// `true` where the input is missing.
    IsMissing,
}

/// Functions that collapse a group to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// Sum (booleans count `true`s).
    Sum,
    /// Arithmetic mean (booleans give the proportion of `true`s).
    Mean,
    /// Median.
    Median,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Sample standard deviation.
    Sd,
    /// Sample variance.
    Var,
    /// First value.
    First,
    /// Last value.
    Last,
    /// Number of distinct non-missing values.
    NDistinct,
}

impl AggFunc {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sd => "sd",
            Self::Var => "var",
            Self::First => "first",
            Self::Last => "last",
            Self::NDistinct => "n_distinct",
        }
    }
}

/// Functions producing one value per row, computed within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunc {
    /// Position in sort order; ties keep original order.
    RowNumber,
    /// Ties share the lowest rank.
    MinRank,
    /// Ties share a rank, no gaps.
    DenseRank,
    /// `min_rank` rescaled to `[0, 1]`.
    PercentRank,
    /// Fraction of values less than or equal to the current one.
    CumeDist,
    /// Bucket number among `n` roughly equal buckets.
    Ntile(usize),
    /// Value `k` rows earlier.
    Lag(usize),
    /// Value `k` rows later.
    Lead(usize),
    /// Running sum.
    CumSum,
    /// Running mean.
    CumMean,
}

/// A column expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A column of the input table.
    Column(String),
    /// A constant.
    Literal(Value),
    /// A binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },
    /// A unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        input: Box<Self>,
    },
    /// Number of rows in the group.
    Count,
    /// An aggregation.
    Aggregate {
        /// Function to apply.
        func: AggFunc,
        /// Input values.
        input: Box<Self>,
        /// Ignore missing inputs instead of propagating them.
        skip_missing: bool,
    },
    /// A window function. `input` is `None` only for a plain `row_number()`.
    Window {
        /// Function to apply.
        func: WindowFunc,
        /// Input values.
        input: Option<Box<Self>>,
    },
    /// Vectorised `if`/`else`.
    IfElse {
        /// Condition; missing yields missing.
        condition: Box<Self>,
        /// Value where the condition is true.
        then: Box<Self>,
        /// Value where the condition is false.
        otherwise: Box<Self>,
    },
    /// First matching branch wins, top to bottom.
    CaseWhen {
        /// `(condition, value)` pairs.
        branches: Vec<(Self, Self)>,
        /// Value where no condition is true.
        default: Box<Self>,
    },
    /// Replaces values found in `mapping`.
    Recode {
        /// Input values.
        input: Box<Self>,
        /// `(from, to)` pairs.
        mapping: Vec<(Value, Value)>,
        /// Replacement for unmapped values; `None` keeps them.
        default: Option<Value>,
    },
    /// Set membership.
    IsIn {
        /// Input values.
        input: Box<Self>,
        /// The set.
        values: Vec<Value>,
    },
    /// First non-missing value across the inputs.
    Coalesce(Vec<Self>),
}

/// A reference to a column.
pub fn col(name: &str) -> Expr {
    Expr::Column(name.into())
}

/// A constant.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// The number of rows in the current group.
pub fn n() -> Expr {
    Expr::Count
}

/// Row position within the current group (1-based).
pub fn row_number() -> Expr {
    Expr::Window {
        func: WindowFunc::RowNumber,
        input: None,
    }
}

/// Vectorised conditional.
pub fn if_else(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::IfElse {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    }
}

/// Multi-branch conditional; the first true condition wins.
pub fn case_when(branches: impl IntoIterator<Item = (Expr, Expr)>, default: Expr) -> Expr {
    Expr::CaseWhen {
        branches: branches.into_iter().collect(),
        default: Box::new(default),
    }
}

/// First non-missing value among `exprs`, per row.
pub fn coalesce(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Coalesce(exprs.into_iter().collect())
}

impl Expr {
    fn binary(self, op: BinaryOp, other: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    fn aggregate(self, func: AggFunc) -> Self {
        Self::Aggregate {
            func,
            input: Box::new(self),
            skip_missing: false,
        }
    }

    fn window(self, func: WindowFunc) -> Self {
        Self::Window {
            func,
            input: Some(Box::new(self)),
        }
    }

    /// `self == other`
    #[allow(
        clippy::should_implement_trait,
        reason = "builds an expression, not a comparison"
    )]
    pub fn eq(self, other: Self) -> Self {
        self.binary(BinaryOp::Eq, other)
    }

    /// `self != other`
    pub fn neq(self, other: Self) -> Self {
        self.binary(BinaryOp::NotEq, other)
    }

    /// `self < other`
    pub fn lt(self, other: Self) -> Self {
        self.binary(BinaryOp::Lt, other)
    }

    /// `self <= other`
    pub fn lt_eq(self, other: Self) -> Self {
        self.binary(BinaryOp::LtEq, other)
    }

    /// `self > other`
    pub fn gt(self, other: Self) -> Self {
        self.binary(BinaryOp::Gt, other)
    }

    /// `self >= other`
    pub fn gt_eq(self, other: Self) -> Self {
        self.binary(BinaryOp::GtEq, other)
    }

    /// `lo <= self & self <= hi`
    pub fn between(self, lo: Self, hi: Self) -> Self {
        self.clone().gt_eq(lo).and(self.lt_eq(hi))
    }

    /// Three-valued `&`.
    pub fn and(self, other: Self) -> Self {
        self.binary(BinaryOp::And, other)
    }

    /// Three-valued `|`.
    pub fn or(self, other: Self) -> Self {
        self.binary(BinaryOp::Or, other)
    }

    /// Floored integer division.
    pub fn int_div(self, other: Self) -> Self {
        self.binary(BinaryOp::IntDiv, other)
    }

    /// `true` where the value is missing.
    pub fn is_missing(self) -> Self {
        Self::Unary {
            op: UnaryOp::IsMissing,
            input: Box::new(self),
        }
    }

    /// Membership in a set of constants.
    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        Self::IsIn {
            input: Box::new(self),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Replaces missing values with `value`.
    pub fn fill_missing(self, value: impl Into<Value>) -> Self {
        coalesce([self, lit(value)])
    }

    /// Replaces values present in `mapping`; others are kept, or replaced by
    /// `default` when one is given. Unmapped missing values stay missing.
    pub fn recode<F: Into<Value>, T: Into<Value>>(
        self,
        mapping: impl IntoIterator<Item = (F, T)>,
        default: Option<Value>,
    ) -> Self {
        Self::Recode {
            input: Box::new(self),
            mapping: mapping
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
            default,
        }
    }

    /// Sum of the group.
    pub fn sum(self) -> Self {
        self.aggregate(AggFunc::Sum)
    }

    /// Mean of the group.
    pub fn mean(self) -> Self {
        self.aggregate(AggFunc::Mean)
    }

    /// Median of the group.
    pub fn median(self) -> Self {
        self.aggregate(AggFunc::Median)
    }

    /// Minimum of the group.
    pub fn min(self) -> Self {
        self.aggregate(AggFunc::Min)
    }

    /// Maximum of the group.
    pub fn max(self) -> Self {
        self.aggregate(AggFunc::Max)
    }

    /// Sample standard deviation of the group.
    pub fn sd(self) -> Self {
        self.aggregate(AggFunc::Sd)
    }

    /// Sample variance of the group.
    pub fn var(self) -> Self {
        self.aggregate(AggFunc::Var)
    }

    /// First value of the group.
    pub fn first(self) -> Self {
        self.aggregate(AggFunc::First)
    }

    /// Last value of the group.
    pub fn last(self) -> Self {
        self.aggregate(AggFunc::Last)
    }

    /// Number of distinct non-missing values in the group.
    pub fn n_distinct(self) -> Self {
        self.aggregate(AggFunc::NDistinct)
    }

    /// Makes an aggregation ignore missing inputs.
    ///
    /// Has no effect on other expressions.
    pub fn skip_missing(self) -> Self {
        match self {
            Self::Aggregate { func, input, .. } => Self::Aggregate {
                func,
                input,
                skip_missing: true,
            },
            other => other,
        }
    }

    /// Row number in the order of this expression (ties keep row order).
    pub fn row_number(self) -> Self {
        self.window(WindowFunc::RowNumber)
    }

    /// Rank with ties sharing the lowest rank.
    pub fn min_rank(self) -> Self {
        self.window(WindowFunc::MinRank)
    }

    /// Rank with ties sharing a rank and no gaps.
    pub fn dense_rank(self) -> Self {
        self.window(WindowFunc::DenseRank)
    }

    /// `min_rank` rescaled to `[0, 1]`.
    pub fn percent_rank(self) -> Self {
        self.window(WindowFunc::PercentRank)
    }

    /// Cumulative distribution.
    pub fn cume_dist(self) -> Self {
        self.window(WindowFunc::CumeDist)
    }

    /// Bucket number among `buckets` roughly equal buckets.
    pub fn ntile(self, buckets: usize) -> Self {
        self.window(WindowFunc::Ntile(buckets))
    }

    /// The value `k` rows earlier.
    pub fn lag(self, k: usize) -> Self {
        self.window(WindowFunc::Lag(k))
    }

    /// The value `k` rows later.
    pub fn lead(self, k: usize) -> Self {
        self.window(WindowFunc::Lead(k))
    }

    /// Running sum.
    pub fn cumsum(self) -> Self {
        self.window(WindowFunc::CumSum)
    }

    /// Running mean.
    pub fn cummean(self) -> Self {
        self.window(WindowFunc::CumMean)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl ops::$trait for Expr {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                self.binary(BinaryOp::$op, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);
impl_binary_op!(Rem, rem, Rem);

impl ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::Unary {
            op: UnaryOp::Neg,
            input: Box::new(self),
        }
    }
}

impl ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            input: Box::new(self),
        }
    }
}
