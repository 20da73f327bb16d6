// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tidy-style table verbs.
//!
//! This crate provides:
//! - an expression language ([`Expr`]) for predicates, computed columns and
//!   summaries,
//! - the verbs themselves, as extension traits on [`Table`](wrangle_core::Table):
//!   [`TableVerbs`] (select, filter, mutate, arrange, summarize, ...),
//!   [`JoinOps`] (the six relational joins) and [`PivotOps`] (long/wide
//!   reshaping), plus [`GroupedTable`] for per-group work,
//! - free functions for binding ([`bind_rows`], [`bind_cols`]) and ranking
//!   ([`window`]), and
//! - a small transform IR ([`Transform`]) with a full-recompute executor
//!   ([`Program`]).
//!
//! ```
//! use wrangle_core::{table, Value};
//! use wrangle_transforms::{TableVerbs, n};
//!
//! let t = table! { "g" => [1, 1, 2], "x" => [3, 4, 1] }.unwrap();
//! let counts = t.group_by(["g"]).and_then(|g| g.summarize([("n", n())])).unwrap();
//! assert_eq!(counts.pull("n").unwrap(), [Value::Int(2), Value::Int(1)]);
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod arrange;
mod bind;
mod eval;
mod expr;
#[cfg(not(feature = "std"))]
mod float;
mod group;
mod join;
mod mutate;
mod pivot;
mod program;
mod select;
mod transform;
mod verbs;
pub mod window;

pub use arrange::{SortKey, asc, desc};
pub use bind::{bind_cols, bind_rows};
pub use expr::{
    AggFunc, BinaryOp, Expr, UnaryOp, WindowFunc, case_when, coalesce, col, if_else, lit, n,
    row_number,
};
pub use group::GroupedTable;
pub use join::{JoinKey, JoinKind, JoinOps, JoinOptions};
pub use pivot::{PivotLongerSpec, PivotOps, PivotWiderSpec};
pub use program::{ExecutionError, Program, ProgramOutput};
pub use select::Selector;
pub use transform::{SortOrder, Transform};
pub use verbs::{AsTable, TableVerbs};
