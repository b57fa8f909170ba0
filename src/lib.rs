// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Schemagram: parse trees for data-model definitions.
//!
//! Two grammars describe the inputs a data-model tool reads:
//!
//! - GenericSql `SELECT` statements ([`schemagram_sql`])
//! - the Python3Subset used to write model definitions
//!   ([`schemagram_python`])
//!
//! Both produce [`ParseTree`](schemagram_tree::ParseTree)s over the shared
//! node type of [`schemagram_tree`], which also provides the listener walker
//! and the visitor. This crate adds run-time grammar selection and the
//! `schemagram` command line tool.

pub use schemagram_python as python;
pub use schemagram_sql as sql;
pub use schemagram_tree as tree;

pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod output;
