// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The GenericSql grammar.
//!
//! GenericSql covers the single `SELECT` statements that appear inside schema
//! definitions:
//!
//! ```text
//! SELECT a.x AS y, count(b), CAST(c AS int) FROM schema.table t
//! WHERE a.x > 1 AND c IS NOT NULL
//! ```
//!
//! [`parse`] produces a [`ParseTree<GenericSql>`](schemagram_tree::ParseTree).
//! Implement [`SqlListener`] and run it with [`walk`], or implement
//! [`SqlVisitor`] and run it with [`visit`]. Both traits only require the
//! callbacks a pass actually uses.
//!
//! # Example
//!
//! ```
//! use schemagram_sql::{parse, walk, GenericSql, SqlListener};
//! use schemagram_tree::{CallbackResult, WalkContext};
//!
//! #[derive(Default)]
//! struct Identifiers(Vec<String>);
//!
//! impl SqlListener for Identifiers {
//!     fn enter_identifier(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
//!         self.0.push(ctx.node().text());
//!         Ok(())
//!     }
//! }
//!
//! let tree = parse("SELECT a.x AS y FROM t").unwrap();
//! let mut identifiers = Identifiers::default();
//! walk(tree.root(), &mut [&mut identifiers]).unwrap();
//! assert_eq!(identifiers.0, ["a", "x", "y", "t"]);
//! ```

mod collect;
mod kinds;
mod lexer;
mod parser;
mod roles;

pub use collect::{FieldCollector, IdPathCollector, SelectedField, TableRef};
pub use kinds::{
    visit, visit_children, walk, walk_with, GenericSql, SqlListener, SqlListenerAdapter, SqlNode,
    SqlRule, SqlToken, SqlVisitor, SqlVisitorAdapter,
};
pub use lexer::{tokenize, SqlLexeme};
pub use parser::{parse, parse_with_options};
pub use roles::SqlRoles;
