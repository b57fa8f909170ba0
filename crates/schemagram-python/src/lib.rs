// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The Python3Subset grammar.
//!
//! Python3Subset is the Python 3 syntax used to write data-model
//! definitions, extended with template strings whose `{...}` holes hold
//! ordinary expressions:
//!
//! ```text
//! @model(sql=f"SELECT * FROM {schema}.orders")
//! class Orders:
//!     if owner:
//!         status = "open"
//!     else:
//!         status = "closed"
//! ```
//!
//! Three entry points mirror the three start rules: [`parse_file`] for a
//! module, [`parse_single`] for one interactive statement and
//! [`parse_eval`] for an expression list. Each builds a
//! [`ParseTree<Python3Subset>`](schemagram_tree::ParseTree) in which every
//! grammar rule that matched has a node.
//!
//! Implement [`PyListener`] and run it with [`walk`], or implement
//! [`PyVisitor`] and run it with [`visit`].
//!
//! # Example
//!
//! ```
//! use schemagram_python::{parse_file, walk, PyListener, PyRoles, Python3Subset};
//! use schemagram_tree::{CallbackResult, WalkContext};
//!
//! #[derive(Default)]
//! struct Conditions(Vec<String>);
//!
//! impl PyListener for Conditions {
//!     fn enter_if_stmt(&mut self, ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
//!         self.0.extend(ctx.node().conditions().iter().map(|test| test.text()));
//!         Ok(())
//!     }
//! }
//!
//! let tree = parse_file("if a:\n    pass\nelif b.c:\n    pass\n").unwrap();
//! let mut conditions = Conditions::default();
//! walk(tree.root(), &mut [&mut conditions]).unwrap();
//! assert_eq!(conditions.0, ["a", "b.c"]);
//! ```

mod collect;
mod kinds;
mod lexer;
mod parser;
mod roles;

pub use collect::{
    Definition, DefinitionCollector, DefinitionKind, NameCollector, NameRef, SuiteTracker,
    SuiteVisit,
};
pub use kinds::{
    visit, visit_children, walk, walk_with, PyListener, PyListenerAdapter, PyNode, PyRule,
    PyToken, PyVisitor, PyVisitorAdapter, Python3Subset,
};
pub use lexer::{tokenize, PyLexeme};
pub use parser::{
    parse_eval, parse_eval_with_options, parse_file, parse_file_with_options, parse_single,
    parse_single_with_options,
};
pub use roles::PyRoles;
