// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parse-tree core shared by the schemagram grammars.
//!
//! This crate knows nothing about SQL or Python. It defines:
//!
//! - **Trees**: [`Node`], [`ParseTree`], [`Span`], built by a grammar layer
//!   with [`RuleBuilder`] and immutable afterwards
//! - **Grammars**: the [`Grammar`], [`RuleKind`] and [`TokenKind`] traits,
//!   plus [`grammar_dispatch!`] which generates a grammar's listener and
//!   visitor traits from its rule table
//! - **Listeners**: [`ParseTreeListener`] callbacks driven by
//!   [`ParseTreeWalker`] in a fixed depth-first order
//! - **Visitors**: [`ParseTreeVisitor`] callbacks driven by [`visit`] and
//!   [`visit_children`], returning values of the visitor's choice
//! - **Errors**: [`SyntaxError`] (recovered, reported with the tree),
//!   [`ParseError`] (no tree) and [`TraversalError`] (walk or visit stopped)
//!
//! # Example
//!
//! ```
//! use schemagram_tree::{walk, Grammar, ParseTreeListener, WalkContext, CallbackResult};
//!
//! /// Counts rule nodes in a tree of any grammar.
//! #[derive(Default)]
//! struct RuleCounter(usize);
//!
//! impl<G: Grammar> ParseTreeListener<G> for RuleCounter {
//!     fn enter_every_rule(&mut self, _ctx: &WalkContext<'_, G>) -> CallbackResult {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//! ```

mod dispatch;
mod error;
mod grammar;
mod lexeme;
mod listener;
mod node;
mod options;
mod span;
mod syntax;
mod tree;
mod visitor;
mod walker;

pub use error::{BoxError, CallbackResult, ParseError, Phase, TraversalError};
pub use grammar::{Grammar, RuleKind, TokenKind};
pub use lexeme::{Lexeme, Mark, TextCursor};
pub use listener::{ParseTreeListener, WalkContext};
pub use node::{Descendants, Node, NodeKind, RuleBuilder, MAX_SERIALIZED_HEIGHT};
pub use options::{NestingGuard, ParseOptions, DEFAULT_MAX_NESTING};
pub use span::Span;
pub use syntax::{Recovery, SyntaxError};
pub use tree::ParseTree;
pub use visitor::{visit, visit_children, ParseTreeVisitor};
pub use walker::{walk, ParseTreeWalker};

#[doc(hidden)]
pub use paste as __paste;
