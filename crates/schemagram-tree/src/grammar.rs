// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar identity and the closed kind sets of each grammar.
//!
//! Every grammar is a zero-sized marker type implementing [`Grammar`]. The
//! marker names two enums: the rule kinds produced by the parser and the
//! token kinds produced by the lexer. Trees, listeners and visitors are all
//! parameterized by the marker, so a listener written for one grammar can
//! never be handed a node of another.
//!
//! Grammar crates normally do not implement these traits by hand; the
//! [`grammar_dispatch!`](crate::grammar_dispatch) macro emits the marker,
//! the rule enum and the listener/visitor traits together.

use std::fmt::Debug;
use std::hash::Hash;

/// The closed set of rule (nonterminal) kinds of one grammar.
pub trait RuleKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every rule kind, in declaration order.
    const ALL: &'static [Self];

    /// The rule name as written in the grammar, e.g. `"idPath"`.
    fn name(self) -> &'static str;

    /// Position of this kind in [`ALL`](Self::ALL).
    fn index(self) -> usize;
}

/// The closed set of token (terminal) kinds of one grammar.
pub trait TokenKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// The token name, e.g. `"ID"` or `"'('"`.
    fn name(self) -> &'static str;
}

/// A grammar: the marker type tying rule kinds and token kinds together.
pub trait Grammar: Copy + Eq + Hash + Debug + Default + Send + Sync + 'static {
    /// Display name of the grammar.
    const NAME: &'static str;

    type Rule: RuleKind;
    type Token: TokenKind;
}
