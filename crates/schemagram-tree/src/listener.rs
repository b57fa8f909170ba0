// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The grammar-generic listener protocol.
//!
//! A listener is a passive observer of a walk: the
//! [`ParseTreeWalker`](crate::ParseTreeWalker) decides the traversal order and
//! calls back into every attached listener. Grammar crates generate a
//! friendlier per-kind trait (`enter_query`, `exit_if_stmt`, ...) on top of
//! this one with [`grammar_dispatch!`](crate::grammar_dispatch); implement
//! this trait directly for passes that work with any grammar.

use crate::error::CallbackResult;
use crate::grammar::Grammar;
use crate::node::Node;

/// Callbacks invoked by the walker.
///
/// Every method defaults to a no-op, except the per-rule hooks which
/// grammar-specific adapters route to `enter_<kind>`/`exit_<kind>`.
#[allow(unused_variables)]
pub trait ParseTreeListener<G: Grammar> {
    /// Called on every rule node, before [`enter_rule`](Self::enter_rule).
    fn enter_every_rule(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        Ok(())
    }

    /// Called on every rule node, after [`exit_rule`](Self::exit_rule).
    fn exit_every_rule(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        Ok(())
    }

    /// Called on every terminal the parser accepted.
    fn visit_terminal(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        Ok(())
    }

    /// Called on every terminal produced by error recovery.
    fn visit_error_node(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        Ok(())
    }

    /// Kind-specific hook run before the children of a `rule` node.
    fn enter_rule(&mut self, rule: G::Rule, ctx: &WalkContext<'_, G>) -> CallbackResult {
        Ok(())
    }

    /// Kind-specific hook run after the children of a `rule` node.
    fn exit_rule(&mut self, rule: G::Rule, ctx: &WalkContext<'_, G>) -> CallbackResult {
        Ok(())
    }
}

/// What a listener callback can see of the walk in progress.
///
/// The ancestor path is owned by the walker and only lent out for the
/// duration of one callback.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a, G: Grammar> {
    node: &'a Node<G>,
    ancestors: &'a [&'a Node<G>],
}

impl<'a, G: Grammar> WalkContext<'a, G> {
    pub fn new(node: &'a Node<G>, ancestors: &'a [&'a Node<G>]) -> Self {
        Self { node, ancestors }
    }

    /// The node being entered, exited or visited.
    pub fn node(&self) -> &'a Node<G> {
        self.node
    }

    pub fn parent(&self) -> Option<&'a Node<G>> {
        self.ancestors.last().copied()
    }

    /// Ancestors from the root down to the parent.
    pub fn ancestors(&self) -> &'a [&'a Node<G>] {
        self.ancestors
    }

    /// Number of ancestors; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Whether any ancestor is a `rule` node.
    pub fn within(&self, rule: G::Rule) -> bool {
        self.nearest(rule).is_some()
    }

    /// The closest ancestor that is a `rule` node.
    pub fn nearest(&self, rule: G::Rule) -> Option<&'a Node<G>> {
        self.ancestors.iter().rev().copied().find(|node| node.is(rule))
    }
}
