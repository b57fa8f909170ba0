// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The grammar-generic visitor protocol.
//!
//! Unlike a listener, a visitor drives its own traversal: [`visit`]
//! dispatches on the kind of one node, and the callback decides whether to
//! recurse through [`visit_children`], visit selected children, or stop.
//! Results flow back up as values of the visitor's result type `R`.
//!
//! With no overrides, [`visit_children`] folds child results left to right:
//! it starts from [`default_result`](ParseTreeVisitor::default_result) and
//! combines with [`aggregate_result`](ParseTreeVisitor::aggregate_result),
//! which keeps the newest result unless overridden.

use crate::error::{CallbackResult, Phase, TraversalError};
use crate::grammar::Grammar;
use crate::node::{Node, NodeKind};

/// Callbacks invoked by [`visit`] and [`visit_children`].
#[allow(unused_variables)]
pub trait ParseTreeVisitor<G: Grammar, R> {
    /// Kind-specific dispatch for a `rule` node.
    fn visit_rule(&mut self, rule: G::Rule, node: &Node<G>) -> CallbackResult<R>;

    /// The "no result" value: the starting point of every fold.
    fn default_result(&mut self) -> R;

    /// Combine the result so far with the next child's result.
    fn aggregate_result(&mut self, aggregate: R, next: R) -> R {
        next
    }

    /// Whether to continue with the next child of `node`.
    fn should_visit_next_child(&mut self, node: &Node<G>, current: &R) -> bool {
        true
    }

    /// Called for terminals the parser accepted.
    fn visit_terminal(&mut self, node: &Node<G>) -> CallbackResult<R> {
        Ok(self.default_result())
    }

    /// Called for terminals produced by error recovery.
    fn visit_error_node(&mut self, node: &Node<G>) -> CallbackResult<R> {
        Ok(self.default_result())
    }

    /// Nodes deeper than this are rejected by [`visit`].
    fn max_depth(&self) -> Option<usize> {
        None
    }
}

/// Dispatch `visitor` on `node`.
///
/// A failing callback is reported with the location of the innermost node
/// whose callback failed.
pub fn visit<G, R, V>(visitor: &mut V, node: &Node<G>) -> Result<R, TraversalError>
where
    G: Grammar,
    V: ParseTreeVisitor<G, R> + ?Sized,
{
    if let Some(limit) = visitor.max_depth() {
        if node.depth() as usize > limit {
            return Err(TraversalError::depth_exceeded(node, limit));
        }
    }
    match node.kind() {
        NodeKind::Rule(rule) => visitor
            .visit_rule(rule, node)
            .map_err(|err| TraversalError::from_callback(Phase::Visit, node, err)),
        NodeKind::Token(_) if node.is_recovered() => visitor
            .visit_error_node(node)
            .map_err(|err| TraversalError::from_callback(Phase::ErrorNode, node, err)),
        NodeKind::Token(_) => visitor
            .visit_terminal(node)
            .map_err(|err| TraversalError::from_callback(Phase::Terminal, node, err)),
    }
}

/// Visit the children of `node` left to right and fold their results.
pub fn visit_children<G, R, V>(visitor: &mut V, node: &Node<G>) -> Result<R, TraversalError>
where
    G: Grammar,
    V: ParseTreeVisitor<G, R> + ?Sized,
{
    let mut result = visitor.default_result();
    for child in node.children() {
        if !visitor.should_visit_next_child(node, &result) {
            break;
        }
        let next = visit(visitor, child)?;
        result = visitor.aggregate_result(result, next);
    }
    Ok(result)
}
