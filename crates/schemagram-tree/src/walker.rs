// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Depth-first listener walks.
//!
//! The traversal order is fixed:
//!
//! - **Pre-order**: `enter_every_rule` then `enter_<kind>` before the children
//! - **Post-order**: `exit_<kind>` then `exit_every_rule` after the children
//! - **Source order**: children are walked left to right
//! - **Attachment order**: at every event, listeners run in the order given
//!
//! Terminals get `visit_terminal`, or `visit_error_node` when they were
//! produced by error recovery. The walk uses an explicit frame stack, so tree
//! height never translates into host-stack depth.

use crate::error::{Phase, TraversalError};
use crate::grammar::Grammar;
use crate::listener::{ParseTreeListener, WalkContext};
use crate::node::{Node, NodeKind};

/// Walks trees, notifying listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseTreeWalker {
    max_depth: Option<usize>,
}

/// One open rule node: the node and the index of its next child.
struct Frame<'t, G: Grammar> {
    node: &'t Node<G>,
    rule: G::Rule,
    next_child: usize,
}

impl ParseTreeWalker {
    /// A walker without a depth bound.
    pub const fn new() -> Self {
        Self { max_depth: None }
    }

    /// Refuse to descend into nodes deeper than `limit`.
    #[must_use]
    pub const fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Walk the subtree at `root`, notifying `listeners` in order.
    ///
    /// Stops at the first failing callback. Whatever listeners accumulated
    /// before the failure is left as it is.
    pub fn walk<G: Grammar>(
        &self,
        root: &Node<G>,
        listeners: &mut [&mut dyn ParseTreeListener<G>],
    ) -> Result<(), TraversalError> {
        let mut path: Vec<&Node<G>> = Vec::new();
        let mut stack: Vec<Frame<'_, G>> = Vec::new();
        let mut events = 0usize;

        match root.kind() {
            NodeKind::Token(_) => {
                self.check_depth(root, 0)?;
                return terminal(listeners, root, &path);
            }
            NodeKind::Rule(rule) => {
                self.check_depth(root, 0)?;
                enter(listeners, rule, root, &path)?;
                stack.push(Frame {
                    node: root,
                    rule,
                    next_child: 0,
                });
                path.push(root);
            }
        }

        while let Some(frame) = stack.last_mut() {
            let parent: &Node<G> = frame.node;
            let index = frame.next_child;
            let Some(child) = parent.children().get(index) else {
                let rule = frame.rule;
                stack.pop();
                path.pop();
                exit(listeners, rule, parent, &path)?;
                continue;
            };
            frame.next_child += 1;
            events += 1;

            match child.kind() {
                NodeKind::Token(_) => {
                    self.check_depth(child, path.len())?;
                    terminal(listeners, child, &path)?;
                }
                NodeKind::Rule(rule) => {
                    self.check_depth(child, path.len())?;
                    enter(listeners, rule, child, &path)?;
                    stack.push(Frame {
                        node: child,
                        rule,
                        next_child: 0,
                    });
                    path.push(child);
                }
            }
        }

        tracing::trace!(grammar = G::NAME, nodes = events + 1, "walk complete");
        Ok(())
    }

    fn check_depth<G: Grammar>(&self, node: &Node<G>, depth: usize) -> Result<(), TraversalError> {
        match self.max_depth {
            Some(limit) if depth > limit => Err(TraversalError::DepthExceeded {
                depth,
                limit,
                kind: node.kind().name(),
                span: node.span(),
            }),
            _ => Ok(()),
        }
    }
}

fn enter<G: Grammar>(
    listeners: &mut [&mut dyn ParseTreeListener<G>],
    rule: G::Rule,
    node: &Node<G>,
    path: &[&Node<G>],
) -> Result<(), TraversalError> {
    let ctx = WalkContext::new(node, path);
    for listener in listeners.iter_mut() {
        listener
            .enter_every_rule(&ctx)
            .and_then(|()| listener.enter_rule(rule, &ctx))
            .map_err(|err| TraversalError::from_callback(Phase::Enter, node, err))?;
    }
    Ok(())
}

fn exit<G: Grammar>(
    listeners: &mut [&mut dyn ParseTreeListener<G>],
    rule: G::Rule,
    node: &Node<G>,
    path: &[&Node<G>],
) -> Result<(), TraversalError> {
    let ctx = WalkContext::new(node, path);
    for listener in listeners.iter_mut() {
        listener
            .exit_rule(rule, &ctx)
            .and_then(|()| listener.exit_every_rule(&ctx))
            .map_err(|err| TraversalError::from_callback(Phase::Exit, node, err))?;
    }
    Ok(())
}

fn terminal<G: Grammar>(
    listeners: &mut [&mut dyn ParseTreeListener<G>],
    node: &Node<G>,
    path: &[&Node<G>],
) -> Result<(), TraversalError> {
    let ctx = WalkContext::new(node, path);
    let phase = if node.is_recovered() {
        Phase::ErrorNode
    } else {
        Phase::Terminal
    };
    for listener in listeners.iter_mut() {
        let outcome = match phase {
            Phase::ErrorNode => listener.visit_error_node(&ctx),
            _ => listener.visit_terminal(&ctx),
        };
        outcome.map_err(|err| TraversalError::from_callback(phase, node, err))?;
    }
    Ok(())
}

/// Walk `root` with the default walker.
pub fn walk<G: Grammar>(
    root: &Node<G>,
    listeners: &mut [&mut dyn ParseTreeListener<G>],
) -> Result<(), TraversalError> {
    ParseTreeWalker::new().walk(root, listeners)
}
