// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Errors raised while parsing and while traversing trees.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::grammar::Grammar;
use crate::node::Node;
use crate::span::Span;

/// Error type returned by consumer callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of listener and visitor callbacks.
pub type CallbackResult<T = ()> = Result<T, BoxError>;

/// The callback position in which a traversal failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Enter,
    Exit,
    Terminal,
    ErrorNode,
    Visit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Enter => "enter",
            Phase::Exit => "exit",
            Phase::Terminal => "terminal",
            Phase::ErrorNode => "error-node",
            Phase::Visit => "visit",
        })
    }
}

/// A walk or visit that did not complete.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// A listener or visitor callback returned an error.
    #[error("{phase} callback failed on `{kind}` at {span}: {source}")]
    Callback {
        phase: Phase,
        kind: &'static str,
        span: Span,
        #[source]
        source: BoxError,
    },
    /// A node lies deeper than the configured traversal bound.
    #[error("`{kind}` at {span} has depth {depth}, beyond the limit of {limit}")]
    DepthExceeded {
        depth: usize,
        limit: usize,
        kind: &'static str,
        span: Span,
    },
}

impl TraversalError {
    /// Wrap a callback failure with the location of `node`.
    ///
    /// A failure that already is a `TraversalError` (raised by a nested
    /// `visit`) passes through unchanged, so the innermost location wins.
    pub fn from_callback<G: Grammar>(phase: Phase, node: &Node<G>, error: BoxError) -> Self {
        match error.downcast::<TraversalError>() {
            Ok(inner) => *inner,
            Err(source) => TraversalError::Callback {
                phase,
                kind: node.kind().name(),
                span: node.span(),
                source,
            },
        }
    }

    pub(crate) fn depth_exceeded<G: Grammar>(node: &Node<G>, limit: usize) -> Self {
        TraversalError::DepthExceeded {
            depth: node.depth() as usize,
            limit,
            kind: node.kind().name(),
            span: node.span(),
        }
    }

    /// Name of the node kind at which traversal stopped.
    pub fn kind(&self) -> &'static str {
        match self {
            TraversalError::Callback { kind, .. } | TraversalError::DepthExceeded { kind, .. } => {
                *kind
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TraversalError::Callback { span, .. } | TraversalError::DepthExceeded { span, .. } => {
                *span
            }
        }
    }
}

/// Parsing that could not produce a tree at all.
///
/// Ordinary syntax errors are not `ParseError`s: they are recovered from and
/// reported through [`ParseTree::errors`](crate::ParseTree::errors).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Rules nested deeper than [`ParseOptions::max_nesting`](crate::ParseOptions).
    #[error("nesting exceeds the limit of {limit} at {span}")]
    DepthExceeded { limit: usize, span: Span },
    /// Offsets of the input do not fit a [`Span`].
    #[error("input of {len} bytes is too large to parse")]
    InputTooLarge { len: usize },
}
