// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax errors reported by the grammar layer.
//!
//! Syntax errors never abort parsing. The grammar layer records one, repairs
//! the tree (marking the repaired nodes as recovered) and carries on, so a
//! tree with errors can still be walked.

use serde::Serialize;
use thiserror::Error;

use crate::span::Span;

/// What the grammar layer did to get past a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// The lexer dropped a character that cannot start any token.
    SkippedCharacter,
    /// One statement was kept as error tokens; parsing resumed after it.
    DiscardedStatement,
    /// The whole input was kept as error tokens.
    DiscardedInput,
}

/// A located syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Error)]
#[error("{span}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub span: Span,
    /// What the grammar would have accepted at `span`.
    pub expected: String,
    /// Description of what was there instead.
    pub found: String,
    pub recovery: Recovery,
}

impl SyntaxError {
    pub fn new(
        span: Span,
        expected: impl Into<String>,
        found: impl Into<String>,
        recovery: Recovery,
    ) -> Self {
        Self {
            span,
            expected: expected.into(),
            found: found.into(),
            recovery,
        }
    }
}
