// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parser configuration and the nesting bound shared by both grammars.
//!
//! The grammars are recursive-descent, so every nested expression or block
//! costs host stack. [`ParseOptions::max_nesting`] caps how many recursive
//! rules may be open at once; a [`NestingGuard`] enforces the cap while a
//! grammar runs and reports where it was first hit.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

/// Default for [`ParseOptions::max_nesting`].
pub const DEFAULT_MAX_NESTING: usize = 100;

/// Options controlling a parse.
///
/// # Example
///
/// ```
/// use schemagram_tree::ParseOptions;
///
/// let options = ParseOptions::default().with_max_nesting(32);
/// assert_eq!(options.max_nesting, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// How many nested expression or statement rules may be open at once.
    ///
    /// Input nested deeper fails with
    /// [`ParseError::DepthExceeded`](crate::ParseError::DepthExceeded).
    pub max_nesting: usize,
}

impl ParseOptions {
    pub const fn new() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    #[must_use]
    pub const fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// A guard enforcing these options during one parse.
    pub fn nesting_guard(&self) -> NestingGuard {
        NestingGuard::new(self.max_nesting)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts open recursive rules during one parse.
///
/// Grammars call [`enter`](Self::enter) before descending into a recursive
/// rule and [`leave`](Self::leave) once it returns. The first refusal is
/// remembered so the driver can turn a failed (or backtracked) parse into a
/// depth error at the right token.
#[derive(Debug)]
pub struct NestingGuard {
    depth: Cell<usize>,
    limit: usize,
    tripped_at: Cell<Option<usize>>,
}

impl NestingGuard {
    pub fn new(limit: usize) -> Self {
        Self {
            depth: Cell::new(0),
            limit,
            tripped_at: Cell::new(None),
        }
    }

    /// Open one nesting level at token `position`.
    pub fn enter(&self, position: usize) -> Result<(), &'static str> {
        let depth = self.depth.get();
        if depth >= self.limit {
            if self.tripped_at.get().is_none() {
                self.tripped_at.set(Some(position));
            }
            return Err("nesting within limit");
        }
        self.depth.set(depth + 1);
        Ok(())
    }

    /// Close the innermost nesting level.
    pub fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    /// Close `levels` levels at once, e.g. every step of a folded chain.
    pub fn leave_levels(&self, levels: usize) {
        self.depth.set(self.depth.get().saturating_sub(levels));
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Token position of the first refused `enter`, if any.
    pub fn tripped_at(&self) -> Option<usize> {
        self.tripped_at.get()
    }

    /// Forget the open levels, keeping any recorded refusal.
    pub fn reset_depth(&self) {
        self.depth.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_refuses_beyond_limit() {
        let guard = NestingGuard::new(2);
        assert!(guard.enter(0).is_ok());
        assert!(guard.enter(1).is_ok());
        assert!(guard.enter(5).is_err());
        assert!(guard.enter(7).is_err());
        assert_eq!(guard.tripped_at(), Some(5));
        guard.leave();
        assert!(guard.enter(8).is_ok());
    }

    #[test]
    fn test_leave_levels_closes_a_chain() {
        let guard = NestingGuard::new(3);
        for position in 0..3 {
            assert!(guard.enter(position).is_ok());
        }
        guard.leave_levels(2);
        assert!(guard.enter(3).is_ok());
        assert!(guard.enter(4).is_err());
        guard.leave_levels(10);
        assert!(guard.enter(5).is_ok());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ParseOptions::default());
        let options: ParseOptions = serde_json::from_str(r#"{"max_nesting": 8}"#).unwrap();
        assert_eq!(options.max_nesting, 8);
    }
}
