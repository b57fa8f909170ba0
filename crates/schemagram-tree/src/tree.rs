// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The sealed result of parsing: a root node plus the syntax errors found.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::grammar::Grammar;
use crate::node::Node;
use crate::syntax::SyntaxError;

/// A complete parse tree for grammar `G`.
///
/// Once constructed the tree is immutable; listeners and visitors only ever
/// receive shared references, so one tree can be walked from several threads
/// at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree<G: Grammar> {
    root: Node<G>,
    errors: Vec<SyntaxError>,
}

impl<G: Grammar> ParseTree<G> {
    /// Seal `root` into a tree, assigning node depths.
    pub fn new(mut root: Node<G>, errors: Vec<SyntaxError>) -> Self {
        root.assign_depths();
        Self { root, errors }
    }

    pub fn root(&self) -> &Node<G> {
        &self.root
    }

    /// Syntax errors reported while lexing and parsing, in source order.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of nodes in the tree, terminals included.
    pub fn node_count(&self) -> usize {
        self.root.descendants().count()
    }

    /// Depth of the deepest node.
    pub fn height(&self) -> u32 {
        self.root
            .descendants()
            .map(Node::depth)
            .max()
            .unwrap_or_default()
    }

    pub fn into_parts(self) -> (Node<G>, Vec<SyntaxError>) {
        (self.root, self.errors)
    }
}

impl<G: Grammar> Serialize for ParseTree<G> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParseTree", 3)?;
        state.serialize_field("grammar", G::NAME)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("root", &self.root)?;
        state.end()
    }
}
