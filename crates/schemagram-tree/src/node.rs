// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parse-tree nodes.
//!
//! A [`Node`] is either a rule node (an applied grammar rule, with ordered
//! children) or a terminal (a token, with its source text). Children are
//! owned by their parent, so a tree is acyclic and freed as a unit.
//!
//! Nodes are built bottom-up by the grammar layer with [`RuleBuilder`] and
//! sealed into a [`ParseTree`](crate::ParseTree), which assigns depths and only
//! hands out shared references from then on.

use serde::ser::{self, Serialize, SerializeStruct, Serializer};

use crate::error::TraversalError;
use crate::grammar::{Grammar, RuleKind, TokenKind};
use crate::span::Span;
use crate::visitor::{visit, ParseTreeVisitor};

// ============================================================================
// Kinds
// ============================================================================

/// The kind of a node: a rule of grammar `G` or a token of grammar `G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind<G: Grammar> {
    Rule(G::Rule),
    Token(G::Token),
}

impl<G: Grammar> NodeKind<G> {
    /// The rule or token name.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Rule(rule) => rule.name(),
            NodeKind::Token(token) => token.name(),
        }
    }

    pub fn is_rule(self) -> bool {
        matches!(self, NodeKind::Rule(_))
    }

    pub fn is_token(self) -> bool {
        matches!(self, NodeKind::Token(_))
    }
}

// ============================================================================
// Node
// ============================================================================

/// A node of a parse tree for grammar `G`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<G: Grammar> {
    kind: NodeKind<G>,
    span: Span,
    text: Box<str>,
    children: Vec<Node<G>>,
    recovered: bool,
    depth: u32,
}

impl<G: Grammar> Node<G> {
    /// A terminal for a token the parser accepted.
    pub fn token(kind: G::Token, span: Span, text: &str) -> Self {
        Self {
            kind: NodeKind::Token(kind),
            span,
            text: text.into(),
            children: Vec::new(),
            recovered: false,
            depth: 0,
        }
    }

    /// A terminal produced by error recovery (an error node).
    pub fn error_token(kind: G::Token, span: Span, text: &str) -> Self {
        Self::token(kind, span, text).mark_recovered()
    }

    /// Start building a rule node of the given kind.
    pub fn build(kind: G::Rule) -> RuleBuilder<G> {
        RuleBuilder::new(kind)
    }

    /// A rule node over `children`. Its span covers all child spans.
    pub fn rule(kind: G::Rule, children: Vec<Node<G>>) -> Self {
        let span = children
            .iter()
            .map(|child| child.span)
            .reduce(Span::cover)
            .unwrap_or_default();
        Self {
            kind: NodeKind::Rule(kind),
            span,
            text: "".into(),
            children,
            recovered: false,
            depth: 0,
        }
    }

    /// Mark this node as produced by error recovery.
    #[must_use]
    pub fn mark_recovered(mut self) -> Self {
        self.recovered = true;
        self
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    pub fn kind(&self) -> NodeKind<G> {
        self.kind
    }

    /// The rule kind, if this is a rule node.
    pub fn rule_kind(&self) -> Option<G::Rule> {
        match self.kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Token(_) => None,
        }
    }

    /// The token kind, if this is a terminal.
    pub fn token_kind(&self) -> Option<G::Token> {
        match self.kind {
            NodeKind::Token(token) => Some(token),
            NodeKind::Rule(_) => None,
        }
    }

    /// Whether this is a rule node of kind `rule`.
    pub fn is(&self, rule: G::Rule) -> bool {
        self.kind == NodeKind::Rule(rule)
    }

    /// Whether this is a terminal of kind `token`.
    pub fn is_token(&self, token: G::Token) -> bool {
        self.kind == NodeKind::Token(token)
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_token()
    }

    /// Whether this node was produced by error recovery.
    pub fn is_recovered(&self) -> bool {
        self.recovered
    }

    /// A terminal produced by error recovery.
    pub fn is_error_node(&self) -> bool {
        self.recovered && self.is_terminal()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Distance from the root of the enclosing [`ParseTree`](crate::ParseTree).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// Children in source order. Empty for terminals.
    pub fn children(&self) -> &[Node<G>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Node<G>> {
        self.children.get(index)
    }

    /// Child rule nodes of kind `rule`, in order.
    pub fn rule_children(&self, rule: G::Rule) -> impl Iterator<Item = &Node<G>> + '_ {
        self.children.iter().filter(move |child| child.is(rule))
    }

    pub fn first_rule(&self, rule: G::Rule) -> Option<&Node<G>> {
        self.rule_children(rule).next()
    }

    /// Child terminals of kind `token`, in order.
    pub fn token_children(&self, token: G::Token) -> impl Iterator<Item = &Node<G>> + '_ {
        self.children.iter().filter(move |child| child.is_token(token))
    }

    pub fn first_token(&self, token: G::Token) -> Option<&Node<G>> {
        self.token_children(token).next()
    }

    /// Whether a child terminal of kind `token` exists.
    pub fn has_token(&self, token: G::Token) -> bool {
        self.first_token(token).is_some()
    }

    /// This node and all nodes below it, in pre-order.
    pub fn descendants(&self) -> Descendants<'_, G> {
        Descendants { stack: vec![self] }
    }

    /// The terminal's own text, or `""` for a rule node.
    pub fn token_text(&self) -> &str {
        &self.text
    }

    /// The concatenated text of every terminal in this subtree, without
    /// separators (so an `idPath` over `a . x` reads `"a.x"`).
    pub fn text(&self) -> String {
        if self.is_terminal() {
            return self.text.to_string();
        }
        self.descendants()
            .filter(|node| node.is_terminal())
            .map(|node| node.token_text())
            .collect()
    }

    /// Dispatch `visitor` on this node. Same as [`visit`].
    pub fn accept<R, V>(&self, visitor: &mut V) -> Result<R, TraversalError>
    where
        V: ParseTreeVisitor<G, R> + ?Sized,
    {
        visit(visitor, self)
    }

    /// Assign depths below this node, which becomes depth 0.
    pub(crate) fn assign_depths(&mut self) {
        let mut stack: Vec<(&mut Node<G>, u32)> = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            node.depth = depth;
            stack.extend(node.children.iter_mut().map(|child| (child, depth + 1)));
        }
    }
}

impl<G: Grammar> Drop for Node<G> {
    /// Frees the subtree with a heap stack, so a deep tree never recurses.
    fn drop(&mut self) {
        if self.children.iter().all(|child| child.children.is_empty()) {
            return;
        }
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Deepest subtree, counted in levels below its root, that serializes.
pub const MAX_SERIALIZED_HEIGHT: u32 = 2_048;

impl<G: Grammar> Serialize for Node<G> {
    /// Fails without descending when the subtree is taller than
    /// [`MAX_SERIALIZED_HEIGHT`].
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut height = 0;
        let mut stack = vec![(self, 0u32)];
        while let Some((node, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        if height > MAX_SERIALIZED_HEIGHT {
            return Err(<S::Error as ser::Error>::custom(format_args!(
                "`{}` at {} is {height} levels tall, beyond the limit of {MAX_SERIALIZED_HEIGHT}",
                self.kind.name(),
                self.span
            )));
        }
        Checked(self).serialize(serializer)
    }
}

/// A node whose height was already checked.
struct Checked<'a, G: Grammar>(&'a Node<G>);

impl<G: Grammar> Serialize for Checked<'_, G> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.0;
        let mut state = serializer.serialize_struct("Node", 5)?;
        state.serialize_field("kind", node.kind.name())?;
        state.serialize_field("span", &node.span)?;
        if node.is_terminal() {
            state.serialize_field("text", &*node.text)?;
        } else {
            state.skip_field("text")?;
        }
        state.serialize_field("recovered", &node.recovered)?;
        state.serialize_field("children", &Children(&node.children))?;
        state.end()
    }
}

struct Children<'a, G: Grammar>(&'a [Node<G>]);

impl<G: Grammar> Serialize for Children<'_, G> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Checked))
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Pre-order iterator over a subtree. See [`Node::descendants`].
#[derive(Debug, Clone)]
pub struct Descendants<'a, G: Grammar> {
    stack: Vec<&'a Node<G>>,
}

impl<'a, G: Grammar> Iterator for Descendants<'a, G> {
    type Item = &'a Node<G>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ============================================================================
// Building
// ============================================================================

/// Accumulates the children of a rule node in source order.
///
/// ```
/// # use schemagram_tree::{Node, RuleBuilder};
/// # fn demo<G: schemagram_tree::Grammar>(kind: G::Rule, a: Node<G>, b: Option<Node<G>>) -> Node<G> {
/// Node::build(kind).node(a).opt(b).finish()
/// # }
/// ```
#[derive(Debug)]
#[must_use]
pub struct RuleBuilder<G: Grammar> {
    kind: G::Rule,
    children: Vec<Node<G>>,
}

impl<G: Grammar> RuleBuilder<G> {
    pub fn new(kind: G::Rule) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn node(mut self, child: Node<G>) -> Self {
        self.children.push(child);
        self
    }

    /// Append an optional child; `None` adds nothing.
    pub fn opt(mut self, child: Option<Node<G>>) -> Self {
        self.children.extend(child);
        self
    }

    pub fn nodes(mut self, children: impl IntoIterator<Item = Node<G>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append repeated groups, e.g. the `(',' field)*` tail of a list.
    pub fn groups(mut self, groups: impl IntoIterator<Item = Vec<Node<G>>>) -> Self {
        self.children.extend(groups.into_iter().flatten());
        self
    }

    pub fn finish(self) -> Node<G> {
        Node::rule(self.kind, self.children)
    }
}
