// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Sample consumers of GenericSql trees.
//!
//! - [`IdPathCollector`]: a visitor returning the dotted paths referenced in
//!   expression positions
//! - [`FieldCollector`]: a listener recording the selected fields, their
//!   aliases and the table selected from

use schemagram_tree::{CallbackResult, ParseTree, Span, TraversalError, WalkContext};
use serde::Serialize;

use crate::kinds::{visit, walk, GenericSql, SqlListener, SqlNode, SqlRule, SqlVisitor};
use crate::roles::SqlRoles;

// ============================================================================
// IdPathCollector
// ============================================================================

/// Collects the text of every `idPath` in the select list and the `WHERE`
/// clause, left to right.
///
/// The table in `FROM` is not an expression and is skipped.
///
/// ```
/// use schemagram_sql::{parse, IdPathCollector};
///
/// let tree = parse("SELECT a.x AS y FROM t WHERE a.x > 1").unwrap();
/// assert_eq!(IdPathCollector::collect(&tree).unwrap(), ["a.x", "a.x"]);
/// ```
#[derive(Debug, Default)]
pub struct IdPathCollector;

impl IdPathCollector {
    pub fn collect(tree: &ParseTree<GenericSql>) -> Result<Vec<String>, TraversalError> {
        visit(&mut IdPathCollector, tree.root())
    }
}

impl SqlVisitor<Vec<String>> for IdPathCollector {
    fn default_result(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn aggregate_result(&mut self, mut aggregate: Vec<String>, next: Vec<String>) -> Vec<String> {
        aggregate.extend(next);
        aggregate
    }

    fn visit_id_path(&mut self, node: &SqlNode) -> CallbackResult<Vec<String>> {
        Ok(vec![node.text()])
    }

    fn visit_from_tables(&mut self, _node: &SqlNode) -> CallbackResult<Vec<String>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// FieldCollector
// ============================================================================

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedField {
    /// Source text of the expression, or `*`.
    pub expression: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// The table of the `FROM` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub path: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// Records what a statement selects and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldCollector {
    pub fields: Vec<SelectedField>,
    pub table: Option<TableRef>,
    /// Whether any part of the statement was produced by error recovery.
    pub recovered: bool,
}

impl FieldCollector {
    /// Walk `tree` and return the collected facts.
    pub fn collect(tree: &ParseTree<GenericSql>) -> Result<Self, TraversalError> {
        let mut collector = Self::default();
        walk(tree.root(), &mut [&mut collector])?;
        Ok(collector)
    }
}

impl SqlListener for FieldCollector {
    fn enter_field(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        let node = ctx.node();
        if node.is_asterisk() {
            self.fields.push(SelectedField {
                expression: node.text(),
                alias: None,
                span: node.span(),
            });
        }
        Ok(())
    }

    fn enter_select_field(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        let node = ctx.node();
        let expression = node
            .first_rule(SqlRule::Exp)
            .map(SqlNode::text)
            .unwrap_or_default();
        self.fields.push(SelectedField {
            expression,
            alias: node.alias().map(SqlNode::text),
            span: node.span(),
        });
        Ok(())
    }

    fn enter_alias_field(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        if !ctx.within(SqlRule::FromTables) {
            return Ok(());
        }
        let node = ctx.node();
        self.table = Some(TableRef {
            path: node.id_path().map(SqlNode::text).unwrap_or_default(),
            alias: node.alias().map(SqlNode::text),
            span: node.span(),
        });
        Ok(())
    }

    fn visit_error_node(&mut self, _ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        self.recovered = true;
        Ok(())
    }
}
