// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Output of the `schemagram` command.
//!
//! Two renderings exist for a tree: a plain indented outline written by
//! [`OutlineWriter`], and JSON responses serialized with [`emit_response`].
//!
//! ## JSON Responses
//!
//! 1. **Status first:** every response starts with `status`, which is `ok`
//!    or `syntax_errors`
//! 2. **Versioned:** `schema_version` changes whenever a field changes meaning
//! 3. **Deterministic:** arrays follow source order

use std::fmt::Write as _;
use std::io::{self, Write};

use serde::Serialize;

use schemagram_python::{
    Definition, DefinitionCollector, NameCollector, NameRef, SuiteTracker, SuiteVisit,
};
use schemagram_sql::{FieldCollector, IdPathCollector};
use schemagram_tree::{
    walk, CallbackResult, Grammar, Node, ParseTreeListener, SyntaxError, TraversalError,
    WalkContext,
};

use crate::dialect::{AnyTree, Dialect};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Outline
// ============================================================================

/// Writes one line per node, indented two spaces per level.
///
/// Rule nodes print their kind, terminals their token name and text.
/// Recovered rule nodes are flagged and error terminals are prefixed with
/// `error`:
///
/// ```text
/// statement
///   query
///     SELECT "SELECT"
/// ```
#[derive(Debug, Default)]
pub struct OutlineWriter {
    out: String,
}

impl OutlineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outline of the subtree at `root`.
    pub fn render<G: Grammar>(root: &Node<G>) -> Result<String, TraversalError> {
        let mut writer = Self::new();
        walk(root, &mut [&mut writer])?;
        Ok(writer.finish())
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, depth: usize, args: std::fmt::Arguments<'_>) -> CallbackResult {
        let indent = depth * 2;
        writeln!(self.out, "{:indent$}{args}", "")?;
        Ok(())
    }
}

impl<G: Grammar> ParseTreeListener<G> for OutlineWriter {
    fn enter_every_rule(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        let node = ctx.node();
        let marker = if node.is_recovered() { " (recovered)" } else { "" };
        self.line(ctx.depth(), format_args!("{}{marker}", node.kind().name()))
    }

    fn visit_terminal(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        let node = ctx.node();
        self.line(
            ctx.depth(),
            format_args!("{} {:?}", node.kind().name(), node.token_text()),
        )
    }

    fn visit_error_node(&mut self, ctx: &WalkContext<'_, G>) -> CallbackResult {
        let node = ctx.node();
        self.line(
            ctx.depth(),
            format_args!("error {} {:?}", node.kind().name(), node.token_text()),
        )
    }
}

/// Outline of a tree of either grammar.
pub fn outline(tree: &AnyTree) -> Result<String, TraversalError> {
    match tree {
        AnyTree::Sql(tree) => OutlineWriter::render(tree.root()),
        AnyTree::Python(tree) => OutlineWriter::render(tree.root()),
    }
}

// ============================================================================
// Facts
// ============================================================================

/// What the sample collectors found in a tree.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Facts {
    Sql {
        fields: FieldCollector,
        id_paths: Vec<String>,
    },
    Python {
        names: Vec<NameRef>,
        definitions: Vec<Definition>,
        suites: Vec<SuiteVisit>,
    },
}

/// Run the collectors of the tree's grammar.
///
/// The Python3Subset collectors share a single walk.
pub fn collect_facts(tree: &AnyTree) -> Result<Facts, TraversalError> {
    match tree {
        AnyTree::Sql(tree) => Ok(Facts::Sql {
            fields: FieldCollector::collect(tree)?,
            id_paths: IdPathCollector::collect(tree)?,
        }),
        AnyTree::Python(tree) => {
            let mut names = NameCollector::default();
            let mut definitions = DefinitionCollector::default();
            let mut suites = SuiteTracker::default();
            schemagram_python::walk(
                tree.root(),
                &mut [&mut names, &mut definitions, &mut suites],
            )?;
            Ok(Facts::Python {
                names: names.names,
                definitions: definitions.definitions,
                suites: suites.suites,
            })
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

fn status_of(tree: &AnyTree) -> &'static str {
    if tree.has_errors() {
        "syntax_errors"
    } else {
        "ok"
    }
}

/// Response for `schemagram tree --json`.
#[derive(Debug, Serialize)]
pub struct TreeResponse<'a> {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub dialect: Dialect,
    pub node_count: usize,
    /// The tree: grammar name, syntax errors and root node.
    pub tree: &'a AnyTree,
}

impl<'a> TreeResponse<'a> {
    pub fn new(tree: &'a AnyTree) -> Self {
        TreeResponse {
            status: status_of(tree),
            schema_version: SCHEMA_VERSION,
            dialect: tree.dialect(),
            node_count: tree.node_count(),
            tree,
        }
    }
}

/// Response for `schemagram facts`.
#[derive(Debug, Serialize)]
pub struct FactsResponse<'a> {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub dialect: Dialect,
    pub errors: &'a [SyntaxError],
    pub facts: Facts,
}

impl<'a> FactsResponse<'a> {
    pub fn new(tree: &'a AnyTree, facts: Facts) -> Self {
        FactsResponse {
            status: status_of(tree),
            schema_version: SCHEMA_VERSION,
            dialect: tree.dialect(),
            errors: tree.errors(),
            facts,
        }
    }
}

/// Response written when no result could be produced.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub message: String,
    pub code: u8,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: u8) -> Self {
        ErrorResponse {
            status: "error",
            schema_version: SCHEMA_VERSION,
            message: message.into(),
            code,
        }
    }
}

/// Serialize `response` as pretty JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PythonMode;
    use schemagram_tree::ParseOptions;

    fn parse(text: &str, dialect: Dialect) -> AnyTree {
        AnyTree::parse(text, dialect, PythonMode::File, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_outline_indents_by_depth() {
        let tree = parse("SELECT a FROM t", Dialect::Sql);
        let outline = outline(&tree).unwrap();
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "statement");
        assert!(lines[1].starts_with("  ") && !lines[1].starts_with("   "));
        assert!(lines.iter().any(|line| line.trim() == "SELECT \"SELECT\""));
        assert!(lines.iter().any(|line| line.trim() == "ID \"t\""));
    }

    #[test]
    fn test_outline_flags_recovery() {
        let tree = parse("x = = 1\ny = 2\n", Dialect::Python);
        let outline = outline(&tree).unwrap();
        assert!(outline.contains("stmt (recovered)"), "{outline}");
        assert!(outline.contains("error '=' \"=\""), "{outline}");
    }

    #[test]
    fn test_python_facts_share_one_walk() {
        let tree = parse("class A:\n    if b:\n        c = d\n", Dialect::Python);
        let Facts::Python {
            names,
            definitions,
            suites,
        } = collect_facts(&tree).unwrap()
        else {
            panic!("expected Python facts");
        };
        let names: Vec<&str> = names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "d"]);
        assert_eq!(definitions.len(), 1);
        assert_eq!(suites.len(), 2);
    }

    #[test]
    fn test_facts_response_json() {
        let tree = parse("SELECT a.x AS y FROM t", Dialect::Sql);
        let facts = collect_facts(&tree).unwrap();
        let mut buf = Vec::new();
        emit_response(&FactsResponse::new(&tree, facts), &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
        assert_eq!(json["dialect"], "sql");
        assert_eq!(json["facts"]["fields"]["fields"][0]["alias"], "y");
        assert_eq!(json["facts"]["id_paths"][0], "a.x");
    }

    #[test]
    fn test_tree_response_reports_syntax_errors() {
        let tree = parse("x = = 1\n", Dialect::Python);
        let response = TreeResponse::new(&tree);
        assert_eq!(response.status, "syntax_errors");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tree"]["grammar"], "Python3Subset");
        assert_eq!(json["tree"]["errors"].as_array().unwrap().len(), 1);
    }
}
