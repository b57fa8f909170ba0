// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Choosing a grammar at run time.
//!
//! The grammar crates are statically typed per grammar. [`AnyTree`] holds a
//! tree of either grammar so a caller that only learns the dialect from its
//! input (such as the CLI) can parse and walk without naming the grammar.

use clap::ValueEnum;
use serde::{Serialize, Serializer};

use schemagram_python::Python3Subset;
use schemagram_sql::GenericSql;
use schemagram_tree::{ParseError, ParseOptions, ParseTree, SyntaxError};

/// The grammar to parse with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// GenericSql `SELECT` statements.
    Sql,
    /// Python3Subset model definitions.
    Python,
}

/// The Python3Subset start rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum PythonMode {
    /// A module (`file_input`).
    #[default]
    File,
    /// One interactive statement (`single_input`).
    Single,
    /// An expression list (`eval_input`).
    Eval,
}

/// A parse tree of either grammar.
#[derive(Debug, Clone)]
pub enum AnyTree {
    Sql(ParseTree<GenericSql>),
    Python(ParseTree<Python3Subset>),
}

impl AnyTree {
    /// Parse `text` with `dialect`. `mode` only applies to Python3Subset.
    pub fn parse(
        text: &str,
        dialect: Dialect,
        mode: PythonMode,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let tree = match (dialect, mode) {
            (Dialect::Sql, _) => AnyTree::Sql(schemagram_sql::parse_with_options(text, options)?),
            (Dialect::Python, PythonMode::File) => {
                AnyTree::Python(schemagram_python::parse_file_with_options(text, options)?)
            }
            (Dialect::Python, PythonMode::Single) => {
                AnyTree::Python(schemagram_python::parse_single_with_options(text, options)?)
            }
            (Dialect::Python, PythonMode::Eval) => {
                AnyTree::Python(schemagram_python::parse_eval_with_options(text, options)?)
            }
        };
        tracing::debug!(
            dialect = ?dialect,
            nodes = tree.node_count(),
            errors = tree.errors().len(),
            "parsed input"
        );
        Ok(tree)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            AnyTree::Sql(_) => Dialect::Sql,
            AnyTree::Python(_) => Dialect::Python,
        }
    }

    pub fn errors(&self) -> &[SyntaxError] {
        match self {
            AnyTree::Sql(tree) => tree.errors(),
            AnyTree::Python(tree) => tree.errors(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn node_count(&self) -> usize {
        match self {
            AnyTree::Sql(tree) => tree.node_count(),
            AnyTree::Python(tree) => tree.node_count(),
        }
    }
}

impl Serialize for AnyTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnyTree::Sql(tree) => tree.serialize(serializer),
            AnyTree::Python(tree) => tree.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_dialect() {
        let options = ParseOptions::default();
        let sql = AnyTree::parse("SELECT a FROM t", Dialect::Sql, PythonMode::Eval, &options).unwrap();
        assert_eq!(sql.dialect(), Dialect::Sql);
        assert!(!sql.has_errors());

        let python = AnyTree::parse("a + 1", Dialect::Python, PythonMode::Eval, &options).unwrap();
        assert_eq!(python.dialect(), Dialect::Python);
        match &python {
            AnyTree::Python(tree) => assert_eq!(tree.root().kind().name(), "eval_input"),
            AnyTree::Sql(_) => panic!("expected a Python3Subset tree"),
        }
    }

    #[test]
    fn test_mode_selects_start_rule() {
        let options = ParseOptions::default();
        let file = AnyTree::parse("x = 1\n", Dialect::Python, PythonMode::File, &options).unwrap();
        let single =
            AnyTree::parse("x = 1\n", Dialect::Python, PythonMode::Single, &options).unwrap();
        let eval = AnyTree::parse("x = 1\n", Dialect::Python, PythonMode::Eval, &options).unwrap();
        assert!(!file.has_errors());
        assert!(!single.has_errors());
        assert_eq!(eval.errors().len(), 1);
    }

    #[test]
    fn test_serializes_as_the_inner_tree() {
        let options = ParseOptions::default();
        let tree = AnyTree::parse("SELECT a FROM t", Dialect::Sql, PythonMode::File, &options).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["grammar"], "GenericSql");
        assert_eq!(json["root"]["kind"], "statement");
    }
}
