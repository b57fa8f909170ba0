// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Tree Core
// ============================================================================

use schemagram::tree::{
    BoxError, CallbackResult, Descendants, Grammar, Lexeme, Mark, NestingGuard, Node, NodeKind,
    ParseError, ParseOptions, ParseTree, ParseTreeListener, ParseTreeVisitor, ParseTreeWalker,
    Phase, Recovery, RuleBuilder, RuleKind, Span, SyntaxError, TextCursor, TokenKind,
    TraversalError, WalkContext, DEFAULT_MAX_NESTING,
};

// ============================================================================
// Grammars
// ============================================================================

use schemagram::sql::{
    FieldCollector, GenericSql, IdPathCollector, SelectedField, SqlLexeme, SqlListener, SqlNode,
    SqlRoles, SqlRule, SqlToken, SqlVisitor, TableRef,
};

use schemagram::python::{
    Definition, DefinitionCollector, DefinitionKind, NameCollector, NameRef, PyLexeme,
    PyListener, PyNode, PyRoles, PyRule, PyToken, PyVisitor, Python3Subset, SuiteTracker,
    SuiteVisit,
};

// ============================================================================
// CLI Library
// ============================================================================

use schemagram::diagnostics::{prettify_error, prettify_errors};
use schemagram::dialect::{AnyTree, Dialect, PythonMode};
use schemagram::error::{CliError, OutputErrorCode};
use schemagram::output::{
    collect_facts, emit_response, outline, ErrorResponse, Facts, FactsResponse, OutlineWriter,
    TreeResponse, SCHEMA_VERSION,
};

#[test]
fn api_surface_compiles() {
    // This test exists only to ensure the imports above compile.
    // If we get here, the public API surface is intact.
}

#[test]
fn entry_points_are_functions() {
    let _: fn(&str) -> Result<ParseTree<GenericSql>, ParseError> = schemagram::sql::parse;
    let _: fn(&str) -> Result<ParseTree<Python3Subset>, ParseError> =
        schemagram::python::parse_file;
    let _: fn(&str) -> Result<ParseTree<Python3Subset>, ParseError> =
        schemagram::python::parse_single;
    let _: fn(&str) -> Result<ParseTree<Python3Subset>, ParseError> =
        schemagram::python::parse_eval;
}
