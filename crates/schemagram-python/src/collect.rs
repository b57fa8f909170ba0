// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Sample consumers of Python3Subset trees.
//!
//! - [`NameCollector`]: every name referenced as an atom
//! - [`DefinitionCollector`]: function and class definitions, with their
//!   decorators and the definitions enclosing them
//! - [`SuiteTracker`]: when each `suite` was entered and exited

use schemagram_tree::{CallbackResult, ParseTree, Span, TraversalError, WalkContext};
use serde::Serialize;

use crate::kinds::{walk, PyListener, PyNode, PyRule, PyToken, Python3Subset};
use crate::roles::PyRoles;

// ============================================================================
// NameCollector
// ============================================================================

/// A name used as an expression atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRef {
    pub name: String,
    pub span: Span,
}

/// Collects every `NAME` that forms an `atom`, in source order.
///
/// Definition names, parameter names and attribute names after `.` are not
/// atoms and are skipped. Keyword argument names are atoms.
///
/// ```
/// use schemagram_python::{parse_file, NameCollector};
///
/// let tree = parse_file("x = f(y).z\n").unwrap();
/// let names: Vec<String> = NameCollector::collect(&tree)
///     .unwrap()
///     .into_iter()
///     .map(|r| r.name)
///     .collect();
/// assert_eq!(names, ["x", "f", "y"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameCollector {
    pub names: Vec<NameRef>,
}

impl NameCollector {
    pub fn collect(tree: &ParseTree<Python3Subset>) -> Result<Vec<NameRef>, TraversalError> {
        let mut collector = Self::default();
        walk(tree.root(), &mut [&mut collector])?;
        Ok(collector.names)
    }
}

impl PyListener for NameCollector {
    fn enter_atom(&mut self, ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        if let Some(name) = ctx.node().first_token(PyToken::Name) {
            self.names.push(NameRef {
                name: name.token_text().to_string(),
                span: name.span(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// DefinitionCollector
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Function,
    AsyncFunction,
    Class,
}

/// A `def` or `class`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    /// Names of the enclosing definitions, outermost first.
    pub path: Vec<String>,
    /// Dotted names of the decorators, in source order.
    pub decorators: Vec<String>,
    pub span: Span,
}

impl Definition {
    /// `path` and `name` joined with dots.
    pub fn qualified_name(&self) -> String {
        self.path
            .iter()
            .chain(std::iter::once(&self.name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Records every function and class definition, outer definitions first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionCollector {
    pub definitions: Vec<Definition>,
}

impl DefinitionCollector {
    pub fn collect(tree: &ParseTree<Python3Subset>) -> Result<Vec<Definition>, TraversalError> {
        let mut collector = Self::default();
        walk(tree.root(), &mut [&mut collector])?;
        Ok(collector.definitions)
    }

    fn record(&mut self, ctx: &WalkContext<'_, Python3Subset>, kind: DefinitionKind) {
        let node = ctx.node();
        let name = node
            .name()
            .map(|name| name.token_text().to_string())
            .unwrap_or_default();
        let path = ctx
            .ancestors()
            .iter()
            .filter_map(|ancestor| ancestor.name())
            .map(|name| name.token_text().to_string())
            .collect();
        self.definitions.push(Definition {
            kind,
            name,
            path,
            decorators: decorators_of(ctx),
            span: node.span(),
        });
    }
}

/// Decorator names applied to the definition at `ctx`, which sits directly
/// under `decorated` or under an `async_funcdef` that does.
fn decorators_of(ctx: &WalkContext<'_, Python3Subset>) -> Vec<String> {
    let mut ancestors = ctx.ancestors().iter().rev();
    let decorated = match ancestors.next() {
        Some(parent) if parent.is(PyRule::AsyncFuncdef) => ancestors.next(),
        parent => parent,
    };
    decorated
        .map(|decorated| {
            decorated
                .decorators()
                .iter()
                .filter_map(|decorator| decorator.decorator_name())
                .map(PyNode::text)
                .collect()
        })
        .unwrap_or_default()
}

impl PyListener for DefinitionCollector {
    fn enter_funcdef(&mut self, ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        let is_async = ctx.parent().is_some_and(|parent| {
            parent.is(PyRule::AsyncFuncdef) || parent.is(PyRule::AsyncStmt)
        });
        let kind = if is_async {
            DefinitionKind::AsyncFunction
        } else {
            DefinitionKind::Function
        };
        self.record(ctx, kind);
        Ok(())
    }

    fn enter_classdef(&mut self, ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        self.record(ctx, DefinitionKind::Class);
        Ok(())
    }
}

// ============================================================================
// SuiteTracker
// ============================================================================

/// One `suite`: the rule owning it and the walk events bracketing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteVisit {
    /// Kind of the statement the suite belongs to, e.g. `if_stmt`.
    pub owner: &'static str,
    /// Number of enclosing suites.
    pub level: usize,
    /// Event number of the enter callback.
    pub entered: usize,
    /// Event number of the exit callback, once it ran.
    pub exited: Option<usize>,
    pub span: Span,
}

/// Records the enter/exit pair of every `suite` in walk order.
///
/// Event numbers count every rule enter and exit of the walk, so two suites
/// are siblings exactly when one exits before the other enters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteTracker {
    pub suites: Vec<SuiteVisit>,
    #[serde(skip)]
    events: usize,
    #[serde(skip)]
    open: Vec<usize>,
}

impl SuiteTracker {
    pub fn collect(tree: &ParseTree<Python3Subset>) -> Result<Vec<SuiteVisit>, TraversalError> {
        let mut tracker = Self::default();
        walk(tree.root(), &mut [&mut tracker])?;
        Ok(tracker.suites)
    }
}

impl PyListener for SuiteTracker {
    fn enter_every_rule(&mut self, _ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        self.events += 1;
        Ok(())
    }

    fn exit_every_rule(&mut self, _ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        self.events += 1;
        Ok(())
    }

    fn enter_suite(&mut self, ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        self.open.push(self.suites.len());
        self.suites.push(SuiteVisit {
            owner: ctx.parent().map_or("", |parent| parent.kind().name()),
            level: self.open.len() - 1,
            entered: self.events,
            exited: None,
            span: ctx.node().span(),
        });
        Ok(())
    }

    fn exit_suite(&mut self, _ctx: &WalkContext<'_, Python3Subset>) -> CallbackResult {
        let index = self.open.pop().ok_or("suite exited without being entered")?;
        if let Some(suite) = self.suites.get_mut(index) {
            suite.exited = Some(self.events);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_file;

    #[test]
    fn test_names_are_atoms_only() {
        let tree = parse_file("def f(a):\n    return a.b + g(c=d)\n").unwrap();
        let names: Vec<String> = NameCollector::collect(&tree)
            .unwrap()
            .into_iter()
            .map(|name| name.name)
            .collect();
        assert_eq!(names, ["a", "g", "c", "d"]);
    }

    #[test]
    fn test_definitions_with_paths_and_decorators() {
        let tree = parse_file(
            "@model\nclass A:\n    @field(1)\n    async def f(self):\n        def g():\n            pass\n\
             class B:\n    pass\n",
        )
        .unwrap();
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let definitions = DefinitionCollector::collect(&tree).unwrap();
        let summary: Vec<(DefinitionKind, String, Vec<String>)> = definitions
            .iter()
            .map(|d| (d.kind, d.qualified_name(), d.decorators.clone()))
            .collect();
        assert_eq!(
            summary,
            [
                (DefinitionKind::Class, "A".to_string(), vec!["model".to_string()]),
                (DefinitionKind::AsyncFunction, "A.f".to_string(), vec!["field".to_string()]),
                (DefinitionKind::Function, "A.f.g".to_string(), vec![]),
                (DefinitionKind::Class, "B".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_suite_pairs() {
        let tree = parse_file("if x:\n    y = 1\nelse:\n    y = 2\n").unwrap();
        let suites = SuiteTracker::collect(&tree).unwrap();
        assert_eq!(suites.len(), 2);
        assert!(suites.iter().all(|s| s.owner == "if_stmt" && s.level == 0));
        let first_exit = suites[0].exited.unwrap();
        assert!(suites[0].entered < first_exit);
        assert!(first_exit < suites[1].entered);
        assert!(suites[1].exited.is_some());
    }

    #[test]
    fn test_nested_suites_have_levels() {
        let tree = parse_file("while a:\n    for b in c:\n        pass\n").unwrap();
        let suites = SuiteTracker::collect(&tree).unwrap();
        let levels: Vec<(&str, usize)> = suites.iter().map(|s| (s.owner, s.level)).collect();
        assert_eq!(levels, [("while_stmt", 0), ("for_stmt", 1)]);
        assert!(suites[1].exited < suites[0].exited);
    }
}
