// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Named access to the children of Python3Subset nodes.
//!
//! Accessors apply to the node kinds named in their docs and return `None`
//! (or an empty list) on any other kind.

use crate::kinds::{PyNode, PyRule, PyToken};

/// Role accessors for [`PyNode`].
pub trait PyRoles {
    /// `if_stmt` or `while_stmt`: the condition `test` of each branch, in
    /// order (`if`, then every `elif`).
    fn conditions(&self) -> Vec<&PyNode>;

    /// `if_stmt`, `while_stmt`, `for_stmt`, `try_stmt` or `with_stmt`: every
    /// `suite`, in source order, the `else` suite included.
    fn suites(&self) -> Vec<&PyNode>;

    /// `if_stmt`, `while_stmt`, `for_stmt` or `try_stmt`: the suite after
    /// `else`.
    fn else_suite(&self) -> Option<&PyNode>;

    /// `funcdef`, `classdef`, `for_stmt`, `while_stmt` or `with_stmt`: the
    /// first suite.
    fn body(&self) -> Option<&PyNode>;

    /// `funcdef` or `classdef`: the `NAME` token being defined.
    fn name(&self) -> Option<&PyNode>;

    /// `funcdef`: the `parameters` node.
    fn parameters(&self) -> Option<&PyNode>;

    /// `funcdef`: the `test` after `->`.
    fn return_annotation(&self) -> Option<&PyNode>;

    /// `decorated`: the `decorator` nodes.
    fn decorators(&self) -> Vec<&PyNode>;

    /// `decorated`: the decorated `funcdef`, `classdef` or `async_funcdef`.
    fn definition(&self) -> Option<&PyNode>;

    /// `decorator`: the dotted name being applied.
    fn decorator_name(&self) -> Option<&PyNode>;

    /// `for_stmt`: the loop targets.
    fn targets(&self) -> Option<&PyNode>;

    /// `for_stmt`: what is iterated.
    fn iterable(&self) -> Option<&PyNode>;
}

impl PyRoles for PyNode {
    fn conditions(&self) -> Vec<&PyNode> {
        match self.rule_kind() {
            Some(PyRule::IfStmt) => self.rule_children(PyRule::Test).collect(),
            Some(PyRule::WhileStmt) => self.first_rule(PyRule::Test).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn suites(&self) -> Vec<&PyNode> {
        match self.rule_kind() {
            Some(
                PyRule::IfStmt
                | PyRule::WhileStmt
                | PyRule::ForStmt
                | PyRule::TryStmt
                | PyRule::WithStmt,
            ) => self.rule_children(PyRule::Suite).collect(),
            _ => Vec::new(),
        }
    }

    fn else_suite(&self) -> Option<&PyNode> {
        if !matches!(
            self.rule_kind(),
            Some(PyRule::IfStmt | PyRule::WhileStmt | PyRule::ForStmt | PyRule::TryStmt)
        ) {
            return None;
        }
        self.children()
            .iter()
            .skip_while(|child| !child.is_token(PyToken::Else))
            .find(|child| child.is(PyRule::Suite))
    }

    fn body(&self) -> Option<&PyNode> {
        match self.rule_kind() {
            Some(
                PyRule::Funcdef
                | PyRule::Classdef
                | PyRule::ForStmt
                | PyRule::WhileStmt
                | PyRule::WithStmt,
            ) => self.first_rule(PyRule::Suite),
            _ => None,
        }
    }

    fn name(&self) -> Option<&PyNode> {
        match self.rule_kind() {
            Some(PyRule::Funcdef | PyRule::Classdef) => self.first_token(PyToken::Name),
            _ => None,
        }
    }

    fn parameters(&self) -> Option<&PyNode> {
        self.first_rule(PyRule::Parameters)
            .filter(|_| self.is(PyRule::Funcdef))
    }

    fn return_annotation(&self) -> Option<&PyNode> {
        if !self.is(PyRule::Funcdef) || !self.has_token(PyToken::Arrow) {
            return None;
        }
        self.first_rule(PyRule::Test)
    }

    fn decorators(&self) -> Vec<&PyNode> {
        self.first_rule(PyRule::Decorators)
            .filter(|_| self.is(PyRule::Decorated))
            .map(|list| list.rule_children(PyRule::Decorator).collect())
            .unwrap_or_default()
    }

    fn definition(&self) -> Option<&PyNode> {
        if !self.is(PyRule::Decorated) {
            return None;
        }
        self.children().iter().find(|child| {
            child.is(PyRule::Funcdef) || child.is(PyRule::Classdef) || child.is(PyRule::AsyncFuncdef)
        })
    }

    fn decorator_name(&self) -> Option<&PyNode> {
        self.first_rule(PyRule::DottedName)
            .filter(|_| self.is(PyRule::Decorator))
    }

    fn targets(&self) -> Option<&PyNode> {
        self.first_rule(PyRule::Exprlist)
            .filter(|_| self.is(PyRule::ForStmt))
    }

    fn iterable(&self) -> Option<&PyNode> {
        self.first_rule(PyRule::Testlist)
            .filter(|_| self.is(PyRule::ForStmt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_file;

    fn first(node: &PyNode, rule: PyRule) -> &PyNode {
        node.descendants().find(|n| n.is(rule)).unwrap()
    }

    #[test]
    fn test_if_roles() {
        let tree = parse_file("if a:\n    x\nelif b:\n    y\nelse:\n    z\n").unwrap();
        let if_stmt = first(tree.root(), PyRule::IfStmt);
        let conditions: Vec<String> = if_stmt.conditions().iter().map(|c| c.text()).collect();
        assert_eq!(conditions, ["a", "b"]);
        assert_eq!(if_stmt.suites().len(), 3);
        assert_eq!(if_stmt.else_suite().unwrap().text().trim(), "z");
    }

    #[test]
    fn test_absent_else_is_none() {
        let tree = parse_file("while a:\n    pass\nfor i in xs:\n    pass\n").unwrap();
        let while_stmt = first(tree.root(), PyRule::WhileStmt);
        assert_eq!(while_stmt.conditions().len(), 1);
        assert!(while_stmt.else_suite().is_none());
        let for_stmt = first(tree.root(), PyRule::ForStmt);
        assert_eq!(for_stmt.targets().unwrap().text(), "i");
        assert_eq!(for_stmt.iterable().unwrap().text(), "xs");
        assert!(for_stmt.else_suite().is_none());
        assert!(for_stmt.conditions().is_empty());
    }

    #[test]
    fn test_definition_roles() {
        let tree = parse_file("@a.b\n@c(1)\ndef f(x) -> int:\n    return x\n").unwrap();
        let decorated = first(tree.root(), PyRule::Decorated);
        let names: Vec<String> = decorated
            .decorators()
            .iter()
            .filter_map(|d| d.decorator_name())
            .map(PyNode::text)
            .collect();
        assert_eq!(names, ["a.b", "c"]);

        let funcdef = decorated.definition().unwrap();
        assert_eq!(funcdef.name().unwrap().token_text(), "f");
        assert_eq!(funcdef.parameters().unwrap().text(), "(x)");
        assert_eq!(funcdef.return_annotation().unwrap().text(), "int");
        assert!(funcdef.body().is_some());
        // Roles of other kinds do not apply.
        assert!(decorated.name().is_none());
        assert!(funcdef.decorators().is_empty());
    }

    #[test]
    fn test_missing_annotation_is_none() {
        let tree = parse_file("class A:\n    def g(self):\n        pass\n").unwrap();
        let classdef = first(tree.root(), PyRule::Classdef);
        assert_eq!(classdef.name().unwrap().token_text(), "A");
        let funcdef = first(tree.root(), PyRule::Funcdef);
        assert!(funcdef.return_annotation().is_none());
    }
}
