// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Named access to the children of GenericSql nodes.
//!
//! Each accessor applies to the node kinds named in its docs and returns
//! `None` (or an empty list) on any other kind. An optional part that is
//! absent from the source is `None`, never an empty node.

use crate::kinds::{SqlNode, SqlRule, SqlToken};

/// Role accessors for [`SqlNode`].
pub trait SqlRoles {
    /// `statement`: the query, with or without surrounding parentheses.
    fn query(&self) -> Option<&SqlNode>;

    /// `query`: the `selectFields` list.
    fn select_fields(&self) -> Option<&SqlNode>;

    /// `query`: the `fromTables` part.
    fn from_tables(&self) -> Option<&SqlNode>;

    /// `query`: the `boolExp` after `WHERE`.
    fn where_clause(&self) -> Option<&SqlNode>;

    /// `selectFields`: the `field` entries, without the commas.
    fn fields(&self) -> Vec<&SqlNode>;

    /// `field`: whether this is `*`.
    fn is_asterisk(&self) -> bool;

    /// `selectField` or `aliasField`: the `identifier` naming the alias.
    fn alias(&self) -> Option<&SqlNode>;

    /// `aliasField`: the aliased `idPath`.
    fn id_path(&self) -> Option<&SqlNode>;

    /// `boolExp` or `exp`: the operand nodes of this level, left to right.
    fn operands(&self) -> Vec<&SqlNode>;

    /// `exp` or `boolExp`: the operator node or keyword of this level.
    fn operator(&self) -> Option<&SqlNode>;
}

impl SqlRoles for SqlNode {
    fn query(&self) -> Option<&SqlNode> {
        self.first_rule(SqlRule::Query)
            .filter(|_| self.is(SqlRule::Statement))
    }

    fn select_fields(&self) -> Option<&SqlNode> {
        self.first_rule(SqlRule::SelectFields)
            .filter(|_| self.is(SqlRule::Query))
    }

    fn from_tables(&self) -> Option<&SqlNode> {
        self.first_rule(SqlRule::FromTables)
            .filter(|_| self.is(SqlRule::Query))
    }

    fn where_clause(&self) -> Option<&SqlNode> {
        if !self.is(SqlRule::Query) || !self.has_token(SqlToken::Where) {
            return None;
        }
        self.first_rule(SqlRule::BoolExp)
    }

    fn fields(&self) -> Vec<&SqlNode> {
        if !self.is(SqlRule::SelectFields) {
            return Vec::new();
        }
        self.rule_children(SqlRule::Field).collect()
    }

    fn is_asterisk(&self) -> bool {
        self.is(SqlRule::Field) && self.has_token(SqlToken::Asterisk)
    }

    fn alias(&self) -> Option<&SqlNode> {
        if !(self.is(SqlRule::SelectField) || self.is(SqlRule::AliasField)) {
            return None;
        }
        self.first_rule(SqlRule::Identifier)
    }

    fn id_path(&self) -> Option<&SqlNode> {
        self.first_rule(SqlRule::IdPath)
            .filter(|_| self.is(SqlRule::AliasField))
    }

    fn operands(&self) -> Vec<&SqlNode> {
        match self.rule_kind() {
            Some(SqlRule::BoolExp) => self.rule_children(SqlRule::BoolExp).collect(),
            Some(SqlRule::Exp) => self.rule_children(SqlRule::Exp).collect(),
            _ => Vec::new(),
        }
    }

    fn operator(&self) -> Option<&SqlNode> {
        match self.rule_kind() {
            Some(SqlRule::BoolExp) => self.children().iter().find(|child| {
                child.is_token(SqlToken::And)
                    || child.is_token(SqlToken::Or)
                    || child.is_token(SqlToken::Not)
            }),
            Some(SqlRule::Exp) => self
                .first_rule(SqlRule::BinaryOperator)
                .or_else(|| self.first_rule(SqlRule::UnaryOperator)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_query_roles() {
        let tree = parse("SELECT a, * FROM t WHERE a > 1").unwrap();
        let query = tree.root().query().unwrap();
        let fields = query.select_fields().unwrap().fields();
        assert_eq!(fields.len(), 2);
        assert!(!fields[0].is_asterisk());
        assert!(fields[1].is_asterisk());
        assert_eq!(query.from_tables().unwrap().text(), "t");

        let condition = query.where_clause().unwrap();
        let comparison = condition.child(0).unwrap();
        assert_eq!(comparison.operands().len(), 2);
        assert_eq!(comparison.operator().unwrap().text(), ">");
    }

    #[test]
    fn test_absent_parts_are_none() {
        let tree = parse("(SELECT a FROM t)").unwrap();
        let query = tree.root().query().unwrap();
        assert!(query.where_clause().is_none());
        let table = query.from_tables().unwrap().child(0).unwrap();
        assert!(table.alias().is_none());
        assert_eq!(table.id_path().unwrap().text(), "t");
        // Roles of other kinds do not apply.
        assert!(tree.root().select_fields().is_none());
        assert!(query.fields().is_empty());
    }

    #[test]
    fn test_alias_with_and_without_as() {
        let tree = parse("SELECT a total, b AS other FROM t u").unwrap();
        let aliases: Vec<String> = tree
            .root()
            .descendants()
            .filter_map(|node| node.alias())
            .map(|alias| alias.text())
            .collect();
        assert_eq!(aliases, ["total", "other", "u"]);
    }
}
