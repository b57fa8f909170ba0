// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Token and rule kinds of the GenericSql grammar.

use schemagram_tree::{grammar_dispatch, Node, TokenKind};

/// Token kinds produced by the GenericSql lexer.
///
/// Whitespace and comments are skipped by the lexer and have no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SqlToken {
    LParen,
    RParen,
    Comma,
    Dot,
    Select,
    Asterisk,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    Lt,
    Lte,
    Gt,
    Gte,
    Equals,
    NotEquals,
    Is,
    Null,
    Cast,
    Regexp,
    /// `$1$` or `$1`
    IndexedParam,
    /// `?`
    ParamPlaceholder,
    Id,
    /// A single decimal digit; `numeric` gathers them.
    Digit,
    /// `"name"` or `` `name` ``
    QuotedId,
    /// `'text'`, with `''` standing for a quote.
    String,
    Eof,
}

impl SqlToken {
    /// The keyword spelled by `word`, compared case-insensitively.
    pub fn keyword(word: &str) -> Option<SqlToken> {
        let kind = match word.to_ascii_uppercase().as_str() {
            "SELECT" => SqlToken::Select,
            "FROM" => SqlToken::From,
            "WHERE" => SqlToken::Where,
            "AND" => SqlToken::And,
            "OR" => SqlToken::Or,
            "NOT" => SqlToken::Not,
            "AS" => SqlToken::As,
            "IS" => SqlToken::Is,
            "NULL" => SqlToken::Null,
            "CAST" => SqlToken::Cast,
            "REGEXP" => SqlToken::Regexp,
            _ => return None,
        };
        Some(kind)
    }
}

impl TokenKind for SqlToken {
    fn name(self) -> &'static str {
        match self {
            SqlToken::LParen => "'('",
            SqlToken::RParen => "')'",
            SqlToken::Comma => "','",
            SqlToken::Dot => "'.'",
            SqlToken::Select => "SELECT",
            SqlToken::Asterisk => "ASTERISK",
            SqlToken::From => "FROM",
            SqlToken::Where => "WHERE",
            SqlToken::And => "AND",
            SqlToken::Or => "OR",
            SqlToken::Not => "NOT",
            SqlToken::As => "AS",
            SqlToken::Lt => "LT",
            SqlToken::Lte => "LTE",
            SqlToken::Gt => "GT",
            SqlToken::Gte => "GTE",
            SqlToken::Equals => "EQUALS",
            SqlToken::NotEquals => "NOT_EQUALS",
            SqlToken::Is => "IS",
            SqlToken::Null => "NULL",
            SqlToken::Cast => "CAST",
            SqlToken::Regexp => "REGEXP",
            SqlToken::IndexedParam => "INDEXED_PARAM",
            SqlToken::ParamPlaceholder => "PARAM_PLACEHOLDER",
            SqlToken::Id => "ID",
            SqlToken::Digit => "DIGIT",
            SqlToken::QuotedId => "QUOTED_ID",
            SqlToken::String => "STRING",
            SqlToken::Eof => "EOF",
        }
    }
}

grammar_dispatch! {
    /// The GenericSql grammar: single `SELECT` statements embedded in
    /// schema definitions.
    grammar GenericSql = "GenericSql" {
        tokens: SqlToken,
        rules: SqlRule,
        listener: SqlListener => SqlListenerAdapter,
        visitor: SqlVisitor => SqlVisitorAdapter,
    }
    rules {
        /// `query EOF | '(' query ')' EOF`
        Statement = "statement" => statement,
        /// `SELECT selectFields FROM fromTables (WHERE boolExp)?`
        Query = "query" => query,
        /// `aliasField`
        FromTables = "fromTables" => from_tables,
        /// `field (',' field)*`
        SelectFields = "selectFields" => select_fields,
        /// `selectField | '*'`
        Field = "field" => field,
        /// `exp (AS? identifier)?`
        SelectField = "selectField" => select_field,
        /// `idPath (AS? identifier)?`
        AliasField = "aliasField" => alias_field,
        /// `exp | NOT boolExp | boolExp AND boolExp | boolExp OR boolExp`
        BoolExp = "boolExp" => bool_exp,
        /// Operands, operator applications, calls, casts, literals and params.
        Exp = "exp" => exp,
        /// `DIGIT+ ('.' DIGIT+)? | '.' DIGIT+`
        Numeric = "numeric" => numeric,
        /// `< <= > >= = <> !=`
        BinaryOperator = "binaryOperator" => binary_operator,
        /// `IS NULL | IS NOT NULL`
        UnaryOperator = "unaryOperator" => unary_operator,
        /// `identifier ('.' identifier)*`
        IdPath = "idPath" => id_path,
        /// `ID | QUOTED_ID`
        Identifier = "identifier" => identifier,
    }
}

/// A node of a GenericSql tree.
pub type SqlNode = Node<GenericSql>;
