// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! GenericSql parser.
//!
//! A `peg` grammar over the lexer's token slice. The left-recursive rules of
//! the grammar (`boolExp` and `exp`) are parsed as loops and folded into the
//! same left-nested trees a left-recursive parser would build:
//!
//! - `NOT` binds loosest: `NOT a AND b` is `NOT (a AND b)`
//! - `AND` binds tighter than `OR`, both associate left
//! - a binary operator takes a single operand on its right, and `IS [NOT]
//!   NULL` applies to everything on its left
//!
//! Every folded step nests the tree one level deeper, so each one counts
//! against [`ParseOptions::max_nesting`] until its chain is complete.
//!
//! Input that does not form a statement still produces a tree: the driver
//! records a syntax error and keeps every token under a recovered `statement`
//! node.

use schemagram_tree::{
    Lexeme, NestingGuard, Node, ParseError, ParseOptions, ParseTree, Recovery, SyntaxError,
    TokenKind,
};

use crate::kinds::{GenericSql, SqlNode, SqlRule, SqlToken};
use crate::lexer::{tokenize, SqlLexeme};

type Tok<'a> = Lexeme<'a, SqlToken>;

/// One step of an `exp` operator chain, applied to everything to its left.
enum ExpTail {
    Binary(SqlNode, SqlNode),
    Unary(SqlNode),
}

impl ExpTail {
    fn apply(self, lhs: SqlNode) -> SqlNode {
        let node = Node::build(SqlRule::Exp).node(lhs);
        match self {
            ExpTail::Binary(op, rhs) => node.node(op).node(rhs).finish(),
            ExpTail::Unary(op) => node.node(op).finish(),
        }
    }
}

/// Fold `first (op operand)*` into left-nested `boolExp` nodes.
fn fold_left(first: SqlNode, rest: Vec<(SqlNode, SqlNode)>) -> SqlNode {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        Node::build(SqlRule::BoolExp).node(lhs).node(op).node(rhs).finish()
    })
}

fn exp_of(child: SqlNode) -> SqlNode {
    Node::build(SqlRule::Exp).node(child).finish()
}

peg::parser! {
    grammar sql_grammar<'a>(guard: &'a NestingGuard) for [Tok<'a>] {
        use SqlRule as R;
        use SqlToken as T;

        pub rule statement() -> SqlNode
            = q:query() e:leaf(T::Eof) {
                Node::build(R::Statement).node(q).node(e).finish()
            }
            / l:leaf(T::LParen) q:query() r:leaf(T::RParen) e:leaf(T::Eof) {
                Node::build(R::Statement).node(l).node(q).node(r).node(e).finish()
            }

        rule query() -> SqlNode
            = s:leaf(T::Select) fields:select_fields() f:leaf(T::From) tables:from_tables()
              filter:(w:leaf(T::Where) b:bool_exp() { vec![w, b] })?
            {
                Node::build(R::Query)
                    .node(s)
                    .node(fields)
                    .node(f)
                    .node(tables)
                    .groups(filter)
                    .finish()
            }

        rule from_tables() -> SqlNode
            = a:alias_field() { Node::build(R::FromTables).node(a).finish() }

        rule select_fields() -> SqlNode
            = first:field() rest:(c:leaf(T::Comma) f:field() { vec![c, f] })* {
                Node::build(R::SelectFields).node(first).groups(rest).finish()
            }

        rule field() -> SqlNode
            = a:leaf(T::Asterisk) { Node::build(R::Field).node(a).finish() }
            / s:select_field() { Node::build(R::Field).node(s).finish() }

        rule select_field() -> SqlNode
            = e:exp() a:alias()? { Node::build(R::SelectField).node(e).groups(a).finish() }

        rule alias_field() -> SqlNode
            = p:id_path() a:alias()? { Node::build(R::AliasField).node(p).groups(a).finish() }

        rule alias() -> Vec<SqlNode>
            = a:leaf(T::As)? i:identifier() { a.into_iter().chain([i]).collect() }

        // --------------------------------------------------------------------
        // boolExp
        // --------------------------------------------------------------------

        rule bool_exp() -> SqlNode = nested(<bool_or()>)

        rule bool_or() -> SqlNode
            = first:bool_and() rest:(o:leaf(T::Or) r:bool_and() enter_nesting() { (o, r) })* {
                guard.leave_levels(rest.len());
                fold_left(first, rest)
            }

        rule bool_and() -> SqlNode
            = first:bool_operand() rest:(a:leaf(T::And) r:bool_operand() enter_nesting() { (a, r) })* {
                guard.leave_levels(rest.len());
                fold_left(first, rest)
            }

        rule bool_operand() -> SqlNode
            = n:leaf(T::Not) b:bool_exp() { Node::build(R::BoolExp).node(n).node(b).finish() }
            / e:exp() { Node::build(R::BoolExp).node(e).finish() }

        // --------------------------------------------------------------------
        // exp
        // --------------------------------------------------------------------

        rule exp() -> SqlNode = nested(<exp_chain()>)

        rule exp_chain() -> SqlNode
            = first:primary() tails:(t:exp_tail() enter_nesting() { t })* {
                guard.leave_levels(tails.len());
                tails.into_iter().fold(first, |lhs, tail| tail.apply(lhs))
            }

        rule exp_tail() -> ExpTail
            = op:binary_operator() rhs:primary() { ExpTail::Binary(op, rhs) }
            / op:unary_operator() { ExpTail::Unary(op) }

        rule primary() -> SqlNode
            = name:identifier() l:leaf(T::LParen) first:exp()
              rest:(c:leaf(T::Comma) e:exp() { vec![c, e] })* r:leaf(T::RParen)
            {
                Node::build(R::Exp).node(name).node(l).node(first).groups(rest).node(r).finish()
            }
            / p:id_path() { exp_of(p) }
            / c:leaf(T::Cast) l:leaf(T::LParen) e:exp() a:leaf(T::As) t:identifier() r:leaf(T::RParen) {
                Node::build(R::Exp).node(c).node(l).node(e).node(a).node(t).node(r).finish()
            }
            / k:leaf(T::Regexp) s:leaf(T::String) { Node::build(R::Exp).node(k).node(s).finish() }
            / s:leaf(T::String) { exp_of(s) }
            / n:numeric() { exp_of(n) }
            / p:leaf(T::IndexedParam) { exp_of(p) }
            / p:leaf(T::ParamPlaceholder) { exp_of(p) }
            / l:leaf(T::LParen) e:exp() r:leaf(T::RParen) {
                Node::build(R::Exp).node(l).node(e).node(r).finish()
            }

        rule numeric() -> SqlNode
            = whole:leaf(T::Digit)+ fraction:(d:leaf(T::Dot) ds:leaf(T::Digit)+ {
                  let mut group = vec![d];
                  group.extend(ds);
                  group
              })?
            {
                Node::build(R::Numeric).nodes(whole).groups(fraction).finish()
            }
            / d:leaf(T::Dot) ds:leaf(T::Digit)+ { Node::build(R::Numeric).node(d).nodes(ds).finish() }

        rule binary_operator() -> SqlNode
            = op:leaf_in(&[T::Lt, T::Lte, T::Gt, T::Gte, T::Equals, T::NotEquals], "comparison operator") {
                Node::build(R::BinaryOperator).node(op).finish()
            }

        rule unary_operator() -> SqlNode
            = i:leaf(T::Is) n:leaf(T::Not) u:leaf(T::Null) {
                Node::build(R::UnaryOperator).node(i).node(n).node(u).finish()
            }
            / i:leaf(T::Is) u:leaf(T::Null) {
                Node::build(R::UnaryOperator).node(i).node(u).finish()
            }

        rule id_path() -> SqlNode
            = first:identifier() rest:(d:leaf(T::Dot) i:identifier() { vec![d, i] })* {
                Node::build(R::IdPath).node(first).groups(rest).finish()
            }

        rule identifier() -> SqlNode
            = t:leaf_in(&[T::Id, T::QuotedId], "identifier") {
                Node::build(R::Identifier).node(t).finish()
            }

        // --------------------------------------------------------------------
        // Helpers
        // --------------------------------------------------------------------

        rule nested<N>(inner: rule<N>) -> N
            = enter_nesting() value:inner() leave_nesting() { value }
            // A refused enter opened no level, but its refusal already fails the parse.
            / leave_nesting() value:expected!("expression") { value }

        rule enter_nesting() = p:position!() {? guard.enter(p) }

        rule leave_nesting() = position!() { guard.leave() }

        rule leaf(kind: SqlToken) -> SqlNode
            = [t] {? if t.kind == kind { Ok(t.terminal::<GenericSql>()) } else { Err(kind.name()) } }

        rule leaf_in(kinds: &[SqlToken], label: &'static str) -> SqlNode
            = [t] {?
                if kinds.contains(&t.kind) {
                    Ok(t.terminal::<GenericSql>())
                } else {
                    Err(label)
                }
            }
    }
}

/// Parse a GenericSql statement with default options.
pub fn parse(text: &str) -> Result<ParseTree<GenericSql>, ParseError> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parse a GenericSql statement.
///
/// Syntax errors are recovered from and reported through
/// [`ParseTree::errors`]. Only input nested deeper than
/// [`ParseOptions::max_nesting`], or too large to address, fails outright.
pub fn parse_with_options(
    text: &str,
    options: &ParseOptions,
) -> Result<ParseTree<GenericSql>, ParseError> {
    let (lexemes, mut errors) = tokenize(text)?;
    let guard = options.nesting_guard();
    let outcome = sql_grammar::statement(&lexemes, &guard);

    if let Some(position) = guard.tripped_at() {
        let span = lexeme_at(&lexemes, position)
            .map(|lexeme| lexeme.span)
            .unwrap_or_default();
        tracing::warn!(limit = guard.limit(), %span, "GenericSql nesting limit exceeded");
        return Err(ParseError::DepthExceeded {
            limit: guard.limit(),
            span,
        });
    }

    let root = match outcome {
        Ok(root) => root,
        Err(err) => {
            // Token checks consume the token before rejecting it, so the
            // failure is recorded one past the offending token.
            let position = err.location.saturating_sub(1);
            let (span, found) = lexeme_at(&lexemes, position)
                .map(|lexeme| (lexeme.span, lexeme.describe()))
                .unwrap_or_default();
            let error = SyntaxError::new(
                span,
                err.expected.to_string(),
                found,
                Recovery::DiscardedInput,
            );
            tracing::debug!(%error, "GenericSql statement did not parse");
            errors.push(error);
            recover(&lexemes)
        }
    };

    errors.sort_by_key(|error| error.span.start);
    Ok(ParseTree::new(root, errors))
}

fn lexeme_at<'t, 'a>(lexemes: &'t [SqlLexeme<'a>], position: usize) -> Option<&'t SqlLexeme<'a>> {
    lexemes.get(position).or_else(|| lexemes.last())
}

/// A `statement` holding every token as an error node, except `EOF`.
fn recover(lexemes: &[SqlLexeme<'_>]) -> SqlNode {
    let children = lexemes.iter().map(|lexeme| {
        if lexeme.kind == SqlToken::Eof {
            lexeme.terminal()
        } else {
            lexeme.error_terminal()
        }
    });
    Node::build(SqlRule::Statement)
        .nodes(children)
        .finish()
        .mark_recovered()
}
