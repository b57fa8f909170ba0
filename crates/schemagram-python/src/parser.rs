// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Python3Subset parser.
//!
//! A `peg` grammar over the lexer's token slice. Every rule builds a node of
//! its own kind, so an expression such as `x` is the full
//! `test > or_test > ... > atom_expr > atom` chain. Operator rules are flat:
//! `a + b - c` is one `arith_expr` with five children.
//!
//! Rules that would otherwise parse the same prefix twice (`subscript`,
//! `argument`, `dictorsetmaker`, parameter lists) are factored so every
//! token is examined a bounded number of times.
//!
//! [`parse_file`] parses statement by statement. A statement that does not
//! parse is recorded as a syntax error and kept as a recovered `stmt` of
//! error nodes running to the end of its line, or of its indented block, and
//! parsing resumes after it. [`parse_single`] and [`parse_eval`] recover by
//! keeping the whole input as error nodes.

use schemagram_tree::{
    Lexeme, NestingGuard, Node, ParseError, ParseOptions, ParseTree, Recovery, SyntaxError,
    TokenKind,
};

use crate::kinds::{PyNode, PyRule, PyToken, Python3Subset};
use crate::lexer::{tokenize, PyLexeme};

type Tok<'a> = Lexeme<'a, PyToken>;

fn wrap(kind: PyRule, child: PyNode) -> PyNode {
    Node::build(kind).node(child).finish()
}

/// How a parameter of a `def` or `lambda` is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Plain,
    Star,
    DoubleStar,
}

/// Build a parameter list, refusing a second `*` parameter or anything
/// after the `**` parameter.
fn parameter_list(
    kind: PyRule,
    first: (ParamKind, Vec<PyNode>),
    rest: Vec<(PyNode, (ParamKind, Vec<PyNode>))>,
    trailing: Option<PyNode>,
) -> Result<PyNode, &'static str> {
    const EXPECTED: &str = "parameters with one `*` and `**` last";
    let mut builder = Node::build(kind);
    let mut star = false;
    let mut double_star = false;
    let params = std::iter::once((None, first)).chain(rest.into_iter().map(|(c, p)| (Some(c), p)));
    for (comma, (param, nodes)) in params {
        if double_star {
            return Err(EXPECTED);
        }
        match param {
            ParamKind::Star if star => return Err(EXPECTED),
            ParamKind::Star => star = true,
            ParamKind::DoubleStar => double_star = true,
            ParamKind::Plain => {}
        }
        builder = builder.opt(comma).nodes(nodes);
    }
    Ok(builder.opt(trailing).finish())
}

/// One entry of a `{...}` display: a dict entry or a set element.
struct DisplayItem {
    dict: bool,
    nodes: Vec<PyNode>,
}

enum DisplayTail {
    Comprehension(PyNode),
    Items(Vec<(PyNode, DisplayItem)>, Option<PyNode>),
}

/// Build a `dictorsetmaker`, refusing a mix of dict entries and set
/// elements.
fn dict_or_set(first: DisplayItem, tail: DisplayTail) -> Result<PyNode, &'static str> {
    let builder = Node::build(PyRule::Dictorsetmaker).nodes(first.nodes);
    let node = match tail {
        DisplayTail::Comprehension(comp) => builder.node(comp).finish(),
        DisplayTail::Items(items, trailing) => {
            if items.iter().any(|(_, item)| item.dict != first.dict) {
                return Err(if first.dict { "dict entry" } else { "set element" });
            }
            builder
                .groups(items.into_iter().map(|(comma, item)| {
                    let mut group = vec![comma];
                    group.extend(item.nodes);
                    group
                }))
                .opt(trailing)
                .finish()
        }
    };
    Ok(node)
}

peg::parser! {
    grammar py_grammar<'a>(guard: &'a NestingGuard) for [Tok<'a>] {
        use PyRule as R;
        use PyToken as T;

        // --------------------------------------------------------------------
        // Entry points
        // --------------------------------------------------------------------

        /// One statement, and how many tokens it used.
        pub rule stmt_prefix() -> (PyNode, usize)
            = s:stmt() p:position!() [_]* { (s, p) }

        pub rule single_input() -> PyNode
            = n:leaf(T::Newline) e:leaf(T::Eof) {
                Node::build(R::SingleInput).node(n).node(e).finish()
            }
            / s:simple_stmt() e:leaf(T::Eof) {
                Node::build(R::SingleInput).node(s).node(e).finish()
            }
            / c:compound_stmt() n:leaf(T::Newline)? e:leaf(T::Eof) {
                Node::build(R::SingleInput).node(c).opt(n).node(e).finish()
            }

        pub rule eval_input() -> PyNode
            = t:testlist() ns:leaf(T::Newline)* e:leaf(T::Eof) {
                Node::build(R::EvalInput).node(t).nodes(ns).node(e).finish()
            }

        // --------------------------------------------------------------------
        // Statements
        // --------------------------------------------------------------------

        rule stmt() -> PyNode = nested(<stmt_body()>)

        rule stmt_body() -> PyNode
            = s:simple_stmt() { wrap(R::Stmt, s) }
            / c:compound_stmt() { wrap(R::Stmt, c) }

        rule simple_stmt() -> PyNode
            = first:small_stmt() rest:(s:leaf(T::SemiColon) st:small_stmt() { vec![s, st] })*
              semi:leaf(T::SemiColon)? n:leaf(T::Newline)
            {
                Node::build(R::SimpleStmt).node(first).groups(rest).opt(semi).node(n).finish()
            }

        rule small_stmt() -> PyNode
            = s:(del_stmt() / pass_stmt() / flow_stmt() / import_stmt() / global_stmt()
                 / nonlocal_stmt() / assert_stmt() / expr_stmt())
            {
                wrap(R::SmallStmt, s)
            }

        rule expr_stmt() -> PyNode
            = target:testlist_star_expr() tail:expr_stmt_tail() {
                Node::build(R::ExprStmt).node(target).nodes(tail).finish()
            }

        rule expr_stmt_tail() -> Vec<PyNode>
            = a:annassign() { vec![a] }
            / op:augassign() value:(yield_expr() / testlist()) { vec![op, value] }
            / assigns:(eq:leaf(T::Assign) value:(yield_expr() / testlist_star_expr()) { vec![eq, value] })* {
                assigns.into_iter().flatten().collect()
            }

        rule annassign() -> PyNode
            = c:leaf(T::Colon) t:test() value:(eq:leaf(T::Assign) v:test() { vec![eq, v] })? {
                Node::build(R::Annassign).node(c).node(t).groups(value).finish()
            }

        rule testlist_star_expr() -> PyNode
            = first:test_or_star() rest:(c:leaf(T::Comma) t:test_or_star() { vec![c, t] })*
              trailing:leaf(T::Comma)?
            {
                Node::build(R::TestlistStarExpr).node(first).groups(rest).opt(trailing).finish()
            }

        rule test_or_star() -> PyNode = star_expr() / test()

        rule augassign() -> PyNode
            = op:leaf_in(&[
                T::AddAssign, T::SubAssign, T::MultAssign, T::AtAssign, T::DivAssign,
                T::ModAssign, T::AndAssign, T::OrAssign, T::XorAssign, T::LeftShiftAssign,
                T::RightShiftAssign, T::PowerAssign, T::IdivAssign,
              ], "augmented assignment")
            {
                wrap(R::Augassign, op)
            }

        rule del_stmt() -> PyNode
            = d:leaf(T::Del) e:exprlist() { Node::build(R::DelStmt).node(d).node(e).finish() }

        rule pass_stmt() -> PyNode = p:leaf(T::Pass) { wrap(R::PassStmt, p) }

        rule flow_stmt() -> PyNode
            = s:(break_stmt() / continue_stmt() / return_stmt() / raise_stmt() / yield_stmt()) {
                wrap(R::FlowStmt, s)
            }

        rule break_stmt() -> PyNode = b:leaf(T::Break) { wrap(R::BreakStmt, b) }

        rule continue_stmt() -> PyNode = c:leaf(T::Continue) { wrap(R::ContinueStmt, c) }

        rule return_stmt() -> PyNode
            = r:leaf(T::Return) t:testlist()? { Node::build(R::ReturnStmt).node(r).opt(t).finish() }

        rule yield_stmt() -> PyNode = y:yield_expr() { wrap(R::YieldStmt, y) }

        rule raise_stmt() -> PyNode
            = r:leaf(T::Raise)
              exc:(t:test() cause:(f:leaf(T::From) c:test() { vec![f, c] })? {
                  let mut group = vec![t];
                  group.extend(cause.into_iter().flatten());
                  group
              })?
            {
                Node::build(R::RaiseStmt).node(r).groups(exc).finish()
            }

        rule import_stmt() -> PyNode
            = i:(import_name() / import_from()) { wrap(R::ImportStmt, i) }

        rule import_name() -> PyNode
            = i:leaf(T::Import) names:dotted_as_names() {
                Node::build(R::ImportName).node(i).node(names).finish()
            }

        rule import_from() -> PyNode
            = f:leaf(T::From) source:import_source() i:leaf(T::Import) targets:import_targets() {
                Node::build(R::ImportFrom).node(f).nodes(source).node(i).nodes(targets).finish()
            }

        rule import_source() -> Vec<PyNode>
            = dots:import_dot()* name:dotted_name() { dots.into_iter().chain([name]).collect() }
            / dots:import_dot()+ { dots }

        rule import_dot() -> PyNode = leaf_in(&[T::Dot, T::Ellipsis], "'.'")

        rule import_targets() -> Vec<PyNode>
            = s:leaf(T::Star) { vec![s] }
            / l:leaf(T::OpenParen) names:import_as_names() r:leaf(T::CloseParen) { vec![l, names, r] }
            / names:import_as_names() { vec![names] }

        rule import_as_name() -> PyNode
            = n:leaf(T::Name) alias:(a:leaf(T::As) m:leaf(T::Name) { vec![a, m] })? {
                Node::build(R::ImportAsName).node(n).groups(alias).finish()
            }

        rule dotted_as_name() -> PyNode
            = d:dotted_name() alias:(a:leaf(T::As) m:leaf(T::Name) { vec![a, m] })? {
                Node::build(R::DottedAsName).node(d).groups(alias).finish()
            }

        rule import_as_names() -> PyNode
            = first:import_as_name() rest:(c:leaf(T::Comma) n:import_as_name() { vec![c, n] })*
              trailing:leaf(T::Comma)?
            {
                Node::build(R::ImportAsNames).node(first).groups(rest).opt(trailing).finish()
            }

        rule dotted_as_names() -> PyNode
            = first:dotted_as_name() rest:(c:leaf(T::Comma) n:dotted_as_name() { vec![c, n] })* {
                Node::build(R::DottedAsNames).node(first).groups(rest).finish()
            }

        rule dotted_name() -> PyNode
            = first:leaf(T::Name) rest:(d:leaf(T::Dot) n:leaf(T::Name) { vec![d, n] })* {
                Node::build(R::DottedName).node(first).groups(rest).finish()
            }

        rule global_stmt() -> PyNode
            = g:leaf(T::Global) first:leaf(T::Name) rest:(c:leaf(T::Comma) n:leaf(T::Name) { vec![c, n] })* {
                Node::build(R::GlobalStmt).node(g).node(first).groups(rest).finish()
            }

        rule nonlocal_stmt() -> PyNode
            = g:leaf(T::Nonlocal) first:leaf(T::Name) rest:(c:leaf(T::Comma) n:leaf(T::Name) { vec![c, n] })* {
                Node::build(R::NonlocalStmt).node(g).node(first).groups(rest).finish()
            }

        rule assert_stmt() -> PyNode
            = a:leaf(T::Assert) t:test() message:(c:leaf(T::Comma) m:test() { vec![c, m] })? {
                Node::build(R::AssertStmt).node(a).node(t).groups(message).finish()
            }

        // --------------------------------------------------------------------
        // Compound statements
        // --------------------------------------------------------------------

        rule compound_stmt() -> PyNode
            = s:(if_stmt() / while_stmt() / for_stmt() / try_stmt() / with_stmt() / funcdef()
                 / classdef() / decorated() / async_stmt())
            {
                wrap(R::CompoundStmt, s)
            }

        rule async_stmt() -> PyNode
            = a:leaf(T::Async) s:(funcdef() / with_stmt() / for_stmt()) {
                Node::build(R::AsyncStmt).node(a).node(s).finish()
            }

        rule if_stmt() -> PyNode
            = i:leaf(T::If) t:test() c:leaf(T::Colon) s:suite()
              elifs:(e:leaf(T::Elif) t:test() c:leaf(T::Colon) s:suite() { vec![e, t, c, s] })*
              other:else_part()?
            {
                Node::build(R::IfStmt)
                    .node(i)
                    .node(t)
                    .node(c)
                    .node(s)
                    .groups(elifs)
                    .groups(other)
                    .finish()
            }

        rule else_part() -> Vec<PyNode>
            = e:leaf(T::Else) c:leaf(T::Colon) s:suite() { vec![e, c, s] }

        rule finally_part() -> Vec<PyNode>
            = f:leaf(T::Finally) c:leaf(T::Colon) s:suite() { vec![f, c, s] }

        rule while_stmt() -> PyNode
            = w:leaf(T::While) t:test() c:leaf(T::Colon) s:suite() other:else_part()? {
                Node::build(R::WhileStmt).node(w).node(t).node(c).node(s).groups(other).finish()
            }

        rule for_stmt() -> PyNode
            = f:leaf(T::For) targets:exprlist() i:leaf(T::In) items:testlist() c:leaf(T::Colon)
              s:suite() other:else_part()?
            {
                Node::build(R::ForStmt)
                    .node(f)
                    .node(targets)
                    .node(i)
                    .node(items)
                    .node(c)
                    .node(s)
                    .groups(other)
                    .finish()
            }

        rule try_stmt() -> PyNode
            = t:leaf(T::Try) c:leaf(T::Colon) s:suite() tail:try_tail() {
                Node::build(R::TryStmt).node(t).node(c).node(s).nodes(tail).finish()
            }

        rule try_tail() -> Vec<PyNode>
            = handlers:(e:except_clause() c:leaf(T::Colon) s:suite() { vec![e, c, s] })+
              other:else_part()? last:finally_part()?
            {
                handlers.into_iter().chain(other).chain(last).flatten().collect()
            }
            / finally_part()

        rule with_stmt() -> PyNode
            = w:leaf(T::With) first:with_item() rest:(c:leaf(T::Comma) i:with_item() { vec![c, i] })*
              c:leaf(T::Colon) s:suite()
            {
                Node::build(R::WithStmt).node(w).node(first).groups(rest).node(c).node(s).finish()
            }

        rule with_item() -> PyNode
            = t:test() target:(a:leaf(T::As) e:expr() { vec![a, e] })? {
                Node::build(R::WithItem).node(t).groups(target).finish()
            }

        rule except_clause() -> PyNode
            = e:leaf(T::Except)
              filter:(t:test() alias:(a:leaf(T::As) n:leaf(T::Name) { vec![a, n] })? {
                  let mut group = vec![t];
                  group.extend(alias.into_iter().flatten());
                  group
              })?
            {
                Node::build(R::ExceptClause).node(e).groups(filter).finish()
            }

        rule suite() -> PyNode
            = s:simple_stmt() { wrap(R::Suite, s) }
            / n:leaf(T::Newline) i:leaf(T::Indent) body:stmt()+ d:leaf(T::Dedent) {
                Node::build(R::Suite).node(n).node(i).nodes(body).node(d).finish()
            }

        // --------------------------------------------------------------------
        // Definitions
        // --------------------------------------------------------------------

        rule decorator() -> PyNode
            = at:leaf(T::At) name:dotted_name()
              call:(l:leaf(T::OpenParen) args:arglist()? r:leaf(T::CloseParen) {
                  let mut group = vec![l];
                  group.extend(args);
                  group.push(r);
                  group
              })?
              n:leaf(T::Newline)
            {
                Node::build(R::Decorator).node(at).node(name).groups(call).node(n).finish()
            }

        rule decorators() -> PyNode
            = ds:decorator()+ { Node::build(R::Decorators).nodes(ds).finish() }

        rule decorated() -> PyNode
            = ds:decorators() d:(classdef() / funcdef() / async_funcdef()) {
                Node::build(R::Decorated).node(ds).node(d).finish()
            }

        rule async_funcdef() -> PyNode
            = a:leaf(T::Async) f:funcdef() { Node::build(R::AsyncFuncdef).node(a).node(f).finish() }

        rule funcdef() -> PyNode
            = d:leaf(T::Def) n:leaf(T::Name) p:parameters()
              returns:(a:leaf(T::Arrow) t:test() { vec![a, t] })? c:leaf(T::Colon) s:suite()
            {
                Node::build(R::Funcdef).node(d).node(n).node(p).groups(returns).node(c).node(s).finish()
            }

        rule parameters() -> PyNode
            = l:leaf(T::OpenParen) args:typedargslist()? r:leaf(T::CloseParen) {
                Node::build(R::Parameters).node(l).opt(args).node(r).finish()
            }

        rule typedargslist() -> PyNode
            = first:typed_param() rest:(c:leaf(T::Comma) p:typed_param() { (c, p) })*
              trailing:leaf(T::Comma)?
            {?
                parameter_list(R::Typedargslist, first, rest, trailing)
            }

        rule typed_param() -> (ParamKind, Vec<PyNode>)
            = s:leaf(T::Power) p:tfpdef() { (ParamKind::DoubleStar, vec![s, p]) }
            / s:leaf(T::Star) p:tfpdef()? { (ParamKind::Star, [s].into_iter().chain(p).collect()) }
            / p:tfpdef() default:(eq:leaf(T::Assign) t:test() { vec![eq, t] })? {
                (ParamKind::Plain, [p].into_iter().chain(default.into_iter().flatten()).collect())
            }

        rule tfpdef() -> PyNode
            = n:leaf(T::Name) annotation:(c:leaf(T::Colon) t:test() { vec![c, t] })? {
                Node::build(R::Tfpdef).node(n).groups(annotation).finish()
            }

        rule varargslist() -> PyNode
            = first:plain_param() rest:(c:leaf(T::Comma) p:plain_param() { (c, p) })*
              trailing:leaf(T::Comma)?
            {?
                parameter_list(R::Varargslist, first, rest, trailing)
            }

        rule plain_param() -> (ParamKind, Vec<PyNode>)
            = s:leaf(T::Power) p:vfpdef() { (ParamKind::DoubleStar, vec![s, p]) }
            / s:leaf(T::Star) p:vfpdef()? { (ParamKind::Star, [s].into_iter().chain(p).collect()) }
            / p:vfpdef() default:(eq:leaf(T::Assign) t:test() { vec![eq, t] })? {
                (ParamKind::Plain, [p].into_iter().chain(default.into_iter().flatten()).collect())
            }

        rule vfpdef() -> PyNode = n:leaf(T::Name) { wrap(R::Vfpdef, n) }

        rule classdef() -> PyNode
            = k:leaf(T::Class) n:leaf(T::Name)
              bases:(l:leaf(T::OpenParen) args:arglist()? r:leaf(T::CloseParen) {
                  let mut group = vec![l];
                  group.extend(args);
                  group.push(r);
                  group
              })?
              c:leaf(T::Colon) s:suite()
            {
                Node::build(R::Classdef).node(k).node(n).groups(bases).node(c).node(s).finish()
            }

        // --------------------------------------------------------------------
        // Tests
        // --------------------------------------------------------------------

        rule test() -> PyNode = nested(<test_body()>)

        rule test_body() -> PyNode
            = l:lambdef() { wrap(R::Test, l) }
            / o:or_test()
              conditional:(i:leaf(T::If) c:or_test() e:leaf(T::Else) t:test() { vec![i, c, e, t] })?
            {
                Node::build(R::Test).node(o).groups(conditional).finish()
            }

        rule test_nocond() -> PyNode
            = l:lambdef_nocond() { wrap(R::TestNocond, l) }
            / o:or_test() { wrap(R::TestNocond, o) }

        rule lambdef() -> PyNode
            = l:leaf(T::Lambda) args:varargslist()? c:leaf(T::Colon) t:test() {
                Node::build(R::Lambdef).node(l).opt(args).node(c).node(t).finish()
            }

        rule lambdef_nocond() -> PyNode
            = l:leaf(T::Lambda) args:varargslist()? c:leaf(T::Colon) t:test_nocond() {
                Node::build(R::LambdefNocond).node(l).opt(args).node(c).node(t).finish()
            }

        rule or_test() -> PyNode = chain(R::OrTest, <and_test()>, &[T::Or], "'or'")

        rule and_test() -> PyNode = chain(R::AndTest, <not_test()>, &[T::And], "'and'")

        rule not_test() -> PyNode
            = n:leaf(T::Not) inner:nested(<not_test()>) {
                Node::build(R::NotTest).node(n).node(inner).finish()
            }
            / c:comparison() { wrap(R::NotTest, c) }

        rule comparison() -> PyNode
            = first:expr() rest:(op:comp_op() e:expr() { vec![op, e] })* {
                Node::build(R::Comparison).node(first).groups(rest).finish()
            }

        rule comp_op() -> PyNode
            = n:leaf(T::Not) i:leaf(T::In) { Node::build(R::CompOp).node(n).node(i).finish() }
            / i:leaf(T::Is) n:leaf(T::Not) { Node::build(R::CompOp).node(i).node(n).finish() }
            / op:leaf_in(&[
                T::LessThan, T::GreaterThan, T::Equals, T::GtEq, T::LtEq, T::NotEq1, T::NotEq2,
                T::In, T::Is,
              ], "comparison operator")
            {
                wrap(R::CompOp, op)
            }

        rule star_expr() -> PyNode
            = s:leaf(T::Star) e:expr() { Node::build(R::StarExpr).node(s).node(e).finish() }

        // --------------------------------------------------------------------
        // Expressions
        // --------------------------------------------------------------------

        rule expr() -> PyNode = chain(R::Expr, <xor_expr()>, &[T::OrOp], "'|'")

        rule xor_expr() -> PyNode = chain(R::XorExpr, <and_expr()>, &[T::Xor], "'^'")

        rule and_expr() -> PyNode = chain(R::AndExpr, <shift_expr()>, &[T::AndOp], "'&'")

        rule shift_expr() -> PyNode
            = chain(R::ShiftExpr, <arith_expr()>, &[T::LeftShift, T::RightShift], "shift operator")

        rule arith_expr() -> PyNode
            = chain(R::ArithExpr, <term()>, &[T::Add, T::Minus], "'+' or '-'")

        rule term() -> PyNode
            = chain(R::Term, <factor()>, &[T::Star, T::At, T::Div, T::Mod, T::Idiv], "multiplicative operator")

        rule factor() -> PyNode
            = op:leaf_in(&[T::Add, T::Minus, T::NotOp], "unary operator") f:nested(<factor()>) {
                Node::build(R::Factor).node(op).node(f).finish()
            }
            / p:power() { wrap(R::Factor, p) }

        rule power() -> PyNode
            = a:atom_expr() exponent:(p:leaf(T::Power) f:nested(<factor()>) { vec![p, f] })? {
                Node::build(R::Power).node(a).groups(exponent).finish()
            }

        rule atom_expr() -> PyNode
            = w:leaf(T::Await)? a:atom() trailers:trailer()* {
                Node::build(R::AtomExpr).opt(w).node(a).nodes(trailers).finish()
            }

        rule atom() -> PyNode
            = l:leaf(T::OpenParen) inner:(yield_expr() / testlist_comp())? r:leaf(T::CloseParen) {
                Node::build(R::Atom).node(l).opt(inner).node(r).finish()
            }
            / l:leaf(T::OpenBrack) inner:testlist_comp()? r:leaf(T::CloseBrack) {
                Node::build(R::Atom).node(l).opt(inner).node(r).finish()
            }
            / l:leaf(T::OpenBrace) inner:dictorsetmaker()? r:leaf(T::CloseBrace) {
                Node::build(R::Atom).node(l).opt(inner).node(r).finish()
            }
            / ts:string_template()+ { Node::build(R::Atom).nodes(ts).finish() }
            / ss:leaf(T::String)+ { Node::build(R::Atom).nodes(ss).finish() }
            / t:leaf_in(&[T::Name, T::Number, T::Ellipsis, T::None, T::True, T::False], "atom") {
                wrap(R::Atom, t)
            }

        rule testlist_comp() -> PyNode
            = first:test_or_star() tail:testlist_comp_tail() {
                Node::build(R::TestlistComp).node(first).nodes(tail).finish()
            }

        rule testlist_comp_tail() -> Vec<PyNode>
            = c:comp_for() { vec![c] }
            / rest:(c:leaf(T::Comma) t:test_or_star() { vec![c, t] })* trailing:leaf(T::Comma)? {
                rest.into_iter().flatten().chain(trailing).collect()
            }

        rule trailer() -> PyNode
            = a:call_arguments() { wrap(R::Trailer, a) }
            / l:leaf(T::OpenBrack) s:subscriptlist() r:leaf(T::CloseBrack) {
                Node::build(R::Trailer).node(l).node(s).node(r).finish()
            }
            / d:leaf(T::Dot) n:leaf(T::Name) { Node::build(R::Trailer).node(d).node(n).finish() }

        rule subscriptlist() -> PyNode
            = first:subscript() rest:(c:leaf(T::Comma) s:subscript() { vec![c, s] })*
              trailing:leaf(T::Comma)?
            {
                Node::build(R::Subscriptlist).node(first).groups(rest).opt(trailing).finish()
            }

        rule subscript() -> PyNode
            = lower:test() slice:slice_tail()? {
                Node::build(R::Subscript).node(lower).groups(slice).finish()
            }
            / slice:slice_tail() { Node::build(R::Subscript).nodes(slice).finish() }

        rule slice_tail() -> Vec<PyNode>
            = c:leaf(T::Colon) upper:test()? step:sliceop()? {
                [c].into_iter().chain(upper).chain(step).collect()
            }

        rule sliceop() -> PyNode
            = c:leaf(T::Colon) t:test()? { Node::build(R::Sliceop).node(c).opt(t).finish() }

        rule exprlist() -> PyNode
            = first:expr_or_star() rest:(c:leaf(T::Comma) e:expr_or_star() { vec![c, e] })*
              trailing:leaf(T::Comma)?
            {
                Node::build(R::Exprlist).node(first).groups(rest).opt(trailing).finish()
            }

        rule expr_or_star() -> PyNode = star_expr() / expr()

        rule testlist() -> PyNode
            = first:test() rest:(c:leaf(T::Comma) t:test() { vec![c, t] })* trailing:leaf(T::Comma)? {
                Node::build(R::Testlist).node(first).groups(rest).opt(trailing).finish()
            }

        rule dictorsetmaker() -> PyNode
            = first:display_item() tail:display_tail() {? dict_or_set(first, tail) }

        rule display_item() -> DisplayItem
            = p:leaf(T::Power) e:expr() { DisplayItem { dict: true, nodes: vec![p, e] } }
            / s:star_expr() { DisplayItem { dict: false, nodes: vec![s] } }
            / key:test() value:(c:leaf(T::Colon) v:test() { vec![c, v] })? {
                match value {
                    Some(value) => DisplayItem { dict: true, nodes: [key].into_iter().chain(value).collect() },
                    None => DisplayItem { dict: false, nodes: vec![key] },
                }
            }

        rule display_tail() -> DisplayTail
            = c:comp_for() { DisplayTail::Comprehension(c) }
            / items:(c:leaf(T::Comma) i:display_item() { (c, i) })* trailing:leaf(T::Comma)? {
                DisplayTail::Items(items, trailing)
            }

        rule call_arguments() -> PyNode
            = l:leaf(T::OpenParen) args:arglist()? r:leaf(T::CloseParen) {
                Node::build(R::CallArguments).node(l).opt(args).node(r).finish()
            }

        rule arglist() -> PyNode
            = first:argument() rest:(c:leaf(T::Comma) a:argument() { vec![c, a] })*
              trailing:leaf(T::Comma)?
            {
                Node::build(R::Arglist).node(first).groups(rest).opt(trailing).finish()
            }

        rule argument() -> PyNode
            = s:leaf_in(&[T::Power, T::Star], "'*' or '**'") t:test() {
                Node::build(R::Argument).node(s).node(t).finish()
            }
            / t:test() tail:argument_tail()? {
                Node::build(R::Argument).node(t).groups(tail).finish()
            }

        rule argument_tail() -> Vec<PyNode>
            = c:comp_for() { vec![c] }
            / eq:leaf(T::Assign) v:test() { vec![eq, v] }

        rule comp_iter() -> PyNode = nested(<comp_iter_body()>)

        rule comp_iter_body() -> PyNode
            = c:(comp_for() / comp_if()) { wrap(R::CompIter, c) }

        rule comp_for() -> PyNode
            = a:leaf(T::Async)? f:leaf(T::For) targets:exprlist() i:leaf(T::In) source:or_test()
              next:comp_iter()?
            {
                Node::build(R::CompFor)
                    .opt(a)
                    .node(f)
                    .node(targets)
                    .node(i)
                    .node(source)
                    .opt(next)
                    .finish()
            }

        rule comp_if() -> PyNode
            = i:leaf(T::If) t:test_nocond() next:comp_iter()? {
                Node::build(R::CompIf).node(i).node(t).opt(next).finish()
            }

        rule yield_expr() -> PyNode
            = y:leaf(T::Yield) a:yield_arg()? { Node::build(R::YieldExpr).node(y).opt(a).finish() }

        rule yield_arg() -> PyNode
            = f:leaf(T::From) t:test() { Node::build(R::YieldArg).node(f).node(t).finish() }
            / t:testlist() { wrap(R::YieldArg, t) }

        // --------------------------------------------------------------------
        // Templates
        // --------------------------------------------------------------------

        rule string_template() -> PyNode
            = s:leaf(T::SingleQuoteShortTemplateStart) atoms:single_string_template_atom()*
              e:leaf(T::SingleQuoteShortTemplateEnd)
            {
                Node::build(R::StringTemplate).node(s).nodes(atoms).node(e).finish()
            }
            / s:leaf(T::SingleQuoteLongTemplateStart) atoms:single_string_template_atom()*
              e:leaf(T::SingleQuoteLongTemplateEnd)
            {
                Node::build(R::StringTemplate).node(s).nodes(atoms).node(e).finish()
            }
            / s:leaf(T::DoubleQuoteShortTemplateStart) atoms:double_string_template_atom()*
              e:leaf(T::DoubleQuoteShortTemplateEnd)
            {
                Node::build(R::StringTemplate).node(s).nodes(atoms).node(e).finish()
            }
            / s:leaf(T::DoubleQuoteLongTemplateStart) atoms:double_string_template_atom()*
              e:leaf(T::DoubleQuoteLongTemplateEnd)
            {
                Node::build(R::StringTemplate).node(s).nodes(atoms).node(e).finish()
            }

        rule single_string_template_atom() -> PyNode
            = a:leaf(T::SingleQuoteStringAtom) { wrap(R::SingleStringTemplateAtom, a) }
            / h:template_hole() { Node::build(R::SingleStringTemplateAtom).nodes(h).finish() }

        rule double_string_template_atom() -> PyNode
            = a:leaf(T::DoubleQuoteStringAtom) { wrap(R::DoubleStringTemplateAtom, a) }
            / h:template_hole() { Node::build(R::DoubleStringTemplateAtom).nodes(h).finish() }

        rule template_hole() -> Vec<PyNode>
            = l:leaf(T::OpenBrace) e:test_or_star() r:leaf(T::TemplateCloseBrace) { vec![l, e, r] }

        // --------------------------------------------------------------------
        // Helpers
        // --------------------------------------------------------------------

        rule chain(kind: PyRule, operand: rule<PyNode>, ops: &[PyToken], label: &'static str) -> PyNode
            = first:operand() rest:(op:leaf_in(ops, label) x:operand() { vec![op, x] })* {
                Node::build(kind).node(first).groups(rest).finish()
            }

        rule nested<N>(inner: rule<N>) -> N
            = enter_nesting() value:inner() leave_nesting() { value }
            // A refused enter opened no level, but its refusal already fails the parse.
            / leave_nesting() value:expected!("expression") { value }

        rule enter_nesting() = p:position!() {? guard.enter(p) }

        rule leave_nesting() = position!() { guard.leave() }

        rule leaf(kind: PyToken) -> PyNode
            = [t] {? if t.kind == kind { Ok(t.terminal::<Python3Subset>()) } else { Err(kind.name()) } }

        rule leaf_in(kinds: &[PyToken], label: &'static str) -> PyNode
            = [t] {?
                if kinds.contains(&t.kind) {
                    Ok(t.terminal::<Python3Subset>())
                } else {
                    Err(label)
                }
            }
    }
}

// ============================================================================
// Drivers
// ============================================================================

/// Parse a module (`file_input`) with default options.
pub fn parse_file(text: &str) -> Result<ParseTree<Python3Subset>, ParseError> {
    parse_file_with_options(text, &ParseOptions::default())
}

/// Parse a module (`file_input`).
///
/// Statements that do not parse are recovered from one at a time and
/// reported through [`ParseTree::errors`]. Only input nested deeper than
/// [`ParseOptions::max_nesting`], or too large to address, fails outright.
pub fn parse_file_with_options(
    text: &str,
    options: &ParseOptions,
) -> Result<ParseTree<Python3Subset>, ParseError> {
    let (lexemes, mut errors) = tokenize(text)?;
    let guard = options.nesting_guard();
    let mut children: Vec<PyNode> = Vec::new();
    let mut position = 0;

    while let Some(lexeme) = lexemes.get(position) {
        match lexeme.kind {
            PyToken::Eof => {
                children.push(lexeme.terminal());
                break;
            }
            PyToken::Newline => {
                children.push(lexeme.terminal());
                position += 1;
            }
            _ => {
                let rest = &lexemes[position..];
                guard.reset_depth();
                let outcome = py_grammar::stmt_prefix(rest, &guard);
                check_nesting(&guard, rest)?;
                match outcome {
                    Ok((stmt, used)) => {
                        children.push(stmt);
                        position += used;
                    }
                    Err(err) => {
                        errors.push(syntax_error(rest, &err, Recovery::DiscardedStatement));
                        let end = position + statement_end(rest);
                        children.push(discarded_statement(&lexemes[position..end]));
                        position = end;
                    }
                }
            }
        }
    }

    let root = PyNode::build(PyRule::FileInput).nodes(children).finish();
    tracing::debug!(
        tokens = lexemes.len(),
        errors = errors.len(),
        "parsed Python3Subset file"
    );
    errors.sort_by_key(|error| error.span.start);
    Ok(ParseTree::new(root, errors))
}

/// Parse one interactive statement (`single_input`) with default options.
pub fn parse_single(text: &str) -> Result<ParseTree<Python3Subset>, ParseError> {
    parse_single_with_options(text, &ParseOptions::default())
}

/// Parse one interactive statement (`single_input`).
pub fn parse_single_with_options(
    text: &str,
    options: &ParseOptions,
) -> Result<ParseTree<Python3Subset>, ParseError> {
    parse_whole(text, options, Entry::Single)
}

/// Parse an expression list (`eval_input`) with default options.
pub fn parse_eval(text: &str) -> Result<ParseTree<Python3Subset>, ParseError> {
    parse_eval_with_options(text, &ParseOptions::default())
}

/// Parse an expression list (`eval_input`).
pub fn parse_eval_with_options(
    text: &str,
    options: &ParseOptions,
) -> Result<ParseTree<Python3Subset>, ParseError> {
    parse_whole(text, options, Entry::Eval)
}

/// The entry rules that must consume the whole input.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Single,
    Eval,
}

impl Entry {
    fn rule(self) -> PyRule {
        match self {
            Entry::Single => PyRule::SingleInput,
            Entry::Eval => PyRule::EvalInput,
        }
    }
}

/// Run an entry rule over the whole input, keeping every token as an error
/// node under a recovered root when it fails.
fn parse_whole(
    text: &str,
    options: &ParseOptions,
    entry: Entry,
) -> Result<ParseTree<Python3Subset>, ParseError> {
    let (lexemes, mut errors) = tokenize(text)?;
    let guard = options.nesting_guard();
    let outcome = match entry {
        Entry::Single => py_grammar::single_input(&lexemes, &guard),
        Entry::Eval => py_grammar::eval_input(&lexemes, &guard),
    };
    check_nesting(&guard, &lexemes)?;

    let root = match outcome {
        Ok(root) => root,
        Err(err) => {
            errors.push(syntax_error(&lexemes, &err, Recovery::DiscardedInput));
            let children = lexemes.iter().map(|lexeme| {
                if lexeme.kind == PyToken::Eof {
                    lexeme.terminal()
                } else {
                    lexeme.error_terminal()
                }
            });
            PyNode::build(entry.rule())
                .nodes(children)
                .finish()
                .mark_recovered()
        }
    };
    errors.sort_by_key(|error| error.span.start);
    Ok(ParseTree::new(root, errors))
}

fn check_nesting(guard: &NestingGuard, lexemes: &[PyLexeme<'_>]) -> Result<(), ParseError> {
    let Some(position) = guard.tripped_at() else {
        return Ok(());
    };
    let span = lexeme_at(lexemes, position)
        .map(|lexeme| lexeme.span)
        .unwrap_or_default();
    tracing::warn!(limit = guard.limit(), %span, "Python3Subset nesting limit exceeded");
    Err(ParseError::DepthExceeded {
        limit: guard.limit(),
        span,
    })
}

fn syntax_error(
    lexemes: &[PyLexeme<'_>],
    err: &peg::error::ParseError<usize>,
    recovery: Recovery,
) -> SyntaxError {
    // Token checks consume the token before rejecting it, so the failure is
    // recorded one past the offending token.
    let position = err.location.saturating_sub(1);
    let (span, found) = lexeme_at(lexemes, position)
        .map(|lexeme| (lexeme.span, lexeme.describe()))
        .unwrap_or_default();
    let error = SyntaxError::new(span, err.expected.to_string(), found, recovery);
    tracing::debug!(%error, "Python3Subset input did not parse");
    error
}

fn lexeme_at<'t, 'a>(lexemes: &'t [PyLexeme<'a>], position: usize) -> Option<&'t PyLexeme<'a>> {
    lexemes.get(position).or_else(|| lexemes.last())
}

/// How many tokens of `lexemes` a statement that failed to parse covers: up
/// to and including the `NEWLINE` ending its first line, plus the indented
/// block that follows it. `EOF` is never included.
fn statement_end(lexemes: &[PyLexeme<'_>]) -> usize {
    let mut depth = 0usize;
    let mut index = 0;
    while let Some(lexeme) = lexemes.get(index) {
        let closes = match lexeme.kind {
            PyToken::Eof => return index,
            PyToken::Indent => {
                depth += 1;
                false
            }
            PyToken::Dedent => {
                depth = depth.saturating_sub(1);
                depth == 0
            }
            PyToken::Newline => depth == 0,
            _ => false,
        };
        index += 1;
        let block_follows = lexemes
            .get(index)
            .is_some_and(|next| next.kind == PyToken::Indent);
        if closes && !block_follows {
            return index;
        }
    }
    index
}

fn discarded_statement(lexemes: &[PyLexeme<'_>]) -> PyNode {
    PyNode::build(PyRule::Stmt)
        .nodes(lexemes.iter().map(|lexeme| lexeme.error_terminal()))
        .finish()
        .mark_recovered()
}
