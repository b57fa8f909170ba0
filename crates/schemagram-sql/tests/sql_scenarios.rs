// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end GenericSql scenarios: parse, then walk or visit.

use itertools::Itertools;
use rayon::prelude::*;
use schemagram_sql::{
    parse, parse_with_options, visit, walk, FieldCollector, GenericSql, IdPathCollector,
    SqlListener, SqlNode, SqlRoles, SqlRule, SqlToken, SqlVisitor,
};
use schemagram_tree::{
    CallbackResult, ParseError, ParseOptions, Phase, Recovery, TraversalError, WalkContext,
};

const SCENARIO: &str = "SELECT a.x AS y FROM t WHERE a.x > 1";

#[test]
fn field_extraction_scenario() {
    let tree = parse(SCENARIO).unwrap();
    assert!(!tree.has_errors());

    let query = tree.root().query().unwrap();
    let fields = query.select_fields().unwrap().fields();
    assert_eq!(fields.len(), 1);
    let field = fields[0].first_rule(SqlRule::SelectField).unwrap();
    assert_eq!(field.first_rule(SqlRule::Exp).unwrap().text(), "a.x");
    assert_eq!(field.alias().unwrap().text(), "y");

    let tables = query.from_tables().unwrap();
    assert_eq!(tables.children().len(), 1);
    assert_eq!(tables.text(), "t");

    let condition = query.where_clause().unwrap();
    let comparison = condition.child(0).unwrap();
    let [lhs, rhs] = comparison.operands()[..] else {
        panic!("expected two operands");
    };
    assert_eq!(lhs.first_rule(SqlRule::IdPath).unwrap().text(), "a.x");
    assert_eq!(comparison.operator().unwrap().text(), ">");
    assert_eq!(rhs.first_rule(SqlRule::Numeric).unwrap().text(), "1");

    assert_eq!(IdPathCollector::collect(&tree).unwrap(), ["a.x", "a.x"]);
}

#[test]
fn field_collector_scenario() {
    let tree = parse(SCENARIO).unwrap();
    let facts = FieldCollector::collect(&tree).unwrap();
    assert_eq!(facts.fields.len(), 1);
    assert_eq!(facts.fields[0].expression, "a.x");
    assert_eq!(facts.fields[0].alias.as_deref(), Some("y"));
    assert_eq!(facts.table.unwrap().path, "t");
}

#[test]
fn spans_cover_children() {
    let tree = parse("SELECT a.x AS y,\n  b FROM t").unwrap();
    for node in tree.root().descendants() {
        for child in node.children() {
            assert!(node.span().contains(&child.span()), "{node:?}");
        }
    }
    let second = tree
        .root()
        .descendants()
        .filter(|node| node.is(SqlRule::SelectField))
        .nth(1)
        .unwrap();
    assert_eq!((second.span().line, second.span().column), (2, 2));
}

/// Records every event of a walk.
#[derive(Default)]
struct Trace(Vec<String>);

impl SqlListener for Trace {
    fn enter_every_rule(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        self.0.push(format!("enter {}", ctx.node().kind().name()));
        Ok(())
    }

    fn exit_every_rule(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        self.0.push(format!("exit {}", ctx.node().kind().name()));
        Ok(())
    }

    fn visit_terminal(&mut self, ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        self.0.push(format!("term {}", ctx.node().token_text()));
        Ok(())
    }
}

#[test]
fn walk_visits_every_node_once() {
    let tree = parse(SCENARIO).unwrap();
    let mut trace = Trace::default();
    walk(tree.root(), &mut [&mut trace]).unwrap();

    let rules = tree.root().descendants().filter(|node| !node.is_terminal()).count();
    let terminals = tree.node_count() - rules;
    let counts = trace.0.iter().map(|event| event.split(' ').next().unwrap_or("")).counts();
    assert_eq!(counts["enter"], rules);
    assert_eq!(counts["exit"], rules);
    assert_eq!(counts["term"], terminals);

    let text = trace
        .0
        .iter()
        .filter_map(|event| event.strip_prefix("term "))
        .join(" ");
    assert_eq!(text, "SELECT a . x AS y FROM t WHERE a . x > 1 ");
}

#[test]
fn listeners_are_independent() {
    let tree = parse(SCENARIO).unwrap();
    let mut alone = Trace::default();
    walk(tree.root(), &mut [&mut alone]).unwrap();

    let mut first = Trace::default();
    let mut facts = FieldCollector::default();
    let mut second = Trace::default();
    walk(tree.root(), &mut [&mut first, &mut facts, &mut second]).unwrap();

    assert_eq!(first.0, alone.0);
    assert_eq!(second.0, alone.0);
    assert_eq!(facts, FieldCollector::collect(&tree).unwrap());
}

/// Fails on the first `numeric` it enters.
struct RejectNumbers;

impl SqlListener for RejectNumbers {
    fn enter_numeric(&mut self, _ctx: &WalkContext<'_, GenericSql>) -> CallbackResult {
        Err("numbers are not allowed here".into())
    }
}

#[test]
fn callback_failure_names_the_node() {
    let tree = parse(SCENARIO).unwrap();
    let mut trace = Trace::default();
    let err = walk(tree.root(), &mut [&mut trace, &mut RejectNumbers]).unwrap_err();
    match &err {
        TraversalError::Callback { phase, kind, span, .. } => {
            assert_eq!(*phase, Phase::Enter);
            assert_eq!(*kind, "numeric");
            assert_eq!(span.range(), 35..36);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The first listener already saw the failing node.
    assert_eq!(trace.0.last().map(String::as_str), Some("enter numeric"));
}

/// Counts `exp` nodes, but stops visiting a query once a child found any.
struct FirstExps;

impl SqlVisitor<usize> for FirstExps {
    fn default_result(&mut self) -> usize {
        0
    }

    fn aggregate_result(&mut self, aggregate: usize, next: usize) -> usize {
        aggregate + next
    }

    fn should_visit_next_child(&mut self, node: &SqlNode, current: &usize) -> bool {
        !(node.is(SqlRule::Query) && *current > 0)
    }

    fn visit_exp(&mut self, node: &SqlNode) -> CallbackResult<usize> {
        Ok(1 + schemagram_sql::visit_children(self, node)?)
    }
}

#[test]
fn visitor_can_stop_early() {
    let tree = parse(SCENARIO).unwrap();
    let query = tree.root().query().unwrap();
    // One exp in the select list, three in `a.x > 1`.
    assert_eq!(visit(&mut CountAll, query).unwrap(), 4);
    assert_eq!(visit(&mut FirstExps, query).unwrap(), 1);
}

struct CountAll;

impl SqlVisitor<usize> for CountAll {
    fn default_result(&mut self) -> usize {
        0
    }

    fn aggregate_result(&mut self, aggregate: usize, next: usize) -> usize {
        aggregate + next
    }

    fn visit_exp(&mut self, node: &SqlNode) -> CallbackResult<usize> {
        Ok(1 + schemagram_sql::visit_children(self, node)?)
    }
}

#[test]
fn recovered_input_is_walkable() {
    let tree = parse("SELECT a FROM").unwrap();
    assert_eq!(tree.errors().len(), 1);
    assert_eq!(tree.errors()[0].recovery, Recovery::DiscardedInput);
    assert_eq!(tree.errors()[0].found, "EOF");

    let error_nodes = tree
        .root()
        .descendants()
        .filter(|node| node.is_error_node())
        .map(SqlNode::token_text)
        .collect_vec();
    assert_eq!(error_nodes, ["SELECT", "a", "FROM"]);
    assert!(tree.root().children().last().unwrap().is_token(SqlToken::Eof));

    let mut trace = Trace::default();
    walk(tree.root(), &mut [&mut trace]).unwrap();
    assert_eq!(trace.0, ["enter statement", "term ", "exit statement"]);
}

#[test]
fn deep_nesting_is_refused() {
    // Run on a thread with a generous stack so the bound, not the host
    // stack, decides.
    let outcome = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let depth = 10_000;
            let text = format!("SELECT {}1{} FROM t", "(".repeat(depth), ")".repeat(depth));
            let default = parse(&text);
            let raised = parse_with_options(&text, &ParseOptions::default().with_max_nesting(500));
            (default, raised)
        })
        .unwrap()
        .join()
        .unwrap();

    match outcome {
        (
            Err(ParseError::DepthExceeded { limit: 100, .. }),
            Err(ParseError::DepthExceeded { limit: 500, .. }),
        ) => {}
        other => panic!("expected DepthExceeded twice, got {other:?}"),
    }
}

/// `terms` copies of `x` joined by `separator`, between `prefix` and `suffix`.
fn chain(prefix: &str, separator: &str, terms: usize, suffix: &str) -> String {
    format!("{prefix}{}{suffix}", vec!["x"; terms].join(separator))
}

fn assert_depth_exceeded(text: &str) {
    match parse(text) {
        Err(ParseError::DepthExceeded { limit: 100, .. }) => {}
        other => panic!("expected DepthExceeded, got {other:?}"),
    }
}

#[test]
fn long_boolean_chains_are_refused() {
    assert_depth_exceeded(&chain("SELECT a FROM t WHERE ", " OR ", 10_000, ""));
    assert_depth_exceeded(&chain("SELECT a FROM t WHERE ", " AND ", 10_000, ""));
    assert_depth_exceeded(&chain("SELECT a FROM t WHERE ", " AND x OR ", 5_000, ""));
}

#[test]
fn long_operator_chains_are_refused() {
    assert_depth_exceeded(&chain("SELECT ", " = ", 10_000, " FROM t"));
    assert_depth_exceeded(&chain("SELECT ", " <> ", 10_000, " FROM t"));
    let tails = " IS NULL".repeat(10_000);
    assert_depth_exceeded(&format!("SELECT a{tails} FROM t"));
}

#[test]
fn chains_within_the_limit_parse() {
    let tree = parse(&chain("SELECT a FROM t WHERE ", " OR ", 50, "")).unwrap();
    assert!(!tree.has_errors());
    let tree = parse(&chain("SELECT ", " = ", 50, " FROM t")).unwrap();
    assert!(!tree.has_errors());
    assert_eq!(IdPathCollector::collect(&tree).unwrap().len(), 50);

    // Levels of one chain are closed before the next begins.
    let text = format!(
        "SELECT {} FROM t WHERE {}",
        vec![chain("", " = ", 60, ""); 5].join(", "),
        chain("", " OR ", 60, "")
    );
    let tree = parse(&text).unwrap();
    assert!(!tree.has_errors());
}

/// Counts `exp` nodes, refusing anything deeper than 200.
struct ShallowCount;

impl SqlVisitor<usize> for ShallowCount {
    fn default_result(&mut self) -> usize {
        0
    }

    fn aggregate_result(&mut self, aggregate: usize, next: usize) -> usize {
        aggregate + next
    }

    fn max_depth(&self) -> Option<usize> {
        Some(200)
    }

    fn visit_exp(&mut self, node: &SqlNode) -> CallbackResult<usize> {
        Ok(1 + schemagram_sql::visit_children(self, node)?)
    }
}

#[test]
fn deep_tree_is_safe_on_the_default_stack() {
    let options = ParseOptions::default().with_max_nesting(100_000);
    let tree = parse_with_options(&chain("SELECT a FROM t WHERE ", " OR ", 5_000, ""), &options)
        .unwrap();
    assert!(!tree.has_errors());
    assert!(tree.height() > 5_000);

    let facts = FieldCollector::collect(&tree).unwrap();
    assert_eq!(facts.fields.len(), 1);

    match visit(&mut ShallowCount, tree.root()) {
        Err(TraversalError::DepthExceeded { limit: 200, depth: 201, .. }) => {}
        other => panic!("expected DepthExceeded, got {other:?}"),
    }

    let err = serde_json::to_string(&tree).unwrap_err();
    assert!(err.to_string().contains("levels tall"), "{err}");

    drop(tree);
}

#[test]
fn moderate_nesting_parses_and_walks() {
    let depth = 50;
    let text = format!("SELECT {}1{} FROM t", "(".repeat(depth), ")".repeat(depth));
    let tree = parse(&text).unwrap();
    assert!(!tree.has_errors());
    let mut trace = Trace::default();
    walk(tree.root(), &mut [&mut trace]).unwrap();
    assert_eq!(
        trace.0.iter().filter(|event| *event == "enter exp").count(),
        depth + 1
    );
}

#[test]
fn concurrent_walks_share_one_tree() {
    let tree = parse(SCENARIO).unwrap();
    let expected = FieldCollector::collect(&tree).unwrap();
    let results: Vec<FieldCollector> = (0..16)
        .into_par_iter()
        .map(|_| FieldCollector::collect(&tree).unwrap())
        .collect();
    assert!(results.iter().all(|facts| *facts == expected));
}

#[test]
fn tree_serializes_to_json() {
    let tree = parse("SELECT a FROM t").unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["grammar"], "GenericSql");
    assert_eq!(json["root"]["kind"], "statement");
    assert_eq!(json["root"]["children"][0]["kind"], "query");
    assert_eq!(json["root"]["children"][0]["children"][0]["text"], "SELECT");
    assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
}
