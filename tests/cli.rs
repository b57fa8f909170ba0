// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end tests of the `schemagram` binary.
//!
//! Each test writes its input to a temporary directory (or pipes it through
//! stdin), runs the binary and checks stdout, stderr and the exit code.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

const MODEL: &str = "\
@model(sql=f\"SELECT * FROM {schema}.orders\")
class Orders:
    if owner:
        status = dimension(sql=\"status\")
    else:
        status = None
";

const QUERY: &str = "SELECT o.id, o.amount AS total FROM orders o WHERE o.amount > 10";

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_schemagram")
}

fn write_input(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn run(args: &[&str], path: &Path) -> Output {
    Command::new(binary())
        .args(args)
        .arg(path)
        .output()
        .expect("failed to run schemagram")
}

fn run_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(binary())
        .args(args)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run schemagram");
    if let Some(mut stdin) = child.stdin.take() {
        // The binary may exit before reading, e.g. on bad arguments.
        let _ = stdin.write_all(input.as_bytes());
    }
    child.wait_with_output().unwrap()
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON: {e}\n{stdout}"))
}

#[test]
fn tree_outline_of_a_model_file() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "orders.py", MODEL);
    let output = run(&["tree"], &path);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("file_input"));
    assert!(stdout.contains("classdef"));
    assert!(stdout.contains("template"));
    assert!(stdout.contains("NAME \"owner\""));
    assert!(output.stderr.is_empty());
}

#[test]
fn facts_of_a_query_file() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "query.sql", QUERY);
    let output = run(&["facts"], &path);

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dialect"], "sql");
    let fields = &json["facts"]["fields"]["fields"];
    assert_eq!(fields[0]["expression"], "o.id");
    assert_eq!(fields[1]["alias"], "total");
    assert_eq!(json["facts"]["fields"]["table"]["path"], "orders");
    assert_eq!(json["facts"]["fields"]["table"]["alias"], "o");
    assert_eq!(json["facts"]["id_paths"], serde_json::json!(["o.id", "o.amount", "o.amount"]));
}

#[test]
fn facts_of_a_model_file() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "orders.py", MODEL);
    let output = run(&["facts"], &path);

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["dialect"], "python");
    let definitions = json["facts"]["definitions"].as_array().unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0]["name"], "Orders");
    assert_eq!(definitions[0]["decorators"][0], "model");
    assert_eq!(json["facts"]["suites"].as_array().unwrap().len(), 3);
}

#[test]
fn syntax_errors_exit_with_one_and_render_to_stderr() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "broken.py", "a = 1\nb = = 2\nc = 3\n");
    let output = run(&["tree", "--json"], &path);

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "syntax_errors");
    assert_eq!(json["tree"]["errors"][0]["span"]["line"], 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.py"), "{stderr}");
    assert!(stderr.contains("b = = 2"), "{stderr}");
}

#[test]
fn stdin_needs_an_explicit_dialect() {
    let output = run_stdin(&["tree"], QUERY);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], 2);

    let output = run_stdin(&["tree", "--dialect", "sql", "--json"], QUERY);
    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["tree"]["grammar"], "GenericSql");
}

#[test]
fn eval_mode_parses_an_expression() {
    let output = run_stdin(
        &["tree", "--dialect", "python", "--mode", "eval", "--json"],
        "a.b + f(1)",
    );
    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["tree"]["root"]["kind"], "eval_input");
}

#[test]
fn mode_is_rejected_for_sql() {
    let output = run_stdin(&["tree", "--dialect", "sql", "--mode", "single"], QUERY);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert!(json["message"].as_str().unwrap().contains("--mode"));
}

#[test]
fn nesting_limit_fails_the_parse() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "deep.py", "x = ((((((((1))))))))\n");
    let output = run(&["tree", "--max-nesting", "4"], &path);

    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("nesting exceeds the limit of 4"));

    let output = run(&["tree"], &path);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn missing_file_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let output = run(&["tree"], &dir.path().join("absent.py"));
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert!(json["message"].as_str().unwrap().starts_with("cannot read"));
}
