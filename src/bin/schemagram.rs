// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Binary entry point for the schemagram CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Print the parse tree of a model file as an outline
//! schemagram tree models/orders.py
//!
//! # The same tree as JSON, read from stdin
//! cat query.sql | schemagram tree --dialect sql --json -
//!
//! # Fields, definitions and suites found by the sample collectors
//! schemagram facts models/orders.py
//! ```
//!
//! Exit codes: `0` clean parse, `1` parsed with syntax errors, `2` failure.

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use schemagram::diagnostics::prettify_errors;
use schemagram::dialect::{AnyTree, Dialect, PythonMode};
use schemagram::error::{CliError, OutputErrorCode};
use schemagram::output::{
    collect_facts, emit_response, outline, ErrorResponse, FactsResponse, TreeResponse,
};
use schemagram_tree::{ParseOptions, DEFAULT_MAX_NESTING};

// ============================================================================
// CLI Structure
// ============================================================================

/// Parse trees for SQL queries and Python model definitions.
#[derive(Parser, Debug)]
#[command(name = "schemagram", version, about = "Parse trees for data-model definitions")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write log records as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parse tree.
    Tree {
        #[command(flatten)]
        input: InputArgs,

        /// Print JSON instead of an outline.
        #[arg(long)]
        json: bool,
    },
    /// Print what the sample listeners and visitors collect, as JSON.
    Facts {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// What to parse and how.
#[derive(Args, Debug)]
struct InputArgs {
    /// Source file, or `-` for stdin.
    path: PathBuf,

    /// Grammar to use (default: from the file extension).
    #[arg(long, value_enum)]
    dialect: Option<Dialect>,

    /// Python3Subset start rule.
    #[arg(long, value_enum, default_value = "file")]
    mode: PythonMode,

    /// Maximum nesting of statements and expressions.
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,
}

/// The input text and the name used for it in diagnostics.
struct Source {
    label: String,
    text: String,
}

impl InputArgs {
    fn dialect(&self) -> Result<Dialect, CliError> {
        if let Some(dialect) = self.dialect {
            return Ok(dialect);
        }
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("sql") => Ok(Dialect::Sql),
            Some("py") => Ok(Dialect::Python),
            _ => Err(CliError::invalid_args(format!(
                "cannot infer the dialect of {}; pass --dialect",
                self.path.display()
            ))),
        }
    }

    fn options(&self) -> Result<ParseOptions, CliError> {
        if self.max_nesting == 0 {
            return Err(CliError::invalid_args("--max-nesting must be at least 1"));
        }
        Ok(ParseOptions::default().with_max_nesting(self.max_nesting))
    }

    fn read(&self) -> Result<Source, CliError> {
        if self.path == Path::new("-") {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CliError::io("<stdin>", e))?;
            return Ok(Source {
                label: "<stdin>".to_string(),
                text,
            });
        }
        let text = std::fs::read_to_string(&self.path).map_err(|e| CliError::io(&self.path, e))?;
        Ok(Source {
            label: self.path.display().to_string(),
            text,
        })
    }

    fn parse(&self) -> Result<(Source, AnyTree), CliError> {
        let dialect = self.dialect()?;
        if dialect == Dialect::Sql && self.mode != PythonMode::File {
            return Err(CliError::invalid_args("--mode only applies to --dialect python"));
        }
        let options = self.options()?;
        let source = self.read()?;
        let _span = tracing::info_span!("parse", input = %source.label).entered();
        let tree = AnyTree::parse(&source.text, dialect, self.mode, &options)?;
        Ok((source, tree))
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli) {
        Ok(true) => ExitCode::from(OutputErrorCode::SyntaxErrors.code()),
        Ok(false) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            tracing::error!(error = %err, "schemagram failed");
            let response = ErrorResponse::new(err.to_string(), error_code.code());
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command. Returns whether the input had syntax errors.
fn execute(cli: Cli) -> Result<bool, CliError> {
    match cli.command {
        Command::Tree { input, json } => execute_tree(&input, json),
        Command::Facts { input } => execute_facts(&input),
    }
}

fn execute_tree(input: &InputArgs, json: bool) -> Result<bool, CliError> {
    let (source, tree) = input.parse()?;
    report_syntax_errors(&source, &tree);
    let mut stdout = io::stdout().lock();
    if json {
        emit_response(&TreeResponse::new(&tree), &mut stdout).map_err(CliError::Output)?;
    } else {
        stdout
            .write_all(outline(&tree)?.as_bytes())
            .map_err(CliError::Output)?;
    }
    Ok(tree.has_errors())
}

fn execute_facts(input: &InputArgs) -> Result<bool, CliError> {
    let (source, tree) = input.parse()?;
    report_syntax_errors(&source, &tree);
    let facts = collect_facts(&tree)?;
    emit_response(&FactsResponse::new(&tree, facts), &mut io::stdout().lock())
        .map_err(CliError::Output)?;
    Ok(tree.has_errors())
}

/// Render syntax errors to stderr; stdout carries only the result.
fn report_syntax_errors(source: &Source, tree: &AnyTree) {
    if !tree.has_errors() {
        return;
    }
    tracing::warn!(count = tree.errors().len(), input = %source.label, "syntax errors");
    let stderr = io::stderr();
    let styled = stderr.is_terminal();
    let rendered = prettify_errors(tree.errors(), &source.text, &source.label, styled);
    let _ = writeln!(stderr.lock(), "{rendered}");
}
