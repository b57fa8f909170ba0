// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types and exit codes for schemagram.
//!
//! `CliError` is the single error type of the command line surface. Errors
//! from the grammar crates convert into it with `From`, and each variant maps
//! to an [`OutputErrorCode`] that becomes the process exit code.
//!
//! ## Exit Codes
//!
//! - `0`: the input parsed without syntax errors
//! - `1`: the input parsed, with recovered syntax errors
//! - `2`: nothing useful was produced (bad arguments, unreadable input,
//!   nesting limit exceeded, a failed traversal)

use std::fmt;
use std::path::PathBuf;

use schemagram_tree::{ParseError, TraversalError};
use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// The tree was built but contains recovered syntax errors.
    SyntaxErrors = 1,
    /// No result was produced.
    Failure = 2,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments from the caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Reading the input failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the response failed.
    #[error("cannot write output: {0}")]
    Output(#[source] std::io::Error),

    /// Parsing stopped without a tree.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A listener or visitor failed.
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CliError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<&CliError> for OutputErrorCode {
    /// Every error that ends the run without a tree is a failure.
    fn from(err: &CliError) -> Self {
        match err {
            CliError::InvalidArguments { .. } => OutputErrorCode::Failure,
            CliError::Io { .. } => OutputErrorCode::Failure,
            CliError::Output(_) => OutputErrorCode::Failure,
            CliError::Parse(_) => OutputErrorCode::Failure,
            CliError::Traversal(_) => OutputErrorCode::Failure,
            CliError::Json(_) => OutputErrorCode::Failure,
        }
    }
}
