//! CLI support for rql
//!
//! Provides programmatic access to the rql CLI functionality for embedding
//! in other tools.

mod check;
mod convert;

pub use check::{execute_check, execute_normalize, execute_serialize, CheckOptions, CheckResult};
pub use convert::{argument_to_json, json_to_argument, json_to_tree, tree_to_json};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Query(#[from] crate::RqlError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tree: {0}")]
    Tree(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Query(e.into())
    }
}

impl From<crate::ConversionError> for CliError {
    fn from(e: crate::ConversionError) -> Self {
        CliError::Query(e.into())
    }
}
