//! Execute rql commands against query text or JSON trees

use tracing::debug;

use super::{CliError, json_to_tree, tree_to_json};
use crate::{normalize_syntax, parse, to_query};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The RQL query to parse
    pub query: String,
    /// Only validate syntax, don't print the tree
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query parsed successfully; the tree as JSON
    Success(serde_json::Value),
}

/// Parse a query and report its tree
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let tree = parse(&options.query)?;
    debug!(operator = %tree.name, args = tree.args.len(), "query parsed");

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    Ok(CheckResult::Success(tree_to_json(&tree)))
}

/// Rewrite infix shorthand into call syntax
pub fn execute_normalize(query: &str) -> Result<String, CliError> {
    Ok(normalize_syntax(query)?)
}

/// Render a JSON tree as canonical query text
pub fn execute_serialize(input: &str) -> Result<String, CliError> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    let tree = json_to_tree(json)?;
    Ok(to_query(&tree))
}
