//! JSON <-> operator tree conversion utilities
//!
//! Operators are written as `{"name": ..., "args": [...]}`. Values JSON has
//! no native form for are wrapped in a single-key marker object:
//! `{"$date": "..."}`, `{"$regex": "...", "caseSensitive": bool}`,
//! `{"$json": ...}`, `{"$number": "Infinity"}`, `{"$undefined": true}`.

use serde_json::{Map, json};

use super::CliError;
use crate::{
    Argument, OperatorNode, Pattern, Value,
    converter::{convert_date, parse_number},
    serializer::iso_string,
};

/// Convert an operator tree to serde_json::Value
pub fn tree_to_json(node: &OperatorNode) -> serde_json::Value {
    json!({
        "name": node.name,
        "args": node.args.iter().map(argument_to_json).collect::<Vec<_>>(),
    })
}

/// Convert one argument to serde_json::Value
pub fn argument_to_json(argument: &Argument) -> serde_json::Value {
    match argument {
        Argument::Operator(node) => tree_to_json(node),
        Argument::Array(items) => {
            serde_json::Value::Array(items.iter().map(argument_to_json).collect())
        }
        Argument::Value(value) => value_to_json(value),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Undefined => json!({ "$undefined": true }),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| json!({ "$number": value.to_string() })),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(date) => {
            json!({ "$date": iso_string(date) })
        }
        Value::Regex(pattern) => json!({
            "$regex": pattern.source(),
            "caseSensitive": pattern.case_sensitive(),
        }),
        Value::Json(inner) => json!({ "$json": inner }),
    }
}

/// Convert serde_json::Value to an operator tree
pub fn json_to_tree(v: serde_json::Value) -> Result<OperatorNode, CliError> {
    match json_to_argument(v)? {
        Argument::Operator(node) => Ok(node),
        other => Err(CliError::Tree(format!(
            "expected an operator object at the top level, got `{}`",
            other
        ))),
    }
}

/// Convert serde_json::Value to an argument
pub fn json_to_argument(v: serde_json::Value) -> Result<Argument, CliError> {
    let value = match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            return items
                .into_iter()
                .map(json_to_argument)
                .collect::<Result<Vec<_>, _>>()
                .map(Argument::Array);
        }
        serde_json::Value::Object(obj) => return object_to_argument(obj),
    };
    Ok(Argument::Value(value))
}

fn object_to_argument(mut obj: Map<String, serde_json::Value>) -> Result<Argument, CliError> {
    if let Some(serde_json::Value::String(name)) = obj.get("name") {
        let name = name.clone();
        let args = match obj.remove("args") {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .map(json_to_argument)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
            Some(other) => {
                return Err(CliError::Tree(format!("`args` of `{name}` must be an array, got {other}")));
            }
        };
        return Ok(Argument::Operator(OperatorNode::with_args(name, args)));
    }

    let value = if let Some(date) = obj.get("$date").and_then(|d| d.as_str()) {
        convert_date(date)?
    } else if let Some(source) = obj.get("$regex").and_then(|r| r.as_str()) {
        let case_sensitive = obj
            .get("caseSensitive")
            .and_then(|c| c.as_bool())
            .unwrap_or(false);
        Pattern::new(source, case_sensitive)
            .map(Value::Regex)
            .map_err(|e| CliError::Tree(e.to_string()))?
    } else if let Some(number) = obj.get("$number").and_then(|n| n.as_str()) {
        Value::Number(parse_number(number)?)
    } else if obj.contains_key("$undefined") {
        Value::Undefined
    } else if let Some(inner) = obj.remove("$json") {
        Value::Json(inner)
    } else {
        Value::Json(serde_json::Value::Object(obj))
    };

    Ok(Argument::Value(value))
}
