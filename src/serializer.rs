//! Canonical query text for operator trees and values.
//!
//! Output parses back to the same tree: values whose plain text would be
//! inferred as a different type get an explicit converter tag.
//!
//! # Examples
//!
//! ```
//! use rql::{parse, serializer::to_query};
//!
//! let node = parse("eq(foo,bar)").unwrap();
//! assert_eq!(to_query(&node), "eq(foo,bar)");
//! ```

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use crate::{
    ast::{Argument, OperatorNode},
    converter::{ConverterRegistry, STANDARD_CONVERTERS},
    value::Value,
};

pub struct QuerySerializer<'r> {
    converters: &'r ConverterRegistry,
}

impl<'r> QuerySerializer<'r> {
    pub fn new(converters: &'r ConverterRegistry) -> Self {
        QuerySerializer { converters }
    }

    pub fn print(&self, argument: &Argument) -> String {
        match argument {
            Argument::Operator(node) => self.print_node(node),
            Argument::Value(value) => self.print_value(value),
            Argument::Array(items) => self.print_array(items),
        }
    }

    pub fn print_node(&self, node: &OperatorNode) -> String {
        format!("{}({})", node.name, self.join(&node.args))
    }

    pub fn print_array(&self, items: &[Argument]) -> String {
        format!("({})", self.join(items))
    }

    /// Encodes a single value, adding a tag only when the untagged text
    /// would convert back to something else.
    pub fn print_value(&self, value: &Value) -> String {
        let text = match value {
            Value::Null => return "null".to_string(),
            // an empty argument vanishes when split
            Value::String(s) if s.is_empty() => return "string:".to_string(),
            _ => plain_text(value),
        };

        let round_trips = self
            .converters
            .auto(&text)
            .is_ok_and(|converted| converted == *value);

        match value {
            Value::String(s) if round_trips => encode_string(s),
            _ if round_trips => text,
            Value::String(s) => format!("string:{}", encode_string(s)),
            Value::Regex(pattern) => {
                format!("{}:{}", value.type_name(), encode_string(pattern.source()))
            }
            Value::Date(_) => format!("date:{text}"),
            Value::Json(_) => format!("json:'{}'", encode_string(&text)),
            _ => format!("{}:{}", value.type_name(), encode_string(&text)),
        }
    }

    fn join(&self, items: &[Argument]) -> String {
        items
            .iter()
            .map(|item| self.print(item))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The value as text, before any tagging or escaping.
fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Date(date) => iso_string(date),
        Value::Regex(pattern) => pattern.source().to_string(),
        Value::Json(json) => json.to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        format!("{n:e}")
    } else {
        n.to_string()
    }
}

/// ISO 8601 with milliseconds. Years outside `0000..=9999` use the
/// six-digit signed form (`+010000-01-01T00:00:00.000Z`).
pub(crate) fn iso_string(date: &DateTime<Utc>) -> String {
    let year = match date.year() {
        year @ 0..=9999 => format!("{year:04}"),
        year if year < 0 => format!("-{:06}", year.unsigned_abs()),
        year => format!("+{year:06}"),
    };
    format!("{year}{}", date.format("-%m-%dT%H:%M:%S%.3fZ"))
}

/// Percent-encodes a string payload.
///
/// Everything outside `A-Z a-z 0-9 - _ . ~ ! *` is escaped, including the
/// structural `(`, `)`, `,` and the quote `'`. Angle brackets are written
/// with lowercase hex (`%3c`, `%3e`) so the normalizer, which rewrites the
/// uppercase forms into comparisons, leaves them alone.
pub fn encode_string(s: &str) -> String {
    urlencoding::encode(s)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%3C", "%3c")
        .replace("%3E", "%3e")
}

/// Serializes an argument with the standard converters.
pub fn serialize(argument: &Argument) -> String {
    QuerySerializer::new(&STANDARD_CONVERTERS).print(argument)
}

/// Serializes an operator tree with the standard converters.
pub fn to_query(node: &OperatorNode) -> String {
    QuerySerializer::new(&STANDARD_CONVERTERS).print_node(node)
}

/// Encodes one value with the standard converters.
pub fn encode_value(value: &Value) -> String {
    QuerySerializer::new(&STANDARD_CONVERTERS).print_value(value)
}

impl fmt::Display for OperatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_query(self))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_value(self))
    }
}
