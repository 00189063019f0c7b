//! Rewrites infix comparison shorthand into prefix call syntax.
//!
//! ```text
//! price>=10         =>  ge(price,10)
//! name=bob          =>  eq(name,bob)
//! date=lt=2020      =>  lt(date,2020)
//! price%3C10        =>  lt(price,10)
//! ```
//!
//! Text that is already in call syntax passes through untouched.

use tracing::trace;

use crate::{ast::ComparisonOp, error::ParseError};

/// Characters allowed in an unparenthesised property or value.
const IDENT_EXTRA: [char; 8] = ['+', '*', '$', '-', ':', '%', '.', '_'];

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || IDENT_EXTRA.contains(&c)
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// One `<property><operator><value>` window, as index ranges into the input.
#[derive(Debug, Clone, Copy)]
struct Comparison {
    start: usize,
    operator: (usize, usize),
    end: usize,
}

/// Normalizes a raw query into prefix call form.
///
/// Fails on an operator that is neither a known shorthand nor a bracketed
/// `=name=` form.
///
/// ```
/// use rql::normalize::normalize_syntax;
///
/// assert_eq!(normalize_syntax("foo>=bar").unwrap(), "ge(foo,bar)");
/// assert_eq!(normalize_syntax("eq(foo,bar)").unwrap(), "eq(foo,bar)");
/// assert!(normalize_syntax("foo>==bar").is_err());
/// ```
pub fn normalize_syntax(text: &str) -> Result<String, ParseError> {
    let decoded = decode_angle_brackets(text);
    let chars: Vec<char> = decoded.chars().collect();
    let mut output = String::with_capacity(chars.len());
    let mut position = 0;

    while position < chars.len() {
        match match_comparison(&chars, position) {
            Some(comparison) => {
                let rewritten = rewrite(&chars, comparison)?;
                trace!(from = %collect(&chars[comparison.start..comparison.end]), to = %rewritten, "rewrote infix comparison");
                output.push_str(&rewritten);
                position = comparison.end;
            }
            None => {
                output.push(chars[position]);
                position += 1;
            }
        }
    }

    Ok(output)
}

/// Turns percent-encoded angle brackets into bracketed operators.
fn decode_angle_brackets(text: &str) -> String {
    text.replace("%3C=", "=le=")
        .replace("%3E=", "=ge=")
        .replace("%3C", "=lt=")
        .replace("%3E", "=gt=")
}

fn match_comparison(chars: &[char], start: usize) -> Option<Comparison> {
    if let Some(property_end) = match_group(chars, start) {
        if let Some(comparison) = match_rest(chars, start, property_end) {
            return Some(comparison);
        }
    }
    let property_end = match_ident_run(chars, start);
    match_rest(chars, start, property_end)
}

fn match_rest(chars: &[char], start: usize, property_end: usize) -> Option<Comparison> {
    let operator_end = match_operator(chars, property_end)?;
    let end = match_group(chars, operator_end).unwrap_or_else(|| match_ident_run(chars, operator_end));
    Some(Comparison {
        start,
        operator: (property_end, operator_end),
        end,
    })
}

/// `(` one-or-more ident/comma characters `)`, without nesting.
fn match_group(chars: &[char], start: usize) -> Option<usize> {
    if chars.get(start) != Some(&'(') {
        return None;
    }
    let mut position = start + 1;
    while chars.get(position).is_some_and(|&c| is_ident(c) || c == ',') {
        position += 1;
    }
    (position > start + 1 && chars.get(position) == Some(&')')).then_some(position + 1)
}

fn match_ident_run(chars: &[char], start: usize) -> usize {
    let mut position = start;
    while chars.get(position).is_some_and(|&c| is_ident(c)) {
        position += 1;
    }
    position
}

/// `[<>!]?=` optionally followed by `word*=`, or a bare `<` / `>`.
fn match_operator(chars: &[char], start: usize) -> Option<usize> {
    let after_equals = match (chars.get(start), chars.get(start + 1)) {
        (Some('<' | '>' | '!'), Some('=')) => start + 2,
        (Some('='), _) => start + 1,
        (Some('<' | '>'), _) => return Some(start + 1),
        _ => return None,
    };

    let mut position = after_equals;
    while chars.get(position).is_some_and(|&c| is_word(c)) {
        position += 1;
    }
    if chars.get(position) == Some(&'=') {
        Some(position + 1)
    } else {
        Some(after_equals)
    }
}

fn rewrite(chars: &[char], comparison: Comparison) -> Result<String, ParseError> {
    let (op_start, op_end) = comparison.operator;
    let operator = collect(&chars[op_start..op_end]);
    let name = operator_name(&operator)?;
    let property = collect(&chars[comparison.start..op_start]);
    let value = collect(&chars[op_end..comparison.end]);
    Ok(format!("{name}({property},{value})"))
}

fn operator_name(operator: &str) -> Result<String, ParseError> {
    if operator.len() < 3 {
        return ComparisonOp::from_symbol(operator)
            .map(|op| op.name().to_string())
            .ok_or_else(|| ParseError::IllegalOperator(operator.to_string()));
    }

    // bracketed form: =name=
    let inner = operator
        .strip_prefix('=')
        .and_then(|rest| rest.strip_suffix('='))
        .filter(|inner| !inner.is_empty() && inner.chars().all(is_word));

    match inner {
        Some(name) => Ok(name.to_string()),
        None => Err(ParseError::IllegalOperator(operator.to_string())),
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}
