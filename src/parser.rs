use std::mem;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    ast::{Argument, OperatorNode},
    converter::{ConverterRegistry, STANDARD_CONVERTERS},
    error::{ParseError, RqlError},
    normalize::normalize_syntax,
    scanner::{self, RawArg},
};

lazy_static! {
    /// An argument that starts a call, e.g. `eq(`.
    static ref CALL: Regex = Regex::new(r"^[A-Za-z0-9_]+\(").unwrap();
}

/// Knobs for a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
    /// Makes the following character literal (default `\`)
    pub escape: char,
    /// How deep calls, arrays and nested aggregates may go
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            escape: scanner::DEFAULT_ESCAPE,
            max_depth: scanner::DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joiner {
    And,
    Or,
}

impl Joiner {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '&' | ',' => Some(Joiner::And),
            '|' => Some(Joiner::Or),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Joiner::And => "and",
            Joiner::Or => "or",
        }
    }
}

/// An `and`/`or` node being filled at one level of the walk.
struct Aggregate {
    joiner: Joiner,
    node: OperatorNode,
}

impl Aggregate {
    fn new(joiner: Joiner) -> Self {
        Aggregate {
            joiner,
            node: OperatorNode::new(joiner.name()),
        }
    }

    fn push(&mut self, operator: OperatorNode) {
        if !operator.is_empty() {
            self.node.push(operator);
        }
    }
}

/// Turns RQL text into an [`OperatorNode`] tree.
///
/// # Examples
///
/// ```
/// use rql::{ConverterRegistry, OperatorNode, Parser, Value};
///
/// let converters = ConverterRegistry::standard();
/// let parser = Parser::new(&converters);
///
/// let node = parser.parse("eq(foo,bar)&limit(10)").unwrap();
/// assert_eq!(node.name, "and");
/// assert_eq!(node.args.len(), 2);
/// ```
pub struct Parser<'r> {
    converters: &'r ConverterRegistry,
    options: ParseOptions,
}

impl<'r> Parser<'r> {
    pub fn new(converters: &'r ConverterRegistry) -> Self {
        Self::with_options(converters, ParseOptions::default())
    }

    pub fn with_options(converters: &'r ConverterRegistry, options: ParseOptions) -> Self {
        Parser {
            converters,
            options,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn converters(&self) -> &ConverterRegistry {
        self.converters
    }

    /// Normalizes infix shorthand, then walks the result.
    pub fn parse(&self, query: &str) -> Result<OperatorNode, RqlError> {
        if query.is_empty() {
            return Err(ParseError::EmptyQuery.into());
        }
        if query.starts_with('?') {
            return Err(ParseError::LeadingQuestionMark.into());
        }

        let normalized = normalize_syntax(query)?;
        debug!(query, normalized = %normalized, "parsing query");
        self.walk_query(&normalized)
    }

    /// Walks already-normalized text into a tree.
    pub fn walk_query(&self, text: &str) -> Result<OperatorNode, RqlError> {
        let chars: Vec<char> = text.chars().collect();
        self.walk(&chars, 0, None, 0).map(|(node, _)| node)
    }

    /// Walks `input` from `start` and returns the node built for this level
    /// together with the index where walking stopped.
    ///
    /// The joiner seen first owns the level. When the other joiner shows up,
    /// the operator just finished seeds a nested aggregate of that joiner,
    /// the rest of the input is walked into it, and the level is closed.
    fn walk(
        &self,
        input: &[char],
        start: usize,
        inherited: Option<Aggregate>,
        depth: usize,
    ) -> Result<(OperatorNode, usize), RqlError> {
        if depth > self.options.max_depth {
            return Err(ParseError::TooDeep(self.options.max_depth).into());
        }

        let mut aggregate = inherited;
        let mut current = OperatorNode::default();
        let mut position = start;

        while let Some(&ch) = input.get(position) {
            if let Some(joiner) = Joiner::from_char(ch) {
                if let Some(mut outer) = aggregate.take_if(|agg| agg.joiner != joiner) {
                    trace!(
                        outer = outer.joiner.name(),
                        inner = joiner.name(),
                        position,
                        "nesting the rest of the level"
                    );
                    let mut nested = Aggregate::new(joiner);
                    nested.push(mem::take(&mut current));
                    let (subtree, end) = self.walk(input, position + 1, Some(nested), depth + 1)?;
                    outer.node.push(subtree);
                    return Ok((outer.node, end));
                }

                aggregate
                    .get_or_insert_with(|| Aggregate::new(joiner))
                    .push(mem::take(&mut current));
                position += 1;
                continue;
            }

            if ch == '(' {
                let (_, end) = scanner::scan_group(input, position, self.options.escape)?;
                let body = &input[position + 1..end - 1];
                let raw_args =
                    scanner::split_chars(body, self.options.escape, 0, self.options.max_depth)?;
                current.args = raw_args
                    .into_iter()
                    .map(|raw| self.parse_arg(raw, depth + 1))
                    .collect::<Result<_, _>>()?;
                position = end;
            } else {
                current.name.push(ch);
                position += 1;
            }
        }

        match aggregate {
            Some(mut aggregate) => {
                aggregate.push(current);
                Ok((aggregate.node, position))
            }
            None => Ok((current, position)),
        }
    }

    /// Resolves a raw argument: arrays element-wise, embedded calls by
    /// walking them, everything else through the converters.
    fn parse_arg(&self, raw: RawArg, depth: usize) -> Result<Argument, RqlError> {
        match raw {
            RawArg::List(items) => items
                .into_iter()
                .map(|item| self.parse_arg(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Argument::Array),
            RawArg::Text(text) if CALL.is_match(&text) => {
                let chars: Vec<char> = text.chars().collect();
                let (node, _) = self.walk(&chars, 0, None, depth + 1)?;
                Ok(Argument::Operator(node))
            }
            RawArg::Text(text) => Ok(Argument::Value(self.converters.string_to_value(&text)?)),
        }
    }
}

/// Parses a query with the standard converters and default options.
///
/// ```
/// use rql::{parse, Argument, OperatorNode, Value};
///
/// let node = parse("eq(foo,bar)").unwrap();
/// assert_eq!(
///     node,
///     OperatorNode::with_args("eq", vec![Argument::from("foo"), Argument::from("bar")])
/// );
/// ```
pub fn parse(query: &str) -> Result<OperatorNode, RqlError> {
    Parser::new(&STANDARD_CONVERTERS).parse(query)
}

/// Walks already-normalized text with the standard converters.
pub fn walk_query(text: &str) -> Result<OperatorNode, RqlError> {
    Parser::new(&STANDARD_CONVERTERS).walk_query(text)
}
