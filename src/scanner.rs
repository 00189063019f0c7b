//! Paren- and quote-aware scanning of call bodies.
//!
//! Both the group scanner and the argument splitter run the same small state
//! machine: an escape character makes the next character literal, and a
//! quote (`'` or `"`) switches off structural meaning until the same quote
//! closes it. Escapes are only recognised outside quotes.

use crate::error::ParseError;

/// Default escape character.
pub const DEFAULT_ESCAPE: char = '\\';

/// Default limit on nested arrays for [`split_arguments`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// A raw, not yet typed argument produced by the splitter.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArg {
    /// A trimmed argument string; may still hold an embedded call
    Text(String),
    /// A parenthesised array literal
    List(Vec<RawArg>),
}

impl From<&str> for RawArg {
    fn from(s: &str) -> Self {
        RawArg::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CharClass {
    /// Goes to the output as-is, with no structural meaning
    Literal(char),
    /// The escape character itself; dropped
    EscapeMark,
    /// Unquoted, unescaped; the caller decides what it means
    Structural(char),
}

struct QuoteState {
    escape: char,
    quote: Option<char>,
    literal: bool,
}

impl QuoteState {
    fn new(escape: char) -> Self {
        QuoteState {
            escape,
            quote: None,
            literal: false,
        }
    }

    fn classify(&mut self, ch: char) -> CharClass {
        if self.literal {
            self.literal = false;
            return CharClass::Literal(ch);
        }

        match self.quote {
            None if ch == self.escape => {
                self.literal = true;
                CharClass::EscapeMark
            }
            None if ch == '\'' || ch == '"' => {
                self.quote = Some(ch);
                CharClass::Literal(ch)
            }
            Some(q) if ch == q => {
                self.quote = None;
                CharClass::Literal(ch)
            }
            Some(_) => CharClass::Literal(ch),
            None => CharClass::Structural(ch),
        }
    }
}

/// Scans the group opening at `input[start]`.
///
/// Returns the unescaped content between the parens and the index just past
/// the matching closing paren. The raw body is always `input[start + 1..end - 1]`.
pub(crate) fn scan_group(
    input: &[char],
    start: usize,
    escape: char,
) -> Result<(String, usize), ParseError> {
    let mut state = QuoteState::new(escape);
    let mut depth = 1usize;
    let mut output = String::new();
    let mut position = start + 1;

    while let Some(&ch) = input.get(position) {
        position += 1;
        match state.classify(ch) {
            CharClass::Literal(c) => output.push(c),
            CharClass::EscapeMark => {}
            CharClass::Structural('(') => {
                depth += 1;
                output.push('(');
            }
            CharClass::Structural(')') => {
                depth -= 1;
                if depth == 0 {
                    return Ok((output, position));
                }
                output.push(')');
            }
            CharClass::Structural(c) => output.push(c),
        }
    }

    Err(ParseError::UnclosedParen(
        input.get(start..).unwrap_or_default().iter().collect(),
    ))
}

/// Returns the text inside the group that `text` opens with.
///
/// The first character is taken as the opening paren. Escape characters are
/// dropped and the character after each one is kept literally.
///
/// ```
/// use rql::scanner::inside;
///
/// assert_eq!(inside("(foo,(bar))baz", '\\').unwrap(), "foo,(bar)");
/// assert_eq!(inside(r"(a\)b)", '\\').unwrap(), "a)b");
/// ```
pub fn inside(text: &str, escape: char) -> Result<String, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    scan_group(&chars, 0, escape).map(|(body, _)| body)
}

/// Splits the body of a call into its top-level arguments.
///
/// A group at the start of an argument becomes a [`RawArg::List`]; a group
/// after other text is kept verbatim so the embedded call can be parsed later.
///
/// ```
/// use rql::scanner::{split_arguments, RawArg};
///
/// let args = split_arguments("foo,(bar,baz),eq(a,b)", '\\').unwrap();
/// assert_eq!(
///     args,
///     vec![
///         RawArg::from("foo"),
///         RawArg::List(vec![RawArg::from("bar"), RawArg::from("baz")]),
///         RawArg::from("eq(a,b)"),
///     ]
/// );
/// ```
pub fn split_arguments(text: &str, escape: char) -> Result<Vec<RawArg>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    split_chars(&chars, escape, 0, DEFAULT_MAX_DEPTH)
}

pub(crate) fn split_chars(
    input: &[char],
    escape: char,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<RawArg>, ParseError> {
    let mut args = Vec::new();
    let mut buffer = String::new();
    let mut state = QuoteState::new(escape);
    let mut position = 0;

    while let Some(&ch) = input.get(position) {
        match state.classify(ch) {
            CharClass::Literal(c) => {
                buffer.push(c);
                position += 1;
            }
            CharClass::EscapeMark => position += 1,
            CharClass::Structural('(') if buffer.is_empty() => {
                if depth >= max_depth {
                    return Err(ParseError::TooDeep(max_depth));
                }
                let (_, end) = scan_group(input, position, escape)?;
                let body = &input[position + 1..end - 1];
                let items = split_chars(body, escape, depth + 1, max_depth)?;
                args.push(RawArg::List(items));
                position = skip_separator(input, end);
            }
            CharClass::Structural(c) if buffer.is_empty() && c.is_whitespace() => position += 1,
            CharClass::Structural(',') => {
                args.push(RawArg::Text(trim(&buffer)));
                buffer.clear();
                position += 1;
            }
            CharClass::Structural('(') => {
                // embedded call: keep it whole for the walker
                let (_, end) = scan_group(input, position, escape)?;
                buffer.extend(&input[position..end]);
                position = end;
            }
            CharClass::Structural(c) => {
                buffer.push(c);
                position += 1;
            }
        }
    }

    if !buffer.is_empty() {
        args.push(RawArg::Text(trim(&buffer)));
    }

    Ok(args)
}

/// Skips whitespace, at most one comma, and whitespace again.
fn skip_separator(input: &[char], mut position: usize) -> usize {
    while input.get(position).is_some_and(|c| c.is_whitespace()) {
        position += 1;
    }
    if input.get(position) == Some(&',') {
        position += 1;
    }
    while input.get(position).is_some_and(|c| c.is_whitespace()) {
        position += 1;
    }
    position
}

/// Strips surrounding whitespace and then one pair of matching outer quotes.
///
/// ```
/// use rql::scanner::trim;
///
/// assert_eq!(trim("  'hello world' "), "hello world");
/// assert_eq!(trim("\"a\""), "a");
/// assert_eq!(trim("'a\""), "'a\"");
/// ```
pub fn trim(text: &str) -> String {
    let text = text.trim();
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[1..text.len() - 1].to_string();
        }
    }
    text.to_string()
}
