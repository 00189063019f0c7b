use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};

/// A typed leaf of an RQL operator tree.
///
/// Leaf strings in a query are converted into one of these variants by the
/// converter registry, either through an explicit tag (`date:2020-01-01`)
/// or through the `auto` inference rules.
///
/// # Examples
///
/// ```
/// use rql::Value;
///
/// let name = Value::String("bar".to_string());
/// let limit = Value::Number(10.0);
/// let flag = Value::Boolean(true);
///
/// assert_eq!(name.type_name(), "string");
/// assert_eq!(limit.as_f64(), Some(10.0));
/// assert_eq!(flag.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,

    /// `undefined`, only reachable through the `auto` literal table
    Undefined,

    /// `true` / `false`
    Boolean(bool),

    /// Double-precision number, including the two infinities
    Number(f64),

    /// Percent-decoded text
    String(String),

    /// UTC timestamp with millisecond precision
    Date(DateTime<Utc>),

    /// Compiled regular expression (`re:` / `RE:`)
    Regex(Pattern),

    /// Arbitrary structured data (`json:`)
    Json(serde_json::Value),
}

impl Value {
    /// Name used as the converter tag when a value has to be tagged on output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Regex(p) if p.case_sensitive() => "RE",
            Value::Regex(_) => "re",
            Value::Json(_) => "json",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// A regular expression together with the case-sensitivity it was built with.
///
/// Two patterns are equal when their source text and flag match.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    case_sensitive: bool,
}

impl Pattern {
    pub fn new(source: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Pattern {
            regex,
            case_sensitive,
        })
    }

    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.case_sensitive == other.case_sensitive && self.source() == other.source()
    }
}
