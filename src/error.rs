use thiserror::Error;

/// Structural problems with the query text itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("query must not start with ?")]
    LeadingQuestionMark,

    #[error("illegal operator `{0}`")]
    IllegalOperator(String),

    #[error("could not find closing paren in `{0}`")]
    UnclosedParen(String),

    #[error("unknown converter `{0}`")]
    UnknownConverter(String),

    #[error("query nests deeper than {0} levels")]
    TooDeep(usize),
}

/// A leaf string could not be turned into the value its tag asked for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("invalid date `{0}`")]
    InvalidDate(String),

    #[error("invalid regular expression `{pattern}`: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("invalid JSON `{input}`: {message}")]
    InvalidJson { input: String, message: String },

    #[error("invalid percent-encoding in `{0}`")]
    InvalidEncoding(String),
}

/// Any failure produced while turning query text into a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RqlError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),
}

impl RqlError {
    pub fn is_parse(&self) -> bool {
        matches!(self, RqlError::Parse(_))
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, RqlError::Conversion(_))
    }
}
