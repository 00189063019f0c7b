//! # `rql`: Resource Query Language
//!
//! Parses compact, URL-safe RQL query strings into operator trees and
//! serializes trees back into canonical query text.
//!
//! ```
//! use rql::{parse, Argument, OperatorNode, Value};
//!
//! let node = parse("price>=10&in(tag,(new,sale))").unwrap();
//! assert_eq!(node.name, "and");
//! assert_eq!(node.to_string(), "and(ge(price,10),in(tag,(new,sale)))");
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod converter;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod scanner;
pub mod serializer;
pub mod value;

pub use ast::{Argument, ComparisonOp, OperatorNode};
pub use converter::{Converter, ConverterRegistry, string_to_value};
pub use error::{ConversionError, ParseError, RqlError};
pub use normalize::normalize_syntax;
pub use parser::{ParseOptions, Parser, parse, walk_query};
pub use scanner::{RawArg, inside, split_arguments, trim};
pub use serializer::{QuerySerializer, encode_value, serialize, to_query};
pub use value::{Pattern, Value};
