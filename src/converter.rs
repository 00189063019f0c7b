//! Typed conversion of leaf strings.
//!
//! A leaf may carry an explicit tag (`number:10`, `date:2020-01-01`,
//! `re:^foo`); without one the `auto` converter infers the type. The
//! standard table is built once by [`ConverterRegistry::standard`] and can
//! be extended with [`ConverterRegistry::register`] before it is handed to a
//! [`Parser`](crate::Parser).

use std::{borrow::Cow, collections::HashMap, fmt, sync::Arc};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::{
    error::{ConversionError, ParseError, RqlError},
    value::{Pattern, Value},
};

/// A conversion from a raw leaf string to a typed value.
pub type Converter = Arc<dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync>;

/// Tag of the inference converter used when a leaf has no tag.
pub const AUTO: &str = "auto";

/// Largest distance from the epoch, in milliseconds, a date may have.
/// `DateTime<Utc>` stops at years -262144 and 262143 (about ±8.2e15 ms),
/// so that narrower range applies first.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

const ISO_TEMPLATE: &str = "0000-01-01T00:00:00Z";

lazy_static! {
    static ref TAG: Regex = Regex::new(r"^([A-Za-z0-9_]+):").unwrap();
    static ref ISO_DATE: Regex =
        Regex::new(r"^([+-]\d{6}|\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(?:\.(\d*))?Z$").unwrap();
    pub(crate) static ref STANDARD_CONVERTERS: ConverterRegistry = ConverterRegistry::standard();
}

/// Lookup table from converter tag to conversion function.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl ConverterRegistry {
    /// A registry with no converters; untagged leaves still go through
    /// [`convert_auto`].
    pub fn empty() -> Self {
        ConverterRegistry {
            converters: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        let mut registry = Self::empty();

        registry.register("number", convert_number);
        registry.register("epoch", convert_epoch);
        registry.register("isodate", convert_isodate);
        registry.register("date", convert_date);
        registry.register("boolean", convert_boolean);
        registry.register("string", convert_string);
        registry.register("re", |raw: &str| convert_regex(raw, false));
        registry.register("RE", |raw: &str| convert_regex(raw, true));
        registry.register("json", convert_json);
        registry.register(AUTO, convert_auto);
        registry.register("default", convert_auto);

        registry
    }

    /// Adds or replaces the converter for `tag`.
    pub fn register<F>(&mut self, tag: impl Into<String>, converter: F)
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.converters.insert(tag.into(), Arc::new(converter));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, tag: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.register(tag, converter);
        self
    }

    /// Looks a tag up exactly, then lower-cased.
    pub fn get(&self, tag: &str) -> Option<&Converter> {
        self.converters
            .get(tag)
            .or_else(|| self.converters.get(&tag.to_lowercase()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    /// Runs the registered `auto` converter.
    pub fn auto(&self, raw: &str) -> Result<Value, ConversionError> {
        match self.converters.get(AUTO) {
            Some(converter) => converter(raw),
            None => convert_auto(raw),
        }
    }

    /// Converts a leaf string, honouring an explicit `tag:` prefix.
    ///
    /// ```
    /// use rql::{ConverterRegistry, Value};
    ///
    /// let converters = ConverterRegistry::standard();
    /// assert_eq!(converters.string_to_value("10").unwrap(), Value::Number(10.0));
    /// assert_eq!(
    ///     converters.string_to_value("string:10").unwrap(),
    ///     Value::String("10".to_string())
    /// );
    /// assert!(converters.string_to_value("nope:10").is_err());
    /// ```
    pub fn string_to_value(&self, raw: &str) -> Result<Value, RqlError> {
        let Some(captures) = TAG.captures(raw) else {
            return Ok(self.auto(&unescape_colons(raw))?);
        };

        let tag = &captures[1];
        let converter = self
            .get(tag)
            .ok_or_else(|| ParseError::UnknownConverter(tag.to_string()))?;
        let remainder = &raw[captures[0].len()..];
        trace!(tag, remainder, "converting tagged value");

        Ok(converter(&unescape_colons(remainder))?)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("ConverterRegistry").field("tags", &tags).finish()
    }
}

/// Converts a leaf string with the standard converters.
pub fn string_to_value(raw: &str) -> Result<Value, RqlError> {
    STANDARD_CONVERTERS.string_to_value(raw)
}

fn unescape_colons(text: &str) -> Cow<'_, str> {
    if text.contains("\\:") {
        Cow::Owned(text.replace("\\:", ":"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Percent-decodes `raw`. Malformed escapes are kept as written.
pub fn percent_decode(raw: &str) -> Result<String, ConversionError> {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|_| ConversionError::InvalidEncoding(raw.to_string()))
}

/// Parses the whole of `raw` as a number.
///
/// Accepts decimal and exponent notation, `0x`/`0o`/`0b` integers and the
/// spelled-out `Infinity`. Surrounding whitespace is ignored.
pub fn parse_number(raw: &str) -> Result<f64, ConversionError> {
    let invalid = || ConversionError::InvalidNumber(raw.to_string());
    let text = raw.trim();

    match text {
        "" => return Err(invalid()),
        "Infinity" | "+Infinity" => return Ok(f64::INFINITY),
        "-Infinity" => return Ok(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(n) = parse_radix(text) {
        return Ok(n);
    }

    // keeps Rust-only spellings like "inf" and "NaN" out
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return Err(invalid());
    }

    text.parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
        .ok_or_else(invalid)
}

fn parse_radix(text: &str) -> Option<f64> {
    let (digits, radix) = match text.get(..2)? {
        "0x" | "0X" => (&text[2..], 16),
        "0o" | "0O" => (&text[2..], 8),
        "0b" | "0B" => (&text[2..], 2),
        _ => return None,
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

pub fn convert_number(raw: &str) -> Result<Value, ConversionError> {
    parse_number(raw).map(Value::Number)
}

/// Milliseconds since the Unix epoch, UTC.
pub fn convert_epoch(raw: &str) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::InvalidDate(raw.to_string());
    let millis = parse_number(raw).map_err(|_| invalid())?;

    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return Err(invalid());
    }

    DateTime::from_timestamp_millis(millis.trunc() as i64)
        .map(Value::Date)
        .ok_or_else(invalid)
}

/// A possibly partial ISO date (`2020`, `2020-05`, `2020-05-06T10`, ...),
/// completed from `0000-01-01T00:00:00Z`.
pub fn convert_isodate(raw: &str) -> Result<Value, ConversionError> {
    let length = raw.chars().count();
    let mut date = if length < 4 {
        "0".repeat(4 - length) + raw
    } else {
        raw.to_string()
    };

    let length = date.chars().count();
    if let Some(rest) = ISO_TEMPLATE.get(length..) {
        date.push_str(rest);
    }

    convert_date(&date)
}

/// A full `YYYY-MM-DDTHH:mm:ss[.SSS]Z` timestamp (the year may also be the
/// signed six-digit `±YYYYYY` form), or any other date shape
/// the fallback parser understands (read as UTC).
pub fn convert_date(raw: &str) -> Result<Value, ConversionError> {
    let parsed = match ISO_DATE.captures(raw) {
        Some(captures) => {
            let field = |i: usize| -> i64 {
                captures
                    .get(i)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0)
            };
            let millis = captures.get(7).map_or(0, |m| fraction_to_millis(m.as_str()));
            utc_from_fields(field(1), field(2), field(3), field(4), field(5), field(6), millis)
        }
        None => parse_loose_date(raw),
    };

    parsed
        .filter(|date| (date.timestamp_millis() as f64).abs() <= MAX_EPOCH_MILLIS)
        .map(Value::Date)
        .ok_or_else(|| ConversionError::InvalidDate(raw.to_string()))
}

fn fraction_to_millis(fraction: &str) -> i64 {
    let digits: String = fraction.chars().chain("000".chars()).take(3).collect();
    digits.parse().unwrap_or(0)
}

/// Builds a UTC timestamp, letting out-of-range fields roll over into the
/// next larger unit (month 13 is January of the following year).
fn utc_from_fields(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    millis: i64,
) -> Option<DateTime<Utc>> {
    let month_index = month - 1;
    let year = i32::try_from(year + month_index.div_euclid(12)).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12) + 1).ok()?;

    let start = NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();

    let offset = TimeDelta::try_days(day - 1)?
        .checked_add(&TimeDelta::try_hours(hour)?)?
        .checked_add(&TimeDelta::try_minutes(minute)?)?
        .checked_add(&TimeDelta::try_seconds(second)?)?
        .checked_add(&TimeDelta::try_milliseconds(millis)?)?;

    start.checked_add_signed(offset)
}

fn parse_loose_date(text: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            [
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%dT%H:%M",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%Y/%m/%d %H:%M:%S",
            ]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|date| date.and_utc())
        })
        .or_else(|| {
            ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|date| date.and_utc())
        })?;

    // dates carry millisecond precision
    DateTime::from_timestamp_millis(parsed.timestamp_millis())
}

/// `true` for any casing of "true", `false` for everything else.
pub fn convert_boolean(raw: &str) -> Result<Value, ConversionError> {
    Ok(Value::Boolean(raw.to_lowercase() == "true"))
}

pub fn convert_string(raw: &str) -> Result<Value, ConversionError> {
    percent_decode(raw).map(Value::String)
}

pub fn convert_regex(raw: &str, case_sensitive: bool) -> Result<Value, ConversionError> {
    let pattern = percent_decode(raw)?;
    Pattern::new(&pattern, case_sensitive)
        .map(Value::Regex)
        .map_err(|e| ConversionError::InvalidRegex {
            pattern,
            message: e.to_string(),
        })
}

/// Strict JSON, optionally percent-encoded and wrapped in single quotes.
pub fn convert_json(raw: &str) -> Result<Value, ConversionError> {
    let decoded = percent_decode(raw)?;
    let text = strip_single_quotes(&decoded).unwrap_or(decoded.as_str());

    serde_json::from_str(text)
        .map(Value::Json)
        .map_err(|e| ConversionError::InvalidJson {
            input: decoded.clone(),
            message: e.to_string(),
        })
}

/// Infers a type: literal table, then number, then (percent-decoded) string.
///
/// A decoded string wrapped in single quotes is read as a JSON string body,
/// so `'a b'` becomes `a b`.
pub fn convert_auto(raw: &str) -> Result<Value, ConversionError> {
    if let Some(value) = literal(raw) {
        return Ok(value);
    }

    if let Ok(n) = parse_number(raw) {
        return Ok(Value::Number(n));
    }

    let decoded = percent_decode(raw)?;
    match strip_single_quotes(&decoded) {
        Some(inner) => serde_json::from_str::<String>(&format!("\"{inner}\""))
            .map(Value::String)
            .map_err(|e| ConversionError::InvalidJson {
                input: decoded.clone(),
                message: e.to_string(),
            }),
        None => Ok(Value::String(decoded)),
    }
}

fn literal(raw: &str) -> Option<Value> {
    match raw {
        "true" => Some(Value::Boolean(true)),
        "false" => Some(Value::Boolean(false)),
        "null" => Some(Value::Null),
        "undefined" => Some(Value::Undefined),
        "Infinity" => Some(Value::Number(f64::INFINITY)),
        "-Infinity" => Some(Value::Number(f64::NEG_INFINITY)),
        _ => None,
    }
}

fn strip_single_quotes(text: &str) -> Option<&str> {
    if text.len() >= 2 {
        text.strip_prefix('\'')?.strip_suffix('\'')
    } else {
        None
    }
}
