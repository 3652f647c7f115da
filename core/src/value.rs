//! Value types and coercion of raw option values.
//!
//! Options carry a [`ValueType`] that describes what their values mean.
//! Parsing itself never looks at it: values are collected as strings and
//! only converted when the caller asks for a [`TypedValue`] through
//! [`ParseResult::parsed_value`](crate::ParseResult::parsed_value).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ParseError;

/// Semantic type of an option's values.
///
/// # Examples
///
/// ```
/// use optcat_core::ValueType;
///
/// assert_eq!(ValueType::default(), ValueType::Text);
/// assert_eq!(ValueType::Integer.to_string(), "Integer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Free text (the default).
    #[default]
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// Floating point number.
    Number,
    /// `true`/`false`, `yes`/`no`, `1`/`0`.
    Bool,
    /// File path.
    File,
    /// Directory path.
    Directory,
    /// Absolute URL with a scheme.
    Url,
    /// One of a fixed set of values.
    Choice(Vec<String>),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Integer => f.write_str("Integer"),
            Self::Number => f.write_str("Number"),
            Self::Bool => f.write_str("Bool"),
            Self::File => f.write_str("File"),
            Self::Directory => f.write_str("Directory"),
            Self::Url => f.write_str("Url"),
            Self::Choice(choices) => write!(f, "Choice({})", choices.join("|")),
        }
    }
}

/// A value converted according to its option's [`ValueType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Path(PathBuf),
    Url(Url),
    Choice(String),
}

impl ValueType {
    /// Converts `raw` into a [`TypedValue`].
    ///
    /// `option` is only used to build the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use optcat_core::{TypedValue, ValueType};
    ///
    /// let v = ValueType::Integer.coerce("n", "42").unwrap();
    /// assert_eq!(v, TypedValue::Integer(42));
    /// assert!(ValueType::Integer.coerce("n", "forty-two").is_err());
    /// ```
    pub fn coerce(&self, option: &str, raw: &str) -> Result<TypedValue, ParseError> {
        let invalid = |expected: String| ParseError::InvalidValue {
            option: option.to_string(),
            value: raw.to_string(),
            expected,
        };

        match self {
            Self::Text => Ok(TypedValue::Text(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|_| invalid("an integer".to_string())),
            Self::Number => raw
                .trim()
                .parse::<f64>()
                .map(TypedValue::Number)
                .map_err(|_| invalid("a number".to_string())),
            Self::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(TypedValue::Bool(true)),
                "false" | "no" | "0" => Ok(TypedValue::Bool(false)),
                _ => Err(invalid("a boolean".to_string())),
            },
            Self::File | Self::Directory => {
                if raw.is_empty() {
                    Err(invalid("a path".to_string()))
                } else {
                    Ok(TypedValue::Path(PathBuf::from(raw)))
                }
            }
            Self::Url => Url::parse(raw.trim())
                .map(TypedValue::Url)
                .map_err(|err| invalid(format!("a URL ({err})"))),
            Self::Choice(choices) => {
                if choices.iter().any(|c| c == raw) {
                    Ok(TypedValue::Choice(raw.to_string()))
                } else {
                    Err(invalid(format!("one of: {}", choices.join(", "))))
                }
            }
        }
    }
}
