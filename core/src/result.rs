//! The outcome of a successful parse.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::option::CliOption;
use crate::value::TypedValue;

/// One option occurrence and the values it received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedOption {
    pub option: CliOption,
    pub values: Vec<String>,
}

/// Options matched on the command line, in order, plus positional
/// arguments.
///
/// An option given twice appears twice in [`options`](ParseResult::options);
/// the value accessors look across all occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    options: Vec<MatchedOption>,
    args: Vec<String>,
}

impl ParseResult {
    pub(crate) fn new(options: Vec<MatchedOption>, args: Vec<String>) -> Self {
        Self { options, args }
    }

    /// Whether the option named `name` (key or long name, dashes optional)
    /// was matched.
    pub fn has_option(&self, name: &str) -> bool {
        self.occurrences(name).next().is_some()
    }

    /// The definition of a matched option.
    pub fn option(&self, name: &str) -> Option<&CliOption> {
        self.occurrences(name).next().map(|m| &m.option)
    }

    /// First value supplied for `name`.
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.occurrences(name)
            .flat_map(|m| m.values.iter())
            .next()
            .map(String::as_str)
    }

    /// First value supplied for `name`, or `default`.
    pub fn option_value_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.option_value(name).unwrap_or(default)
    }

    /// Every value supplied for `name`, across all occurrences. `None` when
    /// the option received no values.
    pub fn option_values(&self, name: &str) -> Option<Vec<&str>> {
        let values: Vec<&str> = self
            .occurrences(name)
            .flat_map(|m| m.values.iter().map(String::as_str))
            .collect();
        (!values.is_empty()).then_some(values)
    }

    /// Key/value pairs for property-style options such as `-Dkey=value`.
    ///
    /// Each occurrence with two values contributes `values[0] = values[1]`;
    /// an occurrence with one value contributes `values[0] = "true"`.
    pub fn option_properties(&self, name: &str) -> IndexMap<String, String> {
        let mut properties = IndexMap::new();
        for m in self.occurrences(name) {
            match m.values.as_slice() {
                [] => {}
                [key] => {
                    properties.insert(key.clone(), "true".to_string());
                }
                [key, value, ..] => {
                    properties.insert(key.clone(), value.clone());
                }
            }
        }
        properties
    }

    /// First value of `name` converted with the option's value type.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidValue`](crate::ParseError::InvalidValue) when the
    /// value does not convert.
    pub fn parsed_value(&self, name: &str) -> Result<Option<TypedValue>> {
        let Some(m) = self.occurrences(name).find(|m| !m.values.is_empty()) else {
            return Ok(None);
        };
        m.option
            .value_type()
            .coerce(m.option.key(), &m.values[0])
            .map(Some)
    }

    /// Every value of `name` converted with the option's value type.
    pub fn parsed_values(&self, name: &str) -> Result<Vec<TypedValue>> {
        self.occurrences(name)
            .flat_map(|m| m.values.iter().map(move |v| (&m.option, v)))
            .map(|(option, value)| option.value_type().coerce(option.key(), value))
            .collect()
    }

    /// Matched options in command-line order.
    pub fn options(&self) -> &[MatchedOption] {
        &self.options
    }

    /// Positional arguments in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    fn occurrences<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a MatchedOption> {
        self.options.iter().filter(move |m| m.option.matches(name))
    }
}
