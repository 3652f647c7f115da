//! Error types for catalog registration and argument parsing.
//!
//! Registration problems ([`CatalogError`]) and parse failures
//! ([`ParseError`]) are kept apart: a catalog is usually built once by the
//! program, while parse errors are the user's fault and get reported back to
//! them verbatim.

use thiserror::Error;

/// Errors raised while building options or registering them in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An option has neither a short nor a long name.
    #[error("option must define a short or long name")]
    MissingName,
    /// Short name is not a single legal option character.
    #[error("invalid short option name: '{0}'")]
    InvalidShortName(char),
    /// Long name is empty or contains `=` or whitespace.
    #[error("invalid long option name: '{0}'")]
    InvalidLongName(String),
    /// A merged catalog registers a key that is already present.
    #[error("Duplicate key: {0}")]
    ConflictingRegistration(String),
}

/// Errors raised by [`Parser`](crate::Parser) and typed value access.
///
/// The `Display` output of each variant is the message shown to end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A long-option abbreviation matches more than one long name.
    #[error("Ambiguous option: '{token}'  (could be: {})", quote_list(.candidates))]
    AmbiguousOption {
        /// The token as it appeared on the command line (without dashes).
        token: String,
        /// Every long name the token is a prefix of.
        candidates: Vec<String>,
    },
    /// Required options or required groups were not supplied.
    #[error("{}", missing_message(.0))]
    MissingOptions(Vec<String>),
    /// Two options of the same mutual-exclusion group were supplied.
    #[error(
        "The option '{option}' was specified but an option from this group has already been selected: '{selected}'"
    )]
    GroupConflict {
        /// Display form of the group.
        group: String,
        /// Key of the option selected first.
        selected: String,
        /// Key of the option that conflicted with it.
        option: String,
    },
    /// An option ran out of tokens before receiving all of its values.
    #[error("Missing argument for option: {option}")]
    InsufficientValues {
        option: String,
        /// Minimum number of values the option needs.
        expected: usize,
        found: usize,
    },
    /// A token has option syntax but names no registered option.
    #[error("Unrecognized option: {0}")]
    UnrecognizedOption(String),
    /// A value could not be converted to the option's value type.
    #[error("invalid value '{value}' for option '{option}': expected {expected}")]
    InvalidValue {
        option: String,
        value: String,
        expected: String,
    },
    /// A default property names an option the catalog does not know.
    #[error("Default option wasn't defined: {0}")]
    UnknownDefault(String),
}

impl ParseError {
    /// The missing identities carried by [`ParseError::MissingOptions`].
    pub fn missing_options(&self) -> Option<&[String]> {
        match self {
            Self::MissingOptions(missing) => Some(missing),
            _ => None,
        }
    }
}

fn missing_message(missing: &[String]) -> String {
    if missing.len() == 1 {
        format!("Missing required option: {}", missing[0])
    } else {
        format!("Missing required options: {}", missing.join(", "))
    }
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
