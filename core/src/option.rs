//! The option model: [`CliOption`], its [`Arity`], deprecation metadata and
//! the validating [`OptionBuilder`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::value::ValueType;

/// Number of values an option consumes.
///
/// # Examples
///
/// ```
/// use optcat_core::Arity;
///
/// assert_eq!(Arity::Fixed(2).min_values(), 2);
/// assert_eq!(Arity::Unbounded.max_values(), None);
/// assert!(!Arity::None.takes_values());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// A switch: no values.
    #[default]
    None,
    /// Exactly `n` values (`n >= 1`).
    Fixed(usize),
    /// One or more values, up to the next option or `--`.
    Unbounded,
}

impl Arity {
    /// Returns `true` for any arity other than [`Arity::None`].
    pub fn takes_values(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Values needed before the option is satisfied.
    pub fn min_values(self) -> usize {
        match self {
            Self::None => 0,
            Self::Fixed(n) => n,
            Self::Unbounded => 1,
        }
    }

    /// Upper bound on values, `None` when unbounded.
    pub fn max_values(self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::Fixed(n) => Some(n),
            Self::Unbounded => None,
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::Fixed(0) => Self::None,
            other => other,
        }
    }
}

/// Deprecation metadata attached to an option.
///
/// # Examples
///
/// ```
/// use optcat_core::DeprecatedAttributes;
///
/// let attrs = DeprecatedAttributes::new()
///     .for_removal()
///     .with_since("2.0")
///     .with_description("Use X.");
/// assert_eq!(attrs.to_string(), "Deprecated for removal since 2.0: Use X.");
/// assert_eq!(DeprecatedAttributes::new().to_string(), "Deprecated");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedAttributes {
    /// Free-form replacement hint.
    #[serde(default)]
    pub description: String,
    /// Version the option was deprecated in.
    #[serde(default)]
    pub since: String,
    /// Whether the option is scheduled for removal.
    #[serde(default)]
    pub for_removal: bool,
}

impl DeprecatedAttributes {
    /// Creates attributes with no description, version or removal flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement hint.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the deprecation version.
    pub fn with_since(mut self, since: &str) -> Self {
        self.since = since.to_string();
        self
    }

    /// Marks the option as scheduled for removal.
    pub fn for_removal(mut self) -> Self {
        self.for_removal = true;
        self
    }
}

impl fmt::Display for DeprecatedAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deprecated")?;
        if self.for_removal {
            f.write_str(" for removal")?;
        }
        if !self.since.is_empty() {
            write!(f, " since {}", self.since)?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// A recognized command-line option.
///
/// An option is identified by its [`key`](CliOption::key): the short name if
/// it has one, the long name otherwise. Build options with
/// [`CliOption::builder`] or the [`flag`](CliOption::flag) /
/// [`with_arg`](CliOption::with_arg) shorthands.
///
/// # Examples
///
/// ```
/// use optcat_core::{Arity, CliOption};
///
/// let file = CliOption::builder()
///     .short('f')
///     .long("--file")
///     .description("Input file")
///     .has_arg()
///     .required(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(file.key(), "f");
/// assert_eq!(file.long(), Some("file"));
/// assert_eq!(file.arity(), Arity::Fixed(1));
/// assert!(file.to_string().starts_with("[ Option f file"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliOption {
    key: String,
    short: Option<char>,
    long: Option<String>,
    description: Option<String>,
    value_type: ValueType,
    required: bool,
    arity: Arity,
    optional_arg: bool,
    value_separator: Option<char>,
    arg_name: Option<String>,
    deprecated: Option<DeprecatedAttributes>,
}

impl CliOption {
    /// Starts building an option.
    pub fn builder() -> OptionBuilder {
        OptionBuilder::default()
    }

    /// Creates a switch (no values).
    pub fn flag(short: Option<char>, long: Option<&str>) -> Result<Self, CatalogError> {
        names(Self::builder(), short, long).build()
    }

    /// Creates an option taking exactly one value.
    pub fn with_arg(short: Option<char>, long: Option<&str>) -> Result<Self, CatalogError> {
        names(Self::builder(), short, long).has_arg().build()
    }

    /// The option identity: short name if present, else long name.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// Long name without leading dashes.
    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Whether values may be left out entirely.
    pub fn has_optional_arg(&self) -> bool {
        self.optional_arg
    }

    pub fn value_separator(&self) -> Option<char> {
        self.value_separator
    }

    /// Display name for the option's values (`ARG` unless set).
    pub fn arg_name(&self) -> &str {
        self.arg_name.as_deref().unwrap_or("ARG")
    }

    pub fn deprecated(&self) -> Option<&DeprecatedAttributes> {
        self.deprecated.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Values the option must receive when it appears on the command line.
    pub fn min_values(&self) -> usize {
        if self.optional_arg {
            0
        } else {
            self.arity.min_values()
        }
    }

    /// Checks whether `name` (with or without leading dashes) names this
    /// option.
    pub fn matches(&self, name: &str) -> bool {
        let name = strip_dashes(name);
        self.key == name || self.long.as_deref() == Some(name)
    }

    /// Renders the deprecation notice, or an empty string when the option is
    /// not deprecated.
    ///
    /// # Examples
    ///
    /// ```
    /// use optcat_core::{CliOption, DeprecatedAttributes};
    ///
    /// let opt = CliOption::builder().short('b').deprecated().build().unwrap();
    /// assert_eq!(opt.to_deprecated_string(), "Option 'b': Deprecated");
    ///
    /// let opt = CliOption::builder().short('a').build().unwrap();
    /// assert_eq!(opt.to_deprecated_string(), "");
    /// ```
    pub fn to_deprecated_string(&self) -> String {
        match &self.deprecated {
            Some(attrs) => format!("Option '{}': {attrs}", self.key),
            None => String::new(),
        }
    }

    pub(crate) fn set_required(&mut self, required: bool) {
        self.required = required;
    }
}

impl fmt::Display for CliOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ Option {}", self.key)?;
        if self.short.is_some() {
            if let Some(long) = &self.long {
                write!(f, " {long}")?;
            }
        }
        if self.required {
            f.write_str(" [REQUIRED]")?;
        }
        if self.deprecated.is_some() {
            f.write_str(" [DEPRECATED]")?;
        }
        match self.arity {
            Arity::None => {}
            Arity::Fixed(_) => f.write_str(" [ARG]")?,
            Arity::Unbounded => f.write_str(" [ARG...]")?,
        }
        write!(
            f,
            " :: {} :: {} ]",
            self.description.as_deref().unwrap_or_default(),
            self.value_type
        )
    }
}

fn names(mut builder: OptionBuilder, short: Option<char>, long: Option<&str>) -> OptionBuilder {
    if let Some(short) = short {
        builder = builder.short(short);
    }
    if let Some(long) = long {
        builder = builder.long(long);
    }
    builder
}

pub(crate) fn strip_dashes(name: &str) -> &str {
    name.trim_start_matches('-')
}

fn is_valid_short(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '?' | '@')
}

/// Builder for [`CliOption`].
///
/// All setters are infallible; names are validated once in
/// [`build`](OptionBuilder::build).
#[derive(Debug, Clone, Default)]
pub struct OptionBuilder {
    short: Option<char>,
    long: Option<String>,
    description: Option<String>,
    value_type: ValueType,
    required: bool,
    arity: Arity,
    optional_arg: bool,
    value_separator: Option<char>,
    arg_name: Option<String>,
    deprecated: Option<DeprecatedAttributes>,
}

impl OptionBuilder {
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Sets the long name; leading dashes are dropped.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Shorthand for `arity(Arity::Fixed(1))`.
    pub fn has_arg(self) -> Self {
        self.arity(Arity::Fixed(1))
    }

    /// Shorthand for `arity(Arity::Unbounded)`.
    pub fn has_args(self) -> Self {
        self.arity(Arity::Unbounded)
    }

    /// Shorthand for `arity(Arity::Fixed(n))`.
    pub fn num_args(self, n: usize) -> Self {
        self.arity(Arity::Fixed(n))
    }

    pub fn optional_arg(mut self, optional: bool) -> Self {
        self.optional_arg = optional;
        self
    }

    pub fn value_separator(mut self, sep: char) -> Self {
        self.value_separator = Some(sep);
        self
    }

    pub fn arg_name(mut self, name: impl Into<String>) -> Self {
        self.arg_name = Some(name.into());
        self
    }

    /// Marks the option deprecated without further details.
    pub fn deprecated(self) -> Self {
        self.deprecated_with(DeprecatedAttributes::default())
    }

    pub fn deprecated_with(mut self, attrs: DeprecatedAttributes) -> Self {
        self.deprecated = Some(attrs);
        self
    }

    /// Validates names and produces the option.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingName`] when neither name is set.
    /// - [`CatalogError::InvalidShortName`] for a short name that is not
    ///   alphanumeric, `_`, `?` or `@`.
    /// - [`CatalogError::InvalidLongName`] for a long name that is empty after
    ///   stripping dashes or contains `=` or whitespace.
    pub fn build(self) -> Result<CliOption, CatalogError> {
        if let Some(c) = self.short {
            if !is_valid_short(c) {
                return Err(CatalogError::InvalidShortName(c));
            }
        }

        let long = match self.long {
            Some(raw) => {
                let name = strip_dashes(raw.trim());
                if name.is_empty() || name.contains('=') || name.chars().any(char::is_whitespace)
                {
                    return Err(CatalogError::InvalidLongName(raw));
                }
                Some(name.to_string())
            }
            None => None,
        };

        let key = match (self.short, &long) {
            (Some(c), _) => c.to_string(),
            (None, Some(long)) => long.clone(),
            (None, None) => return Err(CatalogError::MissingName),
        };

        Ok(CliOption {
            key,
            short: self.short,
            long,
            description: self.description,
            value_type: self.value_type,
            required: self.required,
            arity: self.arity.normalized(),
            optional_arg: self.optional_arg,
            value_separator: self.value_separator,
            arg_name: self.arg_name,
            deprecated: self.deprecated,
        })
    }
}
