//! Catalog definition documents.
//!
//! A document describes an [`OptionCatalog`] and the [`ParserConfig`] to
//! parse it with. Documents are stored as YAML or JSON; the format is chosen
//! from the file extension.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! parser:
//!   unknown: reject
//!   allow_abbreviations: true
//! options:
//!   - short: f
//!     long: file
//!     description: Input file
//!     value_type: file
//!     required: true
//!     args: 1
//!   - long: define
//!     short: D
//!     args: 2
//!     value_separator: "="
//! groups:
//!   - required: true
//!     options:
//!       - long: json
//!       - long: yaml
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use optcat_core::{
    Arity, CatalogError, CliOption, DeprecatedAttributes, OptionCatalog, OptionGroup, Parser,
    ParserConfig, ValueType,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoaderError, Result};

const DEFAULT_ARG_NAME: &str = "ARG";

/// Keyword forms of [`ArgsSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgsKeyword {
    None,
    Unbounded,
}

/// How many values an option takes, as written in a document: `none`, a
/// count, or `unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgsSpec {
    Count(usize),
    Keyword(ArgsKeyword),
}

impl Default for ArgsSpec {
    fn default() -> Self {
        Self::Keyword(ArgsKeyword::None)
    }
}

impl ArgsSpec {
    fn is_none(&self) -> bool {
        matches!(self, Self::Keyword(ArgsKeyword::None) | Self::Count(0))
    }
}

impl From<ArgsSpec> for Arity {
    fn from(args: ArgsSpec) -> Self {
        match args {
            ArgsSpec::Count(0) | ArgsSpec::Keyword(ArgsKeyword::None) => Arity::None,
            ArgsSpec::Count(n) => Arity::Fixed(n),
            ArgsSpec::Keyword(ArgsKeyword::Unbounded) => Arity::Unbounded,
        }
    }
}

impl From<Arity> for ArgsSpec {
    fn from(arity: Arity) -> Self {
        match arity {
            Arity::None => Self::Keyword(ArgsKeyword::None),
            Arity::Fixed(n) => Self::Count(n),
            Arity::Unbounded => Self::Keyword(ArgsKeyword::Unbounded),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_text(value_type: &ValueType) -> bool {
    *value_type == ValueType::Text
}

/// One option as written in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_text")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "ArgsSpec::is_none")]
    pub args: ArgsSpec,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional_arg: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_separator: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecatedAttributes>,
}

impl OptionEntry {
    /// Builds the option, validating its names.
    pub fn to_option(&self) -> std::result::Result<CliOption, CatalogError> {
        let mut builder = CliOption::builder()
            .value_type(self.value_type.clone())
            .required(self.required)
            .arity(self.args.into())
            .optional_arg(self.optional_arg);
        if let Some(short) = self.short {
            builder = builder.short(short);
        }
        if let Some(long) = &self.long {
            builder = builder.long(long.as_str());
        }
        if let Some(description) = &self.description {
            builder = builder.description(description.as_str());
        }
        if let Some(sep) = self.value_separator {
            builder = builder.value_separator(sep);
        }
        if let Some(arg_name) = &self.arg_name {
            builder = builder.arg_name(arg_name.as_str());
        }
        if let Some(deprecated) = &self.deprecated {
            builder = builder.deprecated_with(deprecated.clone());
        }
        builder.build()
    }

    pub fn from_option(option: &CliOption) -> Self {
        Self {
            short: option.short(),
            long: option.long().map(str::to_string),
            description: option.description().map(str::to_string),
            value_type: option.value_type().clone(),
            required: option.is_required(),
            args: option.arity().into(),
            optional_arg: option.has_optional_arg(),
            value_separator: option.value_separator(),
            arg_name: (option.arg_name() != DEFAULT_ARG_NAME).then(|| option.arg_name().to_string()),
            deprecated: option.deprecated().cloned(),
        }
    }
}

/// A mutually exclusive group as written in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    pub options: Vec<OptionEntry>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A catalog definition plus the parser settings to use with it.
///
/// # Examples
///
/// ```
/// use optcat_loader::CatalogDocument;
///
/// let doc = CatalogDocument::from_yaml_str(
///     r#"
/// parser:
///   unknown: positional
/// options:
///   - short: v
///     long: verbose
/// "#,
/// )
/// .unwrap();
///
/// let catalog = doc.to_catalog().unwrap();
/// let result = doc.parser().parse(&catalog, &["--verb", "-x"]).unwrap();
/// assert!(result.has_option("v"));
/// assert_eq!(result.args(), ["-x".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Document format version (e.g., `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// Parser settings; `unknown` must be given.
    pub parser: ParserConfig,
    /// Options outside any group, in registration order.
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl CatalogDocument {
    /// An empty document with the given parser settings.
    pub fn new(parser: ParserConfig) -> Self {
        Self {
            version: default_version(),
            parser,
            options: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Loads a document from a `.yaml`, `.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](crate::LoaderError::UnsupportedFormat)
    /// for other extensions, [`Io`](crate::LoaderError::Io) if the file
    /// cannot be read, or a format error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let reader = BufReader::new(File::open(path)?);
        let doc: Self = match format {
            Format::Yaml => serde_yaml::from_reader(reader)?,
            Format::Json => serde_json::from_reader(reader)?,
        };
        debug!(
            path = %path.display(),
            options = doc.options.len(),
            groups = doc.groups.len(),
            "Loaded catalog document"
        );
        Ok(doc)
    }

    /// Saves the document; the extension picks the format.
    ///
    /// # Errors
    ///
    /// Same conditions as [`load`](Self::load), for writing.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let writer = BufWriter::new(File::create(path)?);
        match format {
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
        }
        debug!(path = %path.display(), "Saved catalog document");
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the catalog: ungrouped options first, then each group.
    ///
    /// # Errors
    ///
    /// [`Catalog`](crate::LoaderError::Catalog) when an entry has no name or
    /// an invalid one.
    pub fn to_catalog(&self) -> Result<OptionCatalog> {
        let mut catalog = OptionCatalog::new();
        for entry in &self.options {
            catalog.add_option(entry.to_option()?);
        }
        for entry in &self.groups {
            let mut group = OptionGroup::new().with_required(entry.required);
            for option in &entry.options {
                group.add_option(option.to_option()?);
            }
            catalog.add_option_group(group);
        }
        Ok(catalog)
    }

    /// Describes an existing catalog.
    pub fn from_catalog(catalog: &OptionCatalog, parser: ParserConfig) -> Self {
        let options = catalog
            .options()
            .filter(|option| catalog.group_id_of(option.key()).is_none())
            .map(OptionEntry::from_option)
            .collect();
        let groups = catalog
            .option_groups()
            .map(|group| GroupEntry {
                required: group.is_required(),
                options: group.options().map(OptionEntry::from_option).collect(),
            })
            .collect();
        Self {
            version: default_version(),
            parser,
            options,
            groups,
        }
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser
    }

    /// A parser configured with this document's settings.
    pub fn parser(&self) -> Parser {
        Parser::new(self.parser.clone())
    }
}
