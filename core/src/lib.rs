//! Option catalogs and command-line parsing.
//!
//! This crate models the options a program accepts and matches raw
//! argument vectors against them:
//!
//! - [`CliOption`]: one option: short/long names, arity, value type,
//!   requiredness and deprecation, built through [`OptionBuilder`].
//! - [`OptionGroup`]: mutually exclusive options, optionally required as a
//!   whole.
//! - [`OptionCatalog`]: the registry of options and groups, with lookup by
//!   key, long name or long-name prefix.
//! - [`Tokenizer`]: splits POSIX/GNU argument vectors (`-abc`, `-ofile`,
//!   `--name=value`, `--`, negative numbers) into [`Token`]s.
//! - [`Parser`]: matches tokens against a catalog under a [`ParserConfig`]
//!   and produces a [`ParseResult`] or a [`ParseError`].
//!
//! Catalogs are plain values. Parsing borrows them and keeps all per-call
//! state (group selections, pending values) to itself.
//!
//! # Example
//!
//! ```
//! use optcat_core::*;
//!
//! let mut catalog = OptionCatalog::new();
//! catalog.add_flag('v', false, "Verbose output").unwrap();
//! catalog.add_option(
//!     CliOption::builder()
//!         .short('n')
//!         .long("count")
//!         .has_arg()
//!         .value_type(ValueType::Integer)
//!         .build()
//!         .unwrap(),
//! );
//! catalog.add_option_group(
//!     OptionGroup::new()
//!         .with_option(CliOption::flag(None, Some("json")).unwrap())
//!         .with_option(CliOption::flag(None, Some("yaml")).unwrap()),
//! );
//!
//! let parser = Parser::new(ParserConfig::strict());
//! let result = parser
//!     .parse(&catalog, &["-v", "--count=3", "--json", "input.txt"])
//!     .unwrap();
//!
//! assert!(result.has_option("v"));
//! assert_eq!(result.parsed_value("count").unwrap(), Some(TypedValue::Integer(3)));
//! assert_eq!(result.args(), ["input.txt".to_string()]);
//!
//! let err = parser.parse(&catalog, &["--json", "--yaml"]).unwrap_err();
//! assert!(matches!(err, ParseError::GroupConflict { .. }));
//! ```

mod catalog;
mod error;
mod group;
mod option;
mod parser;
mod result;
mod tokenizer;
mod value;

pub use catalog::{OptionCatalog, Requirement};
pub use error::{CatalogError, ParseError, Result};
pub use group::{GroupId, GroupSelection, OptionGroup};
pub use option::{Arity, CliOption, DeprecatedAttributes, OptionBuilder};
pub use parser::{Parser, ParserConfig, UnknownOptionPolicy};
pub use result::{MatchedOption, ParseResult};
pub use tokenizer::{Token, Tokenizer};
pub use value::{TypedValue, ValueType};
