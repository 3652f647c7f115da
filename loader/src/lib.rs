//! Catalog definition documents for optcat.
//!
//! This crate is the configuration layer: it reads and writes
//! [`CatalogDocument`]s (YAML or JSON, chosen by file extension) and turns
//! them into an [`OptionCatalog`](optcat_core::OptionCatalog) plus the
//! [`ParserConfig`](optcat_core::ParserConfig) to parse it with.
//!
//! # Quick start
//!
//! ```no_run
//! use optcat_loader::CatalogDocument;
//!
//! let doc = CatalogDocument::load("tar.yaml").unwrap();
//! let catalog = doc.to_catalog().unwrap();
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! match doc.parser().parse(&catalog, &args) {
//!     Ok(result) => println!("{} positional arguments", result.args().len()),
//!     Err(err) => eprintln!("error: {err}"),
//! }
//! ```

mod document;
mod error;

pub use document::{ArgsKeyword, ArgsSpec, CatalogDocument, GroupEntry, OptionEntry};
pub use error::{LoaderError, Result};
