//! Splitting raw arguments into option and value tokens.
//!
//! The tokenizer knows the catalog, so it can expand bundled short flags
//! (`-abc`), split attached values (`--name=value`, `-n=value`, `-ofile`)
//! and tell negative numbers from options. It never fails: arguments it
//! cannot place are passed on as [`Token::Option`] with their raw spelling
//! and the parser decides what to do with them.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::OptionCatalog;

static NEGATIVE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").expect("static regex must compile")
});

/// One normalized unit of the argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An option occurrence.
    Option {
        /// `-x` for short names, `--name` for long names (possibly an
        /// abbreviation), or the raw argument when nothing matched.
        name: String,
        /// Value attached in the same argument.
        value: Option<String>,
        /// What the user typed for this token.
        raw: String,
    },
    /// A plain argument: an option value or a positional.
    Value(String),
    /// The `--` terminator.
    EndOfOptions,
}

impl Token {
    fn option(name: impl Into<String>, value: Option<&str>, raw: impl Into<String>) -> Self {
        Self::Option {
            name: name.into(),
            value: value.map(str::to_string),
            raw: raw.into(),
        }
    }
}

/// Catalog-aware argument splitter.
///
/// # Examples
///
/// ```
/// use optcat_core::{CliOption, OptionCatalog, Token, Tokenizer};
///
/// let mut catalog = OptionCatalog::new();
/// catalog.add_flag('a', false, "").unwrap();
/// catalog.add_flag('b', false, "").unwrap();
///
/// let tokens = Tokenizer::new(&catalog).tokenize(&["-ab", "-5"]);
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[2], Token::Value("-5".into()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'c> {
    catalog: &'c OptionCatalog,
    abbreviations: bool,
}

impl<'c> Tokenizer<'c> {
    /// Creates a tokenizer with abbreviation matching enabled.
    pub fn new(catalog: &'c OptionCatalog) -> Self {
        Self {
            catalog,
            abbreviations: true,
        }
    }

    /// Enables or disables treating single-dash long-name prefixes as long
    /// options.
    pub fn with_abbreviations(mut self, enabled: bool) -> Self {
        self.abbreviations = enabled;
        self
    }

    /// Tokenizes a whole argument vector. Everything after `--` becomes a
    /// [`Token::Value`].
    pub fn tokenize<S: AsRef<str>>(&self, args: &[S]) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(args.len());
        let mut trailing = false;
        for arg in args {
            let arg = arg.as_ref();
            if trailing {
                tokens.push(Token::Value(arg.to_string()));
                continue;
            }
            let split = self.split(arg);
            trailing = matches!(split.as_slice(), [Token::EndOfOptions]);
            tokens.extend(split);
        }
        tokens
    }

    /// Tokenizes a single argument.
    pub fn split(&self, arg: &str) -> Vec<Token> {
        if arg == "--" {
            return vec![Token::EndOfOptions];
        }
        if arg == "-" || !arg.starts_with('-') {
            return vec![Token::Value(arg.to_string())];
        }

        if let Some(body) = arg.strip_prefix("--") {
            let token = match body.split_once('=') {
                Some((name, value)) => Token::option(format!("--{name}"), Some(value), arg),
                None => Token::option(arg, None, arg),
            };
            return vec![token];
        }

        let body = &arg[1..];
        if self.is_negative_number(arg, body) {
            return vec![Token::Value(arg.to_string())];
        }

        if let Some((name, value)) = body.split_once('=') {
            if self.is_short(name) {
                return vec![Token::option(format!("-{name}"), Some(value), arg)];
            }
            if self.is_long_like(name) {
                return vec![Token::option(format!("--{name}"), Some(value), arg)];
            }
        }

        if self.is_short(body) {
            return vec![Token::option(arg, None, arg)];
        }
        if self.is_long_like(body) {
            return vec![Token::option(format!("--{body}"), None, arg)];
        }

        self.burst(body)
            .unwrap_or_else(|| vec![Token::option(arg, None, arg)])
    }

    /// `-5` is a value unless `5` itself is a registered short option.
    fn is_negative_number(&self, arg: &str, body: &str) -> bool {
        NEGATIVE_NUMBER.is_match(arg) && !self.is_short(body)
    }

    fn is_short(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.catalog.short_option(c).is_some(),
            _ => false,
        }
    }

    fn is_long_like(&self, name: &str) -> bool {
        self.catalog.has_long_option(name)
            || (self.abbreviations && !self.catalog.matching_options(name).is_empty())
    }

    /// Expands `-abc` into `-a -b -c`. The first value-taking option ends the
    /// bundle and takes the rest of the argument as its value.
    fn burst(&self, body: &str) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        for (idx, c) in body.char_indices() {
            let option = self.catalog.short_option(c)?;
            if option.arity().takes_values() {
                let rest = &body[idx + c.len_utf8()..];
                let value = (!rest.is_empty()).then_some(rest);
                tokens.push(Token::option(format!("-{c}"), value, format!("-{c}{rest}")));
                return Some(tokens);
            }
            tokens.push(Token::option(format!("-{c}"), None, format!("-{c}")));
        }
        Some(tokens)
    }
}
