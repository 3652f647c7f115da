//! Matching an argument vector against a catalog.
//!
//! [`Parser`] drives a small state machine over the tokens produced by
//! [`Tokenizer`]. It never mutates the catalog: group selections and matched
//! keys live in the per-call run, so one catalog can be parsed against from
//! several threads.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{OptionCatalog, Requirement};
use crate::error::{ParseError, Result};
use crate::group::GroupSelection;
use crate::option::CliOption;
use crate::result::{MatchedOption, ParseResult};
use crate::tokenizer::{Token, Tokenizer};

/// What to do with an option-like argument the catalog does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOptionPolicy {
    /// Fail with [`ParseError::UnrecognizedOption`].
    Reject,
    /// Keep it as a positional argument and continue.
    Positional,
    /// Keep it and every later argument as positionals.
    StopParsing,
}

fn default_true() -> bool {
    true
}

/// Parser settings.
///
/// `unknown` has no default and must always be chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub unknown: UnknownOptionPolicy,
    /// Accept unambiguous prefixes of long names.
    #[serde(default = "default_true")]
    pub allow_abbreviations: bool,
    /// The first positional argument ends option parsing.
    #[serde(default)]
    pub stop_at_non_option: bool,
    /// Log a warning when a deprecated option is used.
    #[serde(default = "default_true")]
    pub warn_deprecated: bool,
}

impl ParserConfig {
    pub fn new(unknown: UnknownOptionPolicy) -> Self {
        Self {
            unknown,
            allow_abbreviations: true,
            stop_at_non_option: false,
            warn_deprecated: true,
        }
    }

    /// Rejects unknown options, accepts abbreviations, parses the whole
    /// vector and warns about deprecated options.
    pub fn strict() -> Self {
        Self::new(UnknownOptionPolicy::Reject)
    }

    pub fn with_abbreviations(mut self, enabled: bool) -> Self {
        self.allow_abbreviations = enabled;
        self
    }

    pub fn with_stop_at_non_option(mut self, enabled: bool) -> Self {
        self.stop_at_non_option = enabled;
        self
    }

    pub fn with_deprecation_warnings(mut self, enabled: bool) -> Self {
        self.warn_deprecated = enabled;
        self
    }
}

/// Parses argument vectors with a fixed [`ParserConfig`].
///
/// # Examples
///
/// ```
/// use optcat_core::{OptionCatalog, Parser, ParserConfig};
///
/// let mut catalog = OptionCatalog::new();
/// catalog.add_flag('v', false, "verbose").unwrap();
/// catalog.add_long_flag('o', "output", true, "output file").unwrap();
///
/// let parser = Parser::new(ParserConfig::strict());
/// let result = parser.parse(&catalog, &["-v", "--out=a.txt", "input"]).unwrap();
///
/// assert!(result.has_option("v"));
/// assert_eq!(result.option_value("output"), Some("a.txt"));
/// assert_eq!(result.args(), ["input".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses `args` against `catalog`.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] except [`ParseError::UnknownDefault`]; nothing is
    /// returned for a partially parsed vector.
    pub fn parse<S: AsRef<str>>(&self, catalog: &OptionCatalog, args: &[S]) -> Result<ParseResult> {
        self.parse_with_properties::<S, &str, &str>(catalog, args, &[])
    }

    /// Parses `args`, then applies `properties` as defaults for options the
    /// command line did not supply.
    ///
    /// A value-taking option receives the property value. A flag is matched
    /// only when the value is `yes`, `true` or `1` (any case). Properties are
    /// skipped for options already matched and for groups that already have
    /// a selection.
    pub fn parse_with_properties<S, K, V>(
        &self,
        catalog: &OptionCatalog,
        args: &[S],
        properties: &[(K, V)],
    ) -> Result<ParseResult>
    where
        S: AsRef<str>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut run = ParseRun::new(catalog, &self.config);
        for arg in args {
            run.feed(arg.as_ref())?;
        }
        run.close_pending()?;
        run.apply_properties(properties)?;
        run.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    /// The option at `index` in the matched list is collecting values.
    Consuming { index: usize },
}

struct ParseRun<'c> {
    catalog: &'c OptionCatalog,
    config: &'c ParserConfig,
    tokenizer: Tokenizer<'c>,
    state: State,
    /// Set once option parsing has ended; remaining arguments are positional.
    passthrough: bool,
    selection: GroupSelection,
    matched: Vec<MatchedOption>,
    seen: HashSet<String>,
    args: Vec<String>,
}

impl<'c> ParseRun<'c> {
    fn new(catalog: &'c OptionCatalog, config: &'c ParserConfig) -> Self {
        Self {
            catalog,
            config,
            tokenizer: Tokenizer::new(catalog).with_abbreviations(config.allow_abbreviations),
            state: State::Scanning,
            passthrough: false,
            selection: GroupSelection::new(),
            matched: Vec::new(),
            seen: HashSet::new(),
            args: Vec::new(),
        }
    }

    fn feed(&mut self, arg: &str) -> Result<()> {
        if self.passthrough {
            self.args.push(arg.to_string());
            return Ok(());
        }
        for token in self.tokenizer.split(arg) {
            self.handle(token)?;
        }
        Ok(())
    }

    fn handle(&mut self, token: Token) -> Result<()> {
        match token {
            Token::EndOfOptions => {
                self.close_pending()?;
                self.passthrough = true;
                Ok(())
            }
            Token::Value(value) => {
                self.handle_value(value);
                Ok(())
            }
            Token::Option { name, value, raw } => self.handle_option(&name, value, raw),
        }
    }

    fn handle_value(&mut self, value: String) {
        if let State::Consuming { index } = self.state {
            self.push_value(index, &value);
            return;
        }
        self.args.push(value);
        if self.config.stop_at_non_option {
            self.passthrough = true;
        }
    }

    fn handle_option(&mut self, name: &str, value: Option<String>, raw: String) -> Result<()> {
        let option = match self.resolve(name)? {
            Some(option) if value.is_some() && !option.arity().takes_values() => None,
            other => other,
        };

        let Some(option) = option else {
            if let State::Consuming { index } = self.state {
                self.push_value(index, &raw);
                return Ok(());
            }
            return self.handle_unknown(raw);
        };

        self.close_pending()?;
        let index = self.record(option)?;
        if let Some(value) = value {
            self.push_value(index, &value);
        }
        let wants_more = match option.arity().max_values() {
            Some(max) => self.matched[index].values.len() < max,
            None => option.arity().takes_values(),
        };
        if wants_more {
            self.state = State::Consuming { index };
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<Option<&'c CliOption>> {
        if let Some(long) = name.strip_prefix("--") {
            if let Some(option) = self.catalog.long_option(long) {
                return Ok(Some(option));
            }
            if !self.config.allow_abbreviations {
                return Ok(None);
            }
            let candidates = self.catalog.matching_options(long);
            return match candidates.as_slice() {
                [] => Ok(None),
                [only] => {
                    debug!(token = %long, resolved = %only, "Resolved abbreviated option");
                    Ok(self.catalog.long_option(only))
                }
                _ => Err(ParseError::AmbiguousOption {
                    token: long.to_string(),
                    candidates: candidates.iter().map(|c| c.to_string()).collect(),
                }),
            };
        }

        let body = name.strip_prefix('-').unwrap_or(name);
        let mut chars = body.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(self.catalog.short_option(c)),
            _ => Ok(None),
        }
    }

    fn handle_unknown(&mut self, raw: String) -> Result<()> {
        match self.config.unknown {
            UnknownOptionPolicy::Reject => Err(ParseError::UnrecognizedOption(raw)),
            UnknownOptionPolicy::Positional => {
                debug!(token = %raw, "Keeping unknown option as positional");
                self.args.push(raw);
                if self.config.stop_at_non_option {
                    self.passthrough = true;
                }
                Ok(())
            }
            UnknownOptionPolicy::StopParsing => {
                debug!(token = %raw, "Unknown option ends option parsing");
                self.args.push(raw);
                self.passthrough = true;
                Ok(())
            }
        }
    }

    /// Records a match and returns its index in the matched list.
    fn record(&mut self, option: &CliOption) -> Result<usize> {
        let key = option.key();
        if let Some(id) = self.catalog.group_id_of(key) {
            if let Some(group) = self.catalog.group(id) {
                self.selection.select(id, group, key)?;
            }
        }
        if option.is_deprecated() && self.config.warn_deprecated {
            warn!(option = %key, "{}", option.to_deprecated_string());
        }
        self.seen.insert(key.to_string());
        self.matched.push(MatchedOption {
            option: option.clone(),
            values: Vec::new(),
        });
        Ok(self.matched.len() - 1)
    }

    /// Adds `raw` to the values of the match at `index`, splitting on the
    /// option's separator. A fixed arity keeps the remainder whole once only
    /// one slot is left.
    fn push_value(&mut self, index: usize, raw: &str) {
        let matched = &mut self.matched[index];
        let max = matched.option.arity().max_values();
        match matched.option.value_separator() {
            Some(sep) => {
                let mut rest = raw;
                while let Some((head, tail)) = rest.split_once(sep) {
                    if max.is_some_and(|max| matched.values.len() + 1 >= max) {
                        break;
                    }
                    matched.values.push(head.to_string());
                    rest = tail;
                }
                matched.values.push(rest.to_string());
            }
            None => matched.values.push(raw.to_string()),
        }
        if max.is_some_and(|max| matched.values.len() >= max) {
            self.state = State::Scanning;
        }
    }

    fn close_pending(&mut self) -> Result<()> {
        let State::Consuming { index } = self.state else {
            return Ok(());
        };
        self.state = State::Scanning;
        let matched = &self.matched[index];
        let expected = matched.option.min_values();
        if matched.values.len() < expected {
            return Err(ParseError::InsufficientValues {
                option: matched.option.key().to_string(),
                expected,
                found: matched.values.len(),
            });
        }
        Ok(())
    }

    fn apply_properties<K: AsRef<str>, V: AsRef<str>>(&mut self, properties: &[(K, V)]) -> Result<()> {
        let catalog = self.catalog;
        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref());
            let option = catalog
                .option(key)
                .ok_or_else(|| ParseError::UnknownDefault(key.to_string()))?;
            if self.seen.contains(option.key()) {
                continue;
            }
            let grouped_selected = self
                .catalog
                .group_id_of(option.key())
                .is_some_and(|id| self.selection.is_selected(id));
            if grouped_selected {
                continue;
            }

            if option.arity().takes_values() {
                let index = self.record(option)?;
                self.push_value(index, value);
                debug!(option = %option.key(), value = %value, "Applied default from properties");
            } else if matches!(value.to_ascii_lowercase().as_str(), "yes" | "true" | "1") {
                self.record(option)?;
                debug!(option = %option.key(), "Applied flag from properties");
            }
        }
        self.state = State::Scanning;
        Ok(())
    }

    fn finish(self) -> Result<ParseResult> {
        let missing: Vec<String> = self
            .catalog
            .requirements()
            .iter()
            .filter_map(|requirement| match requirement {
                Requirement::Option(key) => (!self.seen.contains(key)).then(|| key.clone()),
                Requirement::Group(id) if self.selection.is_selected(*id) => None,
                Requirement::Group(id) => self.catalog.group(*id).map(|group| group.to_string()),
            })
            .collect();
        if !missing.is_empty() {
            debug!(missing = ?missing, "Required options not supplied");
            return Err(ParseError::MissingOptions(missing));
        }

        debug!(
            matched = self.matched.len(),
            positional = self.args.len(),
            "Parsed argument vector"
        );
        Ok(ParseResult::new(self.matched, self.args))
    }
}
