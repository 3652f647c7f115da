//! The option catalog: every option and group a parser recognizes.
//!
//! [`OptionCatalog`] indexes options by key and by long name, tracks which
//! options (and groups) are required, and answers the prefix queries used for
//! GNU-style abbreviations.
//!
//! # Example
//!
//! ```
//! use optcat_core::*;
//!
//! let mut catalog = OptionCatalog::new();
//! catalog.add_option(CliOption::flag(None, Some("version")).unwrap());
//! catalog.add_option(CliOption::flag(None, Some("verbose")).unwrap());
//!
//! assert_eq!(catalog.matching_options("ver"), vec!["version", "verbose"]);
//! assert_eq!(catalog.matching_options("version"), vec!["version"]);
//! assert!(catalog.matching_options("foo").is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::group::{GroupId, OptionGroup};
use crate::option::{CliOption, strip_dashes};

/// Something that must be present on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Requirement {
    /// A required option, by key.
    Option(String),
    /// A required group: any one of its members.
    Group(GroupId),
}

/// The schema consulted by the parser.
///
/// Registration follows "last registration wins": adding an option whose key
/// is already present replaces the previous definition and keeps its
/// position. An option in a group is never individually required.
#[derive(Debug, Clone, Default)]
pub struct OptionCatalog {
    options: IndexMap<String, CliOption>,
    long_names: IndexMap<String, String>,
    groups: IndexMap<GroupId, OptionGroup>,
    membership: HashMap<String, GroupId>,
    requirements: Vec<Requirement>,
    next_group: u32,
}

impl OptionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `option`, replacing any option with the same key.
    ///
    /// # Examples
    ///
    /// ```
    /// use optcat_core::{CliOption, OptionCatalog};
    ///
    /// let mut catalog = OptionCatalog::new();
    /// catalog.add_option(CliOption::builder().short('a').description("toggle -a").build().unwrap());
    /// catalog.add_option(CliOption::builder().short('a').description("toggle -a*").build().unwrap());
    ///
    /// assert_eq!(catalog.option("a").unwrap().description(), Some("toggle -a*"));
    /// assert_eq!(catalog.len(), 1);
    /// ```
    pub fn add_option(&mut self, mut option: CliOption) -> &mut Self {
        let key = option.key().to_string();

        if let Some(id) = self.membership.get(&key).copied() {
            option.set_required(false);
            if let Some(member) = self.groups.get_mut(&id).and_then(|g| g.get_mut(&key)) {
                *member = option.clone();
            }
        }

        self.requirements
            .retain(|req| !matches!(req, Requirement::Option(k) if *k == key));
        if option.is_required() {
            self.requirements.push(Requirement::Option(key.clone()));
        }

        self.long_names.retain(|_, owner| *owner != key);
        if let Some(long) = option.long() {
            if let Some(previous) = self.long_names.insert(long.to_string(), key.clone()) {
                debug!(long = %long, previous = %previous, key = %key, "Long name re-assigned");
            }
        }

        if self.options.insert(key.clone(), option).is_some() {
            debug!(key = %key, "Replaced option registration");
        }
        self
    }

    /// Registers a short option with an optional single value.
    pub fn add_flag(
        &mut self,
        short: char,
        has_arg: bool,
        description: &str,
    ) -> Result<&mut Self, CatalogError> {
        let option = arg_builder(has_arg)
            .short(short)
            .description(description)
            .build()?;
        Ok(self.add_option(option))
    }

    /// Registers an option with both names.
    pub fn add_long_flag(
        &mut self,
        short: char,
        long: &str,
        has_arg: bool,
        description: &str,
    ) -> Result<&mut Self, CatalogError> {
        let option = arg_builder(has_arg)
            .short(short)
            .long(long)
            .description(description)
            .build()?;
        Ok(self.add_option(option))
    }

    /// Registers a required option with both names.
    pub fn add_required_option(
        &mut self,
        short: char,
        long: &str,
        has_arg: bool,
        description: &str,
    ) -> Result<&mut Self, CatalogError> {
        let option = arg_builder(has_arg)
            .short(short)
            .long(long)
            .description(description)
            .required(true)
            .build()?;
        Ok(self.add_option(option))
    }

    /// Registers a group and all of its members.
    ///
    /// Members lose individual requiredness and leave any group they were in
    /// before; a group emptied that way is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use optcat_core::{CliOption, OptionCatalog, OptionGroup};
    ///
    /// let a = CliOption::builder().short('a').required(true).build().unwrap();
    /// let mut catalog = OptionCatalog::new();
    /// catalog.add_option(a.clone());
    /// assert_eq!(catalog.required_options(), vec!["a"]);
    ///
    /// catalog.add_option_group(OptionGroup::new().with_option(a));
    /// assert!(catalog.required_options().is_empty());
    /// assert!(!catalog.option("a").unwrap().is_required());
    /// ```
    pub fn add_option_group(&mut self, group: OptionGroup) -> &mut Self {
        if group.is_empty() {
            debug!("Ignoring empty option group");
            return self;
        }

        let id = self.allocate_group();
        let mut stored = OptionGroup::new().with_required(group.is_required());

        for option in group.options() {
            let mut option = option.clone();
            option.set_required(false);
            let key = option.key().to_string();
            if let Some(previous) = self.membership.insert(key.clone(), id) {
                self.detach(previous, &key);
            }
            stored.add_option(option.clone());
            self.add_option(option);
        }

        if stored.is_required() {
            self.requirements.push(Requirement::Group(id));
        }
        self.groups.insert(id, stored);
        self
    }

    /// Merges every option and group of `other` into this catalog.
    ///
    /// The merge is all-or-nothing: if any key or long name of `other` is
    /// already registered here, nothing is changed.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ConflictingRegistration`] naming the first shared key,
    /// or the first shared long name when no key is shared.
    ///
    /// # Examples
    ///
    /// ```
    /// use optcat_core::{CatalogError, CliOption, OptionCatalog};
    ///
    /// let mut catalog = OptionCatalog::new();
    /// catalog.add_flag('x', false, "x").unwrap();
    ///
    /// let snapshot = catalog.clone();
    /// assert_eq!(
    ///     catalog.add_options(&snapshot).unwrap_err(),
    ///     CatalogError::ConflictingRegistration("x".into())
    /// );
    /// ```
    pub fn add_options(&mut self, other: &OptionCatalog) -> Result<&mut Self, CatalogError> {
        if let Some(key) = other.options.keys().find(|k| self.options.contains_key(*k)) {
            return Err(CatalogError::ConflictingRegistration(key.clone()));
        }
        if let Some(long) = other
            .options
            .values()
            .filter_map(CliOption::long)
            .find(|long| self.long_names.contains_key(*long))
        {
            return Err(CatalogError::ConflictingRegistration(long.to_string()));
        }

        let mut remap: HashMap<GroupId, GroupId> = HashMap::new();
        for (id, group) in &other.groups {
            let new_id = self.allocate_group();
            remap.insert(*id, new_id);
            self.groups.insert(new_id, group.clone());
        }

        for (key, option) in &other.options {
            if let Some(long) = option.long() {
                self.long_names.insert(long.to_string(), key.clone());
            }
            if let Some(new_id) = other.membership.get(key).and_then(|id| remap.get(id)) {
                self.membership.insert(key.clone(), *new_id);
            }
            self.options.insert(key.clone(), option.clone());
        }

        for requirement in &other.requirements {
            match requirement {
                Requirement::Option(key) => {
                    self.requirements.push(Requirement::Option(key.clone()));
                }
                Requirement::Group(id) => {
                    if let Some(new_id) = remap.get(id) {
                        self.requirements.push(Requirement::Group(*new_id));
                    }
                }
            }
        }

        debug!(
            options = other.options.len(),
            groups = other.groups.len(),
            "Merged option catalog"
        );
        Ok(self)
    }

    /// Looks an option up by key, then by long name. Leading dashes are
    /// ignored.
    pub fn option(&self, name: &str) -> Option<&CliOption> {
        let name = strip_dashes(name);
        self.options.get(name).or_else(|| {
            self.long_names
                .get(name)
                .and_then(|key| self.options.get(key))
        })
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    pub fn has_short_option(&self, name: &str) -> bool {
        let mut chars = strip_dashes(name).chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.short_option(c).is_some(),
            _ => false,
        }
    }

    pub fn has_long_option(&self, name: &str) -> bool {
        self.long_names.contains_key(strip_dashes(name))
    }

    /// The option registered under short name `c`.
    pub fn short_option(&self, c: char) -> Option<&CliOption> {
        let mut buf = [0; 4];
        let key: &str = c.encode_utf8(&mut buf);
        self.options
            .get(key)
            .filter(|option| option.short() == Some(c))
    }

    /// The option registered under long name `name` (no abbreviation).
    pub fn long_option(&self, name: &str) -> Option<&CliOption> {
        self.long_names
            .get(strip_dashes(name))
            .and_then(|key| self.options.get(key))
    }

    /// All options in registration order.
    pub fn options(&self) -> impl Iterator<Item = &CliOption> {
        self.options.values()
    }

    /// All options, grouped and ungrouped, in registration order, for help
    /// formatters.
    pub fn help_options(&self) -> Vec<&CliOption> {
        self.options.values().collect()
    }

    pub fn option_groups(&self) -> impl Iterator<Item = &OptionGroup> {
        self.groups.values()
    }

    /// Groups with their catalog ids.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &OptionGroup)> {
        self.groups.iter().map(|(id, group)| (*id, group))
    }

    pub fn group(&self, id: GroupId) -> Option<&OptionGroup> {
        self.groups.get(&id)
    }

    /// The group the option named `name` belongs to.
    pub fn option_group(&self, name: &str) -> Option<&OptionGroup> {
        self.group_id_of(name).and_then(|id| self.groups.get(&id))
    }

    pub fn group_id_of(&self, name: &str) -> Option<GroupId> {
        let key = self.option(name)?.key();
        self.membership.get(key).copied()
    }

    /// Required options and groups in registration order.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Keys of individually required options, in registration order.
    pub fn required_options(&self) -> Vec<&str> {
        self.requirements
            .iter()
            .filter_map(|req| match req {
                Requirement::Option(key) => Some(key.as_str()),
                Requirement::Group(_) => None,
            })
            .collect()
    }

    /// Long names matching `token` for abbreviation.
    ///
    /// An exact long name short-circuits to itself; otherwise every long name
    /// that starts with `token` is returned in registration order.
    pub fn matching_options(&self, token: &str) -> Vec<&str> {
        let token = strip_dashes(token);
        if let Some((long, _)) = self.long_names.get_key_value(token) {
            return vec![long.as_str()];
        }
        if token.is_empty() {
            return Vec::new();
        }
        self.long_names
            .keys()
            .filter(|long| long.starts_with(token))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn allocate_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    fn detach(&mut self, id: GroupId, key: &str) {
        let emptied = match self.groups.get_mut(&id) {
            Some(group) => {
                group.remove(key);
                group.is_empty()
            }
            None => false,
        };
        debug!(key = %key, group = ?id, "Moved option out of its previous group");
        if emptied {
            self.groups.shift_remove(&id);
            self.requirements
                .retain(|req| !matches!(req, Requirement::Group(g) if *g == id));
        }
    }
}

fn arg_builder(has_arg: bool) -> crate::option::OptionBuilder {
    let builder = CliOption::builder();
    if has_arg { builder.has_arg() } else { builder }
}

impl fmt::Display for OptionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ Options: [ short {")?;
        for (idx, (key, option)) in self.options.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={option}")?;
        }
        f.write_str("} ] [ long {")?;
        for (idx, (long, key)) in self.long_names.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match self.options.get(key) {
                Some(option) => write!(f, "{long}={option}")?,
                None => write!(f, "{long}")?,
            }
        }
        f.write_str("} ] ]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn short(c: char) -> CliOption {
        CliOption::flag(Some(c), None).unwrap()
    }

    fn group_of(options: Vec<CliOption>) -> OptionGroup {
        options
            .into_iter()
            .fold(OptionGroup::new(), OptionGroup::with_option)
    }

    #[test]
    fn test_simple_and_long_registration() {
        let mut catalog = OptionCatalog::new();
        catalog.add_flag('a', false, "toggle -a").unwrap();
        catalog.add_flag('b', true, "toggle -b").unwrap();
        catalog.add_long_flag('c', "--c", false, "toggle -c").unwrap();
        assert!(catalog.has_option("a"));
        assert!(catalog.has_option("b"));
        assert!(catalog.has_option("c"));
        assert!(catalog.has_long_option("--c"));
        assert!(catalog.has_short_option("-a"));
        assert!(!catalog.has_option("z"));
    }

    #[test]
    fn test_duplicate_long_last_one_wins() {
        let mut catalog = OptionCatalog::new();
        catalog.add_long_flag('a', "--a", false, "toggle -a").unwrap();
        catalog.add_long_flag('a', "--a", false, "toggle -a*").unwrap();
        assert_eq!(catalog.option("a").unwrap().description(), Some("toggle -a*"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_duplicate_simple_last_one_wins() {
        let mut catalog = OptionCatalog::new();
        catalog.add_flag('a', false, "toggle -a").unwrap();
        catalog.add_flag('a', true, "toggle -a*").unwrap();
        let option = catalog.option("a").unwrap();
        assert_eq!(option.description(), Some("toggle -a*"));
        assert!(option.arity().takes_values());
    }

    #[test]
    fn test_required_list_keeps_registration_order() {
        let mut catalog = OptionCatalog::new();
        catalog.add_required_option('f', "file", true, "").unwrap();
        catalog.add_required_option('x', "extract", false, "").unwrap();
        assert_eq!(catalog.required_options(), vec!["f", "x"]);

        catalog.add_required_option('f', "file", true, "again").unwrap();
        assert_eq!(catalog.required_options(), vec!["x", "f"]);

        catalog.add_flag('x', false, "no longer required").unwrap();
        assert_eq!(catalog.required_options(), vec!["f"]);
    }

    #[test]
    fn test_required_option_in_group_is_not_required() {
        let option = CliOption::builder()
            .short('a')
            .long("along")
            .description("Option A")
            .required(true)
            .build()
            .unwrap();
        let mut catalog = OptionCatalog::new();
        catalog.add_option(option.clone());
        assert!(catalog.required_options().contains(&"a"));

        catalog.add_option_group(group_of(vec![option.clone()]));
        assert!(!catalog.option("a").unwrap().is_required());
        assert!(!catalog.required_options().contains(&"a"));

        catalog.add_option(option);
        assert!(catalog.required_options().is_empty());
        assert!(!catalog.option_group("a").unwrap().options().next().unwrap().is_required());
    }

    #[test]
    fn test_option_moves_to_new_group() {
        let mut catalog = OptionCatalog::new();
        catalog.add_option_group(group_of(vec![short('a'), short('b')]).with_required(true));
        catalog.add_option_group(group_of(vec![short('b'), short('c')]));

        let first = catalog.option_group("a").unwrap();
        assert_eq!(first.names(), vec!["a"]);
        assert_eq!(catalog.option_group("b").unwrap().names(), vec!["b", "c"]);

        catalog.add_option_group(group_of(vec![short('a')]));
        assert_eq!(catalog.option_groups().count(), 2);
        assert!(catalog.requirements().is_empty());
    }

    #[test]
    fn test_option_groups_are_listed() {
        let mut catalog = OptionCatalog::new();
        catalog.add_option_group(group_of(vec![short('a'), short('b')]));
        catalog.add_option_group(group_of(vec![short('x'), short('y')]));
        assert_eq!(catalog.option_groups().count(), 2);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_matching_options() {
        let mut catalog = OptionCatalog::new();
        catalog.add_option(CliOption::flag(None, Some("version")).unwrap());
        catalog.add_option(CliOption::flag(None, Some("verbose")).unwrap());
        assert!(catalog.matching_options("foo").is_empty());
        assert_eq!(catalog.matching_options("version").len(), 1);
        assert_eq!(catalog.matching_options("ver").len(), 2);
        assert_eq!(catalog.matching_options("--verb"), vec!["verbose"]);
        assert!(catalog.matching_options("").is_empty());
    }

    #[test]
    fn test_help_options_cover_everything() {
        let long_only1 = CliOption::flag(None, Some("long-only1")).unwrap();
        let long_only2 = CliOption::flag(None, Some("long-only2")).unwrap();
        let short_only1 = short('1');
        let short_only2 = short('2');
        let both_a = CliOption::flag(Some('a'), Some("bothA")).unwrap();
        let both_b = CliOption::flag(Some('b'), Some("bothB")).unwrap();
        let all = vec![long_only1, long_only2, short_only1, short_only2, both_a, both_b];

        let mut catalog = OptionCatalog::new();
        for option in &all {
            catalog.add_option(option.clone());
        }

        let help: Vec<CliOption> = catalog.help_options().into_iter().cloned().collect();
        assert_eq!(help, all);
    }

    #[test]
    fn test_add_options_copies_groups_and_order() {
        let mut options = OptionCatalog::new();
        options.add_option_group(group_of(vec![short('a'), short('b')]));
        options.add_option(short('X'));
        options.add_option(short('y'));

        let mut under_test = OptionCatalog::new();
        under_test.add_options(&options).unwrap();

        assert_eq!(
            options.option_groups().collect::<Vec<_>>(),
            under_test.option_groups().collect::<Vec<_>>()
        );
        assert_eq!(options.help_options(), under_test.help_options());
    }

    #[test]
    fn test_add_non_conflicting_options() {
        let mut options1 = OptionCatalog::new();
        options1.add_option_group(group_of(vec![short('a'), short('b')]));
        options1.add_option(short('x'));
        options1.add_option(short('y'));
        options1.add_option(short('e'));
        options1.add_option(short('f'));

        let mut options2 = OptionCatalog::new();
        let typed = |c| {
            CliOption::builder()
                .short(c)
                .value_type(ValueType::Integer)
                .build()
                .unwrap()
        };
        options2.add_option_group(group_of(vec![typed('c'), typed('d')]).with_required(true));

        let mut under_test = OptionCatalog::new();
        under_test.add_options(&options1).unwrap();
        under_test.add_options(&options2).unwrap();

        assert_eq!(under_test.len(), 8);
        assert_eq!(under_test.option_groups().count(), 2);
        assert_eq!(under_test.requirements().len(), 1);
        assert_eq!(
            under_test.option_group("c").unwrap(),
            options2.option_group("d").unwrap()
        );
    }

    #[test]
    fn test_add_conflicting_options_is_atomic() {
        let mut options1 = OptionCatalog::new();
        options1.add_option_group(group_of(vec![short('a'), short('b')]));
        options1.add_option(short('x'));
        options1.add_option(short('y'));

        let typed = |c| {
            CliOption::builder()
                .short(c)
                .value_type(ValueType::Integer)
                .build()
                .unwrap()
        };
        let mut options2 = OptionCatalog::new();
        options2.add_option(short('c'));
        options2.add_option_group(group_of(vec![typed('x'), typed('b')]));

        let before = options1.help_options().into_iter().cloned().collect::<Vec<_>>();
        let err = options1.add_options(&options2).unwrap_err();
        assert_eq!(err, CatalogError::ConflictingRegistration("x".to_string()));
        assert_eq!(err.to_string(), "Duplicate key: x");
        assert!(!options1.has_option("c"));
        assert_eq!(
            options1.help_options().into_iter().cloned().collect::<Vec<_>>(),
            before
        );
    }

    #[test]
    fn test_add_options_rejects_shared_long_name() {
        let mut catalog = OptionCatalog::new();
        catalog.add_long_flag('f', "file", true, "input").unwrap();
        let mut other = OptionCatalog::new();
        other.add_flag('q', false, "quiet").unwrap();
        other.add_long_flag('g', "file", true, "other input").unwrap();

        let err = catalog.add_options(&other).unwrap_err();
        assert_eq!(err, CatalogError::ConflictingRegistration("file".to_string()));
        assert!(!catalog.has_option("q"));
        assert!(!catalog.has_option("g"));
        assert_eq!(catalog.option("file").map(CliOption::key), Some("f"));
        assert_eq!(catalog.option("f").and_then(CliOption::long), Some("file"));
    }

    #[test]
    fn test_merge_with_own_snapshot_fails() {
        let mut options = OptionCatalog::new();
        options.add_option_group(group_of(vec![short('a'), short('b')]));
        options.add_option(short('X'));
        let snapshot = options.clone();
        assert!(options.add_options(&snapshot).is_err());
    }

    #[test]
    fn test_display_mentions_every_option() {
        let mut catalog = OptionCatalog::new();
        catalog.add_long_flag('f', "foo", true, "Foo").unwrap();
        catalog.add_long_flag('b', "bar", false, "Bar").unwrap();
        let text = catalog.to_string().to_lowercase();
        assert!(text.starts_with("[ options: [ short {"));
        assert!(text.contains("foo"));
        assert!(text.contains("bar"));
    }

    #[test]
    fn test_re_registration_drops_stale_long_name() {
        let mut catalog = OptionCatalog::new();
        catalog.add_long_flag('o', "output", true, "").unwrap();
        catalog.add_long_flag('o', "out", true, "").unwrap();
        assert!(!catalog.has_long_option("output"));
        assert_eq!(catalog.long_option("out").unwrap().key(), "o");
    }
}
