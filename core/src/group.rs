//! Mutually exclusive option groups.
//!
//! An [`OptionGroup`] is plain data: its members and whether one of them
//! must be supplied. Which member was chosen during a parse is tracked by a
//! [`GroupSelection`] owned by that parse, so a catalog holding groups can be
//! shared between parses and threads.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ParseError;
use crate::option::CliOption;

/// Catalog-assigned identity of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub(crate) u32);

/// A set of options of which at most one may appear per parse.
///
/// Members keep insertion order. Adding an option whose key is already a
/// member replaces it in place.
///
/// # Examples
///
/// ```
/// use optcat_core::{CliOption, OptionGroup};
///
/// let group = OptionGroup::new()
///     .with_option(CliOption::flag(Some('a'), None).unwrap())
///     .with_option(CliOption::flag(Some('b'), Some("bravo")).unwrap());
///
/// assert_eq!(group.names(), vec!["a", "b"]);
/// assert_eq!(group.to_string(), "[-a, -b]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionGroup {
    options: IndexMap<String, CliOption>,
    required: bool,
}

impl OptionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member.
    pub fn with_option(mut self, option: CliOption) -> Self {
        self.add_option(option);
        self
    }

    /// Adds a member in place.
    pub fn add_option(&mut self, option: CliOption) -> &mut Self {
        self.options.insert(option.key().to_string(), option);
        self
    }

    /// Marks the group as required (one member must be supplied).
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn options(&self) -> impl Iterator<Item = &CliOption> {
        self.options.values()
    }

    /// Member keys in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.options.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut CliOption> {
        self.options.get_mut(key)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<CliOption> {
        self.options.shift_remove(key)
    }
}

impl fmt::Display for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, option) in self.options.values().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match (option.short(), option.long()) {
                (Some(short), _) => write!(f, "-{short}")?,
                (None, Some(long)) => write!(f, "--{long}")?,
                (None, None) => f.write_str(option.key())?,
            }
            if let Some(description) = option.description() {
                write!(f, " {description}")?;
            }
        }
        f.write_str("]")
    }
}

/// Per-parse record of which member each group selected.
///
/// # Examples
///
/// ```
/// use optcat_core::{CliOption, GroupSelection, OptionCatalog, OptionGroup};
///
/// let mut catalog = OptionCatalog::new();
/// catalog.add_option_group(
///     OptionGroup::new()
///         .with_option(CliOption::flag(Some('a'), None).unwrap())
///         .with_option(CliOption::flag(Some('b'), None).unwrap()),
/// );
/// let id = catalog.group_id_of("a").unwrap();
/// let group = catalog.group(id).unwrap();
///
/// let mut selection = GroupSelection::new();
/// selection.select(id, group, "a").unwrap();
/// selection.select(id, group, "a").unwrap();
/// assert!(selection.select(id, group, "b").is_err());
/// assert_eq!(selection.selected(id), Some("a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupSelection {
    selected: HashMap<GroupId, String>,
}

impl GroupSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as the selection of group `id`.
    ///
    /// # Errors
    ///
    /// [`ParseError::GroupConflict`] when a different member was already
    /// selected.
    pub fn select(&mut self, id: GroupId, group: &OptionGroup, key: &str) -> Result<(), ParseError> {
        match self.selected.get(&id) {
            Some(current) if current != key => Err(ParseError::GroupConflict {
                group: group.to_string(),
                selected: current.clone(),
                option: key.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.selected.insert(id, key.to_string());
                Ok(())
            }
        }
    }

    pub fn selected(&self, id: GroupId) -> Option<&str> {
        self.selected.get(&id).map(String::as_str)
    }

    pub fn is_selected(&self, id: GroupId) -> bool {
        self.selected.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
