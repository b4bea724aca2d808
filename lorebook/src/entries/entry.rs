//! A single trigger-keyed content snippet.

use serde::{Deserialize, Serialize};

use super::EntryId;

/// Where an activated entry's content is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Before the character definition block.
    #[default]
    BeforeChar,
    /// After the character definition block.
    AfterChar,
    /// Inside the chat history, `depth` messages from the most recent one.
    AtDepth,
    /// Into a named outlet owned by the prompt assembler.
    Outlet,
}

/// The resolved output slot of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot<'a> {
    BeforeChar,
    AfterChar,
    AtDepth(u32),
    Outlet(&'a str),
}

/// How secondary keys combine with a primary key match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectiveLogic {
    /// At least one secondary key must match.
    #[default]
    AndAny,
    /// Every secondary key must match.
    AndAll,
    /// No secondary key may match.
    NotAny,
    /// At least one secondary key must be absent.
    NotAll,
}

/// An entry: the unit of activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Entry {
    pub id: EntryId,

    /// Primary trigger keys (any one activates).
    pub key: Vec<String>,

    /// Secondary keys, consulted only when `selective` is set.
    #[serde(alias = "keysecondary")]
    pub key_secondary: Vec<String>,
    pub selective: bool,
    pub selective_logic: SelectiveLogic,

    /// Text injected when the entry is activated.
    pub content: String,

    /// Ascending priority: lower value wins.
    pub order: i64,

    pub position: Position,

    /// Chat depth, required when `position` is [`Position::AtDepth`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,

    /// Outlet name, required when `position` is [`Position::Outlet`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_whole_words: Option<bool>,

    /// Per-entry override of how many chat messages are scanned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_depth: Option<usize>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub character_filter_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub character_filter_tags: Vec<String>,
    /// Reject, rather than require, participants matching the filters.
    pub character_filter_exclude: bool,

    /// Mutual-exclusion group(s), comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub group_override: bool,

    /// Minimum chat length before the entry may activate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<usize>,

    /// Activates without a key match.
    pub constant: bool,
    pub disable: bool,

    /// Only the chat buffer may activate this entry.
    pub exclude_recursion: bool,
    /// This entry's content never feeds later passes.
    pub prevent_recursion: bool,
    /// Only recursed content may activate this entry.
    pub delay_until_recursion: bool,
}

impl Entry {
    /// Create a new entry with the given id and content.
    pub fn new(id: impl Into<EntryId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Add a primary key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key.push(key.into());
        self
    }

    /// Add secondary keys and enable selective matching.
    pub fn with_secondary_keys(
        mut self,
        logic: SelectiveLogic,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.selective = true;
        self.selective_logic = logic;
        self.key_secondary.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Place the entry at a chat depth.
    pub fn at_depth(mut self, depth: u32) -> Self {
        self.position = Position::AtDepth;
        self.depth = Some(depth);
        self
    }

    /// Route the entry into a named outlet.
    pub fn in_outlet(mut self, name: impl Into<String>) -> Self {
        self.position = Position::Outlet;
        self.outlet_name = Some(name.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>, group_override: bool) -> Self {
        self.group = Some(group.into());
        self.group_override = group_override;
        self
    }

    pub fn with_character_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.character_filter_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_character_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.character_filter_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    pub fn with_whole_words(mut self, whole_words: bool) -> Self {
        self.match_whole_words = Some(whole_words);
        self
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    /// Resolve the output slot, or `None` when the position is missing its
    /// address.
    pub fn slot(&self) -> Option<Slot<'_>> {
        match self.position {
            Position::BeforeChar => Some(Slot::BeforeChar),
            Position::AfterChar => Some(Slot::AfterChar),
            Position::AtDepth => self.depth.map(Slot::AtDepth),
            Position::Outlet => self
                .outlet_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(Slot::Outlet),
        }
    }

    /// Group names this entry belongs to.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.group
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Check whether any primary key is non-empty.
    pub fn has_keys(&self) -> bool {
        self.key.iter().any(|k| !k.trim().is_empty())
    }

    /// An entry that can never produce output.
    pub fn is_malformed(&self) -> bool {
        self.slot().is_none() || self.content.trim().is_empty() || (!self.constant && !self.has_keys())
    }
}
