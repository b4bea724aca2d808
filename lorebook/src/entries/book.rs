//! Books - named, ordered collections of entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{Entry, EntryId};
use crate::error::{LoreError, Result};

/// A named collection of entries (a "lorebook").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Book {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "entries_list_or_map")]
    pub entries: Vec<Entry>,
}

impl Book {
    /// Create an empty book.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry to this book.
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Get an entry by ID.
    pub fn get_entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Parse a book from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a book from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a book from disk. `.toml` files are read as TOML, everything else
    /// as JSON. A book without a name takes the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let mut book = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text)?,
            _ => Self::from_json_str(&text)?,
        };

        if book.name.is_empty() {
            book.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
        }

        Ok(book)
    }

    /// Check that entry IDs are unique within the book.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.entries {
            if !seen.insert(&entry.id) {
                return Err(LoreError::Config {
                    message: format!("duplicate entry id '{}' in book '{}'", entry.id, self.name),
                });
            }
        }
        Ok(())
    }
}

/// Exported books frequently store entries as an object keyed by uid; accept
/// that shape as well as a plain list. Map entries keep their key order.
fn entries_list_or_map<'de, D>(deserializer: D) -> std::result::Result<Vec<Entry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawEntries {
        List(Vec<Entry>),
        Map(BTreeMap<String, Entry>),
    }

    Ok(match RawEntries::deserialize(deserializer)? {
        RawEntries::List(entries) => entries,
        RawEntries::Map(map) => {
            let mut entries: Vec<(String, Entry)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            });
            entries
                .into_iter()
                .map(|(key, mut entry)| {
                    if entry.id.as_str().is_empty() {
                        entry.id = EntryId(key);
                    }
                    entry
                })
                .collect()
        }
    })
}
