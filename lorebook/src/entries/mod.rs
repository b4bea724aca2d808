//! Entry and book definitions.

mod book;
mod entry;

pub use book::*;
pub use entry::*;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of an entry, unique within its book.
///
/// Books exported by other tools often number their entries, so both JSON
/// strings and integers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Create an entry ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntryId(s),
            RawId::Number(n) => EntryId(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_from_number_or_string() {
        let from_text: EntryId = serde_json::from_str("\"castle\"").unwrap();
        let from_number: EntryId = serde_json::from_str("42").unwrap();

        assert_eq!(from_text, EntryId::new("castle"));
        assert_eq!(from_number, EntryId::from(42u64));
    }
}
