//! Non-lexical preconditions on activation.

use lorebook::{Character, Entry, Persona};
use std::collections::HashSet;

/// Why an eligibility check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The chat is shorter than the entry's delay.
    Delayed { required: usize, chat_len: usize },
    /// No active participant satisfies the character filter.
    CharacterFilter,
    /// An active participant matches an exclusion filter.
    CharacterExcluded,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delayed { required, chat_len } => {
                write!(f, "delayed until {} messages (chat has {})", required, chat_len)
            }
            Self::CharacterFilter => write!(f, "no participant matches the character filter"),
            Self::CharacterExcluded => write!(f, "a participant is excluded by the character filter"),
        }
    }
}

/// Eligibility rules for one call: chat length and active participants.
///
/// Participant names are the active characters' names plus the persona's
/// name; tags come from the active characters.
#[derive(Debug, Clone)]
pub struct EligibilityFilter<'a> {
    chat_len: usize,
    names: HashSet<&'a str>,
    tags: HashSet<&'a str>,
}

impl<'a> EligibilityFilter<'a> {
    pub fn new(chat_len: usize, characters: &'a [Character], persona: Option<&'a Persona>) -> Self {
        let mut names: HashSet<&str> = characters.iter().map(|c| c.name.as_str()).collect();
        if let Some(persona) = persona.filter(|p| !p.name.is_empty()) {
            names.insert(persona.name.as_str());
        }

        let tags = characters
            .iter()
            .flat_map(|c| c.tags.iter().map(String::as_str))
            .collect();

        Self {
            chat_len,
            names,
            tags,
        }
    }

    /// Check an entry against delay and character filters.
    ///
    /// When both name and tag filters are present, either one matching is
    /// enough.
    pub fn check(&self, entry: &Entry) -> Result<(), Rejection> {
        if let Some(required) = entry.delay {
            if self.chat_len < required {
                return Err(Rejection::Delayed {
                    required,
                    chat_len: self.chat_len,
                });
            }
        }

        let by_name = (!entry.character_filter_names.is_empty()).then(|| {
            entry
                .character_filter_names
                .iter()
                .any(|n| self.names.contains(n.as_str()))
        });
        let by_tag = (!entry.character_filter_tags.is_empty()).then(|| {
            entry
                .character_filter_tags
                .iter()
                .any(|t| self.tags.contains(t.as_str()))
        });

        let matched = match (by_name, by_tag) {
            (None, None) => return Ok(()),
            (Some(a), None) | (None, Some(a)) => a,
            (Some(a), Some(b)) => a || b,
        };

        match (entry.character_filter_exclude, matched) {
            (false, false) => Err(Rejection::CharacterFilter),
            (true, true) => Err(Rejection::CharacterExcluded),
            _ => Ok(()),
        }
    }
}
