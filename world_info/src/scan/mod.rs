//! Scan buffer and key matching.
//!
//! Entries from every book are flattened and their keys compiled once per
//! call; recursion passes reuse the compiled matchers.

mod buffer;
mod matcher;

pub use buffer::*;
pub use matcher::*;

use lorebook::{Book, Entry, WorldInfoSettings};
use tracing::debug;

/// An entry prepared for matching, with its book and input position.
#[derive(Debug, Clone)]
pub struct CompiledEntry<'a> {
    pub book: &'a str,
    pub entry: &'a Entry,
    pub matcher: KeyMatcher,
}

/// Flatten books into compiled entries, preserving input order.
///
/// Malformed and disabled entries are skipped here so they never reach
/// matching.
pub fn compile_books<'a>(books: &'a [Book], settings: &WorldInfoSettings) -> Vec<CompiledEntry<'a>> {
    books
        .iter()
        .flat_map(|book| book.entries.iter().map(move |entry| (book.name.as_str(), entry)))
        .filter_map(|(book, entry)| {
            if entry.disable {
                return None;
            }
            if entry.is_malformed() {
                debug!(book, entry = %entry.id, "Skipping malformed entry");
                return None;
            }

            let matcher = KeyMatcher::for_entry(entry, settings);
            if matcher.is_empty() && !entry.constant {
                debug!(book, entry = %entry.id, "Skipping entry without usable keys");
                return None;
            }

            Some(CompiledEntry { book, entry, matcher })
        })
        .collect()
}
