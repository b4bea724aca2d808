//! Activation state for one `process()` call.

use lorebook::Entry;
use std::collections::HashSet;

use crate::scan::CompiledEntry;

/// An activated entry carried through resolution, budgeting and assembly.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub book: &'a str,
    pub entry: &'a Entry,
    /// Position in activation order, used to break `order` ties.
    pub discovery: usize,
    /// Pass on which the entry activated (1 = chat buffer).
    pub pass: usize,
    /// Depth of the newest chat message that triggered the entry, when known.
    pub chat_depth: Option<usize>,
}

impl Candidate<'_> {
    /// Sort key: ascending `order`, then discovery order.
    pub fn priority(&self) -> (i64, usize) {
        (self.entry.order, self.discovery)
    }
}

/// Tracks which compiled entries have activated, and in what order.
#[derive(Debug, Clone, Default)]
pub struct ActivationState {
    activated: HashSet<usize>,
    order: Vec<Activation>,
}

#[derive(Debug, Clone, Copy)]
struct Activation {
    index: usize,
    pass: usize,
    chat_depth: Option<usize>,
}

impl ActivationState {
    /// Create a new empty activation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the compiled entry at `index` has activated.
    pub fn is_activated(&self, index: usize) -> bool {
        self.activated.contains(&index)
    }

    /// Record an activation. Returns `false` if the entry was already active.
    pub fn activate(&mut self, index: usize, pass: usize, chat_depth: Option<usize>) -> bool {
        if !self.activated.insert(index) {
            return false;
        }
        self.order.push(Activation {
            index,
            pass,
            chat_depth,
        });
        true
    }

    /// Number of activated entries.
    pub fn active_count(&self) -> usize {
        self.order.len()
    }

    /// Entries activated on a given pass, in activation order.
    pub fn activated_in_pass(&self, pass: usize) -> impl Iterator<Item = usize> + '_ {
        self.order
            .iter()
            .filter(move |a| a.pass == pass)
            .map(|a| a.index)
    }

    /// Convert into the candidate list, in discovery order.
    pub fn into_candidates<'a>(self, compiled: &[CompiledEntry<'a>]) -> Vec<Candidate<'a>> {
        self.order
            .into_iter()
            .enumerate()
            .map(|(discovery, a)| Candidate {
                book: compiled[a.index].book,
                entry: compiled[a.index].entry,
                discovery,
                pass: a.pass,
                chat_depth: a.chat_depth,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_is_at_most_once() {
        let mut state = ActivationState::new();

        assert!(state.activate(3, 1, Some(1)));
        assert!(!state.activate(3, 2, None));
        assert!(state.is_activated(3));
        assert!(!state.is_activated(0));
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_activated_in_pass() {
        let mut state = ActivationState::new();
        state.activate(2, 1, None);
        state.activate(0, 1, None);
        state.activate(1, 2, None);

        assert_eq!(state.activated_in_pass(1).collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(state.activated_in_pass(2).collect::<Vec<_>>(), vec![1]);
    }
}
