//! Group override resolution.
//!
//! Within a group that has at least one `groupOverride` member, only the
//! override member(s) with the lowest `order` survive. Groups without an
//! override member are left alone, as are ungrouped entries.

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::activation::Candidate;

/// Remove candidates suppressed by a group override.
pub fn resolve_groups(candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        for group in candidate.entry.groups() {
            groups.entry(group).or_default().push(i);
        }
    }

    let mut suppressed: HashSet<usize> = HashSet::new();
    for (group, members) in &groups {
        let winning_order = members
            .iter()
            .map(|&i| candidates[i].entry)
            .filter(|e| e.group_override)
            .map(|e| e.order)
            .min();

        let Some(winning_order) = winning_order else {
            continue;
        };

        for &i in members {
            let entry = candidates[i].entry;
            if !(entry.group_override && entry.order == winning_order) {
                debug!(group, entry = %entry.id, winning_order, "Suppressed by group override");
                suppressed.insert(i);
            }
        }
    }

    candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !suppressed.contains(i))
        .map(|(_, c)| c)
        .collect()
}
