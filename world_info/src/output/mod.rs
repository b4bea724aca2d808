//! Output slots consumed by the prompt assembler.

use lorebook::{EntryId, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::activation::Candidate;
use crate::generation::GenerationId;

/// Entries placed at one chat-history depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthBucket {
    pub depth: u32,
    pub entries: Vec<String>,
}

/// Reference to an admitted entry, for caller-side itemization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    pub book: String,
    pub id: EntryId,
    pub order: i64,
}

/// The engine's result for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedWorldInfo {
    pub world_info_before: String,
    pub world_info_after: String,
    /// Buckets in ascending depth.
    pub depth_entries: Vec<DepthBucket>,
    pub outlet_entries: BTreeMap<String, Vec<String>>,
    /// Admitted entries keyed by book name.
    pub triggered_entries: BTreeMap<String, Vec<EntryRef>>,
    /// Present when `overflowAlert` is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflowed: Option<bool>,
    pub generation_id: GenerationId,
}

impl ProcessedWorldInfo {
    /// A result with no content.
    pub fn empty(generation_id: GenerationId) -> Self {
        Self {
            world_info_before: String::new(),
            world_info_after: String::new(),
            depth_entries: Vec::new(),
            outlet_entries: BTreeMap::new(),
            triggered_entries: BTreeMap::new(),
            overflowed: None,
            generation_id,
        }
    }

    /// Check whether no entry was placed anywhere.
    pub fn is_empty(&self) -> bool {
        self.triggered_entries.is_empty()
    }

    /// Total number of triggered entries across books.
    pub fn triggered_count(&self) -> usize {
        self.triggered_entries.values().map(Vec::len).sum()
    }

    /// Entries at a given depth.
    pub fn at_depth(&self, depth: u32) -> &[String] {
        self.depth_entries
            .iter()
            .find(|b| b.depth == depth)
            .map(|b| b.entries.as_slice())
            .unwrap_or(&[])
    }

    /// An outlet's content joined with newlines.
    pub fn outlet_text(&self, name: &str) -> Option<String> {
        self.outlet_entries.get(name).map(|entries| entries.join("\n"))
    }
}

/// Routes admitted entries into output slots.
pub struct OutputAssembler;

impl OutputAssembler {
    /// Group admitted entries by slot, each slot ordered by priority.
    pub fn assemble(
        mut admitted: Vec<Candidate<'_>>,
        generation_id: GenerationId,
        overflowed: Option<bool>,
    ) -> ProcessedWorldInfo {
        admitted.sort_by_key(Candidate::priority);

        let mut before: Vec<&str> = Vec::new();
        let mut after: Vec<&str> = Vec::new();
        let mut depths: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        let mut outlets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut triggered: BTreeMap<String, Vec<EntryRef>> = BTreeMap::new();

        for candidate in &admitted {
            let entry = candidate.entry;
            let Some(slot) = entry.slot() else {
                continue;
            };

            match slot {
                Slot::BeforeChar => before.push(&entry.content),
                Slot::AfterChar => after.push(&entry.content),
                Slot::AtDepth(depth) => depths.entry(depth).or_default().push(entry.content.clone()),
                Slot::Outlet(name) => outlets
                    .entry(name.to_string())
                    .or_default()
                    .push(entry.content.clone()),
            }

            triggered
                .entry(candidate.book.to_string())
                .or_default()
                .push(EntryRef {
                    book: candidate.book.to_string(),
                    id: entry.id.clone(),
                    order: entry.order,
                });
        }

        ProcessedWorldInfo {
            world_info_before: before.join("\n"),
            world_info_after: after.join("\n"),
            depth_entries: depths
                .into_iter()
                .map(|(depth, entries)| DepthBucket { depth, entries })
                .collect(),
            outlet_entries: outlets,
            triggered_entries: triggered,
            overflowed,
            generation_id,
        }
    }
}
