//! Token budget allocation.
//!
//! Candidates are admitted in priority order while their running token total
//! stays under the ceiling. The first entry that does not fit ends normal
//! admission; after that only entries counting towards the minimum
//! activation floor are admitted, even past the ceiling.
//!
//! Token counts are awaited one at a time, in priority order, so the same
//! counter responses always produce the same admissions.

use lorebook::WorldInfoSettings;
use tracing::debug;

use crate::activation::Candidate;
use crate::error::TokenizerError;
use crate::tokenizer::TokenCounter;

/// Result of budget allocation.
#[derive(Debug, Clone)]
pub struct Allocation<'a> {
    /// Admitted candidates, in priority order.
    pub admitted: Vec<Candidate<'a>>,
    /// Candidates excluded for budget reasons, in priority order.
    pub excluded: Vec<Candidate<'a>>,
    /// Tokens used by admitted content.
    pub tokens_used: usize,
    /// The computed ceiling.
    pub ceiling: usize,
}

impl Allocation<'_> {
    /// Whether any candidate was dropped for budget.
    pub fn overflowed(&self) -> bool {
        !self.excluded.is_empty()
    }
}

/// Admits candidates within the token budget.
pub struct BudgetAllocator<'a> {
    settings: &'a WorldInfoSettings,
    max_context: usize,
    tokenizer: &'a dyn TokenCounter,
}

impl<'a> BudgetAllocator<'a> {
    pub fn new(
        settings: &'a WorldInfoSettings,
        max_context: usize,
        tokenizer: &'a dyn TokenCounter,
    ) -> Self {
        Self {
            settings,
            max_context,
            tokenizer,
        }
    }

    /// `min(round(max_context * budget / 100), budget_cap)`; a zero cap is no cap.
    /// Budgets above 100 percent are clamped to the full context.
    pub fn ceiling(&self) -> usize {
        let percent = self.settings.budget.min(100);
        let share = (self.max_context as f64 * f64::from(percent) / 100.0).round() as usize;
        match self.settings.budget_cap {
            0 => share,
            cap => share.min(cap),
        }
    }

    /// Whether a candidate counts towards the minimum activation floor.
    fn counts_towards_floor(&self, candidate: &Candidate<'_>) -> bool {
        match self.settings.min_activations_depth_max {
            0 => true,
            limit => {
                candidate.entry.constant || candidate.chat_depth.is_some_and(|depth| depth <= limit)
            }
        }
    }

    /// Order candidates by priority and admit them within the budget.
    pub async fn allocate<'c>(
        &self,
        mut candidates: Vec<Candidate<'c>>,
    ) -> Result<Allocation<'c>, TokenizerError> {
        candidates.sort_by_key(Candidate::priority);

        let ceiling = self.ceiling();
        let floor = self.settings.min_activations;

        let mut admitted = Vec::new();
        let mut excluded = Vec::new();
        let mut tokens_used: usize = 0;
        let mut floor_count = 0;
        let mut saturated = false;

        for candidate in candidates {
            let towards_floor = self.counts_towards_floor(&candidate);
            let floor_open = towards_floor && floor_count < floor;

            if saturated && !floor_open {
                excluded.push(candidate);
                continue;
            }

            let tokens = self.tokenizer.count_tokens(&candidate.entry.content).await?;
            let fits = !saturated && tokens_used.saturating_add(tokens) <= ceiling;

            if !fits && !saturated {
                saturated = true;
                debug!(
                    entry = %candidate.entry.id,
                    tokens,
                    tokens_used,
                    ceiling,
                    "Budget ceiling reached"
                );
            }

            if fits || floor_open {
                tokens_used = tokens_used.saturating_add(tokens);
                if towards_floor {
                    floor_count += 1;
                }
                admitted.push(candidate);
            } else {
                excluded.push(candidate);
            }
        }

        Ok(Allocation {
            admitted,
            excluded,
            tokens_used,
            ceiling,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::HeuristicTokenCounter;
    use lorebook::Entry;

    fn candidates(entries: &[Entry]) -> Vec<Candidate<'_>> {
        entries
            .iter()
            .enumerate()
            .map(|(discovery, entry)| Candidate {
                book: "test",
                entry,
                discovery,
                pass: 1,
                chat_depth: Some(discovery + 1),
            })
            .collect()
    }

    fn ids(candidates: &[Candidate<'_>]) -> Vec<String> {
        candidates.iter().map(|c| c.entry.id.to_string()).collect()
    }

    /// Each entry's content is 40 chars -> 10 tokens.
    fn entries() -> Vec<Entry> {
        [("c", 3), ("a", 1), ("b", 2)]
            .into_iter()
            .map(|(id, order)| Entry::new(id, "x".repeat(40)).with_key("k").with_order(order))
            .collect()
    }

    #[test]
    fn test_ceiling() {
        let mut settings = WorldInfoSettings {
            budget: 25,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;

        assert_eq!(BudgetAllocator::new(&settings, 1000, &counter).ceiling(), 250);

        settings.budget_cap = 100;
        assert_eq!(BudgetAllocator::new(&settings, 1000, &counter).ceiling(), 100);

        settings.budget = 0;
        assert_eq!(BudgetAllocator::new(&settings, 1000, &counter).ceiling(), 0);
    }

    #[test]
    fn test_ceiling_never_exceeds_context() {
        let settings = WorldInfoSettings {
            budget: 200,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;

        assert_eq!(BudgetAllocator::new(&settings, 1000, &counter).ceiling(), 1000);
    }

    struct HugeCounter;

    #[async_trait::async_trait]
    impl TokenCounter for HugeCounter {
        async fn count_tokens(&self, _text: &str) -> Result<usize, TokenizerError> {
            Ok(usize::MAX)
        }
    }

    #[tokio::test]
    async fn test_huge_token_counts_saturate() {
        let settings = WorldInfoSettings {
            budget: 100,
            min_activations: 2,
            ..WorldInfoSettings::default()
        };
        let entries = entries();

        let allocation = BudgetAllocator::new(&settings, 1000, &HugeCounter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["a", "b"]);
        assert_eq!(ids(&allocation.excluded), vec!["c"]);
        assert_eq!(allocation.tokens_used, usize::MAX);
    }

    #[tokio::test]
    async fn test_admits_in_priority_order_within_ceiling() {
        let settings = WorldInfoSettings {
            budget: 100,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;
        let entries = entries();

        let allocation = BudgetAllocator::new(&settings, 25, &counter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["a", "b"]);
        assert_eq!(ids(&allocation.excluded), vec!["c"]);
        assert_eq!(allocation.tokens_used, 20);
        assert!(allocation.overflowed());
    }

    #[tokio::test]
    async fn test_everything_fits() {
        let settings = WorldInfoSettings {
            budget: 100,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;
        let entries = entries();

        let allocation = BudgetAllocator::new(&settings, 30, &counter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["a", "b", "c"]);
        assert!(!allocation.overflowed());
    }

    #[tokio::test]
    async fn test_min_activations_floor_exceeds_ceiling() {
        let settings = WorldInfoSettings {
            budget: 0,
            min_activations: 2,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;
        let entries = entries();

        let allocation = BudgetAllocator::new(&settings, 1000, &counter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["a", "b"]);
        assert_eq!(ids(&allocation.excluded), vec!["c"]);
        assert_eq!(allocation.tokens_used, 20);
    }

    #[tokio::test]
    async fn test_floor_scoped_by_chat_depth() {
        // Discovery 0 ("c") matched at depth 1, "a" at depth 2, "b" at depth 3.
        let settings = WorldInfoSettings {
            budget: 0,
            min_activations: 2,
            min_activations_depth_max: 1,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;
        let entries = entries();

        let allocation = BudgetAllocator::new(&settings, 1000, &counter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["c"]);
    }

    #[tokio::test]
    async fn test_no_admission_after_saturation() {
        // "a" fits, "b" does not, "c" would fit on its own but admission has stopped.
        let settings = WorldInfoSettings {
            budget: 100,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;
        let entries = vec![
            Entry::new("a", "x".repeat(40)).with_key("k").with_order(1),
            Entry::new("b", "x".repeat(400)).with_key("k").with_order(2),
            Entry::new("c", "x".repeat(4)).with_key("k").with_order(3),
        ];

        let allocation = BudgetAllocator::new(&settings, 20, &counter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["a"]);
        assert_eq!(ids(&allocation.excluded), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_order_ties_keep_discovery_order() {
        let settings = WorldInfoSettings {
            budget: 100,
            ..WorldInfoSettings::default()
        };
        let counter = HeuristicTokenCounter;
        let entries = vec![
            Entry::new("first", "x").with_key("k").with_order(5),
            Entry::new("second", "x").with_key("k").with_order(5),
            Entry::new("top", "x").with_key("k").with_order(0),
        ];

        let allocation = BudgetAllocator::new(&settings, 100, &counter)
            .allocate(candidates(&entries))
            .await
            .unwrap();

        assert_eq!(ids(&allocation.admitted), vec!["top", "first", "second"]);
    }
}
