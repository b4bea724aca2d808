//! The World Info processor and its recursive activation loop.
//!
//! Activation runs as an explicit loop over passes:
//! 1. **Match**: every not-yet-activated entry is tested against the buffer
//! 2. **Filter**: matches failing eligibility are left for later passes
//! 3. **Activate**: survivors are recorded once and become candidates
//! 4. **Extend**: their content is appended to the buffer for the next pass
//!
//! The loop stops when a pass activates nothing or the pass limit is reached.
//! Each pass strictly shrinks the pool of unactivated entries, so the loop
//! always terminates.

mod state;

pub use state::*;

use lorebook::{Book, Character, ChatMessage, Persona, WorldInfoSettings};
use tracing::{debug, info, warn};

use crate::budget::BudgetAllocator;
use crate::error::Result;
use crate::filter::EligibilityFilter;
use crate::generation::GenerationId;
use crate::output::{OutputAssembler, ProcessedWorldInfo};
use crate::resolve::resolve_groups;
use crate::scan::{compile_books, CompiledEntry, ScanBuffer};
use crate::tokenizer::TokenCounter;

/// Snapshot of everything one generation request supplies.
#[derive(Clone, Copy)]
pub struct ProcessInput<'a> {
    pub chat: &'a [ChatMessage],
    pub characters: &'a [Character],
    pub persona: Option<&'a Persona>,
    pub books: &'a [Book],
    pub settings: &'a WorldInfoSettings,
    /// Token ceiling of the whole downstream prompt.
    pub max_context: usize,
    pub tokenizer: &'a dyn TokenCounter,
    pub generation_id: GenerationId,
}

/// Processes one generation request. Build a new one per request.
pub struct WorldInfoProcessor<'a> {
    input: ProcessInput<'a>,
}

impl<'a> WorldInfoProcessor<'a> {
    pub fn new(input: ProcessInput<'a>) -> Self {
        Self { input }
    }

    /// Run activation, group resolution, budgeting and assembly.
    ///
    /// Fails only if the token counter fails.
    #[tracing::instrument(skip_all, fields(generation_id = %self.input.generation_id))]
    pub async fn process(self) -> Result<ProcessedWorldInfo> {
        let input = self.input;
        let settings = input.settings;

        let candidates = self.activate();
        let activated = candidates.len();

        let candidates = resolve_groups(candidates);
        let suppressed = activated - candidates.len();

        let allocator = BudgetAllocator::new(settings, input.max_context, input.tokenizer);
        let allocation = allocator.allocate(candidates).await?;

        if allocation.overflowed() {
            warn!(
                excluded = allocation.excluded.len(),
                ceiling = allocation.ceiling,
                "World info budget overflowed"
            );
        }
        let overflowed = settings.overflow_alert.then(|| allocation.overflowed());

        info!(
            activated,
            suppressed,
            admitted = allocation.admitted.len(),
            tokens = allocation.tokens_used,
            ceiling = allocation.ceiling,
            "World info processed"
        );

        Ok(OutputAssembler::assemble(
            allocation.admitted,
            input.generation_id,
            overflowed,
        ))
    }

    /// Run the recursive activation loop and return candidates in discovery
    /// order.
    pub fn activate(&self) -> Vec<Candidate<'a>> {
        let input = self.input;
        let settings = input.settings;

        let compiled = compile_books(input.books, settings);
        let filter = EligibilityFilter::new(input.chat.len(), input.characters, input.persona);
        let mut buffer = ScanBuffer::new(input.chat, settings);
        let mut state = ActivationState::new();
        let track_depth = settings.min_activations > 0 && settings.min_activations_depth_max > 0;

        for pass in 1..=settings.max_passes() {
            let newly = Self::scan_pass(&compiled, &buffer, &filter, &state, pass);
            if newly.is_empty() {
                debug!(pass, "No new activations");
                break;
            }

            for &i in &newly {
                let entry = &compiled[i];
                let chat_depth = if track_depth && pass == 1 && !entry.entry.constant {
                    buffer.chat_depth_of_match(&entry.matcher, entry.entry.scan_depth)
                } else {
                    None
                };
                state.activate(i, pass, chat_depth);
            }

            debug!(pass, activated = newly.len(), total = state.active_count(), "Activation pass");

            buffer.extend(
                state
                    .activated_in_pass(pass)
                    .map(|i| compiled[i].entry)
                    .filter(|e| !e.prevent_recursion)
                    .map(|e| e.content.as_str()),
            );
        }

        state.into_candidates(&compiled)
    }

    /// Indices of entries that activate on this pass.
    fn scan_pass(
        compiled: &[CompiledEntry<'_>],
        buffer: &ScanBuffer,
        filter: &EligibilityFilter<'_>,
        state: &ActivationState,
        pass: usize,
    ) -> Vec<usize> {
        compiled
            .iter()
            .enumerate()
            .filter(|(i, _)| !state.is_activated(*i))
            .filter(|(_, c)| match pass {
                1 => !c.entry.delay_until_recursion,
                _ => !c.entry.exclude_recursion,
            })
            .filter(|(_, c)| c.entry.constant || buffer.matches(&c.matcher, c.entry.scan_depth))
            .filter(|(_, c)| match filter.check(c.entry) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(book = c.book, entry = %c.entry.id, %reason, "Entry not eligible");
                    false
                }
            })
            .map(|(i, _)| i)
            .collect()
    }
}
