//! # World Info
//!
//! Decides which lorebook entries are relevant to the current conversation
//! and places their content into prompt slots.
//!
//! ## Pipeline
//!
//! 1. **Scan**: build the text window from the most recent chat messages
//! 2. **Match**: test each entry's keys against the window
//! 3. **Filter**: drop entries failing delay or participant filters
//! 4. **Recurse**: feed activated content back into the window until nothing
//!    new activates or the pass limit is reached
//! 5. **Resolve**: apply group overrides
//! 6. **Budget**: admit entries by priority within the token budget
//! 7. **Assemble**: route admitted content into before/after, depth and
//!    outlet slots
//!
//! Every call to [`WorldInfoProcessor::process`] owns its state; nothing is
//! shared between generations.

pub mod activation;
pub mod budget;
pub mod error;
pub mod filter;
pub mod generation;
pub mod output;
pub mod resolve;
pub mod scan;
pub mod tokenizer;

pub use activation::*;
pub use budget::*;
pub use error::*;
pub use filter::*;
pub use generation::*;
pub use output::*;
pub use resolve::*;
pub use scan::*;
pub use tokenizer::*;
