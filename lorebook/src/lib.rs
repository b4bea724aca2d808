//! # Lorebook
//!
//! The data model consumed by the World Info engine - books of keyword-indexed
//! entries, the chat transcript, the active participants and the global
//! activation settings. This crate holds no activation logic.

pub mod chat;
pub mod entries;
pub mod error;
pub mod settings;

pub use chat::*;
pub use entries::*;
pub use error::*;
pub use settings::*;
