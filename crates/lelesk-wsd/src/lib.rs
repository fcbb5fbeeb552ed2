//! Extended-LESK word-sense disambiguation.
//!
//! Given a target word, an optional part of speech, and a context sentence,
//! the engine ranks the word's dictionary senses by lexical overlap between
//! the context bag and each sense's expanded gloss token set. Expansion
//! covers the sense's own terms and gloss, the senses referenced inside its
//! gloss, and its taxonomy neighbors, each for exactly one hop.
//!
//! All collaborators are injected at construction: a [`SenseStore`] for the
//! sense network, a [`TextAnalyzer`] for tokenization and lemmatization, and
//! an optional [`TokenSetCache`] that makes repeated expansions cheap across
//! processes.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lelesk_store::SenseBank;
//! use lelesk_types::Pos;
//! use lelesk_wsd::WsdEngine;
//!
//! # fn main() -> anyhow::Result<()> {
//! let bank = Arc::new(SenseBank::load("senses.jsonl")?);
//! let engine = WsdEngine::from_bank(bank);
//! let ranked = engine.lelesk_wsd("fish", "there are so many fish in the river", Some(Pos::Noun), None);
//! if let Some(top) = ranked.first() {
//!     println!("{} (score={}, freq={})", top.candidate.sense.id, top.score, top.freq);
//! }
//! # Ok(()) }
//! ```

pub mod context;
mod engine;
pub mod score;

pub use engine::{EXPANSION_DEPTH, WsdEngine};
pub use lelesk_cache::{MemoryTokenCache, SqliteTokenCache, TokenSetCache};
pub use lelesk_morph::{EnglishAnalyzer, TextAnalyzer};
pub use lelesk_store::{SenseBank, SenseStore};
pub use lelesk_types::{Pos, ScoredCandidate, Sense, SenseId, WsdCandidate};
