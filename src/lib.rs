//! Ledger-file parsing and suggestion indexes for interactive transaction entry.
//!
//! Text goes through [`parser`] into [`models::Transaction`] values, which feed
//! an [`index::Index`]. [`intelligence::Intelligence`] pairs the ledger index
//! with a runtime index over the not-yet-committed batch and merges answers
//! from both.

pub mod amount;
pub mod error;
pub mod fmt;
pub mod index;
pub mod intelligence;
pub mod ledger;
pub mod models;
pub mod parser;
pub mod session;
pub mod settings;
pub mod templates;
pub mod trie;
