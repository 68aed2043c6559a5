//! Composer logic for the relay chat client.
//!
//! Everything in this crate is independent of the terminal front end: the
//! draft/selection data model, markdown and mention splicing, autocomplete
//! trigger classification, and the collaborator traits (drafts, messages,
//! slash commands, subscriptions, room services) together with in-memory and
//! file-backed implementations of them.

pub mod autocomplete;
pub mod commands;
pub mod config;
pub mod draft;
mod error;
pub mod hashtag;
pub mod markdown;
pub mod memory;
pub mod mention;
pub mod report;
pub mod room;
pub mod selection;
pub mod services;
pub mod suggestions;
pub mod trigger;

pub use error::RelayErr;
pub use error::Result;
pub use selection::Selection;
