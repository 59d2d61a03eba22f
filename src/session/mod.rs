//! # Session Module
//!
//! Client side of a tone edit: a [`ToneSession`] owns the document history,
//! issues at most one transformation request at a time, and applies results
//! either directly or through a confirm/decline preview step.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ToneSession`] | Request lifecycle controller over a [`HistoryState`](crate::history::HistoryState) |
//! | [`ToneTransport`] | Round trip to the coordinator (in-process or [`HttpToneTransport`]) |
//! | [`SessionStore`] | Persistence collaborator ([`JsonFileStore`], [`MemoryStore`]) |

mod controller;
mod store;
mod transport;
mod writer;

pub use controller::{ApplyMode, ApplyOutcome, PendingRequest, Preview, ToneSession};
pub use store::{JsonFileStore, MemoryStore, PersistedSession, SessionStore};
pub use transport::{HttpToneTransport, ToneTransport};
