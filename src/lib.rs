//! # tone-grid
//!
//! Tone transformation runtime: pick a point on a formality × verbosity grid,
//! have an external rewriting service restate the text in that tone, and keep
//! the result as an undoable document version.
//!
//! ## Overview
//!
//! The crate has two halves:
//!
//! - **Service side**: [`RequestCoordinator`] validates and normalizes requests,
//!   memoizes results in a [`cache::CacheStore`], and delegates misses to a
//!   [`rewrite::Rewriter`] such as [`rewrite::ChatRewriteClient`].
//! - **Client side**: [`ToneSession`] keeps the document as a
//!   [`HistoryState`] and allows a single in-flight request, cancelling
//!   superseded ones. Results are applied directly or held for confirmation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tone_grid::session::{ApplyMode, MemoryStore, ToneSession};
//! use tone_grid::types::{cell_by_id, TonePick};
//! use tone_grid::{RequestCoordinator, ToneConfig};
//!
//! #[tokio::main]
//! async fn main() -> tone_grid::Result<()> {
//!     let config = ToneConfig::from_env()?;
//!     let coordinator = Arc::new(RequestCoordinator::from_config(&config));
//!     let session = ToneSession::open(coordinator, Arc::new(MemoryStore::new()), ApplyMode::Direct);
//!
//!     session.edit("hey, can u send the report by friday?")?;
//!     if let Some(cell) = cell_by_id("formal-concise") {
//!         session.apply(TonePick::from(cell)).await?;
//!     }
//!     println!("{}", session.current());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Tone axes, the grid, wire bodies |
//! | [`cache`] | LRU + TTL memoization keyed by request fingerprint |
//! | [`rewrite`] | Connector to the external rewriting service |
//! | [`coordinator`] | Server-side validation, caching and error translation |
//! | [`history`] | Pure undo/redo state machine |
//! | [`session`] | Client-side request lifecycle and persistence |
//! | [`config`] | Layered configuration |

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod rewrite;
pub mod session;
pub mod types;

pub use config::ToneConfig;
pub use coordinator::RequestCoordinator;
pub use error::{Error, ErrorContext, StatusClass, TransportError, SERVICE_FAILURE_MESSAGE};
pub use history::HistoryState;
pub use session::{ApplyMode, ApplyOutcome, ToneSession};
pub use types::{ToneAxes, TonePick};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
