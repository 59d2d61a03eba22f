//! # Types Module
//!
//! Core value types shared by the service and the client session.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ToneAxes`] | Validated formality × verbosity pair |
//! | [`RawAxes`] | Axes as received on the wire, before normalization |
//! | [`ToneCell`] | One of the nine grid cells |
//! | [`TonePick`] | A user pick emitted by the grid gesture component |
//! | [`ToneRequest`] / [`ToneResponse`] | Tone endpoint bodies |
//! | [`Message`] | Chat message sent to the rewrite service |
//!
//! ## Example
//!
//! ```rust
//! use tone_grid::types::{RawAxes, ToneAxes, Formality, Verbosity};
//!
//! let raw = RawAxes { formality: Some("formal".into()), verbosity: None };
//! let axes = ToneAxes::normalize(Some(&raw)).unwrap();
//! assert_eq!(axes, ToneAxes::new(Formality::Formal, Verbosity::Balanced));
//! ```

pub mod axes;
pub mod grid;
pub mod message;
pub mod wire;

pub use axes::{Formality, RawAxes, ToneAxes, Verbosity};
pub use grid::{cell_by_id, cell_for, GridDescriptor, ToneCell, TonePick, GRID};
pub use message::{Message, MessageRole};
pub use wire::{ErrorResponse, ToneReply, ToneRequest, ToneResponse};
