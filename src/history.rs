//! Linear undo/redo history over document snapshots.
//!
//! Every transition is pure: it borrows the current state and returns a new
//! one. `past` runs oldest → newest, `future` runs nearest → furthest.

use serde::{Deserialize, Serialize};

pub const INITIAL_TEXT: &str = "Paste or type your text, then drag the picker →";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    past: Vec<String>,
    current: String,
    future: Vec<String>,
}

impl HistoryState {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            past: Vec::new(),
            current: initial.into(),
            future: Vec::new(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn past(&self) -> &[String] {
        &self.past
    }

    pub fn future(&self) -> &[String] {
        &self.future
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Record `current` and move to `snapshot`. Discards the redo branch.
    #[must_use]
    pub fn push(&self, snapshot: impl Into<String>) -> Self {
        let mut past = self.past.clone();
        past.push(self.current.clone());
        Self {
            past,
            current: snapshot.into(),
            future: Vec::new(),
        }
    }

    #[must_use]
    pub fn undo(&self) -> Self {
        let Some((prev, rest)) = self.past.split_last() else {
            return self.clone();
        };
        let mut future = Vec::with_capacity(self.future.len() + 1);
        future.push(self.current.clone());
        future.extend(self.future.iter().cloned());
        Self {
            past: rest.to_vec(),
            current: prev.clone(),
            future,
        }
    }

    #[must_use]
    pub fn redo(&self) -> Self {
        let Some((next, rest)) = self.future.split_first() else {
            return self.clone();
        };
        let mut past = self.past.clone();
        past.push(self.current.clone());
        Self {
            past,
            current: next.clone(),
            future: rest.to_vec(),
        }
    }

    /// Drop all history and start over from `snapshot`.
    #[must_use]
    pub fn reset_to(&self, snapshot: impl Into<String>) -> Self {
        Self::new(snapshot)
    }

    /// Replace `current` without recording a history entry.
    ///
    /// Used for editor keystrokes and for settling a slot reserved by an
    /// optimistic `push`.
    #[must_use]
    pub fn replace_current(&self, snapshot: impl Into<String>) -> Self {
        Self {
            past: self.past.clone(),
            current: snapshot.into(),
            future: self.future.clone(),
        }
    }
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new(INITIAL_TEXT)
    }
}
