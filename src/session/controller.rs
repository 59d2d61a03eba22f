//! Client-side request lifecycle over a versioned document.

use super::store::{PersistedSession, SessionStore};
use super::transport::ToneTransport;
use super::writer::SessionWriter;
use crate::history::HistoryState;
use crate::types::TonePick;
use crate::{Error, ErrorContext, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a successful rewrite reaches the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Reserve an undo slot up front, then settle it with the result.
    #[default]
    Direct,
    /// Hold the result until the user confirms it.
    Preview,
}

/// The one live request of a session.
#[derive(Debug)]
pub struct PendingRequest {
    pub id: u64,
    token: CancellationToken,
}

impl PendingRequest {
    fn new(id: u64) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A rewrite waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub original: String,
    pub text: String,
    pub pick: TonePick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Direct mode: `current` now holds `text`.
    Applied { text: String },
    /// Preview mode: nothing changed yet; confirm or decline.
    PreviewReady(Preview),
    /// A newer intent (or a manual history operation) replaced this one.
    Superseded,
}

struct SessionState {
    history: HistoryState,
    pending: Option<PendingRequest>,
    preview: Option<Preview>,
    last_pick: Option<TonePick>,
    active_id: Option<String>,
    next_id: u64,
}

impl SessionState {
    fn from_persisted(saved: PersistedSession) -> Self {
        Self {
            history: saved.history,
            pending: None,
            preview: None,
            last_pick: saved.last_axes,
            active_id: saved.axes_active_id,
            next_id: 1,
        }
    }

    /// Cancel the live request, if any, and install a fresh one.
    fn replace_pending(&mut self) -> (u64, CancellationToken) {
        self.cancel_pending();
        let pending = PendingRequest::new(self.next_id);
        self.next_id += 1;
        let handle = (pending.id, pending.token.clone());
        self.pending = Some(pending);
        handle
    }

    fn cancel_pending(&mut self) {
        if let Some(old) = self.pending.take() {
            debug!(request = old.id, "cancelling superseded tone request");
            old.cancel();
        }
    }

    fn is_live(&self, id: u64) -> bool {
        self.pending
            .as_ref()
            .map(|p| p.id == id && !p.is_cancelled())
            .unwrap_or(false)
    }

    fn record_pick(&mut self, pick: TonePick) {
        self.active_id = Some(pick.id.clone());
        self.last_pick = Some(pick);
    }

    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            axes_active_id: self.active_id.clone(),
            last_axes: self.last_pick.clone(),
            history: self.history.clone(),
        }
    }
}

/// Mediates tone intents and the document history.
///
/// At most one request is in flight. A new intent, or any manual history
/// operation, cancels the previous request before doing anything else, and a
/// cancelled request never commits a result or reports an error.
pub struct ToneSession {
    transport: Arc<dyn ToneTransport>,
    writer: SessionWriter,
    mode: ApplyMode,
    state: Mutex<SessionState>,
}

impl ToneSession {
    /// Open a session, restoring whatever the store last saved.
    ///
    /// Later saves are handed to a background writer when a tokio runtime is
    /// running; call [`flush`](Self::flush) before exiting to wait for them.
    pub fn open(
        transport: Arc<dyn ToneTransport>,
        store: Arc<dyn SessionStore>,
        mode: ApplyMode,
    ) -> Self {
        let saved = match store.load() {
            Ok(Some(saved)) => saved,
            Ok(None) => PersistedSession::default(),
            Err(e) => {
                warn!("discarding unreadable session state: {}", e);
                PersistedSession::default()
            }
        };
        Self {
            transport,
            writer: SessionWriter::start(store),
            mode,
            state: Mutex::new(SessionState::from_persisted(saved)),
        }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    /// Request a tone change for the current document.
    pub async fn apply(&self, pick: TonePick) -> Result<ApplyOutcome> {
        let (id, token, text) = {
            let mut st = self.lock()?;
            let text = st.history.current().to_string();
            if text.trim().is_empty() {
                return Err(Error::validation_with_context(
                    "Please enter some text first.",
                    ErrorContext::new()
                        .with_field_path("text")
                        .with_source("session"),
                ));
            }
            let (id, token) = st.replace_pending();
            st.preview = None;
            if self.mode == ApplyMode::Direct {
                st.history = st.history.push(text.clone());
                self.persist(&st);
            }
            (id, token, text)
        };
        debug!(request = id, tone = %pick.id, "tone request issued");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(ApplyOutcome::Superseded),
            r = self.transport.transform(&text, pick.axes) => r,
        };

        let mut st = self.lock()?;
        if !st.is_live(id) {
            return Ok(ApplyOutcome::Superseded);
        }
        st.pending = None;
        let output = result?;

        match self.mode {
            ApplyMode::Direct => {
                st.history = st.history.replace_current(output.clone());
                st.record_pick(pick);
                self.persist(&st);
                info!(request = id, "tone applied");
                Ok(ApplyOutcome::Applied { text: output })
            }
            ApplyMode::Preview => {
                let preview = Preview {
                    original: text,
                    text: output,
                    pick,
                };
                st.preview = Some(preview.clone());
                Ok(ApplyOutcome::PreviewReady(preview))
            }
        }
    }

    /// Repeat the most recent successful tone.
    pub async fn apply_last(&self) -> Result<ApplyOutcome> {
        let pick = self.lock()?.last_pick.clone().ok_or_else(|| {
            Error::validation_with_context(
                "No tone has been applied yet.",
                ErrorContext::new().with_source("session"),
            )
        })?;
        self.apply(pick).await
    }

    /// Commit the held preview as one history entry. Returns the new text.
    pub fn confirm_preview(&self) -> Result<Option<String>> {
        let mut st = self.lock()?;
        let Some(preview) = st.preview.take() else {
            return Ok(None);
        };
        st.history = st.history.push(preview.text.clone());
        st.record_pick(preview.pick);
        self.persist(&st);
        Ok(Some(preview.text))
    }

    /// Drop the held preview. History is untouched.
    pub fn decline_preview(&self) -> Result<bool> {
        Ok(self.lock()?.preview.take().is_some())
    }

    pub fn undo(&self) -> Result<()> {
        self.transition(|h| h.undo())
    }

    pub fn redo(&self) -> Result<()> {
        self.transition(|h| h.redo())
    }

    /// Editor keystrokes: replace the text without an undo entry.
    pub fn edit(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.transition(move |h| h.replace_current(text))
    }

    /// Clear the document and all history.
    pub fn reset(&self) -> Result<()> {
        let mut st = self.lock()?;
        st.cancel_pending();
        st.preview = None;
        st.active_id = None;
        st.history = st.history.reset_to("");
        self.persist(&st);
        Ok(())
    }

    /// Wait until every change made so far has been handed to the store.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Cancel the in-flight request, if any.
    pub fn cancel(&self) -> Result<bool> {
        let mut st = self.lock()?;
        let had = st.pending.is_some();
        st.cancel_pending();
        Ok(had)
    }

    pub fn current(&self) -> String {
        self.with_state(|st| st.history.current().to_string())
            .unwrap_or_default()
    }

    pub fn history(&self) -> Option<HistoryState> {
        self.with_state(|st| st.history.clone())
    }

    pub fn preview(&self) -> Option<Preview> {
        self.with_state(|st| st.preview.clone()).flatten()
    }

    pub fn last_pick(&self) -> Option<TonePick> {
        self.with_state(|st| st.last_pick.clone()).flatten()
    }

    pub fn active_id(&self) -> Option<String> {
        self.with_state(|st| st.active_id.clone()).flatten()
    }

    pub fn is_busy(&self) -> bool {
        self.with_state(|st| st.pending.is_some()).unwrap_or(false)
    }

    pub fn can_undo(&self) -> bool {
        self.with_state(|st| st.history.can_undo()).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.with_state(|st| st.history.can_redo()).unwrap_or(false)
    }

    /// Any held preview was computed from the old text, so it goes too.
    fn transition(&self, f: impl FnOnce(&HistoryState) -> HistoryState) -> Result<()> {
        let mut st = self.lock()?;
        st.cancel_pending();
        st.preview = None;
        st.history = f(&st.history);
        self.persist(&st);
        Ok(())
    }

    fn persist(&self, st: &SessionState) {
        self.writer.save(st.to_persisted());
    }

    fn with_state<T>(&self, f: impl FnOnce(&SessionState) -> T) -> Option<T> {
        self.state.lock().ok().map(|st| f(&st))
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|_| {
            Error::service_with_context(
                "session state unavailable",
                ErrorContext::new().with_source("session"),
            )
        })
    }
}
