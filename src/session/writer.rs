//! Background persistence of session snapshots.
//!
//! Snapshots go through an unbounded channel to one writer task, so saves
//! land in the order they were taken and never block the caller. Each save
//! runs on the blocking pool. Without a tokio runtime (plain sync callers)
//! saves happen inline instead.

use super::store::{PersistedSession, SessionStore};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Save(PersistedSession),
    Flush(oneshot::Sender<()>),
}

pub(crate) struct SessionWriter {
    store: Arc<dyn SessionStore>,
    tx: Option<mpsc::UnboundedSender<Command>>,
}

impl SessionWriter {
    pub(crate) fn start(store: Arc<dyn SessionStore>) -> Self {
        let tx = match Handle::try_current() {
            Ok(handle) => {
                let (tx, rx) = mpsc::unbounded_channel();
                handle.spawn(run(store.clone(), rx));
                Some(tx)
            }
            Err(_) => {
                debug!("no async runtime, session saves run inline");
                None
            }
        };
        Self { store, tx }
    }

    /// Queue `value` for saving. Returns immediately when a writer task runs.
    pub(crate) fn save(&self, value: PersistedSession) {
        match &self.tx {
            Some(tx) => {
                if tx.send(Command::Save(value)).is_err() {
                    warn!("session writer stopped, snapshot dropped");
                }
            }
            None => save_now(self.store.as_ref(), &value),
        }
    }

    /// Resolves once every snapshot queued before this call has been handled.
    pub(crate) async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack, done) = oneshot::channel();
        if tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run(store: Arc<dyn SessionStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Save(value) => {
                let store = store.clone();
                let saved = tokio::task::spawn_blocking(move || save_now(store.as_ref(), &value)).await;
                if let Err(e) = saved {
                    warn!("session save task failed: {}", e);
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Save failures are logged and otherwise ignored.
fn save_now(store: &dyn SessionStore, value: &PersistedSession) {
    if let Err(e) = store.save(value) {
        warn!("failed to persist session state: {}", e);
    }
}
