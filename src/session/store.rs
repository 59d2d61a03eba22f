//! Persistence collaborator for the client session.

use crate::history::HistoryState;
use crate::types::TonePick;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Everything that survives a reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub axes_active_id: Option<String>,
    #[serde(default)]
    pub last_axes: Option<TonePick>,
    #[serde(default)]
    pub history: HistoryState,
}

pub trait SessionStore: Send + Sync {
    /// Last saved value, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<PersistedSession>>;
    fn save(&self, value: &PersistedSession) -> Result<()>;
}

/// Stores the session as a JSON document on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, value: &PersistedSession) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        // written beside the target, then renamed into place
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Option<PersistedSession>>>,
    saves: Arc<RwLock<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: PersistedSession) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.inner.write() {
            *slot = Some(value);
        }
        store
    }

    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.inner.read().ok().and_then(|v| v.clone())
    }

    pub fn save_count(&self) -> usize {
        self.saves.read().map(|n| *n).unwrap_or(0)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.snapshot())
    }

    fn save(&self, value: &PersistedSession) -> Result<()> {
        if let Ok(mut slot) = self.inner.write() {
            *slot = Some(value.clone());
        }
        if let Ok(mut n) = self.saves.write() {
            *n += 1;
        }
        Ok(())
    }
}
