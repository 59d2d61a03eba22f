//! Request lifecycle scenarios with a transport the test resolves by hand.

use async_trait::async_trait;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tone_grid::session::{
    ApplyMode, ApplyOutcome, JsonFileStore, MemoryStore, PersistedSession, SessionStore,
    ToneSession, ToneTransport,
};
use tone_grid::types::{cell_by_id, Formality, ToneAxes, TonePick, Verbosity};
use tone_grid::{Error, ErrorContext, Result};

type Reply = oneshot::Sender<Result<String>>;

/// Parks every call until the test answers it.
#[derive(Default)]
struct Gated {
    calls: Mutex<Vec<(ToneAxes, Option<Reply>)>>,
}

impl Gated {
    fn issued(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn wait_for(&self, n: usize) {
        for _ in 0..500 {
            if self.issued() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("expected {} transport calls, saw {}", n, self.issued());
    }

    /// Answer call `i`. Returns false when its caller already went away.
    fn resolve(&self, i: usize, result: Result<String>) -> bool {
        let tx = self.calls.lock().unwrap()[i].1.take();
        tx.map(|tx| tx.send(result).is_ok()).unwrap_or(false)
    }
}

#[async_trait]
impl ToneTransport for Gated {
    async fn transform(&self, _text: &str, axes: ToneAxes) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push((axes, Some(tx)));
        rx.await.unwrap_or_else(|_| {
            Err(Error::service_with_context("gate dropped", ErrorContext::new()))
        })
    }
}

fn pick(id: &str) -> TonePick {
    TonePick::from(cell_by_id(id).unwrap())
}

fn open(mode: ApplyMode) -> (Arc<ToneSession>, Arc<Gated>, MemoryStore) {
    let gate = Arc::new(Gated::default());
    let store = MemoryStore::new();
    let session = ToneSession::open(gate.clone(), Arc::new(store.clone()), mode);
    session.edit("Hello.").unwrap();
    (Arc::new(session), gate, store)
}

fn spawn_apply(
    session: &Arc<ToneSession>,
    p: TonePick,
) -> tokio::task::JoinHandle<Result<ApplyOutcome>> {
    let s = session.clone();
    tokio::spawn(async move { s.apply(p).await })
}

#[tokio::test]
async fn test_newer_intent_supersedes_older_one() {
    let (session, gate, _) = open(ApplyMode::Direct);
    let before = session.history().unwrap();

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    let b = spawn_apply(&session, pick("casual-elaborate"));
    gate.wait_for(2).await;

    assert_eq!(a.await.unwrap().unwrap(), ApplyOutcome::Superseded);
    assert!(!gate.resolve(0, Ok("A".into())));
    assert!(gate.resolve(1, Ok("B".into())));

    assert_eq!(
        b.await.unwrap().unwrap(),
        ApplyOutcome::Applied { text: "B".into() }
    );
    assert_eq!(session.current(), "B");
    assert_eq!(session.active_id().as_deref(), Some("casual-elaborate"));
    assert_eq!(session.last_pick().unwrap().id, "casual-elaborate");
    assert!(!session.is_busy());

    // Two optimistic slots were reserved, and the newest one holds B.
    let history = session.history().unwrap();
    assert_eq!(history.past().len(), before.past().len() + 2);
    assert_eq!(history.past().last().map(String::as_str), Some("Hello."));
}

#[tokio::test]
async fn test_superseded_failure_is_silent() {
    let (session, gate, _) = open(ApplyMode::Direct);

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    let b = spawn_apply(&session, pick("neutral-balanced"));
    gate.wait_for(2).await;

    gate.resolve(0, Err(Error::service_with_context("late failure", ErrorContext::new())));
    assert_eq!(a.await.unwrap().unwrap(), ApplyOutcome::Superseded);

    gate.resolve(1, Ok("settled".into()));
    assert!(b.await.unwrap().is_ok());
    assert_eq!(session.current(), "settled");
}

#[tokio::test]
async fn test_undo_cancels_in_flight_request() {
    let (session, gate, _) = open(ApplyMode::Direct);
    let before = session.history().unwrap();

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    assert!(session.is_busy());
    session.undo().unwrap();

    assert_eq!(a.await.unwrap().unwrap(), ApplyOutcome::Superseded);
    assert!(!gate.resolve(0, Ok("too late".into())));
    let history = session.history().unwrap();
    assert_eq!(history.past(), before.past());
    assert_eq!(history.current(), "Hello.");
    assert!(session.active_id().is_none());
}

#[tokio::test]
async fn test_explicit_cancel_fires_neither_path() {
    let (session, gate, store) = open(ApplyMode::Direct);

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    let reserved = session.history().unwrap();
    session.flush().await;
    let saves = store.save_count();

    assert!(session.cancel().unwrap());
    assert_eq!(a.await.unwrap().unwrap(), ApplyOutcome::Superseded);
    assert_eq!(session.history().unwrap(), reserved);
    session.flush().await;
    assert_eq!(store.save_count(), saves);
    assert!(session.last_pick().is_none());
    assert!(!session.cancel().unwrap());
}

#[tokio::test]
async fn test_preview_decline_leaves_history_untouched() {
    let (session, gate, store) = open(ApplyMode::Preview);
    let before = session.history().unwrap();
    session.flush().await;
    let saves = store.save_count();

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    gate.resolve(0, Ok("Good day.".into()));

    let ApplyOutcome::PreviewReady(preview) = a.await.unwrap().unwrap() else {
        panic!("expected a preview");
    };
    assert_eq!(preview.original, "Hello.");
    assert_eq!(preview.text, "Good day.");
    assert_eq!(session.history().unwrap(), before);

    assert!(session.decline_preview().unwrap());
    assert!(session.preview().is_none());
    assert_eq!(session.history().unwrap(), before);
    session.flush().await;
    assert_eq!(store.save_count(), saves);
}

#[tokio::test]
async fn test_preview_confirm_is_one_undoable_step() {
    let (session, gate, store) = open(ApplyMode::Preview);
    let before = session.history().unwrap();

    let a = spawn_apply(&session, pick("casual-concise"));
    gate.wait_for(1).await;
    gate.resolve(0, Ok("hey!".into()));
    assert!(matches!(
        a.await.unwrap().unwrap(),
        ApplyOutcome::PreviewReady(_)
    ));

    assert_eq!(session.confirm_preview().unwrap().as_deref(), Some("hey!"));
    assert_eq!(session.history().unwrap(), before.push("hey!"));
    assert_eq!(session.active_id().as_deref(), Some("casual-concise"));
    session.flush().await;
    assert_eq!(store.snapshot().unwrap().history.current(), "hey!");
    assert_eq!(session.confirm_preview().unwrap(), None);

    session.undo().unwrap();
    assert_eq!(session.current(), before.current());
    assert_eq!(session.history().unwrap().future(), ["hey!"]);
}

#[tokio::test]
async fn test_new_intent_discards_pending_preview() {
    let (session, gate, _) = open(ApplyMode::Preview);

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    gate.resolve(0, Ok("first".into()));
    a.await.unwrap().unwrap();
    assert!(session.preview().is_some());

    let b = spawn_apply(&session, pick("formal-elaborate"));
    gate.wait_for(2).await;
    assert!(session.preview().is_none());
    gate.resolve(1, Ok("second".into()));
    b.await.unwrap().unwrap();
    assert_eq!(session.preview().unwrap().text, "second");
}

#[tokio::test]
async fn test_transport_receives_picked_axes() {
    let (session, gate, _) = open(ApplyMode::Direct);
    let a = spawn_apply(&session, pick("casual-elaborate"));
    gate.wait_for(1).await;
    assert_eq!(
        gate.calls.lock().unwrap()[0].0,
        ToneAxes::new(Formality::Casual, Verbosity::Elaborate)
    );
    gate.resolve(0, Ok("done".into()));
    a.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_session_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let gate = Arc::new(Gated::default());
        let session = Arc::new(ToneSession::open(
            gate.clone(),
            Arc::new(JsonFileStore::new(&path)),
            ApplyMode::Direct,
        ));
        session.edit("Hello.").unwrap();
        let a = spawn_apply(&session, pick("formal-concise"));
        gate.wait_for(1).await;
        gate.resolve(0, Ok("Good day.".into()));
        a.await.unwrap().unwrap();
        session.flush().await;
    }

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["axesActiveId"], "formal-concise");
    assert_eq!(raw["history"]["current"], "Good day.");

    let store = JsonFileStore::new(&path);
    assert!(store.load().unwrap().is_some());
    let reopened = ToneSession::open(
        Arc::new(Gated::default()),
        Arc::new(store),
        ApplyMode::Direct,
    );
    assert_eq!(reopened.current(), "Good day.");
    reopened.undo().unwrap();
    assert_eq!(reopened.current(), "Hello.");
}

#[tokio::test]
async fn test_edit_drops_preview_of_older_text() {
    let (session, gate, _) = open(ApplyMode::Preview);
    session.edit("draft one").unwrap();

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    gate.resolve(0, Ok("DRAFT ONE".into()));
    assert!(matches!(
        a.await.unwrap().unwrap(),
        ApplyOutcome::PreviewReady(_)
    ));

    session.edit("completely different draft").unwrap();
    assert!(session.preview().is_none());
    assert_eq!(session.confirm_preview().unwrap(), None);
    assert_eq!(session.current(), "completely different draft");
    assert!(!session.can_undo());
}

#[tokio::test]
async fn test_undo_and_redo_drop_held_preview() {
    let (session, gate, _) = open(ApplyMode::Preview);

    let a = spawn_apply(&session, pick("neutral-concise"));
    gate.wait_for(1).await;
    gate.resolve(0, Ok("Hi.".into()));
    a.await.unwrap().unwrap();
    session.confirm_preview().unwrap();

    let b = spawn_apply(&session, pick("casual-concise"));
    gate.wait_for(2).await;
    gate.resolve(1, Ok("hey".into()));
    b.await.unwrap().unwrap();
    assert!(session.preview().is_some());

    session.undo().unwrap();
    assert!(session.preview().is_none());
    assert_eq!(session.confirm_preview().unwrap(), None);
    assert_eq!(session.current(), "Hello.");
}

/// Blocks every save until the test opens it.
#[derive(Default)]
struct HeldStore {
    open: Mutex<bool>,
    opened: Condvar,
    saved: Mutex<Vec<PersistedSession>>,
}

impl HeldStore {
    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl SessionStore for HeldStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(None)
    }

    fn save(&self, value: &PersistedSession) -> Result<()> {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
        self.saved.lock().unwrap().push(value.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_stalled_store_does_not_hold_up_requests() {
    let gate = Arc::new(Gated::default());
    let store = Arc::new(HeldStore::default());
    let session = Arc::new(ToneSession::open(
        gate.clone(),
        store.clone(),
        ApplyMode::Direct,
    ));
    session.edit("Hello.").unwrap();

    let a = spawn_apply(&session, pick("formal-concise"));
    gate.wait_for(1).await;
    gate.resolve(0, Ok("Good day.".into()));
    assert_eq!(
        a.await.unwrap().unwrap(),
        ApplyOutcome::Applied { text: "Good day.".into() }
    );
    assert!(store.saved.lock().unwrap().is_empty());

    store.release();
    session.flush().await;
    let saved = store.saved.lock().unwrap();
    let currents: Vec<&str> = saved.iter().map(|s| s.history.current()).collect();
    assert_eq!(currents, ["Hello.", "Hello.", "Good day."]);
    assert_eq!(saved[2].axes_active_id.as_deref(), Some("formal-concise"));
}
