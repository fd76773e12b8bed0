//! Test harness for end-to-end board flows.
//!
//! Wraps the in-memory store with a [`Gate`] so tests can hold remote calls
//! open and observe the board while several actions are pending.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use board_common::board::BoardState;
use board_common::error::{RephraseError, StoreError};
use board_common::memory::MemoryDocuments;
use board_common::message::{FormData, Message, MessageDraft, MessageId};
use board_common::rephrase::{RephraseRequest, Rephraser};
use board_common::store::{DocumentStore, MessageStore};

/// Fixed epoch for deterministic timestamps.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// A form that passes validation.
pub fn valid_form(name: &str) -> FormData {
    FormData {
        name: name.to_string(),
        company: "TechCo".into(),
        email: format!("{}@techco.com", name.to_lowercase()),
        body: "Love this project!\n\tIt's amazing how it all came together.".into(),
        signature: String::new(),
    }
}

/// Manually opened barrier. Everything waiting on it resumes on `open`.
#[derive(Clone)]
pub struct Gate {
    trigger: Rc<RefCell<Option<oneshot::Sender<()>>>>,
    opened: Shared<oneshot::Receiver<()>>,
}

impl Gate {
    pub fn closed() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            trigger: Rc::new(RefCell::new(Some(tx))),
            opened: rx.shared(),
        }
    }

    pub fn open(&self) {
        if let Some(tx) = self.trigger.borrow_mut().take() {
            let _ = tx.send(());
        }
    }

    pub async fn wait(&self) {
        let _ = self.opened.clone().await;
    }
}

/// Document store whose calls block until the gate opens.
pub struct Gated<D> {
    pub inner: D,
    pub gate: Gate,
}

impl<D: DocumentStore> DocumentStore for Gated<D> {
    async fn create(&self, draft: &MessageDraft) -> Result<Message, StoreError> {
        self.gate.wait().await;
        self.inner.create(draft).await
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        self.gate.wait().await;
        self.inner.list().await
    }

    async fn increment_likes(&self, id: &MessageId) -> Result<u32, StoreError> {
        self.gate.wait().await;
        self.inner.increment_likes(id).await
    }

    async fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        self.gate.wait().await;
        self.inner.delete(id).await
    }

    fn backend_name(&self) -> &str {
        "gated"
    }
}

/// Document store whose first `list` takes its snapshot straight away but
/// only returns once the gate opens. Every other call passes through.
pub struct SlowSnapshot<D> {
    pub inner: D,
    gate: Gate,
    held: Cell<bool>,
}

impl<D> SlowSnapshot<D> {
    pub fn new(inner: D, gate: Gate) -> Self {
        Self {
            inner,
            gate,
            held: Cell::new(false),
        }
    }
}

impl<D: DocumentStore> DocumentStore for SlowSnapshot<D> {
    async fn create(&self, draft: &MessageDraft) -> Result<Message, StoreError> {
        self.inner.create(draft).await
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        let snapshot = self.inner.list().await;
        if !self.held.replace(true) {
            self.gate.wait().await;
        }
        snapshot
    }

    async fn increment_likes(&self, id: &MessageId) -> Result<u32, StoreError> {
        self.inner.increment_likes(id).await
    }

    async fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    fn backend_name(&self) -> &str {
        "slow-snapshot"
    }
}

/// Rephraser with a fixed answer that counts its calls.
pub struct FakeRephraser {
    reply: Result<String, RephraseError>,
    calls: Cell<usize>,
    last: RefCell<Option<RephraseRequest>>,
    gate: Option<Gate>,
}

impl FakeRephraser {
    pub fn answering(text: &str) -> Self {
        Self::with_reply(Ok(text.to_string()))
    }

    pub fn failing(err: RephraseError) -> Self {
        Self::with_reply(Err(err))
    }

    fn with_reply(reply: Result<String, RephraseError>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
            last: RefCell::new(None),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_request(&self) -> Option<RephraseRequest> {
        self.last.borrow().clone()
    }
}

impl Rephraser for FakeRephraser {
    async fn rephrase(&self, request: &RephraseRequest) -> Result<String, RephraseError> {
        self.calls.set(self.calls.get() + 1);
        *self.last.borrow_mut() = Some(request.clone());
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.reply.clone()
    }
}

/// A board plus an in-memory store with one-second steps between creates.
pub struct TestBoard {
    pub board: Rc<RefCell<BoardState>>,
    pub store: MessageStore<MemoryDocuments>,
}

impl TestBoard {
    pub fn new() -> Self {
        Self {
            board: Rc::new(RefCell::new(BoardState::new())),
            store: MessageStore::new(MemoryDocuments::stepped(epoch(), Duration::seconds(1))),
        }
    }

    pub fn docs(&self) -> &MemoryDocuments {
        self.store.documents()
    }

    pub fn fill_form(&self, form: FormData) {
        self.board.borrow_mut().form = form;
    }

    /// Save `count` messages directly through the store and show them.
    pub async fn seed(&self, count: usize) -> Vec<Message> {
        let mut saved = Vec::with_capacity(count);
        for i in 0..count {
            let draft = valid_form(&format!("Seed{i}"))
                .to_draft(board_common::message::Color::Yellow)
                .expect("seed form is valid");
            let outcome = self.store.save(&draft).await.expect("memory store is up");
            saved.push(outcome.message);
        }
        self.board.borrow_mut().messages = saved.clone();
        saved
    }
}

impl Default for TestBoard {
    fn default() -> Self {
        Self::new()
    }
}
