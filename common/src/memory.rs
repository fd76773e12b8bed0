//! In-process document store for offline mode and tests.
//!
//! Behaves like the hosted store: ids and timestamps are assigned on create,
//! likes increment atomically, missing ids fail with `NotFound`. It can be
//! switched "offline" to exercise the unavailable path, and it counts calls so
//! tests can assert that nothing reached the store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::StoreError;
use crate::message::{Message, MessageDraft, MessageId};
use crate::store::DocumentStore;

/// How create timestamps are produced.
enum Clock {
    /// Wall clock, clamped so timestamps never go backwards.
    System,
    /// Deterministic: `next`, then `next + step`, ...
    Stepped { next: DateTime<Utc>, step: Duration },
}

/// Tally of store calls, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create: usize,
    pub list: usize,
    pub increment: usize,
    pub delete: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.create + self.list + self.increment + self.delete
    }
}

pub struct MemoryDocuments {
    docs: RefCell<BTreeMap<MessageId, Message>>,
    clock: RefCell<Clock>,
    last_timestamp: Cell<Option<DateTime<Utc>>>,
    next_id: Cell<u64>,
    available: Cell<bool>,
    calls: Cell<CallCounts>,
}

impl Default for MemoryDocuments {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Timestamps start at `start` and advance by `step` per create.
    pub fn stepped(start: DateTime<Utc>, step: Duration) -> Self {
        Self::with_clock(Clock::Stepped { next: start, step })
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            docs: RefCell::new(BTreeMap::new()),
            clock: RefCell::new(clock),
            last_timestamp: Cell::new(None),
            next_id: Cell::new(1),
            available: Cell::new(true),
            calls: Cell::new(CallCounts::default()),
        }
    }

    /// Insert an already-persisted message verbatim (fixtures, sample data).
    pub fn seed(&self, messages: impl IntoIterator<Item = Message>) {
        let mut docs = self.docs.borrow_mut();
        for message in messages {
            docs.insert(message.id.clone(), message);
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.get()
    }

    pub fn len(&self) -> usize {
        self.docs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.borrow().is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<Message> {
        self.docs.borrow().get(id).cloned()
    }

    fn record(&self, f: impl FnOnce(&mut CallCounts)) -> Result<(), StoreError> {
        let mut calls = self.calls.get();
        f(&mut calls);
        self.calls.set(calls);
        if self.available.get() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".into()))
        }
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let candidate = match &mut *self.clock.borrow_mut() {
            Clock::System => Utc::now(),
            Clock::Stepped { next, step } => {
                let ts = *next;
                *next = ts + *step;
                ts
            }
        };
        let ts = match self.last_timestamp.get() {
            Some(last) if last > candidate => last,
            _ => candidate,
        };
        self.last_timestamp.set(Some(ts));
        ts
    }

    fn next_id(&self) -> MessageId {
        let n = self.next_id.get();
        self.next_id.set(n + 1);
        MessageId(format!("mem-{n:04}"))
    }
}

impl DocumentStore for MemoryDocuments {
    async fn create(&self, draft: &MessageDraft) -> Result<Message, StoreError> {
        self.record(|c| c.create += 1)?;
        let message = draft.clone().persisted(self.next_id(), self.next_timestamp());
        self.docs
            .borrow_mut()
            .insert(message.id.clone(), message.clone());
        Ok(message)
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        self.record(|c| c.list += 1)?;
        Ok(self.docs.borrow().values().cloned().collect())
    }

    async fn increment_likes(&self, id: &MessageId) -> Result<u32, StoreError> {
        self.record(|c| c.increment += 1)?;
        let mut docs = self.docs.borrow_mut();
        let message = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        message.likes = message.likes.saturating_add(1);
        Ok(message.likes)
    }

    async fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        self.record(|c| c.delete += 1)?;
        self.docs
            .borrow_mut()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
