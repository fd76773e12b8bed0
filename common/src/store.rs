//! Message store adapter and the capacity policy.
//!
//! [`DocumentStore`] is the raw collaborator (a hosted document database);
//! [`MessageStore`] layers the board's rules on top of it.
//!
//! The capacity check in [`MessageStore::save`] is check-then-act against a
//! remote store. Two visitors saving at the same moment can both see 99
//! documents and both insert, so the cap is a best-effort target. Enforcing it
//! strictly needs a conditional write inside a store transaction.

use std::cmp::Ordering;

use crate::error::StoreError;
use crate::message::{Message, MessageDraft, MessageId};

/// Number of messages the board keeps.
pub const DEFAULT_CAPACITY: usize = 100;

/// The four operations the board needs from a document database.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Insert a new document; the store assigns id and timestamp.
    async fn create(&self, draft: &MessageDraft) -> Result<Message, StoreError>;

    /// Every document in the collection, in any order.
    async fn list(&self) -> Result<Vec<Message>, StoreError>;

    /// Atomically add one like. Returns the count now persisted.
    async fn increment_likes(&self, id: &MessageId) -> Result<u32, StoreError>;

    /// Remove a document. Missing ids fail with [`StoreError::NotFound`].
    async fn delete(&self, id: &MessageId) -> Result<(), StoreError>;

    /// Human-readable backend name (e.g. "firestore", "memory").
    fn backend_name(&self) -> &str;
}

/// Order in which messages are evicted: fewest likes first, then oldest.
fn eviction_order(a: &Message, b: &Message) -> Ordering {
    a.likes
        .cmp(&b.likes)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| a.id.cmp(&b.id))
}

/// Pick the message to drop when the board is full.
pub fn select_eviction(messages: &[Message]) -> Option<&Message> {
    messages.iter().min_by(|a, b| eviction_order(a, b))
}

/// Result of [`MessageStore::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub message: Message,
    /// Message removed to make room, if the board was full.
    pub evicted: Option<MessageId>,
}

/// Board-level store operations over a [`DocumentStore`].
pub struct MessageStore<D> {
    documents: D,
    capacity: usize,
}

impl<D: DocumentStore> MessageStore<D> {
    pub fn new(documents: D) -> Self {
        Self::with_capacity(documents, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(documents: D, capacity: usize) -> Self {
        Self {
            documents,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    /// Persist a draft, evicting one message first if the board is full.
    pub async fn save(&self, draft: &MessageDraft) -> Result<SaveOutcome, StoreError> {
        let existing = self.documents.list().await?;
        let mut evicted = None;
        if existing.len() >= self.capacity {
            if let Some(victim) = select_eviction(&existing) {
                tracing::info!(
                    id = %victim.id,
                    likes = victim.likes,
                    stored = existing.len(),
                    "board full, evicting message"
                );
                match self.documents.delete(&victim.id).await {
                    // Someone else removed it between our list and delete.
                    Ok(()) | Err(StoreError::NotFound(_)) => evicted = Some(victim.id.clone()),
                    Err(e) => return Err(e),
                }
            }
        }

        let message = self.documents.create(draft).await?;
        tracing::debug!(id = %message.id, backend = self.documents.backend_name(), "message saved");
        Ok(SaveOutcome { message, evicted })
    }

    /// Deterministic snapshot: newest first, ties by id.
    pub async fn list(&self) -> Result<Vec<Message>, StoreError> {
        let mut messages = self.documents.list().await?;
        messages.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(messages)
    }

    /// Record one like. `expected` is the count the caller anticipates; the
    /// store's answer is authoritative and is what gets returned.
    pub async fn increment_likes(&self, id: &MessageId, expected: u32) -> Result<u32, StoreError> {
        let likes = self.documents.increment_likes(id).await?;
        if likes != expected {
            tracing::debug!(%id, expected, likes, "like count diverged from local view");
        }
        Ok(likes)
    }

    pub async fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        self.documents.delete(id).await
    }
}
