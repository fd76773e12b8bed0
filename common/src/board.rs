//! Board state owned by the front end, and its per-action transitions.
//!
//! Every user action is split into a `begin_*` step (validate, raise the
//! in-flight flag, produce what the remote call needs) and a `finish_*` step
//! (apply the remote result, lower the flag, notify). The async drivers in
//! [`crate::controller`] run the remote call between the two, so the state is
//! never borrowed across an await and unrelated actions can overlap.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{BoardError, RephraseError, StoreError, ValidationError};
use crate::feed::{merge_snapshot, sort_messages, SortMode};
use crate::message::{Color, FormData, Message, MessageDraft, MessageId};
use crate::notification::{Notification, Notifier, Tone};
use crate::rephrase::RephraseRequest;
use crate::store::SaveOutcome;

/// Local changes confirmed while a refresh is in flight. The refresh's
/// snapshot may predate them, so they are replayed on top of it.
#[derive(Debug, Clone, Default)]
struct RefreshJournal {
    added: Vec<Message>,
    removed: HashSet<MessageId>,
}

#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub messages: Vec<Message>,
    pub form: FormData,
    pub sort_mode: SortMode,
    submitting: bool,
    rephrasing: bool,
    refreshing: Option<RefreshJournal>,
    liking: HashSet<MessageId>,
    deleting: HashSet<MessageId>,
    notifier: Notifier,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Messages in display order.
    pub fn feed(&self) -> Vec<&Message> {
        sort_messages(&self.messages, self.sort_mode)
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_rephrasing(&self) -> bool {
        self.rephrasing
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.is_some()
    }

    pub fn is_liking(&self, id: &MessageId) -> bool {
        self.liking.contains(id)
    }

    pub fn is_deleting(&self, id: &MessageId) -> bool {
        self.deleting.contains(id)
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifier.current()
    }

    pub fn notify(&mut self, tone: Tone, text: impl Into<String>) -> u64 {
        self.notifier.show(tone, text)
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.notifier.dismiss(id)
    }

    fn reject(&mut self, err: ValidationError) -> BoardError {
        self.notify(Tone::Warning, format!("{}! ⚠️", capitalize(&err.to_string())));
        err.into()
    }

    fn unknown(&mut self, id: &MessageId) -> BoardError {
        self.notify(Tone::Warning, "That message is no longer on the board.");
        BoardError::UnknownMessage(id.clone())
    }

    fn busy(&mut self, action: &str) -> BoardError {
        self.notify(Tone::Info, format!("Still working on your last {action}…"));
        BoardError::Busy
    }

    fn add_local(&mut self, message: Message) {
        if let Some(journal) = &mut self.refreshing {
            journal.added.push(message.clone());
        }
        if self.message(&message.id).is_none() {
            self.messages.push(message);
        }
    }

    fn remove_local(&mut self, id: &MessageId) {
        if let Some(journal) = &mut self.refreshing {
            journal.removed.insert(id.clone());
        }
        self.messages.retain(|m| &m.id != id);
    }

    // ─── Submit ─────────────────────────────────────────────────────────

    pub fn begin_submit(&mut self, color: Color) -> Result<MessageDraft, BoardError> {
        if self.submitting {
            return Err(self.busy("post"));
        }
        match self.form.to_draft(color) {
            Ok(draft) => {
                self.submitting = true;
                Ok(draft)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// A message evicted to make room leaves the feed along with the new one
    /// arriving.
    pub fn finish_submit(&mut self, result: Result<SaveOutcome, StoreError>) -> Result<Message, BoardError> {
        self.submitting = false;
        match result {
            Ok(SaveOutcome { message, evicted }) => {
                if let Some(evicted) = evicted {
                    self.remove_local(&evicted);
                }
                self.add_local(message.clone());
                self.form = FormData::default();
                self.notify(Tone::Success, "Message posted successfully! 🎉");
                Ok(message)
            }
            Err(err) => {
                self.notify(Tone::Error, format!("Failed to post message: {err} ⚠️"));
                Err(err.into())
            }
        }
    }

    // ─── Like ───────────────────────────────────────────────────────────

    /// Returns the like count the store is expected to report.
    pub fn begin_like(&mut self, id: &MessageId) -> Result<u32, BoardError> {
        let Some(likes) = self.message(id).map(|m| m.likes) else {
            return Err(self.unknown(id));
        };
        if !self.liking.insert(id.clone()) {
            return Err(self.busy("like"));
        }
        Ok(likes.saturating_add(1))
    }

    /// Likes are confirmed: the local count only moves once the store has
    /// acknowledged, and never moves down.
    pub fn finish_like(&mut self, id: &MessageId, result: Result<u32, StoreError>) -> Result<u32, BoardError> {
        self.liking.remove(id);
        match result {
            Ok(persisted) => {
                let likes = match self.messages.iter_mut().find(|m| &m.id == id) {
                    Some(message) => {
                        message.likes = message.likes.max(persisted);
                        message.likes
                    }
                    None => persisted,
                };
                self.notify(Tone::Success, "Thanks for your like! 💖");
                Ok(likes)
            }
            Err(StoreError::NotFound(gone)) => {
                self.remove_local(&gone);
                self.notify(Tone::Warning, "That message has already been removed.");
                Err(StoreError::NotFound(gone).into())
            }
            Err(err) => {
                self.notify(Tone::Error, format!("Could not record your like: {err} ⚠️"));
                Err(err.into())
            }
        }
    }

    // ─── Delete ─────────────────────────────────────────────────────────

    pub fn begin_delete(&mut self, id: &MessageId) -> Result<(), BoardError> {
        if self.message(id).is_none() {
            return Err(self.unknown(id));
        }
        if !self.deleting.insert(id.clone()) {
            return Err(self.busy("delete"));
        }
        Ok(())
    }

    /// A delete the store answers with `NotFound` still succeeds: the message
    /// is gone either way, so it leaves the feed with an informational note.
    pub fn finish_delete(&mut self, id: &MessageId, result: Result<(), StoreError>) -> Result<(), BoardError> {
        self.deleting.remove(id);
        match result {
            Ok(()) => {
                self.remove_local(id);
                self.notify(Tone::Success, "Message deleted successfully! 🗑️");
                Ok(())
            }
            Err(StoreError::NotFound(_)) => {
                self.remove_local(id);
                self.notify(Tone::Info, "That message was already deleted.");
                Ok(())
            }
            Err(err) => {
                self.notify(Tone::Error, format!("Failed to delete message: {err} ⚠️"));
                Err(err.into())
            }
        }
    }

    // ─── Rephrase ───────────────────────────────────────────────────────

    pub fn begin_rephrase(&mut self) -> Result<RephraseRequest, BoardError> {
        if self.rephrasing {
            return Err(self.busy("rephrase"));
        }
        if self.form.body.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyBody));
        }
        self.rephrasing = true;
        Ok(RephraseRequest::from_form(&self.form))
    }

    /// Apply a rephrase result for `request`.
    ///
    /// If the draft body changed while the call was pending (edited, or the
    /// form was posted and cleared) the suggestion is dropped rather than
    /// overwriting newer input.
    pub fn finish_rephrase(
        &mut self,
        request: &RephraseRequest,
        result: Result<String, RephraseError>,
    ) -> Result<(), BoardError> {
        self.rephrasing = false;
        match result {
            Ok(_) if self.form.body != request.text => {
                self.notify(Tone::Info, "Your draft changed while rephrasing; suggestion discarded.");
                Ok(())
            }
            Ok(text) => {
                self.form.body = text;
                self.notify(Tone::Success, "Text rephrased successfully! ✨");
                Ok(())
            }
            Err(err) => {
                self.notify(Tone::Error, format!("Failed to rephrase: {err} ⚠️"));
                Err(err.into())
            }
        }
    }

    // ─── Refresh ────────────────────────────────────────────────────────

    pub fn begin_refresh(&mut self) -> Result<(), BoardError> {
        if self.refreshing.is_some() {
            return Err(self.busy("refresh"));
        }
        self.refreshing = Some(RefreshJournal::default());
        Ok(())
    }

    /// Loading the feed is silent on success; only failures notify.
    ///
    /// Posts and deletes confirmed after the snapshot was requested are
    /// replayed on top of it.
    pub fn finish_refresh(&mut self, result: Result<Vec<Message>, StoreError>) -> Result<usize, BoardError> {
        let journal = self.refreshing.take().unwrap_or_default();
        match result {
            Ok(snapshot) => {
                let mut merged = merge_snapshot(&self.messages, snapshot);
                for message in journal.added {
                    if !merged.iter().any(|m| m.id == message.id) {
                        merged.push(message);
                    }
                }
                merged.retain(|m| !journal.removed.contains(&m.id));
                self.messages = merged;
                Ok(self.messages.len())
            }
            Err(err) => {
                self.notify(Tone::Error, format!("Could not load messages: {err} ⚠️"));
                Err(err.into())
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Access to the single owner of a [`BoardState`].
///
/// Implementations hand out a mutable borrow for the duration of `f` only.
pub trait BoardHandle {
    fn update<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R;
}

impl BoardHandle for RefCell<BoardState> {
    fn update<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

impl<H: BoardHandle> BoardHandle for Rc<H> {
    fn update<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        (**self).update(f)
    }
}
