use thiserror::Error;

use crate::message::{FormField, MessageId};

/// Local input problems, caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill in the {0} field")]
    MissingField(FormField),
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("please enter some text to rephrase")]
    EmptyBody,
}

/// Failures reported by the message store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message {0} does not exist")]
    NotFound(MessageId),
    #[error("message store unavailable: {0}")]
    Unavailable(String),
    /// The store answered with a document we could not decode.
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Failures from the external rephrase webhook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RephraseError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("the rephrase service returned no text")]
    EmptyResponse,
}

/// Error surfaced at the boundary of a user action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Rephrase(#[from] RephraseError),
    /// The same action is already pending.
    #[error("another request is already in flight")]
    Busy,
    /// The message is not in the locally displayed list.
    #[error("message {0} is no longer on the board")]
    UnknownMessage(MessageId),
}
