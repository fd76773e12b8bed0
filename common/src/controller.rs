//! Async drivers for the board's user actions.
//!
//! Each driver is `begin` → remote call → `finish` against a [`BoardHandle`].
//! The state is only touched inside `update` closures, never across an
//! await, so any number of drivers can be pending on one thread at once.

use crate::board::BoardHandle;
use crate::error::BoardError;
use crate::message::{Color, Message, MessageId};
use crate::rephrase::Rephraser;
use crate::store::{DocumentStore, MessageStore};

/// Validate the form and post it.
pub async fn submit<H, D>(board: &H, store: &MessageStore<D>) -> Result<Message, BoardError>
where
    H: BoardHandle,
    D: DocumentStore,
{
    let color = Color::random(&mut rand::thread_rng());
    let draft = board.update(|b| b.begin_submit(color))?;
    let result = store.save(&draft).await;
    board.update(|b| b.finish_submit(result))
}

/// Add one like to a displayed message.
pub async fn like<H, D>(board: &H, store: &MessageStore<D>, id: &MessageId) -> Result<u32, BoardError>
where
    H: BoardHandle,
    D: DocumentStore,
{
    let expected = board.update(|b| b.begin_like(id))?;
    let result = store.increment_likes(id, expected).await;
    board.update(|b| b.finish_like(id, result))
}

/// Delete a displayed message.
pub async fn delete<H, D>(board: &H, store: &MessageStore<D>, id: &MessageId) -> Result<(), BoardError>
where
    H: BoardHandle,
    D: DocumentStore,
{
    board.update(|b| b.begin_delete(id))?;
    let result = store.delete(id).await;
    board.update(|b| b.finish_delete(id, result))
}

/// Replace the draft body with a rewritten version.
pub async fn rephrase<H, R>(board: &H, rephraser: &R) -> Result<(), BoardError>
where
    H: BoardHandle,
    R: Rephraser,
{
    let request = board.update(|b| b.begin_rephrase())?;
    let result = rephraser.rephrase(&request).await;
    board.update(|b| b.finish_rephrase(&request, result))
}

/// Reload the feed from the store. Returns the number of messages shown.
pub async fn refresh<H, D>(board: &H, store: &MessageStore<D>) -> Result<usize, BoardError>
where
    H: BoardHandle,
    D: DocumentStore,
{
    board.update(|b| b.begin_refresh())?;
    let result = store.list().await;
    board.update(|b| b.finish_refresh(result))
}
