use std::cell::RefCell;
use std::rc::Rc;

use chrono::Duration;
use tokio::task::yield_now;

use board_common::board::BoardState;
use board_common::controller;
use board_common::error::{BoardError, RephraseError, StoreError, ValidationError};
use board_common::feed::{SortMode, TAB_INDENT};
use board_common::memory::MemoryDocuments;
use board_common::message::{Color, FormData, MessageId};
use board_common::notification::Tone;
use board_common::store::{DocumentStore, MessageStore};
use board_flows::{epoch, valid_form, FakeRephraser, Gate, Gated, SlowSnapshot, TestBoard};

/// An email without `@` never reaches the store.
#[tokio::test]
async fn invalid_email_is_rejected_locally() {
    let t = TestBoard::new();
    let mut form = valid_form("Alice");
    form.email = "not-an-email".into();
    t.fill_form(form.clone());

    let err = controller::submit(&t.board, &t.store).await.unwrap_err();

    assert_eq!(err, BoardError::Validation(ValidationError::InvalidEmail));
    assert_eq!(t.docs().calls().total(), 0);
    let board = t.board.borrow();
    assert!(!board.is_submitting());
    assert_eq!(board.form, form);
    assert_eq!(board.notification().unwrap().tone, Tone::Warning);
}

/// A valid submission lands in the store and in the feed, and clears the form.
#[tokio::test]
async fn submit_appends_and_clears_form() {
    let t = TestBoard::new();
    t.fill_form(valid_form("Charlie"));

    let saved = controller::submit(&t.board, &t.store).await.unwrap();

    assert_eq!(saved.likes, 0);
    assert!(Color::PALETTE.contains(&saved.color));
    assert_eq!(t.docs().get(&saved.id).unwrap().name, "Charlie");
    let board = t.board.borrow();
    assert_eq!(board.messages, vec![saved]);
    assert_eq!(board.form, FormData::default());
    assert_eq!(board.notification().unwrap().tone, Tone::Success);
}

/// A store outage keeps what the visitor typed and re-enables the form.
#[tokio::test]
async fn submit_during_outage_keeps_the_draft() {
    let t = TestBoard::new();
    t.docs().set_available(false);
    t.fill_form(valid_form("Diana"));

    let err = controller::submit(&t.board, &t.store).await.unwrap_err();

    assert!(matches!(err, BoardError::Store(StoreError::Unavailable(_))));
    let board = t.board.borrow();
    assert!(!board.is_submitting());
    assert_eq!(board.form, valid_form("Diana"));
    assert!(board.messages.is_empty());
    assert_eq!(board.notification().unwrap().tone, Tone::Error);
}

/// With 100 stored messages, the 101st evicts the least-liked, oldest one.
#[tokio::test]
async fn hundred_and_first_message_evicts_one() {
    let t = TestBoard::new();
    let seeded = t.seed(100).await;
    // Give every message a like except seeded[3] and seeded[40]; both stay at
    // zero and seeded[3] is older.
    for (i, m) in seeded.iter().enumerate() {
        if i != 3 && i != 40 {
            controller::like(&t.board, &t.store, &m.id).await.unwrap();
        }
    }
    let deletes_before = t.docs().calls().delete;
    t.fill_form(valid_form("Overflow"));

    let saved = controller::submit(&t.board, &t.store).await.unwrap();

    assert_eq!(t.docs().calls().delete - deletes_before, 1);
    assert_eq!(t.docs().len(), 100);
    assert!(t.docs().get(&seeded[3].id).is_none());
    assert!(t.docs().get(&seeded[40].id).is_some());
    assert!(t.docs().get(&saved.id).is_some());

    {
        let board = t.board.borrow();
        assert_eq!(board.messages.len(), 100);
        assert!(board.message(&seeded[3].id).is_none());
        assert!(board.message(&saved.id).is_some());
    }

    controller::refresh(&t.board, &t.store).await.unwrap();
    assert_eq!(t.board.borrow().messages.len(), 100);
}

/// Two sequential likes add exactly two, and local and remote agree.
#[tokio::test]
async fn liking_twice_adds_two() {
    let t = TestBoard::new();
    let seeded = t.seed(1).await;
    let id = seeded[0].id.clone();

    assert_eq!(controller::like(&t.board, &t.store, &id).await, Ok(1));
    assert_eq!(controller::like(&t.board, &t.store, &id).await, Ok(2));

    assert_eq!(t.docs().get(&id).unwrap().likes, 2);
    assert_eq!(t.board.borrow().message(&id).unwrap().likes, 2);
}

/// A like that fails remotely does not move the local count.
#[tokio::test]
async fn failed_like_is_not_applied() {
    let t = TestBoard::new();
    let id = t.seed(1).await[0].id.clone();
    t.docs().set_available(false);

    assert!(controller::like(&t.board, &t.store, &id).await.is_err());

    let board = t.board.borrow();
    assert_eq!(board.message(&id).unwrap().likes, 0);
    assert!(!board.is_liking(&id));
    assert_eq!(board.notification().unwrap().tone, Tone::Error);
}

/// Deleting an id that is not displayed is a no-op and never panics.
#[tokio::test]
async fn deleting_unknown_id_is_a_no_op() {
    let t = TestBoard::new();
    t.seed(2).await;
    let calls_before = t.docs().calls();

    let err = controller::delete(&t.board, &t.store, &MessageId::from("nope"))
        .await
        .unwrap_err();

    assert_eq!(err, BoardError::UnknownMessage(MessageId::from("nope")));
    assert_eq!(t.board.borrow().messages.len(), 2);
    assert_eq!(t.docs().calls(), calls_before);
}

/// Delete removes the message only once the store confirms.
#[tokio::test]
async fn delete_waits_for_the_store() {
    let t = TestBoard::new();
    let seeded = t.seed(2).await;
    let keep = seeded[0].id.clone();
    let doomed = seeded[1].id.clone();

    t.docs().set_available(false);
    assert!(controller::delete(&t.board, &t.store, &doomed).await.is_err());
    assert!(t.board.borrow().message(&doomed).is_some());

    t.docs().set_available(true);
    controller::delete(&t.board, &t.store, &doomed).await.unwrap();
    let board = t.board.borrow();
    assert!(board.message(&doomed).is_none());
    assert!(board.message(&keep).is_some());
    assert!(t.docs().get(&doomed).is_none());
}

/// A message already removed remotely disappears locally without an error.
#[tokio::test]
async fn deleting_a_remotely_evicted_message_succeeds() {
    let t = TestBoard::new();
    let id = t.seed(1).await[0].id.clone();
    t.store.delete(&id).await.unwrap();

    controller::delete(&t.board, &t.store, &id).await.unwrap();

    let board = t.board.borrow();
    assert!(board.messages.is_empty());
    assert_eq!(board.notification().unwrap().tone, Tone::Info);
}

/// An empty draft is never sent to the rephrase service.
#[tokio::test]
async fn rephrase_with_empty_body_makes_no_call() {
    let t = TestBoard::new();
    let mut form = valid_form("Bob");
    form.body = "   ".into();
    t.fill_form(form);
    let rephraser = FakeRephraser::answering("unused");

    let err = controller::rephrase(&t.board, &rephraser).await.unwrap_err();

    assert_eq!(err, BoardError::Validation(ValidationError::EmptyBody));
    assert_eq!(rephraser.calls(), 0);
    let board = t.board.borrow();
    assert!(!board.is_rephrasing());
    assert_eq!(board.notification().unwrap().tone, Tone::Warning);
}

#[tokio::test]
async fn rephrase_replaces_the_body() {
    let t = TestBoard::new();
    let mut form = valid_form("Bob");
    form.signature = "Bob @ DesignHub".into();
    t.fill_form(form);
    let rephraser = FakeRephraser::answering("The design is spot on.");

    controller::rephrase(&t.board, &rephraser).await.unwrap();

    assert_eq!(t.board.borrow().form.body, "The design is spot on.");
    let sent = rephraser.last_request().unwrap();
    assert_eq!(sent.signature, "Bob @ DesignHub");
    assert_eq!(sent.email, "bob@techco.com");
}

#[tokio::test]
async fn failed_rephrase_names_the_status() {
    let t = TestBoard::new();
    t.fill_form(valid_form("Bob"));
    let rephraser = FakeRephraser::failing(RephraseError::Status(503));

    let err = controller::rephrase(&t.board, &rephraser).await.unwrap_err();

    assert_eq!(err, BoardError::Rephrase(RephraseError::Status(503)));
    let board = t.board.borrow();
    assert_eq!(board.form.body, valid_form("Bob").body);
    assert!(!board.is_rephrasing());
    assert!(board.notification().unwrap().text.contains("503"));
}

/// Likes on two different messages are pending at the same time.
#[tokio::test]
async fn concurrent_likes_have_independent_flags() {
    let gate = Gate::closed();
    let store = MessageStore::new(Gated {
        inner: MemoryDocuments::stepped(epoch(), Duration::seconds(1)),
        gate: gate.clone(),
    });
    let draft_a = valid_form("A").to_draft(Color::Red).unwrap();
    let draft_b = valid_form("B").to_draft(Color::Teal).unwrap();
    let a = store.documents().inner.create(&draft_a);
    let b = store.documents().inner.create(&draft_b);
    let (a, b) = futures::join!(a, b);
    let (a, b) = (a.unwrap(), b.unwrap());
    let board = Rc::new(RefCell::new(BoardState::with_messages(vec![a.clone(), b.clone()])));

    let observer = async {
        yield_now().await;
        {
            let state = board.borrow();
            assert!(state.is_liking(&a.id));
            assert!(state.is_liking(&b.id));
        }
        // A second like on a message that is already pending is refused.
        assert_eq!(
            controller::like(&board, &store, &a.id).await,
            Err(BoardError::Busy)
        );
        {
            let state = board.borrow();
            let note = state.notification().unwrap();
            assert_eq!(note.tone, Tone::Info);
            assert!(note.text.contains("like"));
        }
        gate.open();
    };

    let (ra, rb, ()) = futures::join!(
        controller::like(&board, &store, &a.id),
        controller::like(&board, &store, &b.id),
        observer,
    );

    assert_eq!(ra, Ok(1));
    assert_eq!(rb, Ok(1));
    let state = board.borrow();
    assert!(!state.is_liking(&a.id));
    assert!(!state.is_liking(&b.id));
}

/// A submit can go through while a rephrase is still pending.
#[tokio::test]
async fn submit_is_not_blocked_by_rephrase() {
    let t = TestBoard::new();
    t.fill_form(valid_form("Eve"));
    let gate = Gate::closed();
    let rephraser = FakeRephraser::answering("Polished text.").gated(gate.clone());

    let posting = async {
        yield_now().await;
        assert!(t.board.borrow().is_rephrasing());
        let saved = controller::submit(&t.board, &t.store).await;
        gate.open();
        saved
    };

    let (rephrased, saved) = futures::join!(controller::rephrase(&t.board, &rephraser), posting);

    assert!(saved.is_ok());
    // The form was cleared by the post, so the late suggestion is dropped.
    assert_eq!(rephrased, Ok(()));
    let board = t.board.borrow();
    assert_eq!(board.form.body, "");
    assert!(!board.is_rephrasing());
    assert!(!board.is_submitting());
}

/// A post confirmed while an older refresh is pending stays on the feed.
#[tokio::test]
async fn post_survives_a_stale_refresh() {
    let gate = Gate::closed();
    let store = MessageStore::new(SlowSnapshot::new(
        MemoryDocuments::stepped(epoch(), Duration::seconds(1)),
        gate.clone(),
    ));
    let board = Rc::new(RefCell::new(BoardState::new()));
    board.borrow_mut().form = valid_form("Frank");

    let posting = async {
        yield_now().await;
        assert!(board.borrow().is_refreshing());
        let saved = controller::submit(&board, &store).await;
        gate.open();
        saved
    };

    let (shown, saved) = futures::join!(controller::refresh(&board, &store), posting);

    let saved = saved.unwrap();
    assert_eq!(shown, Ok(1));
    assert!(board.borrow().message(&saved.id).is_some());
    assert!(store.documents().inner.get(&saved.id).is_some());
}

/// A delete confirmed while an older refresh is pending is not undone by it.
#[tokio::test]
async fn delete_survives_a_stale_refresh() {
    let gate = Gate::closed();
    let store = MessageStore::new(SlowSnapshot::new(
        MemoryDocuments::stepped(epoch(), Duration::seconds(1)),
        gate.clone(),
    ));
    let doomed = store
        .documents()
        .inner
        .create(&valid_form("Gina").to_draft(Color::Indigo).unwrap())
        .await
        .unwrap();
    let board = Rc::new(RefCell::new(BoardState::with_messages(vec![doomed.clone()])));

    let deleting = async {
        yield_now().await;
        assert!(board.borrow().is_refreshing());
        let deleted = controller::delete(&board, &store, &doomed.id).await;
        gate.open();
        deleted
    };

    let (shown, deleted) = futures::join!(controller::refresh(&board, &store), deleting);

    assert_eq!(deleted, Ok(()));
    assert_eq!(shown, Ok(0));
    assert!(board.borrow().messages.is_empty());
    assert_eq!(store.documents().inner.len(), 0);
}

/// Feed order follows the selected mode.
#[tokio::test]
async fn feed_ordering_switches_with_sort_mode() {
    let t = TestBoard::new();
    let seeded = t.seed(3).await;
    controller::like(&t.board, &t.store, &seeded[0].id).await.unwrap();

    let mut board = t.board.borrow_mut();
    let latest: Vec<_> = board.feed().iter().map(|m| m.id.clone()).collect();
    assert_eq!(latest, [seeded[2].id.clone(), seeded[1].id.clone(), seeded[0].id.clone()]);

    board.sort_mode = SortMode::Likes;
    let liked: Vec<_> = board.feed().iter().map(|m| m.id.clone()).collect();
    // seeded[1] and seeded[2] tie at zero and keep their stored order.
    assert_eq!(liked, [seeded[0].id.clone(), seeded[1].id.clone(), seeded[2].id.clone()]);
}

#[test]
fn body_formatting_matches_the_feed() {
    let lines = board_common::feed::format_body("a\n\tb");
    assert_eq!(lines, ["a".to_string(), format!("{TAB_INDENT}b")]);
}
