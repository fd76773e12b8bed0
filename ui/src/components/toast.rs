use std::time::Duration;

use dioxus::prelude::*;

use board_common::board::BoardHandle;
use board_common::notification::{Tone, NOTIFICATION_TTL};

use super::board_state::use_board;

/// The current notification, dismissed after [`NOTIFICATION_TTL`].
#[component]
pub fn Toast() -> Element {
    let board = use_board();
    let current_id = use_memo(move || board.state().read().notification().map(|n| n.id));

    // One timer per notification. A newer notification replaces the old one,
    // and the old timer's dismiss then no-ops on the id mismatch.
    use_effect(move || {
        if let Some(id) = current_id() {
            spawn(async move {
                sleep(NOTIFICATION_TTL).await;
                board.update(|b| b.dismiss_notification(id));
            });
        }
    });

    let Some(notification) = board.state().read().notification().cloned() else {
        return rsx! {};
    };
    let tone_class = match notification.tone {
        Tone::Success => "border-green-500",
        Tone::Info => "border-indigo-500",
        Tone::Warning => "border-yellow-500",
        Tone::Error => "border-red-500",
    };
    let id = notification.id;

    rsx! {
        div {
            class: "fixed top-4 right-4 bg-white px-6 py-3 rounded-lg shadow-lg z-50 border-l-4 {tone_class}",
            onclick: move |_| {
                board.update(|b| b.dismiss_notification(id));
            },
            "{notification.text}"
        }
    }
}

#[cfg(target_family = "wasm")]
async fn sleep(duration: Duration) {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

// Non-WASM: notifications stay until clicked
#[cfg(not(target_family = "wasm"))]
async fn sleep(_duration: Duration) {
    futures::future::pending::<()>().await;
}
