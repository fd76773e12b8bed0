use chrono::Local;
use dioxus::prelude::*;

use board_common::board::BoardHandle;
use board_common::controller;
use board_common::feed::{format_body, SortMode};
use board_common::message::Message;

use super::backend::use_services;
use super::board_state::use_board;

/// Messages header, sort toggle, and the bubble grid.
#[component]
pub fn FeedView() -> Element {
    let board = use_board();
    let state = board.state();
    let guard = state.read();
    let count = guard.messages.len();
    let sort_mode = guard.sort_mode;
    let is_refreshing = guard.is_refreshing();
    let cards: Vec<(Message, bool, bool)> = guard
        .feed()
        .into_iter()
        .map(|m| (m.clone(), guard.is_liking(&m.id), guard.is_deleting(&m.id)))
        .collect();
    drop(guard);

    rsx! {
        div { class: "flex justify-between items-center mb-6",
            h2 { class: "text-xl font-bold text-gray-800", "Messages ({count})" }
            div { class: "flex gap-2",
                for mode in [SortMode::Latest, SortMode::Likes] {
                    button {
                        key: "{mode.label()}",
                        class: if mode == sort_mode {
                            "px-4 py-2 rounded-md text-sm font-medium bg-indigo-600 text-white"
                        } else {
                            "px-4 py-2 rounded-md text-sm font-medium bg-white text-gray-700 hover:bg-gray-50"
                        },
                        onclick: move |_| board.update(|b| b.sort_mode = mode),
                        "{mode.label()}"
                    }
                }
            }
        }
        if is_refreshing && count == 0 {
            p { class: "text-gray-500", "Loading messages..." }
        }
        div { class: "grid grid-cols-1 md:grid-cols-2 gap-6",
            for (message, liking, deleting) in cards {
                MessageCard {
                    key: "{message.id}",
                    message,
                    liking,
                    deleting,
                }
            }
        }
    }
}

#[component]
fn MessageCard(message: Message, liking: bool, deleting: bool) -> Element {
    let board = use_board();
    let services = use_services();

    let lines = format_body(&message.body);
    let min_height = 100 + message.likes;
    let date = message.timestamp.with_timezone(&Local).format("%x").to_string();
    let color = message.color.tag();

    let like_id = message.id.clone();
    let like_services = services.clone();
    let delete_id = message.id.clone();
    let delete_services = services;

    rsx! {
        div {
            class: "{color} chat-bubble rounded-2xl p-6 shadow-lg group",
            style: "min-height: {min_height}px",
            div { class: "flex justify-between items-start",
                div {
                    h3 { class: "font-bold text-white text-lg", "{message.name}" }
                    p { class: "text-sm text-white/90 font-medium", "{message.company}" }
                    p { class: "text-sm text-white/90 font-medium break-all", "{message.email}" }
                }
                button {
                    class: "opacity-0 group-hover:opacity-100 text-white/80 hover:text-white",
                    title: "Delete message",
                    disabled: deleting,
                    onclick: move |_| {
                        let id = delete_id.clone();
                        let services = delete_services.clone();
                        spawn(async move {
                            if let Err(e) = controller::delete(&board, &services.store, &id).await {
                                tracing::debug!(%id, "delete not completed: {e}");
                            }
                        });
                    },
                    "🗑"
                }
            }
            p { class: "mt-2 text-white font-medium font-mono",
                for (i, line) in lines.into_iter().enumerate() {
                    if i > 0 {
                        br {}
                    }
                    span { "{line}" }
                }
            }
            div { class: "mt-4 flex items-center justify-between",
                button {
                    class: "flex items-center space-x-2 bg-white/20 px-3 py-1 rounded-full text-white font-medium hover:bg-white/30",
                    disabled: liking,
                    onclick: move |_| {
                        let id = like_id.clone();
                        let services = like_services.clone();
                        spawn(async move {
                            if let Err(e) = controller::like(&board, &services.store, &id).await {
                                tracing::debug!(%id, "like not recorded: {e}");
                            }
                        });
                    },
                    "❤ {message.likes}"
                }
                span { class: "text-sm text-white/80", "{date}" }
            }
        }
    }
}
