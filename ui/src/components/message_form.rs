use dioxus::prelude::*;

use board_common::board::BoardHandle;
use board_common::controller;

use super::backend::use_services;
use super::board_state::use_board;

const INPUT_CLASS: &str = "mt-1 block w-full rounded-md border border-gray-300 px-3 py-2 shadow-sm focus:border-indigo-500 focus:outline-none focus:ring-1 focus:ring-indigo-500";

#[component]
pub fn MessageForm() -> Element {
    let board = use_board();
    let services = use_services();

    let state = board.state();
    let guard = state.read();
    let form = guard.form.clone();
    let is_submitting = guard.is_submitting();
    let is_rephrasing = guard.is_rephrasing();
    drop(guard);

    let submit_services = services.clone();
    let rephrase_services = services;

    rsx! {
        form {
            class: "space-y-4",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let services = submit_services.clone();
                spawn(async move {
                    if let Err(e) = controller::submit(&board, &services.store).await {
                        tracing::debug!("submit not completed: {e}");
                    }
                });
            },
            h2 { class: "text-2xl font-bold text-gray-800 mb-6", "Share Your Thoughts" }

            div {
                label { class: "block text-sm font-medium text-gray-700", "Name *" }
                input {
                    r#type: "text",
                    class: INPUT_CLASS,
                    placeholder: "John Doe",
                    value: "{form.name}",
                    oninput: move |evt| board.update(|b| b.form.name = evt.value()),
                }
            }
            div {
                label { class: "block text-sm font-medium text-gray-700", "Company *" }
                input {
                    r#type: "text",
                    class: INPUT_CLASS,
                    placeholder: "Company Name",
                    value: "{form.company}",
                    oninput: move |evt| board.update(|b| b.form.company = evt.value()),
                }
            }
            div {
                label { class: "block text-sm font-medium text-gray-700", "Email *" }
                input {
                    r#type: "email",
                    class: INPUT_CLASS,
                    placeholder: "john@example.com",
                    value: "{form.email}",
                    oninput: move |evt| board.update(|b| b.form.email = evt.value()),
                }
            }
            div {
                label { class: "block text-sm font-medium text-gray-700", "Message *" }
                div { class: "relative",
                    textarea {
                        class: "{INPUT_CLASS} font-mono",
                        rows: "4",
                        placeholder: "Share your thoughts...",
                        value: "{form.body}",
                        oninput: move |evt| board.update(|b| b.form.body = evt.value()),
                        // Tab inserts a tab character instead of moving focus
                        onkeydown: move |evt: KeyboardEvent| {
                            if evt.key() == Key::Tab {
                                evt.prevent_default();
                                board.update(|b| b.form.body.push('\t'));
                            }
                        },
                    }
                    button {
                        r#type: "button",
                        class: if is_rephrasing {
                            "absolute right-2 top-2 p-2 rounded-md text-white bg-purple-400 cursor-not-allowed"
                        } else {
                            "absolute right-2 top-2 p-2 rounded-md text-white bg-purple-600 hover:bg-purple-700"
                        },
                        title: "Rephrase text",
                        disabled: is_rephrasing,
                        onclick: move |_| {
                            let services = rephrase_services.clone();
                            spawn(async move {
                                if let Err(e) = controller::rephrase(&board, &services.rephraser).await {
                                    tracing::debug!("rephrase not applied: {e}");
                                }
                            });
                        },
                        if is_rephrasing { "…" } else { "✨" }
                    }
                }
                p { class: "mt-1 text-sm text-gray-500",
                    "Use Tab for indentation and Enter for new lines"
                }
            }
            div {
                label { class: "block text-sm font-medium text-gray-700", "Signature" }
                input {
                    r#type: "text",
                    class: INPUT_CLASS,
                    placeholder: "Your signature",
                    value: "{form.signature}",
                    oninput: move |evt| board.update(|b| b.form.signature = evt.value()),
                }
            }

            button {
                r#type: "submit",
                class: if is_submitting {
                    "w-full px-4 py-2 rounded-md text-sm font-medium text-white bg-indigo-400 cursor-not-allowed"
                } else {
                    "w-full px-4 py-2 rounded-md text-sm font-medium text-white bg-indigo-600 hover:bg-indigo-700"
                },
                disabled: is_submitting,
                if is_submitting { "Posting..." } else { "Share Message" }
            }
        }
    }
}
