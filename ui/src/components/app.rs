use std::rc::Rc;

use dioxus::prelude::*;

use board_common::controller;

use super::backend::Services;
use super::board_state::BoardSignal;
use super::feed_view::FeedView;
use super::message_form::MessageForm;
use super::toast::Toast;

#[component]
pub fn App() -> Element {
    let services = use_context_provider(|| Rc::new(Services::from_env()));
    let board = use_context_provider(BoardSignal::new);

    // Initial feed load
    use_effect(move || {
        let services = services.clone();
        spawn(async move {
            match controller::refresh(&board, &services.store).await {
                Ok(count) => tracing::debug!(
                    count,
                    backend = services.store.documents().backend_name(),
                    "feed loaded"
                ),
                Err(e) => tracing::warn!("initial load failed: {e}"),
            }
        });
    });

    rsx! {
        div { class: "min-h-screen bg-gray-100 flex flex-col md:flex-row relative",
            Toast {}
            div { class: "w-full md:w-1/3 bg-white p-6 shadow-lg",
                MessageForm {}
            }
            div { class: "w-full md:w-2/3 p-8 overflow-auto",
                FeedView {}
            }
        }
    }
}
