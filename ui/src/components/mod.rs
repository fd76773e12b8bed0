pub mod app;
pub mod backend;
pub mod board_state;
pub mod config;
pub mod feed_view;
pub mod fetch;
pub mod message_form;
pub mod toast;
