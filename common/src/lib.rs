pub mod board;
pub mod controller;
pub mod error;
pub mod feed;
pub mod firestore;
pub mod http;
pub mod message;
pub mod notification;
pub mod rephrase;
pub mod store;

#[cfg(any(test, feature = "dev"))]
pub mod memory;
