//! Compile-time configuration.
//!
//! Set at build time, e.g.
//! `BOARD_FIRESTORE_PROJECT=my-board BOARD_FIRESTORE_API_KEY=... dx build`.
//! Without a project id the board runs against an in-browser store.

use board_common::firestore::{FirestoreConfig, DEFAULT_COLLECTION};
use board_common::store::DEFAULT_CAPACITY;

/// Path the dev proxy forwards to the rephrase webhook.
const DEFAULT_REPHRASE_URL: &str = "/api/rephrase";

fn non_empty(value: Option<&'static str>) -> Option<&'static str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Firestore settings, or `None` when no project is configured.
pub fn firestore_config() -> Option<FirestoreConfig> {
    let project = non_empty(option_env!("BOARD_FIRESTORE_PROJECT"))?;
    let api_key = option_env!("BOARD_FIRESTORE_API_KEY").unwrap_or_default();
    let collection = non_empty(option_env!("BOARD_COLLECTION")).unwrap_or(DEFAULT_COLLECTION);
    Some(FirestoreConfig::new(project, api_key).with_collection(collection))
}

pub fn rephrase_url() -> &'static str {
    non_empty(option_env!("BOARD_REPHRASE_URL")).unwrap_or(DEFAULT_REPHRASE_URL)
}

pub fn capacity() -> usize {
    option_env!("BOARD_CAPACITY")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_CAPACITY)
}
