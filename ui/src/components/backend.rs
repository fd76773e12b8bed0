//! Remote collaborators the board talks to, chosen at startup.

use std::rc::Rc;

use chrono::{Duration, Utc};
use dioxus::prelude::*;

use board_common::error::StoreError;
use board_common::firestore::FirestoreDocuments;
use board_common::memory::MemoryDocuments;
use board_common::message::{Color, Message, MessageDraft, MessageId};
use board_common::rephrase::WebhookRephraser;
use board_common::store::{DocumentStore, MessageStore};

use super::config;
use super::fetch::FetchTransport;

/// Where messages live.
pub enum Backend {
    Firestore(FirestoreDocuments<FetchTransport>),
    /// In-browser store, used when no Firestore project is configured.
    Offline(MemoryDocuments),
}

impl Backend {
    pub fn from_env() -> Self {
        match config::firestore_config() {
            Some(cfg) => {
                tracing::info!(project = %cfg.project_id, collection = %cfg.collection, "using firestore");
                Backend::Firestore(FirestoreDocuments::new(cfg, FetchTransport))
            }
            None => {
                tracing::info!("no firestore project configured, messages stay in this tab");
                let docs = MemoryDocuments::new();
                if cfg!(feature = "example-data") {
                    docs.seed(example_messages());
                }
                Backend::Offline(docs)
            }
        }
    }
}

impl DocumentStore for Backend {
    async fn create(&self, draft: &MessageDraft) -> Result<Message, StoreError> {
        match self {
            Backend::Firestore(docs) => docs.create(draft).await,
            Backend::Offline(docs) => docs.create(draft).await,
        }
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        match self {
            Backend::Firestore(docs) => docs.list().await,
            Backend::Offline(docs) => docs.list().await,
        }
    }

    async fn increment_likes(&self, id: &MessageId) -> Result<u32, StoreError> {
        match self {
            Backend::Firestore(docs) => docs.increment_likes(id).await,
            Backend::Offline(docs) => docs.increment_likes(id).await,
        }
    }

    async fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        match self {
            Backend::Firestore(docs) => docs.delete(id).await,
            Backend::Offline(docs) => docs.delete(id).await,
        }
    }

    fn backend_name(&self) -> &str {
        match self {
            Backend::Firestore(docs) => docs.backend_name(),
            Backend::Offline(docs) => docs.backend_name(),
        }
    }
}

/// Store and rephraser shared by every component.
pub struct Services {
    pub store: MessageStore<Backend>,
    pub rephraser: WebhookRephraser<FetchTransport>,
}

impl Services {
    pub fn from_env() -> Self {
        Self {
            store: MessageStore::with_capacity(Backend::from_env(), config::capacity()),
            rephraser: WebhookRephraser::new(config::rephrase_url(), FetchTransport),
        }
    }
}

pub fn use_services() -> Rc<Services> {
    use_context::<Rc<Services>>()
}

/// Sample messages for development.
fn example_messages() -> Vec<Message> {
    let now = Utc::now();
    let samples = [
        (
            "Alice",
            "TechCo",
            "alice@techco.com",
            "Love this project!\n\tIt's amazing how it all came together.\n\tGreat work team!",
            25,
            Color::Pink,
        ),
        (
            "Bob",
            "DesignHub",
            "bob@designhub.io",
            "Amazing work everyone!\n\tThe design is spot on\n\tLooking forward to more!",
            15,
            Color::Purple,
        ),
        (
            "Charlie",
            "DevInc",
            "charlie@devinc.dev",
            "Keep it up!\n\tThis is exactly what we needed\n\tPerfect implementation",
            45,
            Color::Blue,
        ),
        (
            "Diana",
            "CreativeLab",
            "diana@creativelab.com",
            "This is fantastic!\n\tLove the attention to detail\n\tCan't wait to see what's next",
            30,
            Color::Green,
        ),
    ];
    samples
        .into_iter()
        .enumerate()
        .map(|(i, (name, company, email, body, likes, color))| Message {
            id: MessageId(format!("sample-{}", i + 1)),
            name: name.into(),
            company: company.into(),
            email: email.into(),
            body: body.into(),
            likes,
            color,
            timestamp: now - Duration::minutes(10 - i as i64),
        })
        .collect()
}
