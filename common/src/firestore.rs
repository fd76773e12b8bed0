//! Firestore REST (v1) binding for [`DocumentStore`].
//!
//! Documents live in one collection. The server assigns the document id and
//! `createTime`; the latter is the message timestamp unless the document
//! carries an explicit `timestamp` field (older documents do).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::message::{Color, Message, MessageDraft, MessageId};
use crate::store::DocumentStore;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_COLLECTION: &str = "emails";

/// Page size for collection listing. Larger than the board capacity so a
/// normal board fits in one page.
const PAGE_SIZE: u32 = 300;

/// Where the collection lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: String,
    pub collection: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            api_key: api_key.into(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resource name of the documents root, as used inside request bodies.
    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// Resource name of one document.
    pub fn document_name(&self, id: &MessageId) -> String {
        format!("{}/{}/{}", self.database_path(), self.collection, id.0)
    }

    fn key_param(&self) -> String {
        format!("key={}", urlencoding::encode(&self.api_key))
    }

    pub fn collection_url(&self) -> String {
        format!(
            "{}/{}/{}?{}",
            self.base_url,
            self.database_path(),
            self.collection,
            self.key_param()
        )
    }

    pub fn list_url(&self, page_token: Option<&str>) -> String {
        let mut url = format!("{}&pageSize={PAGE_SIZE}", self.collection_url());
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    /// Delete URL guarded by an existence precondition, so a missing document
    /// answers 404 instead of a silent success.
    pub fn delete_url(&self, id: &MessageId) -> String {
        format!(
            "{}/{}?currentDocument.exists=true&{}",
            self.base_url,
            self.document_name(id),
            self.key_param()
        )
    }

    pub fn commit_url(&self) -> String {
        format!(
            "{}/{}:commit?{}",
            self.base_url,
            self.database_path(),
            self.key_param()
        )
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
    create_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// ─── Encoding ────────────────────────────────────────────────────────────────

fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

/// Request body for document creation.
pub fn encode_draft(draft: &MessageDraft) -> Value {
    json!({
        "fields": {
            "name": string_value(&draft.name),
            "company": string_value(&draft.company),
            "email": string_value(&draft.email),
            "body": string_value(&draft.body),
            "likes": { "integerValue": draft.likes.to_string() },
            "color": string_value(draft.color.tag()),
        }
    })
}

/// Commit body that adds one like, failing if the document is gone.
pub fn encode_like_increment(document_name: &str) -> Value {
    json!({
        "writes": [{
            "transform": {
                "document": document_name,
                "fieldTransforms": [{
                    "fieldPath": "likes",
                    "increment": { "integerValue": "1" }
                }]
            },
            "currentDocument": { "exists": true }
        }]
    })
}

// ─── Decoding ────────────────────────────────────────────────────────────────

fn field_str<'a>(doc: &'a Document, field: &str) -> Result<&'a str, StoreError> {
    doc.fields
        .get(field)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Malformed(format!("{}: missing string field `{field}`", doc.name)))
}

/// Firestore sends 64-bit integers as decimal strings; accept numbers too.
fn integer(value: &Value) -> Option<i64> {
    let inner = value.get("integerValue")?;
    inner
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| inner.as_i64())
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn decode_document(doc: &Document) -> Result<Message, StoreError> {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::Malformed(format!("bad document name `{}`", doc.name)))?;

    let likes = match doc.fields.get("likes") {
        Some(v) => integer(v)
            .and_then(|n| u32::try_from(n.max(0)).ok())
            .ok_or_else(|| StoreError::Malformed(format!("{}: bad `likes`", doc.name)))?,
        None => 0,
    };

    let color_tag = field_str(doc, "color")?;
    let color = Color::from_tag(color_tag)
        .ok_or_else(|| StoreError::Malformed(format!("{}: unknown color `{color_tag}`", doc.name)))?;

    let timestamp = doc
        .fields
        .get("timestamp")
        .and_then(|v| v.get("timestampValue"))
        .and_then(Value::as_str)
        .or(doc.create_time.as_deref())
        .and_then(parse_time)
        .ok_or_else(|| StoreError::Malformed(format!("{}: no timestamp", doc.name)))?;

    Ok(Message {
        id: MessageId(id.to_string()),
        name: field_str(doc, "name")?.to_string(),
        company: field_str(doc, "company")?.to_string(),
        email: field_str(doc, "email")?.to_string(),
        body: field_str(doc, "body")?.to_string(),
        likes,
        color,
        timestamp,
    })
}

/// Translate an error response. 404 (or a `NOT_FOUND` status in the body)
/// means the document is missing; everything else is an outage.
fn error_for(response: &HttpResponse, id: Option<&MessageId>) -> StoreError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(&response.body).ok();
    let not_found = response.status == 404
        || envelope
            .as_ref()
            .is_some_and(|e| e.error.status == "NOT_FOUND");

    match (not_found, id) {
        (true, Some(id)) => StoreError::NotFound(id.clone()),
        _ => {
            let detail = envelope
                .map(|e| e.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| response.body.chars().take(200).collect());
            StoreError::Unavailable(format!("HTTP {}: {detail}", response.status))
        }
    }
}

fn parse<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Firestore-backed [`DocumentStore`] over any [`HttpTransport`].
pub struct FirestoreDocuments<T> {
    config: FirestoreConfig,
    transport: T,
}

impl<T: HttpTransport> FirestoreDocuments<T> {
    pub fn new(config: FirestoreConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    async fn send(&self, request: HttpRequest, id: Option<&MessageId>) -> Result<String, StoreError> {
        tracing::debug!(method = %request.method, collection = %self.config.collection, "firestore request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(StoreError::Unavailable)?;
        if response.is_success() {
            Ok(response.body)
        } else {
            let err = error_for(&response, id);
            tracing::warn!(status = response.status, "firestore request failed: {err}");
            Err(err)
        }
    }
}

impl<T: HttpTransport> DocumentStore for FirestoreDocuments<T> {
    async fn create(&self, draft: &MessageDraft) -> Result<Message, StoreError> {
        let request = HttpRequest::post(self.config.collection_url(), encode_draft(draft).to_string());
        let body = self.send(request, None).await?;
        let doc: Document = parse(&body)?;
        decode_document(&doc)
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        let mut messages = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.config.list_url(page_token.as_deref());
            let body = self.send(HttpRequest::get(url), None).await?;
            let page: ListResponse = parse(&body)?;
            for doc in &page.documents {
                match decode_document(doc) {
                    Ok(message) => messages.push(message),
                    Err(e) => tracing::warn!("skipping undecodable document: {e}"),
                }
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(messages)
    }

    async fn increment_likes(&self, id: &MessageId) -> Result<u32, StoreError> {
        let commit = encode_like_increment(&self.config.document_name(id));
        let request = HttpRequest::post(self.config.commit_url(), commit.to_string());
        let body = self.send(request, Some(id)).await?;
        let response: CommitResponse = parse(&body)?;
        response
            .write_results
            .first()
            .and_then(|w| w.transform_results.first())
            .and_then(integer)
            .and_then(|n| u32::try_from(n.max(0)).ok())
            .ok_or_else(|| StoreError::Malformed("commit returned no like count".into()))
    }

    async fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        self.send(HttpRequest::delete(self.config.delete_url(id)), Some(id))
            .await
            .map(|_| ())
    }

    fn backend_name(&self) -> &str {
        "firestore"
    }
}
