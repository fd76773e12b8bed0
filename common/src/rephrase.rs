//! Client for the external text-rewriting webhook.

use scraper::Html;
use serde::Serialize;

use crate::error::RephraseError;
use crate::http::{HttpRequest, HttpTransport};
use crate::message::FormData;

/// JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RephraseRequest {
    pub text: String,
    pub name: String,
    pub company: String,
    pub email: String,
    pub signature: String,
}

impl RephraseRequest {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            text: form.body.clone(),
            name: form.name.clone(),
            company: form.company.clone(),
            email: form.email.clone(),
            signature: form.signature.clone(),
        }
    }
}

/// Anything that can rewrite a draft body.
#[allow(async_fn_in_trait)]
pub trait Rephraser {
    /// Returns the rewritten text, already reduced to plain text.
    async fn rephrase(&self, request: &RephraseRequest) -> Result<String, RephraseError>;
}

/// Reduce a response body to its text content.
///
/// The webhook answers with plain text or with an HTML fragment. Either way
/// the parser keeps only text nodes, so tags vanish and entities decode.
/// Surrounding blank space is dropped, except a leading tab.
pub fn extract_plain_text(body: &str) -> String {
    let fragment = Html::parse_fragment(body);
    let text: String = fragment.root_element().text().collect();
    text.trim_end()
        .trim_start_matches(|c: char| c.is_whitespace() && c != '\t')
        .to_string()
}

/// [`Rephraser`] that POSTs to a webhook URL.
pub struct WebhookRephraser<T> {
    url: String,
    transport: T,
}

impl<T: HttpTransport> WebhookRephraser<T> {
    pub fn new(url: impl Into<String>, transport: T) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<T: HttpTransport> Rephraser for WebhookRephraser<T> {
    async fn rephrase(&self, request: &RephraseRequest) -> Result<String, RephraseError> {
        let body = serde_json::to_string(request).map_err(|e| RephraseError::Network(e.to_string()))?;
        tracing::debug!(url = %self.url, chars = request.text.len(), "rephrase request");

        let response = self
            .transport
            .send(HttpRequest::post(self.url.clone(), body))
            .await
            .map_err(RephraseError::Network)?;
        if !response.is_success() {
            return Err(RephraseError::Status(response.status));
        }

        let text = extract_plain_text(&response.body);
        if text.trim().is_empty() {
            return Err(RephraseError::EmptyResponse);
        }
        Ok(text)
    }
}
