//! Development server for the board front end.
//!
//! Serves the built UI and forwards `/api/<path>` to `<upstream>/<path>`, so
//! the browser can reach the rephrase webhook without CORS configuration on
//! the webhook host.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path as UrlPath, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream url {url}: {reason}")]
    InvalidUpstream { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),
    #[error("upstream request failed: {0}")]
    Upstream(reqwest::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!("{self}");
        let status = match self {
            ProxyError::Upstream(ref e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

pub struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

impl ProxyState {
    pub fn new(upstream: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let parsed = reqwest::Url::parse(upstream).map_err(|e| ProxyError::InvalidUpstream {
            url: upstream.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidUpstream {
                url: upstream.to_string(),
                reason: "scheme must be http or https".into(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProxyError::Client)?;
        Ok(Self {
            client,
            upstream: upstream.trim_end_matches('/').to_string(),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

/// `<upstream>/<path>[?query]`.
pub fn upstream_url(upstream: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!(
        "{}/{}",
        upstream.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(q);
    }
    url
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    upstream: String,
}

async fn health_handler(State(state): State<Arc<ProxyState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        upstream: state.upstream.clone(),
    })
}

async fn forward_handler(
    State(state): State<Arc<ProxyState>>,
    UrlPath(path): UrlPath<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let url = upstream_url(&state.upstream, &path, uri.query());
    tracing::debug!(%method, %url, bytes = body.len(), "forwarding");

    let mut request = state.client.request(method, &url).body(body);
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type.clone());
    }
    let upstream = request.send().await.map_err(ProxyError::Upstream)?;

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream.bytes().await.map_err(ProxyError::Upstream)?;
    if !status.is_success() {
        tracing::info!(%url, %status, "upstream answered with an error status");
    }

    let mut response = (status, bytes).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

/// Build the proxy router. With `dist`, unknown paths are served from that
/// directory, falling back to its `index.html`.
pub fn router(state: ProxyState, dist: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/{*path}", any(forward_handler))
        .with_state(Arc::new(state));

    if let Some(dist) = dist {
        let index = ServeFile::new(dist.join("index.html"));
        app = app.fallback_service(ServeDir::new(dist).not_found_service(index));
    }

    app.layer(cors).layer(TraceLayer::new_for_http())
}
