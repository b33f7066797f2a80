//! # PocketBase Client
//!
//! Typed async client for the PocketBase record API. Exposes the
//! collection CRUD surface (`create`, `get_one`, `get_first_list_item`,
//! `get_list`, `get_full_list`, `update`, `delete`) through the
//! [`RecordStore`] trait, plus a request-decoration hook used to attach
//! static headers to every outgoing call.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pocketbase_client::{Filter, PocketBase, RecordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pocketbase_client::ClientError> {
//!     let pb = PocketBase::new("http://127.0.0.1:8090")
//!         .with_static_header("x-api-key", "secret");
//!
//!     let record = pb
//!         .get_first_list_item("users", &Filter::eq("user_email", "alice@example.com"))
//!         .await?;
//!     println!("{record}");
//!     Ok(())
//! }
//! ```

mod error;
pub mod filter;
pub mod store;

pub use error::ClientError;
pub use filter::{Filter, FilterClause};
pub use store::{RecordList, RecordStore, StoreResult};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

// ─── Client Options ────────────────────────────────────────────────

/// Configuration for the PocketBase client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the PocketBase server (e.g. `http://127.0.0.1:8090`).
    pub base_url: String,

    /// HTTP request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
        }
    }
}

/// A request-decorating function applied to every outgoing request.
///
/// Supplied at construction time; the client never mutates process-wide
/// state to inject headers.
pub type BeforeSend = Arc<dyn Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder + Send + Sync>;

// ─── Client ────────────────────────────────────────────────────────

/// Async HTTP client for the PocketBase record API.
#[derive(Clone)]
pub struct PocketBase {
    http: reqwest::Client,
    base_url: String,
    before_send: Option<BeforeSend>,
}

impl PocketBase {
    /// Create a client for the given server URL with default options.
    pub fn new(base_url: &str) -> Self {
        Self::with_options(ClientOptions {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Create a client from explicit options.
    pub fn with_options(options: ClientOptions) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(options.timeout_secs))
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            before_send: None,
        }
    }

    /// Install a request decorator invoked before every send.
    pub fn with_before_send(mut self, hook: BeforeSend) -> Self {
        self.before_send = Some(hook);
        self
    }

    /// Convenience decorator: attach one static header to every request.
    pub fn with_static_header(self, name: &str, value: &str) -> Self {
        let name = name.to_string();
        let value = value.to_string();
        self.with_before_send(Arc::new(move |req| req.header(name.as_str(), value.as_str())))
    }

    /// The server base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Internal helpers ───────────────────────────────────────────

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.records_url(collection), id)
    }

    fn decorate(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.before_send {
            Some(hook) => hook(req),
            None => req,
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = self
            .decorate(req)
            .send()
            .await
            .map_err(ClientError::network)?;
        Self::handle_response(resp).await
    }

    async fn send_empty(&self, req: reqwest::RequestBuilder) -> Result<(), ClientError> {
        let resp = self
            .decorate(req)
            .send()
            .await
            .map_err(ClientError::network)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
        Err(ClientError::from_status(status.as_u16(), error_message(&body)))
    }

    /// Handle an HTTP response, mapping non-success statuses to errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp.text().await.map_err(ClientError::network)?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                ClientError::Deserialization(format!(
                    "failed to deserialize response: {e} (body: {})",
                    truncate(&body, 200)
                ))
            })
        } else {
            Err(ClientError::from_status(status.as_u16(), error_message(&body)))
        }
    }
}

/// Extract the `message` field from a PocketBase error body, falling back
/// to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...", &s[..max])
    } else {
        s.to_string()
    }
}

#[async_trait]
impl RecordStore for PocketBase {
    async fn create(&self, collection: &str, fields: Value) -> StoreResult<Value> {
        self.send_json(self.http.post(self.records_url(collection)).json(&fields))
            .await
    }

    async fn get_one(&self, collection: &str, id: &str) -> StoreResult<Value> {
        self.send_json(self.http.get(self.record_url(collection, id)))
            .await
    }

    async fn get_first_list_item(&self, collection: &str, filter: &Filter) -> StoreResult<Value> {
        let page = self.get_list(collection, 1, 1, filter).await?;
        page.items
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound {
                message: format!("no {collection} record matches the provided filter"),
            })
    }

    async fn get_list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        filter: &Filter,
    ) -> StoreResult<RecordList> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("perPage".to_string(), per_page.to_string()),
        ];
        if !filter.is_empty() {
            query.push(("filter".to_string(), filter.to_expr()));
        }

        self.send_json(self.http.get(self.records_url(collection)).query(&query))
            .await
    }

    async fn get_full_list(
        &self,
        collection: &str,
        batch: u32,
        filter: &Filter,
    ) -> StoreResult<Vec<Value>> {
        let batch = batch.max(1);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let list = self.get_list(collection, page, batch, filter).await?;
            let fetched = list.items.len();
            items.extend(list.items);
            if fetched < batch as usize {
                return Ok(items);
            }
            page += 1;
        }
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value> {
        self.send_json(
            self.http
                .patch(self.record_url(collection, id))
                .json(&fields),
        )
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.send_empty(self.http.delete(self.record_url(collection, id)))
            .await
    }
}

impl fmt::Debug for PocketBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PocketBase")
            .field("base_url", &self.base_url)
            .field("decorated", &self.before_send.is_some())
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let pb = PocketBase::new("http://127.0.0.1:8090");
        assert_eq!(
            pb.records_url("users"),
            "http://127.0.0.1:8090/api/collections/users/records"
        );
        assert_eq!(
            pb.record_url("sessions", "abc123"),
            "http://127.0.0.1:8090/api/collections/sessions/records/abc123"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let pb = PocketBase::new("http://127.0.0.1:8090/");
        assert_eq!(pb.base_url(), "http://127.0.0.1:8090");
    }

    #[test]
    fn test_debug_does_not_leak_headers() {
        let pb = PocketBase::new("http://127.0.0.1:8090").with_static_header("x-token", "secret");
        let debug = format!("{pb:?}");
        assert!(debug.contains("decorated: true"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message("{\"code\":404,\"message\":\"not here\"}"),
            "not here"
        );
        assert_eq!(error_message("plain text"), "plain text");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 200), "short");
        assert_eq!(truncate(&"x".repeat(300), 4), "xxxx...");
    }
}
