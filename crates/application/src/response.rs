//! Normalized response returned by the transport selector.

use std::fmt;

use relaydesk_domain::{ApiError, Headers};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, OnceCell};

use crate::ports::{BodyReader, RawResponse, TransportKind};

/// A response in the same shape whichever transport served it.
///
/// The body is read lazily and at most once: the first call to
/// [`text`](Self::text) or [`json`](Self::json) consumes the underlying
/// reader and caches the text, later calls reuse the cache.
pub struct TransportResponse {
    status: u16,
    headers: Headers,
    url: String,
    transport: TransportKind,
    reader: Mutex<Option<Box<dyn BodyReader>>>,
    text: OnceCell<String>,
}

impl TransportResponse {
    /// Wraps a raw transport response.
    #[must_use]
    pub fn new(url: impl Into<String>, transport: TransportKind, raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            url: url.into(),
            transport,
            reader: Mutex::new(Some(raw.body)),
            text: OnceCell::new(),
        }
    }

    /// Returns true if the status is in `[200, 300)`.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the URL the request was sent to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the transport that served the request.
    #[must_use]
    pub const fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Reads the body as text.
    ///
    /// # Errors
    ///
    /// Returns a parse-kind error if the body cannot be read. A failed
    /// read consumes the reader, so every later call fails the same way.
    pub async fn text(&self) -> Result<&str, ApiError> {
        self.text
            .get_or_try_init(|| async {
                let reader = self.reader.lock().await.take();
                let Some(reader) = reader else {
                    return Err(ApiError::parse(
                        self.status,
                        self.url.clone(),
                        "response body was already consumed",
                    ));
                };
                reader.read_text().await.map_err(|error| {
                    ApiError::parse(self.status, self.url.clone(), error.to_string())
                })
            })
            .await
            .map(String::as_str)
    }

    /// Parses the body as JSON. An empty body parses as `{}`.
    ///
    /// # Errors
    ///
    /// Returns a parse-kind error if the body cannot be read or is not
    /// valid JSON for `T`.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let text = self.text().await?;
        let text = if text.trim().is_empty() { "{}" } else { text };
        serde_json::from_str(text)
            .map_err(|error| ApiError::parse(self.status, self.url.clone(), error.to_string()))
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("transport", &self.transport)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use relaydesk_domain::ApiErrorKind;
    use serde_json::{Value, json};

    use crate::ports::TransportError;

    /// Body that counts how often it was read.
    struct CountingBody {
        text: Result<String, TransportError>,
        reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BodyReader for CountingBody {
        async fn read_text(self: Box<Self>) -> Result<String, TransportError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.text
        }
    }

    fn response_with(
        status: u16,
        text: Result<String, TransportError>,
    ) -> (TransportResponse, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let raw = RawResponse {
            status,
            headers: Headers::new(),
            body: Box::new(CountingBody {
                text,
                reads: Arc::clone(&reads),
            }),
        };
        (
            TransportResponse::new("/api/ping", TransportKind::Native, raw),
            reads,
        )
    }

    #[test]
    fn ok_follows_status_range() {
        for (status, ok) in [(199, false), (200, true), (204, true), (299, true), (300, false), (404, false)] {
            let raw = RawResponse::text(status, Headers::new(), "");
            let response = TransportResponse::new("/x", TransportKind::Native, raw);
            assert_eq!(response.ok(), ok, "status {status}");
        }
    }

    #[tokio::test]
    async fn json_reads_the_body_once_and_caches_it() {
        let (response, reads) = response_with(200, Ok(r#"{"message":"pong"}"#.to_string()));

        let first: Value = response.json().await.unwrap();
        let second: Value = response.json().await.unwrap();

        assert_eq!(first, json!({"message": "pong"}));
        assert_eq!(first, second);
        assert_eq!(response.text().await.unwrap(), r#"{"message":"pong"}"#);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_body_parses_as_empty_object() {
        let (response, _) = response_with(204, Ok("  ".to_string()));
        let value: Value = response.json().await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let (response, _) = response_with(200, Ok("plain text".to_string()));

        let error = response.json::<Value>().await.unwrap_err();

        assert_eq!(error.kind, ApiErrorKind::Parse);
        assert_eq!(error.status, 200);
        // The text itself is still available.
        assert_eq!(response.text().await.unwrap(), "plain text");
    }

    #[tokio::test]
    async fn failed_read_fails_deterministically() {
        let (response, reads) =
            response_with(200, Err(TransportError::Body("connection reset".to_string())));

        let first = response.text().await.unwrap_err();
        let second = response.text().await.unwrap_err();

        assert!(first.details.unwrap().contains("connection reset"));
        assert!(second.details.unwrap().contains("already consumed"));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }
}
