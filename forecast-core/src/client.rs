//! HTTP client for the upstream forecast provider.
//!
//! The client validates its inputs before touching the network, normalizes
//! transport/HTTP/upstream failures into [`FetchError`] and returns the
//! payload as parsed. Shape validation of a successful payload is left to
//! [`crate::summary::summarize`].

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::RawPayload;

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const UNITS: &str = "metric";
const LANG: &str = "pt_br";

/// Replacement for the API key in anything that gets logged.
const REDACTED: &str = "***";

#[derive(Debug, Error)]
pub enum FetchError {
    /// The caller passed an empty location; nothing was sent upstream.
    #[error("location must not be empty")]
    InvalidInput,
    /// No API key is configured; nothing was sent upstream.
    #[error("no API key configured")]
    ConfigurationError,
    /// Non-success HTTP status without a structured upstream error body.
    #[error("forecast request failed with HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },
    /// Error reported by the upstream API in its own `{cod, message}` shape.
    #[error("upstream error {code}: {message}")]
    Upstream { code: String, message: String },
    /// Transport failure or a response body that is not valid JSON.
    #[error("network error: {0}")]
    Network(String),
}

/// Response as seen by the client, independent of the HTTP library.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// Minimal HTTP seam so the client can be exercised against a fake in tests.
#[async_trait]
pub trait ForecastTransport: Send + Sync + Debug {
    /// Issue one GET request; `Err` carries a transport-level failure message.
    async fn get(&self, url: &str, query: &[(&str, String)])
        -> Result<TransportResponse, String>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Default)]
pub struct HttpTransport {
    http: Client,
}

#[async_trait]
impl ForecastTransport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<TransportResponse, String> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = res.status();
        let body = res.text().await.map_err(|e| e.to_string())?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

/// Upstream error body, e.g. `{"cod": "404", "message": "city not found"}`.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    cod: String,
    message: String,
}

#[derive(Debug)]
pub struct ForecastClient {
    api_key: Option<String>,
    transport: Box<dyn ForecastTransport>,
}

impl ForecastClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_transport(api_key, Box::new(HttpTransport::default()))
    }

    pub fn with_transport(api_key: Option<String>, transport: Box<dyn ForecastTransport>) -> Self {
        Self { api_key, transport }
    }

    /// Fetch the raw multi-day, 3-hour-resolution forecast for `location`.
    ///
    /// Exactly one outbound request per call, and none at all when the
    /// location is empty or no API key is configured.
    pub async fn fetch(&self, location: &str) -> Result<RawPayload, FetchError> {
        if location.trim().is_empty() {
            return Err(FetchError::InvalidInput);
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::ConfigurationError)?;

        let query = [
            ("q", location.to_string()),
            ("appid", api_key.to_string()),
            ("units", UNITS.to_string()),
            ("lang", LANG.to_string()),
        ];

        debug!(url = FORECAST_URL, query = ?redact(&query), "requesting forecast");

        let res = self
            .transport
            .get(FORECAST_URL, &query)
            .await
            .map_err(FetchError::Network)?;

        debug!(
            status = res.status,
            bytes = res.body.len(),
            "forecast response received"
        );

        if !(200..300).contains(&res.status) {
            if let Ok(err) = serde_json::from_str::<UpstreamErrorBody>(&res.body) {
                return Err(FetchError::Upstream {
                    code: err.cod,
                    message: err.message,
                });
            }
            warn!(
                status = res.status,
                "forecast request failed without a structured error body"
            );
            return Err(FetchError::Http {
                status: res.status,
                status_text: res.status_text,
            });
        }

        serde_json::from_str(&res.body).map_err(|e| FetchError::Network(e.to_string()))
    }
}

/// Copy of the query pairs with the API key replaced, safe to log.
fn redact<'a>(query: &[(&'a str, String)]) -> Vec<(&'a str, String)> {
    query
        .iter()
        .map(|(k, v)| {
            if *k == "appid" {
                (*k, REDACTED.to_string())
            } else {
                (*k, v.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FakeTransport {
        calls: Arc<AtomicUsize>,
        response: Result<TransportResponse, String>,
    }

    impl FakeTransport {
        fn new(response: Result<TransportResponse, String>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    response,
                },
                calls,
            )
        }

        fn ok(status: u16, status_text: &str, body: &str) -> (Self, Arc<AtomicUsize>) {
            Self::new(Ok(TransportResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }))
        }
    }

    #[async_trait]
    impl ForecastTransport for FakeTransport {
        async fn get(
            &self,
            _url: &str,
            _query: &[(&str, String)],
        ) -> Result<TransportResponse, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn client_with(
        api_key: Option<&str>,
        transport: FakeTransport,
    ) -> ForecastClient {
        ForecastClient::with_transport(api_key.map(String::from), Box::new(transport))
    }

    #[tokio::test]
    async fn empty_location_is_rejected_before_any_request() {
        let (transport, calls) = FakeTransport::ok(200, "OK", "{}");
        let client = client_with(Some("KEY"), transport);

        let err = client.fetch("  ").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected_before_any_request() {
        let (transport, calls) = FakeTransport::ok(200, "OK", "{}");
        let client = client_with(None, transport);

        let err = client.fetch("Curitiba").await.unwrap_err();
        assert!(matches!(err, FetchError::ConfigurationError));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn structured_upstream_error_is_passed_through() {
        let (transport, _) = FakeTransport::ok(
            404,
            "Not Found",
            r#"{"cod": "404", "message": "city not found"}"#,
        );
        let client = client_with(Some("KEY"), transport);

        match client.fetch("Nowhereville").await.unwrap_err() {
            FetchError::Upstream { code, message } => {
                assert_eq!(code, "404");
                assert_eq!(message, "city not found");
            }
            other => panic!("expected Upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unstructured_failure_becomes_http_error() {
        let (transport, _) = FakeTransport::ok(503, "Service Unavailable", "oops");
        let client = client_with(Some("KEY"), transport);

        match client.fetch("Curitiba").await.unwrap_err() {
            FetchError::Http {
                status,
                status_text,
            } => {
                assert_eq!(status, 503);
                assert_eq!(status_text, "Service Unavailable");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_becomes_network_error() {
        let (transport, _) = FakeTransport::new(Err("connection reset".to_string()));
        let client = client_with(Some("KEY"), transport);

        match client.fetch("Curitiba").await.unwrap_err() {
            FetchError::Network(message) => assert_eq!(message, "connection reset"),
            other => panic!("expected Network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_success_body_becomes_network_error() {
        let (transport, _) = FakeTransport::ok(200, "OK", "<html>not json</html>");
        let client = client_with(Some("KEY"), transport);

        let err = client.fetch("Curitiba").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn successful_fetch_returns_parsed_payload() {
        let body = r#"{
            "cod": "200",
            "list": [{
                "dt_txt": "2024-05-01 12:00:00",
                "main": { "temp": 21.0, "feels_like": 20.0, "humidity": 55 },
                "weather": [{ "description": "clear sky", "icon": "01d" }],
                "pop": 0.05,
                "wind": { "speed": 2.4 }
            }]
        }"#;
        let (transport, calls) = FakeTransport::ok(200, "OK", body);
        let client = client_with(Some("KEY"), transport);

        let payload = client.fetch("Curitiba").await.expect("fetch should succeed");
        assert_eq!(payload.cod.as_deref(), Some("200"));
        assert_eq!(payload.list.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn redact_replaces_only_the_api_key() {
        let query = [
            ("q", "Curitiba".to_string()),
            ("appid", "SECRET".to_string()),
            ("units", "metric".to_string()),
        ];

        let redacted = redact(&query);
        assert_eq!(redacted[0].1, "Curitiba");
        assert_eq!(redacted[1].1, REDACTED);
        assert_eq!(redacted[2].1, "metric");
    }
}
