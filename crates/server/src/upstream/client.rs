//! HTTP client for the upstream FHIR REST API
//!
//! Performs exactly one request per call with no retry. Any well-formed HTTP
//! response, whatever its status, is returned as an [`UpstreamResponse`];
//! only failures below HTTP (connect, timeout, unreadable body) become a
//! [`TransportError`].

use std::time::{Duration, Instant};

use axum::body::Bytes;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use thiserror::Error;

/// Media type for FHIR JSON payloads
pub const FHIR_JSON: &str = "application/fhir+json";

/// Failure reaching the upstream server
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Could not connect to upstream: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Upstream transport failure: {0}")]
    Protocol(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err)
        } else if err.is_connect() {
            TransportError::Connect(err)
        } else {
            TransportError::Protocol(err)
        }
    }
}

/// Raw upstream response
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Header value as a string, if present and valid ASCII
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Client bound to one FHIR base URL
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client for `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(FHIR_JSON));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}?{query}`
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<UpstreamResponse, TransportError> {
        let request = self.http.get(self.url(path)).query(query);
        self.execute("GET", path, request).await
    }

    /// POST `body` to `{base}{path}`
    pub async fn post(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<UpstreamResponse, TransportError> {
        let request = self
            .http
            .post(self.url(path))
            .header(header::CONTENT_TYPE, content_type)
            .body(body);
        self.execute("POST", path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(
        &self,
        method: &'static str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<UpstreamResponse, TransportError> {
        let start = Instant::now();

        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(UpstreamResponse {
                status,
                headers,
                body,
            })
        }
        .await;

        let elapsed = start.elapsed();
        let resource = resource_label(path);
        let status_label = match &result {
            Ok(response) => response.status.as_u16().to_string(),
            Err(_) => "transport_error".to_string(),
        };

        metrics::counter!(
            "upstream_requests_total",
            "method" => method,
            "resource" => resource.clone(),
            "status" => status_label
        )
        .increment(1);

        metrics::histogram!(
            "upstream_request_duration_seconds",
            "method" => method,
            "resource" => resource
        )
        .record(elapsed.as_secs_f64());

        match result {
            Ok(response) => {
                tracing::debug!(
                    method,
                    path,
                    status = %response.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Upstream request completed"
                );
                Ok(response)
            }
            Err(e) => {
                let err = TransportError::from(e);
                tracing::warn!(
                    method,
                    path,
                    error = %err,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Upstream request failed"
                );
                Err(err)
            }
        }
    }
}

/// Resource type segment of an upstream path, used as a metrics label
fn resource_label(path: &str) -> String {
    path.trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("root")
        .to_string()
}
