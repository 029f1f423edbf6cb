// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for backend requests.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP requests for production
//! - Mock transports for unit testing
//!
//! The error taxonomy matters to callers: [`TransportError::Timeout`] and
//! [`TransportError::Unreachable`] mean no response arrived at all. A
//! response with an error status is not a transport error; it comes back
//! as an [`HttpResponse`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use sq_core::{Method, RequestDescriptor};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No response within the request timeout.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// No response received at all.
    #[error("no response from server: {0}")]
    Unreachable(String),

    /// Request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Returns true when the request produced no response.
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Unreachable(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A request ready to send: the descriptor plus the credential attached at
/// send time.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub request: RequestDescriptor,
    pub bearer: Option<String>,
}

/// Status and body of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for request/response communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Sends one request and waits for its response.
    fn send(
        &self,
        request: OutgoingRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    /// Base URL without a trailing slash; request paths are appended.
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport against `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> TransportResult<Self> {
        reqwest::Url::parse(base_url).map_err(|e| {
            TransportError::InvalidRequest(format!("base URL '{}': {}", base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url_for(&self, path: &str) -> TransportResult<reqwest::Url> {
        let joined = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&joined)
            .map_err(|e| TransportError::InvalidRequest(format!("URL '{}': {}", joined, e)))
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        outgoing: OutgoingRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let OutgoingRequest { request, bearer } = outgoing;
            let url = self.url_for(&request.path)?;
            let method = to_reqwest_method(request.method);

            let mut builder = self.client.request(method.clone(), url.clone());
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(token) = bearer {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            tracing::debug!(%method, %url, "sending request");
            let response = builder.send().await.map_err(|e| self.classify(e))?;
            let status = response.status().as_u16();
            tracing::debug!(%method, %url, status, "received response");

            // The status line arrived, so this is not a transport failure
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "failed to read response body");
                    String::new()
                }
            };

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
