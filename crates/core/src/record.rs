// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue records: durable descriptions of write requests awaiting replay.
//!
//! A [`QueueRecord`] captures everything needed to rebuild a failed request
//! later: method, path, body, query parameters and headers. The bearer
//! credential is deliberately not part of the captured headers; it is
//! re-attached from current auth state when the record is replayed.
//!
//! Serialized layout (camelCase keys):
//!
//! ```text
//! {"id":"1736500000000-9f2c41d07a3be815",
//!  "request":{"method":"POST","path":"/attendance","body":{...},"headers":{...}},
//!  "enqueuedAt":1736500000000,
//!  "retryCount":0}
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Header that carries the bearer credential. Never persisted.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// HTTP method of a captured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Returns true for state-changing methods, the only ones eligible for queuing.
    pub fn is_queueable(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Delete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// A request as issued by the application, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the API base, always starting with `/`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Creates a descriptor with no body, headers or query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] unless `path` starts with `/`.
    pub fn new(method: Method, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(path));
        }
        Ok(RequestDescriptor {
            method,
            path,
            body: None,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
        })
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Drops any `Authorization` header, whatever its casing.
    pub fn without_credentials(mut self) -> Self {
        self.headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION_HEADER));
        self
    }
}

/// Parses a `Name: value` header line.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once(':').ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Unique identifier for a queue record.
///
/// Format: `{enqueued_at_ms}-{16 hex chars}`. The random component keeps ids
/// distinct when several records are enqueued within the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh id for a record enqueued at `now_ms`.
    pub fn generate(now_ms: u64) -> Self {
        let random: u64 = rand::thread_rng().gen();
        RecordId(format!("{}-{:016x}", now_ms, random))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// One pending mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub id: RecordId,
    pub request: RequestDescriptor,
    /// Milliseconds since Unix epoch of the first failure.
    pub enqueued_at: u64,
    /// Failed replay attempts so far. Never decreases.
    #[serde(default)]
    pub retry_count: u32,
}

impl QueueRecord {
    /// Captures a failed request for later replay.
    ///
    /// The bearer credential is stripped from the captured headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotQueueable`] for GET requests.
    pub fn new(request: RequestDescriptor, enqueued_at: u64) -> Result<Self> {
        if !request.method.is_queueable() {
            return Err(Error::NotQueueable(request.method.to_string()));
        }
        Ok(QueueRecord {
            id: RecordId::generate(enqueued_at),
            request: request.without_credentials(),
            enqueued_at,
            retry_count: 0,
        })
    }

    /// Counts one failed replay attempt and returns the new retry count.
    pub fn record_failure(&mut self) -> u32 {
        self.retry_count = self.retry_count.saturating_add(1);
        self.retry_count
    }

    /// Returns true once the retry count has gone past `ceiling`.
    pub fn exceeds(&self, ceiling: u32) -> bool {
        self.retry_count > ceiling
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
