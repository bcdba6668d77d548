// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Responses and their decoded bodies

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// UTF-8 text (the default decoding)
    Text(String),
    /// Parsed JSON (JSON mode, when the body parses)
    Json(Value),
    /// Raw bytes (binary mode)
    Bytes(Bytes),
}

impl Body {
    /// Decode raw bytes the way the request asked for
    ///
    /// JSON mode falls back to text when the body is not valid JSON.
    pub fn decode(raw: Bytes, json: bool, binary: bool) -> Self {
        if binary {
            return Body::Bytes(raw);
        }
        if json && !raw.is_empty() {
            if let Ok(value) = serde_json::from_slice::<Value>(&raw) {
                return Body::Json(value);
            }
        }
        Body::Text(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Get body as text, if it was decoded as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get body as JSON, if it was decoded as JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Get body as text, lossy conversion for every variant
    pub fn text_lossy(&self) -> String {
        match self {
            Body::Text(text) => text.clone(),
            Body::Json(value) => value.to_string(),
            Body::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// JSON rendering used in error messages
    pub fn to_json_string(&self) -> String {
        match self {
            Body::Text(text) => Value::String(text.clone()).to_string(),
            Body::Json(value) => value.to_string(),
            Body::Bytes(bytes) => {
                Value::String(String::from_utf8_lossy(bytes).into_owned()).to_string()
            }
        }
    }

    /// Body length in bytes (JSON is measured serialized)
    pub fn len(&self) -> usize {
        match self {
            Body::Text(text) => text.len(),
            Body::Json(value) => value.to_string().len(),
            Body::Bytes(bytes) => bytes.len(),
        }
    }

    /// Check if the body is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Text(String::new())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl PartialEq<str> for Body {
    fn eq(&self, other: &str) -> bool {
        self.as_text() == Some(other)
    }
}

impl PartialEq<&str> for Body {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

/// A completed exchange as the transport reports it
///
/// This is what `resolveWithFullResponse` resolves with and what a
/// `StatusCodeError` carries when no transform ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Body decoded per the request's JSON and binary modes
    pub body: Body,
    /// URL the response came from, after any redirects
    pub url: Url,
    /// Set when `url` differs from the requested URL
    pub redirected: bool,
    /// Milliseconds from dispatch until the body was read
    pub response_time_ms: u64,
}

impl Response {
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Body,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// 2xx, the only class simple mode accepts
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// First value of a header, when it is visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(reqwest::header::CONTENT_TYPE.as_str())
    }
}
