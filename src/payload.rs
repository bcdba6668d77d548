// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Values a request promise settles with

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::http::{Body, Response};

/// What a promise resolves with
///
/// Without a transform this is the raw [`Body`] or, with
/// `resolveWithFullResponse`, the whole [`Response`]. Transforms may produce
/// any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw response body
    Body(Body),
    /// Full response
    Response(Response),
    /// Response headers only
    Headers(HeaderMap),
    /// Arbitrary JSON value
    Json(Value),
    /// Arbitrary text
    Text(String),
}

impl Payload {
    /// The body, either raw or inside a full response
    pub fn body(&self) -> Option<&Body> {
        match self {
            Payload::Body(body) => Some(body),
            Payload::Response(response) => Some(&response.body),
            _ => None,
        }
    }

    /// The full response, if this payload is one
    pub fn response(&self) -> Option<&Response> {
        match self {
            Payload::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Take the full response out of the payload
    pub fn into_response(self) -> Option<Response> {
        match self {
            Payload::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Header map, either on its own or from a full response
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Payload::Headers(headers) => Some(headers),
            Payload::Response(response) => Some(&response.headers),
            _ => None,
        }
    }

    /// Text content: a text payload or a text body
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Body(body) => body.as_text(),
            _ => None,
        }
    }

    /// JSON content: a JSON payload or a JSON body
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Body(body) => body.as_json(),
            _ => None,
        }
    }

    /// Status code, when the payload is a full response
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(Response::status_code)
    }
}

impl From<Body> for Payload {
    fn from(body: Body) -> Self {
        Payload::Body(body)
    }
}

impl From<Response> for Payload {
    fn from(response: Response) -> Self {
        Payload::Response(response)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}
