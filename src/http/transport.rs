// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport seam
//!
//! A transport performs one HTTP exchange for a normalized request and
//! reports how it ended. Everything about connections, TLS and redirects
//! lives behind this trait.

use async_trait::async_trait;

use super::response::{Body, Response};
use crate::error::TransportError;
use crate::events::EventEmitter;
use crate::request::RequestConfig;

/// Performs HTTP exchanges
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use request_promise::events::EventEmitter;
/// use request_promise::http::{Outcome, Transport};
/// use request_promise::error::TransportError;
/// use request_promise::request::RequestConfig;
///
/// struct Offline;
///
/// #[async_trait]
/// impl Transport for Offline {
///     async fn exchange(&self, _config: &RequestConfig, _events: &EventEmitter) -> Outcome {
///         Outcome::failed(TransportError::other("offline"), None)
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run one exchange and report its outcome
    ///
    /// Implementations may emit `Request` and `Response` events; completion
    /// and error events are emitted by the caller from the returned outcome.
    async fn exchange(&self, config: &RequestConfig, events: &EventEmitter) -> Outcome;
}

/// How an exchange ended: the `(error, response, body)` triple
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The transport failed; a response is present only if headers arrived
    Failed {
        error: TransportError,
        response: Option<Response>,
    },
    /// The exchange completed
    Completed(Response),
}

/// Classification used by the resolution pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    /// The transport reported an error
    TransportFailure,
    /// Completed with a 2xx status
    Success,
    /// Completed with any other status
    Other,
}

impl Outcome {
    /// Create a failed outcome
    pub fn failed(error: TransportError, response: Option<Response>) -> Self {
        Outcome::Failed { error, response }
    }

    /// Create a completed outcome
    pub fn completed(response: Response) -> Self {
        Outcome::Completed(response)
    }

    /// Transport error, if any
    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            Outcome::Completed(_) => None,
        }
    }

    /// Response, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Failed { response, .. } => response.as_ref(),
            Outcome::Completed(response) => Some(response),
        }
    }

    /// Body, if any
    pub fn body(&self) -> Option<&Body> {
        self.response().map(|r| &r.body)
    }

    /// Classify the outcome
    pub fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Failed { .. } => OutcomeClass::TransportFailure,
            Outcome::Completed(response) if response.is_success() => OutcomeClass::Success,
            Outcome::Completed(_) => OutcomeClass::Other,
        }
    }
}
