// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for request-promise
//!
//! Three errors describe how a request can fail once it is in flight:
//! [`RequestError`] (the transport gave up), [`StatusCodeError`] (simple mode
//! saw a non-2xx status) and [`TransformError`] (the user transform failed).
//! They only ever reach the caller through the rejected promise. The
//! remaining [`Error`] variants are returned synchronously when a request
//! cannot even be started.

use std::sync::Arc;

use thiserror::Error;

use crate::http::{Body, Response};
use crate::options::RequestOptions;
use crate::payload::Payload;

/// Result type alias for request-promise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
///
/// Cloneable because one settlement is shared by every clone of a promise.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// No URI or options record was given
    #[error("undefined is not a valid uri or options object.")]
    MissingTarget,

    /// A HEAD request carried a body
    #[error("HTTP HEAD requests MUST NOT include a request body.")]
    HeadWithBody,

    /// Options could not be interpreted
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The underlying HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(Arc<reqwest::Error>),

    /// Cookie store could not be read or written
    #[error("Cookie store error: {0}")]
    CookieStore(String),

    /// Requests were started outside a Tokio runtime
    #[error("no Tokio runtime is running; requests must be started from within one")]
    NoRuntime,

    /// The request task went away without settling the promise
    #[error("Request was dropped before it settled")]
    Dropped,

    /// Transport could not complete the exchange
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Exchange completed with a status rejected by simple mode
    #[error(transparent)]
    StatusCode(#[from] StatusCodeError),

    /// The response transform failed
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Why the transport could not complete an exchange
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// Connection, TLS, timeout or protocol failure reported by reqwest
    #[error("{0}")]
    Http(Arc<reqwest::Error>),

    /// Target could not be turned into a URL
    #[error("Invalid URI: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request was aborted through its handle
    #[error("Request aborted")]
    Aborted,

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(Arc::new(err))
    }
}

impl TransportError {
    /// Create a generic transport error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TransportError::Other(msg.into())
    }

    /// Check if the transport timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }

    /// Check if the connection could not be established
    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_connect())
    }

    /// Check if the request was aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransportError::Aborted)
    }
}

/// The transport could not complete the exchange
#[derive(Error, Debug, Clone)]
#[error("{cause}")]
pub struct RequestError {
    /// Original transport failure
    #[source]
    pub cause: TransportError,
    /// Options the request was made with
    pub options: RequestOptions,
    /// Response, if the failure happened after headers arrived
    pub response: Option<Response>,
}

/// The exchange completed but the status code failed the simple-mode check
#[derive(Error, Debug, Clone)]
#[error("{} - {}", .status_code, .error.to_json_string())]
pub struct StatusCodeError {
    /// Response status code
    pub status_code: u16,
    /// Raw response body
    pub error: Body,
    /// Options the request was made with
    pub options: RequestOptions,
    /// Full response, or the transformed value when a transform ran
    pub response: Payload,
}

/// The transform returned an error, rejected, or panicked
#[derive(Error, Debug, Clone)]
#[error("{cause}")]
pub struct TransformError {
    /// What the transform reported
    pub cause: Arc<anyhow::Error>,
    /// Options the request was made with
    pub options: RequestOptions,
    /// Response the transform was applied to
    pub response: Option<Response>,
}

impl Error {
    /// Create an invalid options error
    pub fn invalid_options<S: Into<String>>(msg: S) -> Self {
        Error::InvalidOptions(msg.into())
    }

    /// Check if this is a transport failure
    pub fn is_request_error(&self) -> bool {
        matches!(self, Error::Request(_))
    }

    /// Check if this is a status code rejection
    pub fn is_status_code_error(&self) -> bool {
        matches!(self, Error::StatusCode(_))
    }

    /// Check if this is a transform failure
    pub fn is_transform_error(&self) -> bool {
        matches!(self, Error::Transform(_))
    }

    /// Check if the caller's input was rejected before any I/O
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::MissingTarget | Error::HeadWithBody | Error::InvalidOptions(_) | Error::NoRuntime
        )
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::StatusCode(e) => Some(e.status_code),
            Error::Request(RequestError {
                response: Some(r), ..
            }) => Some(r.status_code()),
            Error::Transform(TransformError {
                response: Some(r), ..
            }) => Some(r.status_code()),
            _ => None,
        }
    }

    /// Get the response the error was built from, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Request(e) => e.response.as_ref(),
            Error::StatusCode(e) => e.response.response(),
            Error::Transform(e) => e.response.as_ref(),
            _ => None,
        }
    }

    /// Get the options the failed request was made with
    pub fn options(&self) -> Option<&RequestOptions> {
        match self {
            Error::Request(e) => Some(&e.options),
            Error::StatusCode(e) => Some(&e.options),
            Error::Transform(e) => Some(&e.options),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Client(Arc::new(err))
    }
}
