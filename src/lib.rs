// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # request-promise - Promise-style HTTP requests
//!
//! Starts HTTP requests over a callback-style transport and hands back a
//! handle that is both an event source and an awaitable promise.
//!
//! ## Features
//!
//! - Simple mode: non-2xx responses reject with a `StatusCodeError`
//! - Full responses: resolve with status, headers and body instead of the body
//! - Transforms: sync or async post-processing of the response
//! - Legacy callbacks: `(error, response, body)` callbacks still run
//! - Defaults: compose clients whose calls start from shared options
//! - Cookie jars with JSON persistence
//!
//! ## Example
//!
//! ```rust,no_run
//! use request_promise::{RequestOptions, Error};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let body = request_promise::get("http://localhost:4000/200")?.await?;
//!     println!("{:?}", body.as_text());
//!
//!     let api = request_promise::defaults(
//!         RequestOptions::new()
//!             .base_url("http://localhost:4000")
//!             .json_mode(true),
//!     )?;
//!     match api.request("/404")?.await {
//!         Err(Error::StatusCode(err)) => println!("rejected with {}", err.status_code),
//!         other => println!("{:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod events;
pub mod http;
pub mod merge;
pub mod options;
pub mod payload;
pub mod request;

use std::path::Path;

use lazy_static::lazy_static;

// Re-exports for convenience

// Client
pub use client::{Client, Requester};

// Errors
pub use error::{Error, RequestError, Result, StatusCodeError, TransformError, TransportError};

// Events
pub use events::{EventEmitter, EventKind, Listener, RequestEvent};

// HTTP
pub use http::{
    Body, Cookie, CookieJar, Outcome, OutcomeClass, ReqwestTransport, Response, Transport,
    TransportConfig,
};

// Options
pub use options::{Auth, Callback, RequestOptions, Target, Transform, TransformFuture};

// Promise
pub use payload::Payload;
pub use request::{Deferred, Promise, RequestConfig, RequestHandle, ResolutionPipeline, Settlement};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

lazy_static! {
    static ref DEFAULT_CLIENT: Result<Client> = Client::with_config(shared_transport_config());
}

/// Configuration of the client behind the free functions
///
/// That client lives for the whole process and may be used from several
/// Tokio runtimes in turn, so it keeps no idle connections: a pooled
/// connection opened on a runtime that has since shut down cannot be reused.
/// Build a [`Client`] per runtime to get connection reuse.
pub fn shared_transport_config() -> TransportConfig {
    TransportConfig {
        pool_max_idle_per_host: Some(0),
        ..TransportConfig::default()
    }
}

/// Shared client behind the free functions
///
/// See [`shared_transport_config`] for how it behaves across runtimes.
pub fn default_client() -> Result<Client> {
    DEFAULT_CLIENT.clone()
}

/// Start a request with the default client
pub fn request(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.request(target)
}

/// Start a request with extra options
pub fn request_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.request_with(target, options)
}

/// Start a request with a legacy `(error, response, body)` callback
pub fn request_with_callback(
    target: impl Into<Target>,
    options: Option<RequestOptions>,
    callback: Callback,
) -> Result<RequestHandle> {
    default_client()?.request_with_callback(target, options, callback)
}

/// GET with the default client
pub fn get(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.get(target)
}

/// GET with extra options
pub fn get_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.get_with(target, options)
}

/// HEAD with the default client
pub fn head(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.head(target)
}

/// HEAD with extra options
pub fn head_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.head_with(target, options)
}

/// OPTIONS with the default client
pub fn options(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.options(target)
}

/// OPTIONS with extra options
pub fn options_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.options_with(target, options)
}

/// POST with the default client
pub fn post(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.post(target)
}

/// POST with extra options
pub fn post_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.post_with(target, options)
}

/// PUT with the default client
pub fn put(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.put(target)
}

/// PUT with extra options
pub fn put_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.put_with(target, options)
}

/// PATCH with the default client
pub fn patch(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.patch(target)
}

/// PATCH with extra options
pub fn patch_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.patch_with(target, options)
}

/// DELETE with the default client
pub fn delete(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.delete(target)
}

/// DELETE with extra options
pub fn delete_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.delete_with(target, options)
}

/// DELETE with the default client, short name
pub fn del(target: impl Into<Target>) -> Result<RequestHandle> {
    default_client()?.del(target)
}

/// DELETE with extra options, short name
pub fn del_with(target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
    default_client()?.del_with(target, options)
}

/// Full `(target, options, callback)` form with an explicit method
pub fn verb(
    method: reqwest::Method,
    target: impl Into<Target>,
    options: Option<RequestOptions>,
    callback: Option<Callback>,
) -> Result<RequestHandle> {
    default_client()?.verb(method, target, options, callback)
}

/// Client whose calls start from `options`
pub fn defaults(options: RequestOptions) -> Result<Client> {
    Ok(default_client()?.defaults(options))
}

/// Client whose calls start from `options` and go through `requester`
pub fn defaults_with_requester(options: RequestOptions, requester: Requester) -> Result<Client> {
    Ok(default_client()?.defaults_with_requester(options, requester))
}

/// New cookie jar, optionally backed by a JSON store file
pub fn jar(store: Option<&Path>) -> Result<CookieJar> {
    match store {
        Some(path) => CookieJar::load(path),
        None => Ok(CookieJar::new()),
    }
}

/// Parse a cookie string
pub fn cookie(s: &str) -> Option<Cookie> {
    Cookie::parse(s)
}
