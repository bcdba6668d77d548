// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Handle to an in-flight request

use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use reqwest::Method;
use tokio::sync::Notify;

use super::deferred::{Promise, Settlement};
use super::RequestConfig;
use crate::error::Error;
use crate::events::{EventEmitter, EventKind, RequestEvent};
use crate::payload::Payload;

/// An in-flight request: event source and promise in one
///
/// Awaiting the handle yields its settlement:
///
/// ```rust,no_run
/// # async fn run() -> request_promise::Result<()> {
/// let body = request_promise::get("http://localhost:4000/200")?.await?;
/// println!("{:?}", body.as_text());
/// # Ok(())
/// # }
/// ```
pub struct RequestHandle {
    config: Arc<RequestConfig>,
    promise: Promise,
    events: Arc<EventEmitter>,
    abort: Arc<Notify>,
}

impl RequestHandle {
    pub(crate) fn new(
        config: Arc<RequestConfig>,
        promise: Promise,
        events: Arc<EventEmitter>,
        abort: Arc<Notify>,
    ) -> Self {
        Self {
            config,
            promise,
            events,
            abort,
        }
    }

    /// Normalized configuration the request runs with
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Effective method
    pub fn method(&self) -> &Method {
        &self.config.method
    }

    /// The underlying promise; clones share one settlement
    pub fn promise(&self) -> Promise {
        self.promise.clone()
    }

    /// Subscribe to an event; events that already fired are replayed
    pub fn on<F>(&self, kind: EventKind, listener: F) -> &Self
    where
        F: Fn(&RequestEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, Arc::new(listener));
        self
    }

    /// Abort the exchange; the promise rejects with a `RequestError`
    ///
    /// Has no effect once the transport has reported an outcome.
    pub fn abort(&self) {
        self.abort.notify_one();
    }

    /// Map the settlement through one of two handlers
    pub async fn then<T, F, R>(self, on_fulfilled: F, on_rejected: R) -> T
    where
        F: FnOnce(Payload) -> T,
        R: FnOnce(Error) -> T,
    {
        match self.promise.await {
            Ok(value) => on_fulfilled(value),
            Err(error) => on_rejected(error),
        }
    }

    /// Recover from a rejection
    pub async fn catch<F, E>(self, on_rejected: F) -> std::result::Result<Payload, E>
    where
        F: FnOnce(Error) -> std::result::Result<Payload, E>,
    {
        match self.promise.await {
            Ok(value) => Ok(value),
            Err(error) => on_rejected(error),
        }
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("method", &format_args!("{}", self.config.method))
            .field("uri", &self.config.uri())
            .finish()
    }
}

impl IntoFuture for RequestHandle {
    type Output = Settlement;
    type IntoFuture = Promise;

    fn into_future(self) -> Promise {
        self.promise
    }
}
