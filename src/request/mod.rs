// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request initiation
//!
//! Folds call arguments into one [`RequestOptions`], normalizes it into a
//! [`RequestConfig`], and starts exactly one exchange whose outcome is fed to
//! the [`ResolutionPipeline`].

mod deferred;
mod handle;
mod pipeline;

use std::sync::Arc;

use reqwest::Method;
use tokio::runtime::Handle;
use tokio::sync::Notify;

pub use deferred::{Deferred, Promise, Settlement};
pub use handle::RequestHandle;
pub use pipeline::ResolutionPipeline;

use crate::error::{Error, Result, TransportError};
use crate::events::{EventEmitter, RequestEvent};
use crate::http::{Outcome, Transport};
use crate::options::{Callback, RequestOptions, Target, Transform};

/// Normalized configuration of one request
///
/// Built once when the request starts and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Options as the transport sees them, method upper-cased and the
    /// resolution flags filled in
    pub options: RequestOptions,
    /// Effective method
    pub method: Method,
    /// Reject non-2xx outcomes
    pub simple: bool,
    /// Resolve with the full response
    pub resolve_with_full_response: bool,
    /// Only transform 2xx outcomes
    pub transform2xx_only: bool,
    /// Transform in effect, explicit or built in
    pub transform: Option<Transform>,
}

impl RequestConfig {
    /// Normalize options, taking the legacy callback out of them
    pub fn initialize(mut options: RequestOptions) -> Result<(Self, Option<Callback>)> {
        if options.uri.as_deref().map_or(true, str::is_empty) {
            return Err(Error::MissingTarget);
        }

        if let Some(ref mut method) = options.method {
            *method = method.to_uppercase();
        }
        let method = match options.method {
            Some(ref name) => Method::from_bytes(name.as_bytes())
                .map_err(|_| Error::invalid_options(format!("invalid method: {}", name)))?,
            None => Method::GET,
        };

        if method == Method::HEAD && options.has_request_body() {
            return Err(Error::HeadWithBody);
        }

        let callback = options.callback.take();
        let transform = options
            .transform
            .clone()
            .or_else(|| Transform::default_for(&method));
        options.transform = transform.clone();

        let simple = options.simple != Some(false);
        let resolve_with_full_response = options.resolve_with_full_response == Some(true);
        let transform2xx_only = options.transform2xx_only == Some(true);
        options.simple = Some(simple);
        options.resolve_with_full_response = Some(resolve_with_full_response);
        options.transform2xx_only = Some(transform2xx_only);

        Ok((
            Self {
                options,
                method,
                simple,
                resolve_with_full_response,
                transform2xx_only,
                transform,
            },
            callback,
        ))
    }

    /// Check if JSON mode is on
    pub fn json_mode(&self) -> bool {
        self.options.is_json()
    }

    /// Target URI
    pub fn uri(&self) -> &str {
        self.options.uri.as_deref().unwrap_or("")
    }
}

/// Fold the `(target, options, callback)` call forms into one option record
///
/// A target record and a separate options record are merged, the options
/// record winning; an explicit callback wins over one in the options.
pub fn init_params(
    target: Option<Target>,
    options: Option<RequestOptions>,
    callback: Option<Callback>,
) -> Result<RequestOptions> {
    let target = target.ok_or(Error::MissingTarget)?;

    let mut params = match (target, options) {
        (Target::Uri(uri), Some(options)) => options.uri(uri),
        (Target::Uri(uri), None) => RequestOptions::new().uri(uri),
        (Target::Options(target), Some(options)) => target.merged(&options)?,
        (Target::Options(target), None) => target,
    };

    if callback.is_some() {
        params.callback = callback;
    }
    Ok(params)
}

/// Start one request on the current Tokio runtime
///
/// Precondition failures, a missing runtime included, are returned here;
/// everything else settles the returned handle's promise.
pub fn initiate(options: RequestOptions, transport: Arc<dyn Transport>) -> Result<RequestHandle> {
    let (config, callback) = RequestConfig::initialize(options)?;
    let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
    let config = Arc::new(config);
    let (deferred, promise) = Deferred::new();
    let events = Arc::new(EventEmitter::new());
    let abort = Arc::new(Notify::new());

    tracing::debug!(method = %config.method, uri = config.uri(), "starting request");

    let pipeline = ResolutionPipeline::new(config.clone(), deferred, callback);
    runtime.spawn(drive(
        transport,
        config.clone(),
        events.clone(),
        abort.clone(),
        pipeline,
    ));

    Ok(RequestHandle::new(config, promise, events, abort))
}

/// Run the exchange, then the pipeline; the completion context of a request
async fn drive(
    transport: Arc<dyn Transport>,
    config: Arc<RequestConfig>,
    events: Arc<EventEmitter>,
    abort: Arc<Notify>,
    pipeline: ResolutionPipeline,
) {
    let outcome = tokio::select! {
        outcome = transport.exchange(&config, &events) => outcome,
        _ = abort.notified() => {
            events.emit(RequestEvent::Abort);
            Outcome::failed(TransportError::Aborted, None)
        }
    };

    match &outcome {
        Outcome::Completed(response) => events.emit(RequestEvent::Complete(response.clone())),
        Outcome::Failed { error, .. } => {
            tracing::debug!(error = %error, uri = config.uri(), "request failed");
            events.emit(RequestEvent::Error(error.clone()));
        }
    }

    if let Err(error) = pipeline.complete(outcome).await {
        tracing::error!(error = %error, uri = config.uri(), "request callback failed");
        events.emit(RequestEvent::CallbackError(Arc::new(error)));
    }
}
