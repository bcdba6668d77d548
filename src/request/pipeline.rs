// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Resolution pipeline
//!
//! Runs once per exchange with its [`Outcome`] and settles the request's
//! [`Deferred`]. The decision matrix:
//!
//! | outcome            | mode       | transform runs when           | settles as                       |
//! |--------------------|------------|-------------------------------|----------------------------------|
//! | transport failure  | any        | never                         | reject `RequestError`            |
//! | non-2xx            | simple     | `transform2xxOnly` is false   | reject `StatusCodeError`         |
//! | 2xx                | any        | always                        | resolve                          |
//! | non-2xx            | permissive | `transform2xxOnly` is false   | resolve                          |
//!
//! A failing transform always rejects with `TransformError`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;

use super::deferred::Deferred;
use super::RequestConfig;
use crate::error::{RequestError, StatusCodeError, TransformError};
use crate::http::{Outcome, OutcomeClass, Response};
use crate::options::{Callback, Transform};
use crate::payload::Payload;

/// Legacy callback slot of one request
#[derive(Debug)]
pub(crate) enum OriginalCallback {
    /// The caller gave no callback
    Absent,
    /// Waiting for the outcome
    Pending(Callback),
    /// Already called; never called again
    Invoked,
}

impl OriginalCallback {
    pub(crate) fn from_option(callback: Option<Callback>) -> Self {
        match callback {
            Some(callback) => OriginalCallback::Pending(callback),
            None => OriginalCallback::Absent,
        }
    }

    /// Call a pending callback with the outcome triple
    ///
    /// Returns what it raised, a panic included, without propagating it.
    fn invoke(&mut self, outcome: &Outcome) -> Option<anyhow::Error> {
        let callback = match std::mem::replace(self, OriginalCallback::Invoked) {
            OriginalCallback::Pending(callback) => callback,
            OriginalCallback::Absent => {
                *self = OriginalCallback::Absent;
                return None;
            }
            OriginalCallback::Invoked => return None,
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            callback.call(outcome.error(), outcome.response(), outcome.body())
        }));
        match result {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(error),
            Err(panic) => Some(anyhow!("callback panicked: {}", panic_message(&*panic))),
        }
    }
}

/// Settles one request from its outcome
#[derive(Debug)]
pub struct ResolutionPipeline {
    config: Arc<RequestConfig>,
    deferred: Deferred,
    callback: OriginalCallback,
}

impl ResolutionPipeline {
    pub(crate) fn new(
        config: Arc<RequestConfig>,
        deferred: Deferred,
        callback: Option<Callback>,
    ) -> Self {
        Self {
            config,
            deferred,
            callback: OriginalCallback::from_option(callback),
        }
    }

    /// Settle the promise from `outcome`
    ///
    /// The legacy callback runs first. Whatever it raised is returned after
    /// the promise has been settled, never through the promise.
    pub async fn complete(self, outcome: Outcome) -> anyhow::Result<()> {
        let Self {
            config,
            deferred,
            mut callback,
        } = self;

        let raised = callback.invoke(&outcome);
        let class = outcome.class();
        tracing::trace!(?class, method = %config.method, "classified outcome");

        match outcome {
            Outcome::Failed { error, response } => {
                deferred.reject(RequestError {
                    cause: error,
                    options: config.options.clone(),
                    response,
                });
            }
            Outcome::Completed(response) => {
                let success = class == OutcomeClass::Success;
                if config.simple && !success {
                    reject_status(&config, deferred, response).await;
                } else {
                    resolve(&config, deferred, response, success).await;
                }
            }
        }

        match raised {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

async fn reject_status(config: &RequestConfig, deferred: Deferred, response: Response) {
    let status_code = response.status_code();
    let transform = config.transform.as_ref().filter(|_| !config.transform2xx_only);

    let payload = match transform {
        Some(transform) => match run_transform(transform, &response, config.resolve_with_full_response).await {
            Ok(transformed) => transformed,
            Err(cause) => {
                reject_transform(config, deferred, response, cause);
                return;
            }
        },
        None => Payload::Response(response.clone()),
    };

    deferred.reject(StatusCodeError {
        status_code,
        error: response.body,
        options: config.options.clone(),
        response: payload,
    });
}

async fn resolve(config: &RequestConfig, deferred: Deferred, response: Response, success: bool) {
    let transform = config
        .transform
        .as_ref()
        .filter(|_| success || !config.transform2xx_only);

    match transform {
        Some(transform) => {
            match run_transform(transform, &response, config.resolve_with_full_response).await {
                Ok(transformed) => deferred.resolve(transformed),
                Err(cause) => reject_transform(config, deferred, response, cause),
            }
        }
        None if config.resolve_with_full_response => deferred.resolve(Payload::Response(response)),
        None => deferred.resolve(Payload::Body(response.body)),
    }
}

fn reject_transform(config: &RequestConfig, deferred: Deferred, response: Response, cause: anyhow::Error) {
    tracing::warn!(error = %cause, status = response.status_code(), "transform failed");
    deferred.reject(TransformError {
        cause: Arc::new(cause),
        options: config.options.clone(),
        response: Some(response),
    });
}

/// Run a transform on its own task
///
/// An `Err`, a failed future and a panic all come back as `Err`.
async fn run_transform(
    transform: &Transform,
    response: &Response,
    full_response: bool,
) -> anyhow::Result<Payload> {
    let transform = transform.clone();
    let body = response.body.clone();
    let response = response.clone();

    match tokio::spawn(async move { transform.invoke(body, response, full_response).await }).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            Err(anyhow!("transform panicked: {}", panic_message(&*join_error.into_panic())))
        }
        Err(join_error) => Err(anyhow!("transform did not complete: {}", join_error)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransportError};
    use crate::http::Body;
    use crate::options::RequestOptions;
    use crate::request::deferred::{Deferred, Settlement};
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    fn response(status: u16, body: &str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("x-test", HeaderValue::from_static("yes"));
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Body::from(body),
            Url::parse("http://localhost:4000/").unwrap(),
            false,
            1,
        )
    }

    fn reverse() -> Transform {
        Transform::new(|body, _, _| Ok(Payload::Text(body.text_lossy().chars().rev().collect())))
    }

    async fn settle(options: RequestOptions, outcome: Outcome) -> (Settlement, anyhow::Result<()>) {
        let options = options.uri("http://localhost:4000/");
        let (config, callback) = RequestConfig::initialize(options).unwrap();
        let (deferred, promise) = Deferred::new();
        let pipeline = ResolutionPipeline::new(Arc::new(config), deferred, callback);
        let raised = pipeline.complete(outcome).await;
        (promise.await, raised)
    }

    #[tokio::test]
    async fn test_transport_failure_rejects_with_request_error() {
        let (settled, raised) = settle(
            RequestOptions::new().transform(reverse()),
            Outcome::failed(TransportError::other("ECONNREFUSED"), None),
        )
        .await;

        assert!(raised.is_ok());
        match settled {
            Err(Error::Request(err)) => {
                assert_eq!(err.to_string(), "ECONNREFUSED");
                assert!(err.response.is_none());
                assert_eq!(err.options.uri.as_deref(), Some("http://localhost:4000/"));
            }
            other => panic!("expected RequestError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_2xx_resolves_with_body() {
        let (settled, _) = settle(RequestOptions::new(), Outcome::completed(response(200, "GET /200"))).await;
        assert_eq!(settled.unwrap(), Payload::Body(Body::from("GET /200")));
    }

    #[tokio::test]
    async fn test_2xx_resolves_with_full_response() {
        let (settled, _) = settle(
            RequestOptions::new().resolve_with_full_response(true),
            Outcome::completed(response(201, "GET /201")),
        )
        .await;

        let payload = settled.unwrap();
        assert_eq!(payload.status_code(), Some(201));
        assert_eq!(payload.body(), Some(&Body::from("GET /201")));
    }

    #[tokio::test]
    async fn test_simple_non_2xx_rejects_with_raw_response() {
        let (settled, _) = settle(RequestOptions::new(), Outcome::completed(response(404, "GET /404"))).await;

        match settled {
            Err(Error::StatusCode(err)) => {
                assert_eq!(err.status_code, 404);
                assert_eq!(err.error, "GET /404");
                assert_eq!(err.to_string(), r#"404 - "GET /404""#);
                assert_eq!(err.response.status_code(), Some(404));
            }
            other => panic!("expected StatusCodeError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_simple_non_2xx_with_transform_2xx_only_skips_transform() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let transform = Transform::new(move |_, _, _| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(Payload::from("transformed"))
        });

        let (settled, _) = settle(
            RequestOptions::new().transform(transform).transform2xx_only(true),
            Outcome::completed(response(500, "boom")),
        )
        .await;

        let err = settled.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(err.response().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_simple_non_2xx_transformed_payload() {
        let (settled, _) = settle(
            RequestOptions::new().transform(reverse()),
            Outcome::completed(response(404, "GET /404")),
        )
        .await;

        match settled {
            Err(Error::StatusCode(err)) => {
                assert_eq!(err.status_code, 404);
                assert_eq!(err.error, "GET /404");
                assert_eq!(err.response, Payload::Text("404/ TEG".into()));
            }
            other => panic!("expected StatusCodeError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_simple_non_2xx_failing_transform() {
        let failing = Transform::new(|_, _, _| Err(anyhow!("cannot parse")));
        let (settled, _) = settle(
            RequestOptions::new().transform(failing),
            Outcome::completed(response(404, "GET /404")),
        )
        .await;

        match settled {
            Err(Error::Transform(err)) => {
                assert_eq!(err.to_string(), "cannot parse");
                assert_eq!(err.response.map(|r| r.status_code()), Some(404));
            }
            other => panic!("expected TransformError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_2xx_transform_resolves() {
        let (settled, _) = settle(
            RequestOptions::new().transform(reverse()),
            Outcome::completed(response(200, "abc")),
        )
        .await;
        assert_eq!(settled.unwrap(), Payload::Text("cba".into()));
    }

    #[tokio::test]
    async fn test_async_transform_resolves() {
        let transform = Transform::new_async(|body, response, full| async move {
            tokio::task::yield_now().await;
            Ok(Payload::Json(serde_json::json!({
                "body": body.text_lossy(),
                "status": response.status_code(),
                "full": full
            })))
        });
        let (settled, _) = settle(
            RequestOptions::new().transform(transform).resolve_with_full_response(true),
            Outcome::completed(response(200, "abc")),
        )
        .await;

        assert_eq!(
            settled.unwrap(),
            Payload::Json(serde_json::json!({"body": "abc", "status": 200, "full": true}))
        );
    }

    #[tokio::test]
    async fn test_panicking_transform_rejects() {
        let transform = Transform::new(|_, _, _| panic!("transform exploded"));
        let (settled, raised) = settle(
            RequestOptions::new().transform(transform),
            Outcome::completed(response(200, "abc")),
        )
        .await;

        assert!(raised.is_ok());
        let err = settled.unwrap_err();
        assert!(err.is_transform_error());
        assert!(err.to_string().contains("transform exploded"));
    }

    #[tokio::test]
    async fn test_permissive_non_2xx_resolves_with_body() {
        let (settled, _) = settle(
            RequestOptions::new().simple(false),
            Outcome::completed(response(404, "GET /404")),
        )
        .await;
        assert_eq!(settled.unwrap(), Payload::Body(Body::from("GET /404")));
    }

    #[tokio::test]
    async fn test_permissive_non_2xx_full_response_skips_2xx_only_transform() {
        let (settled, _) = settle(
            RequestOptions::new()
                .simple(false)
                .resolve_with_full_response(true)
                .transform(Transform::new(|_, _, _| Ok(Payload::from("must not be called"))))
                .transform2xx_only(true),
            Outcome::completed(response(404, "GET /404")),
        )
        .await;

        let payload = settled.unwrap();
        assert_eq!(payload.status_code(), Some(404));
        assert_eq!(payload.body(), Some(&Body::from("GET /404")));
    }

    #[tokio::test]
    async fn test_permissive_non_2xx_transform_runs_when_not_2xx_only() {
        let (settled, _) = settle(
            RequestOptions::new().simple(false).transform(reverse()),
            Outcome::completed(response(404, "ab")),
        )
        .await;
        assert_eq!(settled.unwrap(), Payload::Text("ba".into()));
    }

    #[tokio::test]
    async fn test_head_default_transform() {
        let (settled, _) = settle(
            RequestOptions::new().method("head"),
            Outcome::completed(response(200, "")),
        )
        .await;
        let payload = settled.unwrap();
        assert!(matches!(payload, Payload::Headers(_)));
        assert_eq!(payload.headers().unwrap()["x-test"], "yes");

        let (settled, _) = settle(
            RequestOptions::new().method("HEAD").resolve_with_full_response(true),
            Outcome::completed(response(200, "")),
        )
        .await;
        assert_eq!(settled.unwrap().status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_callback_sees_exact_triple_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let callback = Callback::new(move |error, response, body| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(error.is_none());
            assert_eq!(response.map(|r| r.status_code()), Some(404));
            assert_eq!(body, Some(&Body::from("GET /404")));
            Ok(())
        });

        let (settled, raised) = settle(
            RequestOptions::new().callback(callback),
            Outcome::completed(response(404, "GET /404")),
        )
        .await;

        assert!(settled.unwrap_err().is_status_code_error());
        assert!(raised.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_callback_sees_transport_error() {
        let callback = Callback::new(|error, response, body| {
            assert!(error.unwrap().is_aborted());
            assert!(response.is_none());
            assert!(body.is_none());
            Ok(())
        });

        let (settled, raised) = settle(
            RequestOptions::new().callback(callback),
            Outcome::failed(TransportError::Aborted, None),
        )
        .await;

        assert!(settled.unwrap_err().is_request_error());
        assert!(raised.is_ok());
    }

    #[tokio::test]
    async fn test_failing_callback_reraised_after_settlement() {
        let callback = Callback::new(|_, _, _| Err(anyhow!("callback failed")));
        let (settled, raised) = settle(
            RequestOptions::new().callback(callback),
            Outcome::completed(response(200, "GET /200")),
        )
        .await;

        assert_eq!(settled.unwrap(), Payload::Body(Body::from("GET /200")));
        assert_eq!(raised.unwrap_err().to_string(), "callback failed");
    }

    #[tokio::test]
    async fn test_panicking_callback_still_settles() {
        let callback = Callback::new(|_, _, _| panic!("legacy code"));
        let (settled, raised) = settle(
            RequestOptions::new().callback(callback),
            Outcome::completed(response(404, "GET /404")),
        )
        .await;

        assert!(settled.unwrap_err().is_status_code_error());
        assert!(raised.unwrap_err().to_string().contains("legacy code"));
    }

    #[test]
    fn test_callback_slot_invoked_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut slot = OriginalCallback::from_option(Some(Callback::new(move |_, _, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));
        let outcome = Outcome::completed(response(200, "x"));

        assert!(slot.invoke(&outcome).is_none());
        assert!(slot.invoke(&outcome).is_none());
        assert!(matches!(slot, OriginalCallback::Invoked));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut empty = OriginalCallback::from_option(None);
        assert!(empty.invoke(&outcome).is_none());
        assert!(matches!(empty, OriginalCallback::Absent));
    }
}
