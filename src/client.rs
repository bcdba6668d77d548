// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client with verb shortcuts and composable defaults

use std::path::Path;
use std::sync::Arc;

use reqwest::Method;

use crate::error::Result;
use crate::http::{Cookie, CookieJar, ReqwestTransport, Transport, TransportConfig};
use crate::options::{Callback, RequestOptions, Target};
use crate::request::{self, init_params, RequestHandle};

/// Replaces request initiation for a composed client
///
/// Receives the fully merged options and a plain client (same transport, no
/// defaults, no requester) it may use to actually start the request.
pub type Requester = Arc<dyn Fn(RequestOptions, &Client) -> Result<RequestHandle> + Send + Sync>;

/// Promise-style HTTP client
///
/// Every call deep-merges, lowest precedence first: each layer of defaults
/// in composition order, then the call's own options. Default layers are
/// shared read-only between calls and clones.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    defaults: Vec<Arc<RequestOptions>>,
    requester: Option<Requester>,
}

impl Client {
    /// Create a client over a reqwest transport with default configuration
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a client over a reqwest transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::with_config(
            config,
        )?)))
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            defaults: Vec::new(),
            requester: None,
        }
    }

    /// Compose a client whose calls start from `options`
    pub fn defaults(&self, options: RequestOptions) -> Client {
        let mut defaults = self.defaults.clone();
        defaults.push(Arc::new(options));
        Client {
            transport: self.transport.clone(),
            defaults,
            requester: self.requester.clone(),
        }
    }

    /// Compose a client with defaults and a replacement requester
    pub fn defaults_with_requester(&self, options: RequestOptions, requester: Requester) -> Client {
        let mut composed = self.defaults(options);
        composed.requester = Some(requester);
        composed
    }

    /// Compose a client that only replaces the requester
    pub fn with_requester(&self, requester: Requester) -> Client {
        self.defaults_with_requester(RequestOptions::new(), requester)
    }

    /// Defaults of this client, merged into one record
    pub fn default_options(&self) -> Result<RequestOptions> {
        self.defaults
            .iter()
            .try_fold(RequestOptions::new(), |acc, layer| acc.merged(layer))
    }

    /// Start a request
    pub fn request(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.call(None, Some(target.into()), None, None)
    }

    /// Start a request with extra options
    pub fn request_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.call(None, Some(target.into()), Some(options), None)
    }

    /// Start a request with a legacy `(error, response, body)` callback
    pub fn request_with_callback(
        &self,
        target: impl Into<Target>,
        options: Option<RequestOptions>,
        callback: Callback,
    ) -> Result<RequestHandle> {
        self.call(None, Some(target.into()), options, Some(callback))
    }

    /// GET shortcut
    pub fn get(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::GET, target, None, None)
    }

    /// GET with extra options
    pub fn get_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::GET, target, Some(options), None)
    }

    /// HEAD shortcut
    pub fn head(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::HEAD, target, None, None)
    }

    /// HEAD with extra options
    pub fn head_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::HEAD, target, Some(options), None)
    }

    /// OPTIONS shortcut
    pub fn options(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::OPTIONS, target, None, None)
    }

    /// OPTIONS with extra options
    pub fn options_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::OPTIONS, target, Some(options), None)
    }

    /// POST shortcut
    pub fn post(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::POST, target, None, None)
    }

    /// POST with extra options
    pub fn post_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::POST, target, Some(options), None)
    }

    /// PUT shortcut
    pub fn put(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::PUT, target, None, None)
    }

    /// PUT with extra options
    pub fn put_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::PUT, target, Some(options), None)
    }

    /// PATCH shortcut
    pub fn patch(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::PATCH, target, None, None)
    }

    /// PATCH with extra options
    pub fn patch_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::PATCH, target, Some(options), None)
    }

    /// DELETE shortcut
    pub fn delete(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.verb(Method::DELETE, target, None, None)
    }

    /// DELETE with extra options
    pub fn delete_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.verb(Method::DELETE, target, Some(options), None)
    }

    /// DELETE shortcut, short name
    pub fn del(&self, target: impl Into<Target>) -> Result<RequestHandle> {
        self.delete(target)
    }

    /// DELETE with extra options, short name
    pub fn del_with(&self, target: impl Into<Target>, options: RequestOptions) -> Result<RequestHandle> {
        self.delete_with(target, options)
    }

    /// Full `(target, options, callback)` form with an explicit method
    ///
    /// The method overrides any method in the defaults or the options.
    pub fn verb(
        &self,
        method: Method,
        target: impl Into<Target>,
        options: Option<RequestOptions>,
        callback: Option<Callback>,
    ) -> Result<RequestHandle> {
        self.call(Some(method), Some(target.into()), options, callback)
    }

    /// New cookie jar, loaded from a JSON store file when one is given
    pub fn jar(&self, store: Option<&Path>) -> Result<CookieJar> {
        crate::jar(store)
    }

    /// Parse a cookie string
    pub fn cookie(&self, s: &str) -> Option<Cookie> {
        crate::cookie(s)
    }

    /// Merge one call over the defaults and hand it off
    pub fn call(
        &self,
        verb: Option<Method>,
        target: Option<Target>,
        options: Option<RequestOptions>,
        callback: Option<Callback>,
    ) -> Result<RequestHandle> {
        let params = init_params(target, options, callback)?;
        let mut merged = self.default_options()?.merged(&params)?;
        if params.pool.is_some() {
            merged.pool = params.pool.clone();
        }
        if let Some(verb) = verb {
            merged.method = Some(verb.as_str().to_string());
        }

        match self.requester {
            Some(ref requester) => requester(merged, &self.plain()),
            None => request::initiate(merged, self.transport.clone()),
        }
    }

    fn plain(&self) -> Client {
        Client::with_transport(self.transport.clone())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new().expect("Failed to create default HTTP client")
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("defaults", &self.defaults.len())
            .field("requester", &self.requester.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::events::EventEmitter;
    use crate::http::{Body, Outcome, Response};
    use crate::payload::Payload;
    use crate::request::RequestConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use serde_json::json;
    use url::Url;

    /// Answers every request with "<METHOD> <path>" and the status in the
    /// last path segment, recording the options it saw
    #[derive(Default)]
    struct EchoTransport {
        seen: Mutex<Vec<RequestOptions>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn exchange(&self, config: &RequestConfig, _events: &EventEmitter) -> Outcome {
            self.seen.lock().push(config.options.clone());
            let url = Url::parse(config.uri()).unwrap();
            let status = url
                .path_segments()
                .and_then(|s| s.last())
                .and_then(|s| s.parse().ok())
                .unwrap_or(200);
            Outcome::completed(Response::new(
                StatusCode::from_u16(status).unwrap(),
                HeaderMap::new(),
                Body::from(format!("{} {}", config.method, url.path())),
                url,
                false,
                0,
            ))
        }
    }

    fn client() -> (Client, Arc<EchoTransport>) {
        let transport = Arc::new(EchoTransport::default());
        (Client::with_transport(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_request_resolves_with_body() {
        let (client, _) = client();
        let body = client.request("http://localhost:4000/200").unwrap().await.unwrap();
        assert_eq!(body.as_text(), Some("GET /200"));
    }

    #[tokio::test]
    async fn test_request_rejects_non_2xx() {
        let (client, _) = client();
        let err = client.request("http://localhost:4000/404").unwrap().await.unwrap_err();
        assert!(err.is_status_code_error());
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_verb_shortcut_forwards_options() {
        let (client, transport) = client();
        let body = client
            .post(
                RequestOptions::new()
                    .uri("http://localhost:4000/404")
                    .json(json!({"a": "b"}))
                    .simple(false),
            )
            .unwrap()
            .await
            .unwrap();

        assert_eq!(body.as_text(), Some("POST /404"));
        assert_eq!(transport.seen.lock()[0].method.as_deref(), Some("POST"));
    }

    #[tokio::test]
    async fn test_defaults() {
        let (client, _) = client();
        let simple_off = client.defaults(RequestOptions::new().simple(false));

        let response = simple_off
            .request(
                RequestOptions::new()
                    .uri("http://localhost:4000/404")
                    .resolve_with_full_response(true),
            )
            .unwrap()
            .await
            .unwrap();
        assert_eq!(response.status_code(), Some(404));
        assert_eq!(response.body(), Some(&Body::from("GET /404")));
    }

    #[tokio::test]
    async fn test_defaults_chained() {
        let (client, _) = client();
        let composed = client
            .defaults(RequestOptions::new().simple(false))
            .defaults(RequestOptions::new().resolve_with_full_response(true));

        let response = composed.request("http://localhost:4000/404").unwrap().await.unwrap();
        assert_eq!(response.status_code(), Some(404));
        assert_eq!(response.body(), Some(&Body::from("GET /404")));
    }

    #[test]
    fn test_chained_defaults_equal_single_merge() {
        let (client, _) = client();
        let a = RequestOptions::new().simple(false).header("x-a", "1");
        let b = RequestOptions::new().resolve_with_full_response(true).header("x-b", "2");

        let chained = client.defaults(a.clone()).defaults(b.clone());
        let single = client.defaults(a.merged(&b).unwrap());

        assert_eq!(
            chained.default_options().unwrap().to_value().unwrap(),
            single.default_options().unwrap().to_value().unwrap()
        );
    }

    #[tokio::test]
    async fn test_call_options_beat_defaults_and_defaults_untouched() {
        let (client, transport) = client();
        let composed = client.defaults(
            RequestOptions::new()
                .header("accept", "text/html")
                .header("x-default", "1")
                .method("PUT"),
        );

        composed
            .request_with(
                "http://localhost:4000/200",
                RequestOptions::new().header("accept", "application/json"),
            )
            .unwrap()
            .await
            .unwrap();
        composed.get("http://localhost:4000/200").unwrap().await.unwrap();

        let seen = transport.seen.lock();
        let headers = seen[0].headers.as_ref().unwrap();
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers["x-default"], "1");
        assert_eq!(seen[0].method.as_deref(), Some("PUT"));
        assert_eq!(seen[1].method.as_deref(), Some("GET"));
        assert_eq!(seen[1].headers.as_ref().unwrap()["accept"], "text/html");
        assert!(composed.default_options().unwrap().uri.is_none());
    }

    #[tokio::test]
    async fn test_pool_prefers_call_value() {
        let (client, transport) = client();
        let composed = client.defaults(RequestOptions::new().pool(json!({"maxSockets": 5, "name": "a"})));

        composed
            .request_with(
                "http://localhost:4000/200",
                RequestOptions::new().pool(json!({"maxSockets": 10})),
            )
            .unwrap()
            .await
            .unwrap();
        composed.request("http://localhost:4000/200").unwrap().await.unwrap();

        let seen = transport.seen.lock();
        assert_eq!(seen[0].pool, Some(json!({"maxSockets": 10})));
        assert_eq!(seen[1].pool, Some(json!({"maxSockets": 5, "name": "a"})));
    }

    #[tokio::test]
    async fn test_requester_receives_merged_options() {
        let (client, _) = client();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let requester: Requester = Arc::new(move |options: RequestOptions, plain: &Client| {
            recorded.lock().push(options.clone());
            plain.request(options)
        });

        let composed = client.defaults_with_requester(RequestOptions::new().simple(false), requester);
        let body = composed.delete("http://localhost:4000/500").unwrap().await.unwrap();

        assert_eq!(body.as_text(), Some("DELETE /500"));
        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].simple, Some(false));
        assert_eq!(calls[0].method.as_deref(), Some("DELETE"));
    }

    #[tokio::test]
    async fn test_callback_form() {
        let (client, _) = client();
        let called = Arc::new(Mutex::new(false));
        let flag = called.clone();
        let callback = Callback::new(move |_, _, _| {
            *flag.lock() = true;
            Ok(())
        });

        let body = client
            .request_with_callback("http://localhost:4000/201", None, callback)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(body, Payload::Body(Body::from("GET /201")));
        assert!(*called.lock());
    }

    #[test]
    fn test_missing_target_is_synchronous() {
        let (client, transport) = client();
        assert!(matches!(
            client.call(None, None, Some(RequestOptions::new()), None),
            Err(Error::MissingTarget)
        ));
        assert!(matches!(
            client.request(RequestOptions::new().simple(false)),
            Err(Error::MissingTarget)
        ));
        assert!(transport.seen.lock().is_empty());
    }

    #[test]
    fn test_head_with_body_is_synchronous() {
        let (client, _) = client();
        let err = client
            .head(RequestOptions::new().uri("http://localhost:4000/200").body("x"))
            .unwrap_err();
        assert!(matches!(err, Error::HeadWithBody));
    }

    #[tokio::test]
    async fn test_verb_with_options_and_callback() {
        let (client, transport) = client();
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let record = statuses.clone();
        let callback = Callback::new(move |_, response, _| {
            record.lock().push(response.map(Response::status_code));
            Ok(())
        });

        let body = client
            .verb(
                Method::POST,
                "http://localhost:4000/404",
                Some(RequestOptions::new().simple(false).header("x-call", "1")),
                Some(callback),
            )
            .unwrap()
            .await
            .unwrap();
        assert_eq!(body.as_text(), Some("POST /404"));
        assert_eq!(*statuses.lock(), vec![Some(404)]);

        let body = client
            .put_with(
                "http://localhost:4000/500",
                RequestOptions::new().simple(false).method("GET"),
            )
            .unwrap()
            .await
            .unwrap();
        assert_eq!(body.as_text(), Some("PUT /500"));

        let seen = transport.seen.lock();
        assert_eq!(seen[0].headers.as_ref().unwrap()["x-call"], "1");
        assert_eq!(seen[1].method.as_deref(), Some("PUT"));
    }

    #[test]
    fn test_request_outside_runtime_is_an_error() {
        let (client, transport) = client();

        let err = client.get("http://localhost:4000/200").unwrap_err();

        assert!(matches!(err, Error::NoRuntime));
        assert!(transport.seen.lock().is_empty());
    }

    #[test]
    fn test_cookie_helpers() {
        let (client, _) = client();
        let jar = client.jar(None).unwrap();
        assert!(jar.is_empty());

        let cookie = client.cookie("key=value; Path=/api").unwrap();
        assert_eq!(cookie.name, "key");
        assert_eq!(cookie.path, "/api");
    }
}
