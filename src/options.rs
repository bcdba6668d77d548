// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request options
//!
//! [`RequestOptions`] is the option record every call is folded into. Data
//! options serialize to a JSON object using the wire option names
//! (`resolveWithFullResponse`, `followRedirect`, ...), and only options that
//! were actually set appear in it. That is what lets defaults and per-call
//! options be combined with [`deep_merge`](crate::merge::deep_merge).
//! Function-valued options ([`Transform`], [`Callback`], the cookie jar) are
//! kept beside the data and merge "right-hand wins when present".

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use lazy_static::lazy_static;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Error, Result, TransportError};
use crate::http::{Body, CookieJar, Response};
use crate::merge::deep_merge;
use crate::payload::Payload;

/// Signature of a legacy completion callback
pub type CallbackFn = dyn Fn(Option<&TransportError>, Option<&Response>, Option<&Body>) -> anyhow::Result<()>
    + Send
    + Sync;

/// Legacy `(error, response, body)` callback
///
/// Invoked exactly once per exchange, before the promise settles. An `Err`
/// it returns does not affect the promise.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wrap a callback closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&TransportError>, Option<&Response>, Option<&Body>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the callback with an outcome triple
    pub fn call(
        &self,
        error: Option<&TransportError>,
        response: Option<&Response>,
        body: Option<&Body>,
    ) -> anyhow::Result<()> {
        (self.0)(error, response, body)
    }

    /// Check if both handles point at the same callback
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Future returned by a transform
pub type TransformFuture = BoxFuture<'static, anyhow::Result<Payload>>;

type TransformFn = dyn Fn(Body, Response, bool) -> TransformFuture + Send + Sync;

/// Response transform `(body, response, resolveWithFullResponse) -> value`
///
/// Synchronous and asynchronous transforms share one representation: both
/// yield a future, so callers never branch on which kind they hold.
#[derive(Clone)]
pub struct Transform(Arc<TransformFn>);

impl Transform {
    /// Wrap a synchronous transform
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Body, Response, bool) -> anyhow::Result<Payload> + Send + Sync + 'static,
    {
        Self(Arc::new(
            move |body: Body, response: Response, full: bool| -> TransformFuture {
                let result = f(body, response, full);
                Box::pin(async move { result })
            },
        ))
    }

    /// Wrap an asynchronous transform
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Body, Response, bool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Payload>> + Send + 'static,
    {
        Self(Arc::new(
            move |body: Body, response: Response, full: bool| -> TransformFuture {
                Box::pin(f(body, response, full))
            },
        ))
    }

    /// Built-in transform for a method, if it has one
    ///
    /// HEAD resolves with the headers, or the full response when
    /// `resolveWithFullResponse` is set.
    pub fn default_for(method: &Method) -> Option<Transform> {
        if *method == Method::HEAD {
            Some(HEAD_TRANSFORM.clone())
        } else {
            None
        }
    }

    /// Start the transform
    pub fn invoke(&self, body: Body, response: Response, full_response: bool) -> TransformFuture {
        (self.0)(body, response, full_response)
    }

    /// Check if both handles point at the same transform
    pub fn ptr_eq(&self, other: &Transform) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

lazy_static! {
    static ref HEAD_TRANSFORM: Transform = Transform::new(|_body, response, full| {
        Ok(if full {
            Payload::Response(response)
        } else {
            Payload::Headers(response.headers)
        })
    });
}

/// Credentials sent with a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    /// Basic auth user
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "username")]
    pub user: Option<String>,
    /// Basic auth password
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "password")]
    pub pass: Option<String>,
    /// Bearer token (takes precedence over user/pass)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer: Option<String>,
}

/// Option record for one request, or a set of defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// Target URI (`url` is accepted as an alias)
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "url")]
    pub uri: Option<String>,
    /// Base URL a relative `uri` is joined to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// HTTP method, upper-cased once the request starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Query string parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qs: Option<Map<String, Value>>,
    /// Request body; strings are sent verbatim, anything else as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// `true` for JSON mode, or a value to send as the JSON body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    /// URL-encoded form body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Map<String, Value>>,
    /// Multipart body description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipart: Option<Value>,
    /// Credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    /// Timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Follow redirects (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_redirect: Option<bool>,
    /// Deliver the body as raw bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<bool>,
    /// Connection pool settings, opaque to this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<Value>,
    /// Reject non-2xx responses (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<bool>,
    /// Resolve with the full response instead of the body (default false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_with_full_response: Option<bool>,
    /// Only transform 2xx responses (default false)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "transform2xxOnly"
    )]
    pub transform2xx_only: Option<bool>,
    /// Options this crate does not interpret, forwarded untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Response transform
    #[serde(skip)]
    pub transform: Option<Transform>,
    /// Legacy completion callback
    #[serde(skip)]
    pub callback: Option<Callback>,
    /// Cookie jar used for this request
    #[serde(skip)]
    pub jar: Option<CookieJar>,
}

impl RequestOptions {
    /// Create an empty option record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::invalid_options(e.to_string()))
    }

    /// Data options as a JSON object (function-valued options left out)
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::invalid_options(e.to_string()))
    }

    /// Deep-merge `overlay` over `self` into a fresh record
    pub fn merged(&self, overlay: &RequestOptions) -> Result<RequestOptions> {
        let data = deep_merge(&self.to_value()?, &overlay.to_value()?);
        let mut merged = Self::from_value(data)?;
        merged.transform = overlay.transform.clone().or_else(|| self.transform.clone());
        merged.callback = overlay.callback.clone().or_else(|| self.callback.clone());
        merged.jar = overlay.jar.clone().or_else(|| self.jar.clone());
        Ok(merged)
    }

    /// Check if the request carries a body of any kind
    pub fn has_request_body(&self) -> bool {
        self.body.is_some()
            || self.form.is_some()
            || self.multipart.is_some()
            || matches!(self.json, Some(ref json) if !json.is_boolean())
    }

    /// Check if JSON mode is on
    pub fn is_json(&self) -> bool {
        !matches!(self.json, None | Some(Value::Bool(false)) | Some(Value::Null))
    }

    /// Set the target URI
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add a query string parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.qs
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Turn JSON mode on or off
    pub fn json_mode(mut self, enabled: bool) -> Self {
        self.json = Some(Value::Bool(enabled));
        self
    }

    /// Send a JSON body (turns JSON mode on)
    pub fn json(mut self, value: impl Into<Value>) -> Self {
        self.json = Some(value.into());
        self
    }

    /// Add a form field
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.form
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Use basic auth
    pub fn basic_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        let auth = self.auth.get_or_insert_with(Auth::default);
        auth.user = Some(user.into());
        auth.pass = Some(pass.into());
        self
    }

    /// Use a bearer token
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth.get_or_insert_with(Auth::default).bearer = Some(token.into());
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout.as_millis() as u64);
        self
    }

    /// Set follow redirects
    pub fn follow_redirect(mut self, follow: bool) -> Self {
        self.follow_redirect = Some(follow);
        self
    }

    /// Deliver the body as raw bytes
    pub fn binary(mut self, binary: bool) -> Self {
        self.binary = Some(binary);
        self
    }

    /// Set pool settings
    pub fn pool(mut self, pool: impl Into<Value>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    /// Set simple mode
    pub fn simple(mut self, simple: bool) -> Self {
        self.simple = Some(simple);
        self
    }

    /// Resolve with the full response
    pub fn resolve_with_full_response(mut self, full: bool) -> Self {
        self.resolve_with_full_response = Some(full);
        self
    }

    /// Only transform 2xx responses
    pub fn transform2xx_only(mut self, only: bool) -> Self {
        self.transform2xx_only = Some(only);
        self
    }

    /// Set the transform
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Set the legacy callback
    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Use a cookie jar
    pub fn jar(mut self, jar: CookieJar) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Set an option this crate does not interpret
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// What a request is aimed at: a URI, or a full option record
#[derive(Debug, Clone)]
pub enum Target {
    /// Target URI
    Uri(String),
    /// Option record carrying its own `uri`
    Options(RequestOptions),
}

impl From<&str> for Target {
    fn from(uri: &str) -> Self {
        Target::Uri(uri.to_string())
    }
}

impl From<String> for Target {
    fn from(uri: String) -> Self {
        Target::Uri(uri)
    }
}

impl From<&String> for Target {
    fn from(uri: &String) -> Self {
        Target::Uri(uri.clone())
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Target::Uri(url.into())
    }
}

impl From<&Url> for Target {
    fn from(url: &Url) -> Self {
        Target::Uri(url.as_str().to_string())
    }
}

impl From<RequestOptions> for Target {
    fn from(options: RequestOptions) -> Self {
        Target::Options(options)
    }
}
