// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! reqwest-backed transport

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde_json::{Map, Value};
use url::Url;

use super::response::{Body, Response};
use super::transport::{Outcome, Transport};
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result, TransportError};
use crate::events::{EventEmitter, RequestEvent};
use crate::request::RequestConfig;

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout, overridden per request by `timeout`
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Headers sent with every request
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Idle connections kept per host; `None` leaves reqwest's default
    ///
    /// Pooled connections belong to the runtime that opened them, so a
    /// transport shared between runtimes should keep none.
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers: HeaderMap::new(),
            proxy: None,
            pool_max_idle_per_host: None,
        }
    }
}

/// Transport that performs exchanges with reqwest
///
/// Holds two clients because redirect policy is fixed per reqwest client:
/// one follows redirects, the other hands 3xx responses back as they are.
#[derive(Clone)]
pub struct ReqwestTransport {
    following: Client,
    direct: Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let following = Self::builder(&config)?
            .redirect(Policy::limited(config.max_redirects))
            .build()?;
        let direct = Self::builder(&config)?.redirect(Policy::none()).build()?;

        Ok(Self {
            following,
            direct,
            config,
        })
    }

    fn builder(config: &TransportConfig) -> Result<reqwest::ClientBuilder> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(idle) = config.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(idle);
        }

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::invalid_options(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(builder)
    }

    /// Get transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn client_for(&self, config: &RequestConfig) -> &Client {
        if config.options.follow_redirect == Some(false) {
            &self.direct
        } else {
            &self.following
        }
    }

    /// Translate a normalized request into a reqwest request
    pub fn build_request(&self, config: &RequestConfig) -> std::result::Result<reqwest::Request, TransportError> {
        let options = &config.options;
        let url = resolve_url(options.base_url.as_deref(), options.uri.as_deref(), options.qs.as_ref())?;
        let mut builder = self.client_for(config).request(config.method.clone(), url.clone());

        if config.json_mode() {
            builder = builder.header("accept", "application/json");
        }

        if let Some(ref headers) = options.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        if let Some(ref jar) = options.jar {
            if let Some(cookies) = jar.get_cookie_string(&url) {
                builder = builder.header("cookie", cookies);
            }
        }

        if let Some(ref auth) = options.auth {
            if let Some(ref token) = auth.bearer {
                builder = builder.header("authorization", format!("Bearer {}", token));
            } else if let Some(ref user) = auth.user {
                let encoded = base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{}:{}", user, auth.pass.as_deref().unwrap_or("")),
                );
                builder = builder.header("authorization", format!("Basic {}", encoded));
            }
        }

        match (&options.json, &options.body, &options.form) {
            (Some(json), _, _) if !json.is_boolean() && !json.is_null() => {
                builder = builder.json(json);
            }
            (_, Some(Value::String(text)), _) => {
                builder = builder.body(text.clone());
            }
            (_, Some(value), _) => {
                if !has_content_type(options.headers.as_ref()) {
                    builder = builder.header("content-type", "application/json");
                }
                builder = builder.body(value.to_string());
            }
            (_, None, Some(form)) => {
                builder = builder.form(&form_pairs(form));
            }
            _ => {}
        }

        if let Some(ms) = options.timeout {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(&self, config: &RequestConfig, events: &EventEmitter) -> Outcome {
        let start = Instant::now();

        let request = match self.build_request(config) {
            Ok(request) => request,
            Err(error) => return Outcome::failed(error, None),
        };
        let requested_url = request.url().clone();
        events.emit(RequestEvent::Request {
            method: request.method().clone(),
            url: requested_url.clone(),
        });

        let response = match self.client_for(config).execute(request).await {
            Ok(response) => response,
            Err(error) => return Outcome::failed(error.into(), None),
        };

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let redirected = final_url != requested_url;
        events.emit(RequestEvent::Response {
            status,
            headers: headers.clone(),
        });

        if let Some(ref jar) = config.options.jar {
            for value in headers.get_all("set-cookie") {
                if let Ok(cookie) = value.to_str() {
                    jar.set_cookie(cookie, &final_url);
                }
            }
        }

        let raw = match response.bytes().await {
            Ok(raw) => raw,
            Err(error) => {
                let partial = Response::new(
                    status,
                    headers,
                    Body::default(),
                    final_url,
                    redirected,
                    start.elapsed().as_millis() as u64,
                );
                return Outcome::failed(error.into(), Some(partial));
            }
        };
        let body = Body::decode(raw, config.json_mode(), config.options.binary == Some(true));

        Outcome::completed(Response::new(
            status,
            headers,
            body,
            final_url,
            redirected,
            start.elapsed().as_millis() as u64,
        ))
    }
}

/// Resolve `uri` against an optional base URL and append `qs`
pub fn resolve_url(
    base_url: Option<&str>,
    uri: Option<&str>,
    qs: Option<&Map<String, Value>>,
) -> std::result::Result<Url, TransportError> {
    let uri = uri.unwrap_or("");
    let mut url = match base_url {
        Some(base) => {
            let base = if base.ends_with('/') {
                base.to_string()
            } else {
                format!("{}/", base)
            };
            Url::parse(&base)?.join(uri.trim_start_matches('/'))?
        }
        None => Url::parse(uri)?,
    };

    if let Some(qs) = qs {
        if !qs.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in qs {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            pairs.append_pair(name, &scalar_to_string(item));
                        }
                    }
                    other => {
                        pairs.append_pair(name, &scalar_to_string(other));
                    }
                }
            }
        }
    }

    Ok(url)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn form_pairs(form: &Map<String, Value>) -> Vec<(String, String)> {
    form.iter()
        .map(|(name, value)| (name.clone(), scalar_to_string(value)))
        .collect()
}

fn has_content_type(headers: Option<&std::collections::BTreeMap<String, String>>) -> bool {
    headers.map_or(false, |h| {
        h.keys().any(|k| k.eq_ignore_ascii_case("content-type"))
    })
}
