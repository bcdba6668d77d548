// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar passed through to requests
//!
//! A jar is shared by every request it is attached to: cookies matching the
//! request URL are sent, and `Set-Cookie` headers from the response are
//! stored back. Jars can be persisted to and restored from a JSON file.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Cookie as parsed from a cookie string or a `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Host the cookie is scoped to, subdomains included; empty until stored
    pub domain: String,
    /// Path prefix, `/` by default
    pub path: String,
    /// Absolute expiry; `None` for session cookies
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    /// Session cookie for every path of any host
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::from("/"),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Parse `name=value; Attr=...`
    ///
    /// Unknown attributes are ignored, as are unparseable `Expires` and
    /// `Max-Age` values.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(';').map(str::trim);
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim());
        for attribute in parts {
            cookie.apply_attribute(attribute);
        }
        Some(cookie)
    }

    fn apply_attribute(&mut self, attribute: &str) {
        let (key, val) = match attribute.split_once('=') {
            Some((key, val)) => (key.trim(), val.trim()),
            None => (attribute, ""),
        };

        match key.to_ascii_lowercase().as_str() {
            "domain" => self.domain = val.trim_start_matches('.').to_string(),
            "path" if !val.is_empty() => self.path = val.to_string(),
            "expires" => {
                if let Ok(at) = DateTime::parse_from_rfc2822(val) {
                    self.expires = Some(at.with_timezone(&Utc));
                }
            }
            "max-age" => {
                if let Ok(secs) = val.parse::<i64>() {
                    self.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                }
            }
            "secure" => self.secure = true,
            "httponly" => self.http_only = true,
            _ => {}
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires, Some(at) if at < Utc::now())
    }

    /// Whether a request to `url` should carry this cookie
    pub fn matches(&self, url: &Url) -> bool {
        if self.is_expired() || (self.secure && url.scheme() != "https") {
            return false;
        }
        if !self.path_matches(url.path()) {
            return false;
        }

        let host = url.host_str().unwrap_or("");
        self.domain.is_empty()
            || host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .map_or(false, |prefix| prefix.ends_with('.'))
    }

    /// Path-match: equal, or a prefix ending at a `/` boundary
    fn path_matches(&self, request_path: &str) -> bool {
        match request_path.strip_prefix(self.path.as_str()) {
            Some(rest) => rest.is_empty() || self.path.ends_with('/') || rest.starts_with('/'),
            None => false,
        }
    }

    /// `name=value` as sent in a Cookie header
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Cookie storage shared by every request it is attached to
///
/// Clones share one store. Cookies are bucketed by domain.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    buckets: Arc<DashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a jar from a JSON store file; a missing file gives an empty jar
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::CookieStore(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json).map_err(|e| Error::CookieStore(format!("{}: {}", path.display(), e)))
    }

    /// Persist the jar to a JSON store file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self
            .to_json()
            .map_err(|e| Error::CookieStore(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| Error::CookieStore(format!("{}: {}", path.display(), e)))
    }

    /// Store a cookie, replacing one with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut bucket = self.buckets.entry(cookie.domain.clone()).or_default();
        bucket.retain(|c| c.name != cookie.name || c.path != cookie.path);
        bucket.push(cookie);
    }

    /// Parse a cookie string and store it as if set by `url`
    pub fn set_cookie(&self, s: &str, url: &Url) -> Option<Cookie> {
        let mut cookie = Cookie::parse(s)?;
        if cookie.domain.is_empty() {
            cookie.domain = url.host_str().unwrap_or("").to_string();
        }
        self.add(cookie.clone());
        Some(cookie)
    }

    /// Live cookies a request to `url` should carry
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.purge_expired();
        let mut cookies = Vec::new();
        for bucket in self.buckets.iter() {
            cookies.extend(bucket.value().iter().filter(|c| c.matches(url)).cloned());
        }
        cookies
    }

    /// Cookie header value for `url`, if any cookie matches
    pub fn get_cookie_string(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self.get_cookies(url).iter().map(Cookie::pair).collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    pub fn clear(&self) {
        self.buckets.clear();
    }

    fn purge_expired(&self) {
        self.buckets.retain(|_, bucket| {
            bucket.retain(|c| !c.is_expired());
            !bucket.is_empty()
        });
    }

    /// Number of stored cookies, expired ones included until the next lookup
    pub fn len(&self) -> usize {
        self.buckets.iter().fold(0, |n, bucket| n + bucket.value().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize every stored cookie as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        let cookies: Vec<Cookie> = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.value().clone())
            .collect();
        serde_json::to_string_pretty(&cookies)
    }

    /// Restore a jar from a JSON array of cookies
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let jar = CookieJar::new();
        serde_json::from_str::<Vec<Cookie>>(json)?
            .into_iter()
            .for_each(|cookie| jar.add(cookie));
        Ok(jar)
    }
}
