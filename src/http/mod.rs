// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport layer
//!
//! The transport seam, its reqwest implementation, the response types it
//! produces and the cookie jar it honors.

mod client;
mod cookie;
mod response;
mod transport;

pub use client::{resolve_url, ReqwestTransport, TransportConfig};
pub use cookie::{Cookie, CookieJar};
pub use response::{Body, Response};
pub use transport::{Outcome, OutcomeClass, Transport};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("request-promise/", env!("CARGO_PKG_VERSION"));
