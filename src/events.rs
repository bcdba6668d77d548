// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-request event emitter
//!
//! Requests start as soon as they are created, so a listener may be attached
//! after the event it cares about already fired. The emitter keeps a history
//! and replays matching events to late listeners; every listener sees every
//! matching event exactly once.

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::TransportError;
use crate::http::Response;

/// Something that happened during an exchange
#[derive(Debug, Clone)]
pub enum RequestEvent {
    /// Request is about to be sent
    Request { method: Method, url: Url },
    /// Status and headers arrived
    Response { status: StatusCode, headers: HeaderMap },
    /// Exchange finished with a full response
    Complete(Response),
    /// Transport failed
    Error(TransportError),
    /// Request was aborted through its handle
    Abort,
    /// The legacy callback failed; re-raised after the promise settled
    CallbackError(Arc<anyhow::Error>),
}

/// Event discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`RequestEvent::Request`]
    Request,
    /// [`RequestEvent::Response`]
    Response,
    /// [`RequestEvent::Complete`]
    Complete,
    /// [`RequestEvent::Error`]
    Error,
    /// [`RequestEvent::Abort`]
    Abort,
    /// [`RequestEvent::CallbackError`]
    CallbackError,
}

impl RequestEvent {
    /// Get the event kind
    pub fn kind(&self) -> EventKind {
        match self {
            RequestEvent::Request { .. } => EventKind::Request,
            RequestEvent::Response { .. } => EventKind::Response,
            RequestEvent::Complete(_) => EventKind::Complete,
            RequestEvent::Error(_) => EventKind::Error,
            RequestEvent::Abort => EventKind::Abort,
            RequestEvent::CallbackError(_) => EventKind::CallbackError,
        }
    }
}

/// Event listener callback type
pub type Listener = Arc<dyn Fn(&RequestEvent) + Send + Sync>;

#[derive(Default)]
struct EmitterState {
    listeners: Vec<(EventKind, Listener)>,
    history: Vec<RequestEvent>,
}

/// Event emitter owned by one request
#[derive(Default)]
pub struct EventEmitter {
    state: Mutex<EmitterState>,
}

impl EventEmitter {
    /// Create a new emitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event, replaying any that already fired
    pub fn on(&self, kind: EventKind, listener: Listener) {
        let replay: Vec<RequestEvent> = {
            let mut state = self.state.lock();
            state.listeners.push((kind, listener.clone()));
            state
                .history
                .iter()
                .filter(|e| e.kind() == kind)
                .cloned()
                .collect()
        };

        for event in &replay {
            listener(event);
        }
    }

    /// Record an event and notify its listeners
    pub fn emit(&self, event: RequestEvent) {
        let listeners: Vec<Listener> = {
            let mut state = self.state.lock();
            state.history.push(event.clone());
            state
                .listeners
                .iter()
                .filter(|(kind, _)| *kind == event.kind())
                .map(|(_, l)| l.clone())
                .collect()
        };

        for listener in listeners {
            listener(&event);
        }
    }

    /// Number of listeners for an event kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}
