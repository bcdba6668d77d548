// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Deferred settlement of a request promise

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

use crate::error::Error;
use crate::payload::Payload;

/// Final result of a request
pub type Settlement = std::result::Result<Payload, Error>;

/// Cloneable future of a request's settlement
pub type Promise = Shared<BoxFuture<'static, Settlement>>;

/// Resolve/reject capability for one promise
///
/// Both operations consume the deferred, so it settles at most once.
#[derive(Debug)]
pub struct Deferred {
    sender: oneshot::Sender<Settlement>,
}

impl Deferred {
    /// Create a deferred and the promise it settles
    pub fn new() -> (Self, Promise) {
        let (sender, receiver) = oneshot::channel();
        let promise = async move { receiver.await.unwrap_or_else(|_| Err(Error::Dropped)) }
            .boxed()
            .shared();
        (Self { sender }, promise)
    }

    /// Fulfil the promise
    pub fn resolve(self, value: Payload) {
        self.settle(Ok(value));
    }

    /// Reject the promise
    pub fn reject(self, error: impl Into<Error>) {
        self.settle(Err(error.into()));
    }

    fn settle(self, settlement: Settlement) {
        if self.sender.send(settlement).is_err() {
            tracing::trace!("promise dropped before settlement");
        }
    }
}
