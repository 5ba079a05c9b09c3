//! Single-settlement completion handles.
//!
//! A [`Resolver`] is handed to every factory and facet. Settling consumes it,
//! so a handler cannot settle twice; dropping it unsettled rejects the paired
//! [`Deferred`] with [`WireError::Abandoned`].

use crate::error::{Result, WireError};
use crate::value::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Creates a resolver and the deferred value it settles.
pub fn resolver(path: impl Into<Arc<str>>) -> (Resolver, Deferred) {
    let (tx, rx) = oneshot::channel();
    let path = path.into();
    (Resolver { tx, path: path.clone() }, Deferred { rx, path })
}

#[derive(Debug)]
pub struct Resolver {
    tx: oneshot::Sender<Result<Value>>,
    path: Arc<str>,
}

impl Resolver {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn resolve(self, value: Value) {
        self.settle(Ok(value));
    }

    pub fn reject(self, error: WireError) {
        self.settle(Err(error));
    }

    pub fn settle(self, result: Result<Value>) {
        if let Err(err) = &result {
            debug!(path = %self.path, kind = err.kind(), error = %err, "Resolver rejected");
        }
        if self.tx.send(result).is_err() {
            trace!(path = %self.path, "Deferred dropped before settlement");
        }
    }

    /// Settles with the outcome of `work`, run on its own task.
    pub fn settle_with<F>(self, work: F)
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        tokio::spawn(async move { self.settle(work.await) });
    }
}

/// Awaitable side of a [`Resolver`].
#[derive(Debug)]
pub struct Deferred {
    rx: oneshot::Receiver<Result<Value>>,
    path: Arc<str>,
}

impl Deferred {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Future for Deferred {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(WireError::Abandoned {
                    message: "resolver dropped without settling".into(),
                    context: Some(this.path.to_string().into()),
                })
            })
        })
    }
}
