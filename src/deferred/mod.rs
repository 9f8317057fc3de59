//! Deferred results for dispatched actions.
//!
//! A [`Deferred`] pairs a [`Promise`] with a [`Resolver`]. The resolver is
//! embedded in an action and handed to whatever processes that action; the
//! submitting side awaits the promise. This turns "dispatch and forget" into
//! an awaitable call.
//!
//! Exactly one settlement takes effect. Later calls to [`Resolver::resolve`]
//! or [`Resolver::reject`] are logged at `warn` level and ignored; they return
//! `false` and never replace the settled value.
//!
//! There is no timeout. A processor that keeps a resolver alive without ever
//! settling it leaves the awaiting task suspended. If every resolver is
//! dropped unsettled, the promise completes with [`Abandoned`].

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Every resolver was dropped before the deferred was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deferred was dropped before it was settled")]
pub struct Abandoned;

type Slot<T, E> = Arc<Mutex<Option<oneshot::Sender<Result<T, E>>>>>;

/// Settlement capability for a [`Deferred`]. Clones share the same slot.
pub struct Resolver<T, E> {
    slot: Slot<T, E>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<T, E> Resolver<T, E> {
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    /// Settle with `result`. Returns `true` only for the call that settled
    /// the deferred.
    pub fn settle(&self, result: Result<T, E>) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(sender) = sender else {
            tracing::warn!("deferred already settled, ignoring settlement");
            return false;
        };
        if sender.send(result).is_err() {
            // The awaiting side went away (e.g. the screen was left).
            tracing::debug!("deferred settled after its promise was dropped");
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

/// The awaiting half of a [`Deferred`].
///
/// Resolves to `Ok(T)` or to the rejection error. An abandoned deferred is
/// reported through `E: From<Abandoned>`.
#[derive(Debug)]
pub struct Promise<T, E> {
    rx: oneshot::Receiver<Result<T, E>>,
}

impl<T, E: From<Abandoned>> Promise<T, E> {
    /// Take the settled result without waiting. `None` while unsettled.
    pub fn try_take(&mut self) -> Option<Result<T, E>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(E::from(Abandoned))),
        }
    }
}

impl<T, E: From<Abandoned>> Future for Promise<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(result) => result,
            Err(_) => Err(E::from(Abandoned)),
        })
    }
}

/// A single-use handle: one promise, one settlement.
#[derive(Debug)]
pub struct Deferred<T, E> {
    resolver: Resolver<T, E>,
    promise: Promise<T, E>,
}

impl<T, E> Deferred<T, E> {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            resolver: Resolver {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
            promise: Promise { rx },
        }
    }

    /// A resolver to embed in a dispatched action.
    pub fn resolver(&self) -> Resolver<T, E> {
        self.resolver.clone()
    }

    pub fn split(self) -> (Resolver<T, E>, Promise<T, E>) {
        (self.resolver, self.promise)
    }
}

impl<T, E> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Awaiting a deferred drops its own resolver, so abandonment is observable
/// once all handed-out resolvers are gone.
impl<T, E: From<Abandoned>> IntoFuture for Deferred<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = Promise<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.promise
    }
}

pub fn defer<T, E>() -> Deferred<T, E> {
    Deferred::new()
}
