//! Pending calls and the deferred results handed back to callers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::FusedFuture;

use crate::error::SettleAction;

/// Identifier of one invocation of a mock, unique within that mock.
///
/// Ids are handed out in invocation order starting at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallId(u64);

impl CallId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call({})", self.0)
    }
}

/// The final value a pending call is settled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    /// Fulfill the call with a value.
    Resolve(T),
    /// Reject the call with an error value.
    Reject(E),
}

impl<T, E> Settlement<T, E> {
    /// Which way this settlement goes.
    #[must_use]
    pub fn action(&self) -> SettleAction {
        match self {
            Self::Resolve(_) => SettleAction::Resolve,
            Self::Reject(_) => SettleAction::Reject,
        }
    }

    fn into_result(self) -> Result<T, E> {
        match self {
            Self::Resolve(value) => Ok(value),
            Self::Reject(error) => Err(error),
        }
    }
}

/// The deferred result of one call to an [`AsyncFn`](crate::AsyncFn).
///
/// Resolves to `Ok(value)` or `Err(error)` once the test settles the call.
/// Chain continuations with [`FutureExt`](futures::FutureExt) or `.await`
/// it like any other future.
///
/// A call that is never settled stays pending forever, including when the
/// mock that created it is dropped first.
#[must_use = "futures do nothing unless polled"]
pub struct CallFuture<T, E> {
    id: CallId,
    rx: oneshot::Receiver<Result<T, E>>,
    done: bool,
}

impl<T, E> CallFuture<T, E> {
    /// The invocation this future belongs to.
    #[must_use]
    pub fn id(&self) -> CallId {
        self.id
    }
}

impl<T, E> Future for CallFuture<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.done {
            return Poll::Pending;
        }

        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => {
                self.done = true;
                Poll::Ready(result)
            }
            // Settler dropped with its mock: the call can never settle.
            Poll::Ready(Err(oneshot::Canceled)) => {
                self.done = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> FusedFuture for CallFuture<T, E> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<T, E> fmt::Debug for CallFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFuture")
            .field("id", &self.id)
            .field("done", &self.done)
            .finish()
    }
}

/// One outstanding invocation held by the registry.
pub(crate) struct PendingCall<A, T, E> {
    pub(crate) id: CallId,
    pub(crate) args: A,
    settler: oneshot::Sender<Result<T, E>>,
}

impl<A, T, E> PendingCall<A, T, E> {
    /// Creates the pending call and the future handed to the caller.
    pub(crate) fn new(id: CallId, args: A) -> (Self, CallFuture<T, E>) {
        let (tx, rx) = oneshot::channel();
        let call = Self {
            id,
            args,
            settler: tx,
        };
        let future = CallFuture {
            id,
            rx,
            done: false,
        };
        (call, future)
    }

    /// Settles the call, consuming it.
    ///
    /// Returns `false` if the caller already dropped its [`CallFuture`].
    pub(crate) fn settle(self, settlement: Settlement<T, E>) -> bool {
        self.settler.send(settlement.into_result()).is_ok()
    }
}

impl<A: fmt::Debug, T, E> fmt::Debug for PendingCall<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("id", &self.id)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
