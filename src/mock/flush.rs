//! Completion signals returned by settlement operations.
//!
//! Settling a call only sends its value; the tasks waiting on the call still
//! have to be polled before their side effects become visible. A [`Flush`]
//! yields back to the scheduler a configured number of times so that every
//! task woken by the settlement, and every task those wake in turn, runs
//! before the awaiting test resumes.
//!
//! Flushing is runtime-agnostic: each tick wakes the current task and returns
//! `Pending` once. The guarantee holds on single-threaded schedulers such as
//! the `current_thread` runtime used by `#[tokio::test]`. Tasks blocked on a
//! future that is still unsettled are not forced to run.
//!
//! On a multi-threaded runtime a flush gives no guarantee at all: woken tasks
//! run on worker threads, and the test usually resumes before they do.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{join_all, JoinAll};

/// Returns a one-tick [`Flush`] that is not tied to any settlement.
///
/// Useful to show that nothing happens until a call is settled.
///
/// # Example
///
/// ```rust
/// use async_fn_mock::{flush_pending, AsyncFn};
/// use futures::FutureExt;
///
/// # futures::executor::block_on(async {
/// let fetch: AsyncFn<(), u32, ()> = AsyncFn::new();
/// let mut result = fetch.call(());
///
/// flush_pending().await;
/// assert!((&mut result).now_or_never().is_none());
/// # });
/// ```
pub fn flush_pending() -> Flush {
    Flush::new(1)
}

/// Completion signal of a single settlement.
#[must_use = "await the flush before asserting on side effects of the settled call"]
#[derive(Debug)]
pub struct Flush {
    remaining: usize,
}

impl Flush {
    pub(crate) fn new(ticks: usize) -> Self {
        Self {
            remaining: ticks.max(1),
        }
    }

    /// Number of scheduler yields still to perform.
    #[must_use]
    pub fn remaining_ticks(&self) -> usize {
        self.remaining
    }
}

impl Future for Flush {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.remaining == 0 {
            Poll::Ready(())
        } else {
            self.remaining -= 1;
            tracing::trace!(remaining = self.remaining, "flush tick");
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Combined completion signal of a settlement that hit several calls.
///
/// Completes once the flush of every settled call has completed.
#[must_use = "await the flush before asserting on side effects of the settled calls"]
pub struct FlushAll {
    settled: usize,
    inner: JoinAll<Flush>,
}

impl FlushAll {
    pub(crate) fn new(flushes: Vec<Flush>) -> Self {
        Self {
            settled: flushes.len(),
            inner: join_all(flushes),
        }
    }

    /// Number of calls settled by the operation that returned this signal.
    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.settled
    }
}

impl Future for FlushAll {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx).map(|_| ())
    }
}

impl std::fmt::Debug for FlushAll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushAll")
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}
