//! Ordered registry of outstanding calls.

use std::collections::VecDeque;
use std::fmt::{Debug, Write};

use super::pending::{CallFuture, CallId, PendingCall};
use crate::matcher::Matcher;

/// Outstanding calls of one mock, in invocation order.
///
/// Selection removes a call before it is settled, so a call is handed out at
/// most once.
pub(crate) struct CallRegistry<A, T, E> {
    calls: VecDeque<PendingCall<A, T, E>>,
    next_id: u64,
}

impl<A, T, E> CallRegistry<A, T, E> {
    pub(crate) fn new() -> Self {
        Self {
            calls: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Id the next registered call will receive.
    pub(crate) fn next_id(&self) -> CallId {
        CallId::new(self.next_id)
    }

    /// Appends a new pending call and returns its deferred result.
    pub(crate) fn register(&mut self, args: A) -> CallFuture<T, E> {
        let id = self.next_id();
        self.next_id += 1;

        let (call, future) = PendingCall::new(id, args);
        self.calls.push_back(call);
        future
    }

    pub(crate) fn len(&self) -> usize {
        self.calls.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Removes the most recent call.
    pub(crate) fn take_last(&mut self) -> Option<PendingCall<A, T, E>> {
        self.calls.pop_back()
    }

    /// Removes the oldest call.
    pub(crate) fn take_first(&mut self) -> Option<PendingCall<A, T, E>> {
        self.calls.pop_front()
    }

    /// Removes every call whose arguments match, keeping registry order.
    pub(crate) fn take_matching<M>(&mut self, matcher: &M) -> Vec<PendingCall<A, T, E>>
    where
        M: Matcher<A> + ?Sized,
    {
        let (matched, kept): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut self.calls)
            .into_iter()
            .partition(|call| {
                let hit = matcher.matches(&call.args);
                if !hit {
                    tracing::trace!(
                        call = %call.id,
                        mismatch = %matcher.describe_mismatch(&call.args),
                        "call not selected"
                    );
                }
                hit
            });
        self.calls = kept;
        matched.into()
    }

    /// Arguments of every outstanding call, oldest first.
    pub(crate) fn args(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.calls.iter().map(|call| call.args.clone()).collect()
    }

    /// One line per outstanding call, for error messages.
    pub(crate) fn describe_outstanding(&self) -> String
    where
        A: Debug,
    {
        let mut out = String::new();
        for call in &self.calls {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "  {}: {:?}", call.id, call.args);
        }
        out
    }
}

impl<A: Debug, T, E> Debug for CallRegistry<A, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRegistry")
            .field("calls", &self.calls)
            .field("next_id", &self.next_id)
            .finish()
    }
}
