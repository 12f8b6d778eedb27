#![allow(clippy::must_use_candidate)]

//! The mock function seam and the default call history.
//!
//! Every invocation of an [`AsyncFn`](crate::AsyncFn) is first handed to its
//! [`MockFunction`], the interceptable callable a mocking framework would
//! normally provide. [`CallHistory`] is the built-in one: it remembers every
//! call, settled or not, for framework-style assertions.
//!
//! # Example
//!
//! ```rust
//! use async_fn_mock::mock::{CallHistory, CallId, MockFunction};
//!
//! let history = CallHistory::<&str>::new();
//! history.intercept(CallId::default(), &"hello");
//!
//! assert!(history.was_called_with(&"hello"));
//! assert_eq!(history.call_count(), 1);
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::pending::CallId;
use crate::matcher::Matcher;

/// The interceptable callable behind an [`AsyncFn`](crate::AsyncFn).
///
/// Implement this to route invocations into another framework's spy.
pub trait MockFunction<A>: Send + Sync {
    /// Observe one invocation, before its pending call is registered.
    fn intercept(&self, id: CallId, args: &A);
}

/// A recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall<A> {
    /// The invocation's id.
    pub id: CallId,
    /// The arguments passed to the call.
    pub args: A,
    /// When the call was made (relative to history creation).
    pub timestamp: Duration,
}

/// Records every invocation of a mock.
///
/// Clones share the same record.
pub struct CallHistory<A> {
    calls: Arc<Mutex<Vec<RecordedCall<A>>>>,
    created_at: Instant,
}

impl<A: Clone> CallHistory<A> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            created_at: Instant::now(),
        }
    }

    /// Get all recorded calls, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall<A>> {
        self.calls.lock().clone()
    }

    /// Get the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Check if any call was recorded.
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Check if called exactly N times.
    pub fn was_called_times(&self, n: usize) -> bool {
        self.call_count() == n
    }

    /// Get the Nth recorded call (0-indexed).
    pub fn nth_call(&self, n: usize) -> Option<RecordedCall<A>> {
        self.calls.lock().get(n).cloned()
    }

    /// Get the most recent call.
    pub fn last_call(&self) -> Option<RecordedCall<A>> {
        self.calls.lock().last().cloned()
    }

    /// Check if called with specific arguments.
    pub fn was_called_with(&self, expected: &A) -> bool
    where
        A: PartialEq,
    {
        self.calls.lock().iter().any(|c| &c.args == expected)
    }

    /// Count the calls whose arguments match.
    pub fn count_matching(&self, matcher: &impl Matcher<A>) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matcher.matches(&c.args))
            .count()
    }

    /// Forget all recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl<A: Clone + Send> MockFunction<A> for CallHistory<A> {
    fn intercept(&self, id: CallId, args: &A) {
        self.calls.lock().push(RecordedCall {
            id,
            args: args.clone(),
            timestamp: self.created_at.elapsed(),
        });
    }
}

impl<A: Clone> Default for CallHistory<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for CallHistory<A> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            created_at: self.created_at,
        }
    }
}

impl<A: Debug> Debug for CallHistory<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let calls = self.calls.lock();
        f.debug_struct("CallHistory")
            .field("call_count", &calls.len())
            .field("calls", &*calls)
            .finish()
    }
}
