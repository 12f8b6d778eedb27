//! The [`AsyncFn`] mock.

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::Mutex;

use super::config::{AsyncFnBuilder, AsyncFnConfig};
use super::flush::{Flush, FlushAll};
use super::history::{CallHistory, MockFunction, RecordedCall};
use super::pending::{CallFuture, PendingCall, Settlement};
use super::registry::CallRegistry;
use crate::error::{Error, Result, SettleAction};
use crate::matcher::Matcher;

/// A mock async function whose calls are settled by the test.
///
/// Every [`call`](Self::call) returns a [`CallFuture`] that stays pending
/// until the test resolves or rejects that call. Settlement methods pick the
/// call to settle, settle it, and return a completion signal to await before
/// asserting on what the code under test did with the result.
///
/// - `A` is the argument value (a tuple for several arguments, `()` for none)
/// - `T` is the value a call resolves with
/// - `E` is the value a call rejects with
/// - `M` is the [`MockFunction`] observing every call
///
/// Clones are handles onto the same mock.
///
/// # Example
///
/// ```rust
/// use async_fn_mock::AsyncFn;
///
/// # futures::executor::block_on(async {
/// let fetch: AsyncFn<u32, String, String> = AsyncFn::new();
///
/// let first = fetch.call(1);
/// let second = fetch.call(2);
///
/// fetch.resolve("one".to_string()).unwrap().await;
/// fetch.reject("nope".to_string()).unwrap().await;
///
/// assert_eq!(first.await, Ok("one".to_string()));
/// assert_eq!(second.await, Err("nope".to_string()));
/// # });
/// ```
pub struct AsyncFn<A, T, E, M = CallHistory<A>> {
    inner: Arc<Inner<A, T, E, M>>,
}

struct Inner<A, T, E, M> {
    config: AsyncFnConfig,
    registry: Mutex<CallRegistry<A, T, E>>,
    mock_fn: M,
}

impl<A: Clone + Send, T, E> AsyncFn<A, T, E> {
    /// Create a mock with the default configuration and call history.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(AsyncFnConfig::default(), CallHistory::new())
    }

    /// Start building a configured mock.
    pub fn builder() -> AsyncFnBuilder<A, T, E, CallHistory<A>> {
        AsyncFnBuilder::new(CallHistory::new())
    }
}

impl<A: Clone + Send, T, E> Default for AsyncFn<A, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E, M: MockFunction<A>> AsyncFn<A, T, E, M> {
    pub(crate) fn from_parts(config: AsyncFnConfig, mock_fn: M) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                registry: Mutex::new(CallRegistry::new()),
                mock_fn,
            }),
        }
    }

    /// Invoke the mock.
    ///
    /// Records the call and returns its pending result immediately. The
    /// [`MockFunction`] sees the call first; it must not call back into this
    /// mock.
    pub fn call(&self, args: A) -> CallFuture<T, E> {
        let mut registry = self.inner.registry.lock();
        let id = registry.next_id();
        self.inner.mock_fn.intercept(id, &args);
        let future = registry.register(args);

        tracing::debug!(
            mock = %self.inner.config.name,
            call = %id,
            pending = registry.len(),
            "call registered"
        );
        future
    }

    /// The mock as a plain function, for code that takes a function
    /// dependency.
    ///
    /// ```rust
    /// use async_fn_mock::AsyncFn;
    ///
    /// let ask: AsyncFn<&'static str, bool, ()> = AsyncFn::new();
    /// let ask_fn = ask.as_fn();
    ///
    /// let _answer = ask_fn("Attack?");
    /// assert_eq!(ask.pending_count(), 1);
    /// ```
    pub fn as_fn(&self) -> impl Fn(A) -> CallFuture<T, E> + Clone {
        let mock = self.clone();
        move |args| mock.call(args)
    }

    /// Name used in log events.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// The configuration this mock was built with.
    #[must_use]
    pub fn config(&self) -> &AsyncFnConfig {
        &self.inner.config
    }

    /// The mock function observing every call.
    #[must_use]
    pub fn mock_function(&self) -> &M {
        &self.inner.mock_fn
    }

    /// Number of calls not yet selected for settlement.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Check if any call is waiting to be settled.
    #[must_use]
    pub fn has_pending_calls(&self) -> bool {
        !self.inner.registry.lock().is_empty()
    }

    /// Arguments of the outstanding calls, oldest first.
    #[must_use]
    pub fn pending_args(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.inner.registry.lock().args()
    }

    // ========================================================================
    // Last call (stack order)
    // ========================================================================

    /// Settle the most recent outstanding call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn settle_last_call(&self, settlement: Settlement<T, E>) -> Result<Flush> {
        let call = self.inner.registry.lock().take_last();
        self.settle_selected("last call", call, settlement)
    }

    /// Resolve the most recent outstanding call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn resolve_last_call(&self, value: T) -> Result<Flush> {
        self.settle_last_call(Settlement::Resolve(value))
    }

    /// Reject the most recent outstanding call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn reject_last_call(&self, error: E) -> Result<Flush> {
        self.settle_last_call(Settlement::Reject(error))
    }

    // ========================================================================
    // First unresolved call (queue order)
    // ========================================================================

    /// Settle the oldest outstanding call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn settle_first_unresolved_call(&self, settlement: Settlement<T, E>) -> Result<Flush> {
        let call = self.inner.registry.lock().take_first();
        self.settle_selected("first unresolved call", call, settlement)
    }

    /// Resolve the oldest outstanding call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn resolve_first_unresolved_call(&self, value: T) -> Result<Flush> {
        self.settle_first_unresolved_call(Settlement::Resolve(value))
    }

    /// Resolve the oldest outstanding call.
    ///
    /// Calls are resolved in the order they were made, so a test can settle
    /// them one after another without tracking which is which.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn resolve(&self, value: T) -> Result<Flush> {
        self.settle_first_unresolved_call(Settlement::Resolve(value))
    }

    /// Reject the oldest outstanding call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding.
    pub fn reject(&self, error: E) -> Result<Flush> {
        self.settle_first_unresolved_call(Settlement::Reject(error))
    }

    // ========================================================================
    // Matched calls
    // ========================================================================

    /// Settle every outstanding call whose arguments match, in call order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding, or
    /// [`Error::NoMatchingCall`] listing the outstanding calls if none match.
    pub fn settle_specific<P>(&self, matcher: P, settlement: Settlement<T, E>) -> Result<FlushAll>
    where
        P: Matcher<A>,
        A: Debug,
        T: Clone,
        E: Clone,
    {
        let action = settlement.action();
        self.settle_matching(&matcher, action, || settlement.clone())
    }

    /// Resolve every outstanding call whose arguments match with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding, or
    /// [`Error::NoMatchingCall`] listing the outstanding calls if none match.
    ///
    /// # Example
    ///
    /// ```rust
    /// use async_fn_mock::{matcher::eq, AsyncFn};
    ///
    /// # futures::executor::block_on(async {
    /// let load: AsyncFn<&'static str, u32, ()> = AsyncFn::new();
    /// let x = load.call("x");
    /// let y = load.call("y");
    ///
    /// load.resolve_specific(eq("y"), 42).unwrap().await;
    ///
    /// assert_eq!(y.await, Ok(42));
    /// assert_eq!(load.pending_args(), vec!["x"]);
    /// # drop(x);
    /// # });
    /// ```
    pub fn resolve_specific<P>(&self, matcher: P, value: T) -> Result<FlushAll>
    where
        P: Matcher<A>,
        A: Debug,
        T: Clone,
    {
        self.settle_matching(&matcher, SettleAction::Resolve, || {
            Settlement::Resolve(value.clone())
        })
    }

    /// Reject every outstanding call whose arguments match with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCalledYet`] if no call is outstanding, or
    /// [`Error::NoMatchingCall`] listing the outstanding calls if none match.
    pub fn reject_specific<P>(&self, matcher: P, error: E) -> Result<FlushAll>
    where
        P: Matcher<A>,
        A: Debug,
        E: Clone,
    {
        self.settle_matching(&matcher, SettleAction::Reject, || {
            Settlement::Reject(error.clone())
        })
    }

    // ========================================================================
    // Disallowed configuration
    // ========================================================================

    /// Not supported: calls are settled by the test.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::MockImplementation`].
    pub fn mock_implementation<F, R>(&self, _implementation: F) -> Result<()>
    where
        F: Fn(A) -> R,
    {
        Err(Error::mock_implementation("mock_implementation"))
    }

    /// Not supported: calls are settled by the test.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::MockImplementation`].
    pub fn mock_implementation_once<F, R>(&self, _implementation: F) -> Result<()>
    where
        F: FnOnce(A) -> R,
    {
        Err(Error::mock_implementation("mock_implementation_once"))
    }

    /// Not supported: calls are settled by the test.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::MockImplementation`].
    pub fn mock_return_value(&self, _value: T) -> Result<()> {
        Err(Error::mock_implementation("mock_return_value"))
    }

    /// Not supported: calls are settled by the test.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::MockImplementation`].
    pub fn mock_return_value_once(&self, _value: T) -> Result<()> {
        Err(Error::mock_implementation("mock_return_value_once"))
    }

    fn settle_selected(
        &self,
        policy: &'static str,
        call: Option<PendingCall<A, T, E>>,
        settlement: Settlement<T, E>,
    ) -> Result<Flush> {
        let call = call.ok_or(Error::NotCalledYet(settlement.action()))?;
        Ok(self.apply(policy, call, settlement))
    }

    fn settle_matching<P, F>(
        &self,
        matcher: &P,
        action: SettleAction,
        mut make: F,
    ) -> Result<FlushAll>
    where
        P: Matcher<A>,
        A: Debug,
        F: FnMut() -> Settlement<T, E>,
    {
        let matched = {
            let mut registry = self.inner.registry.lock();
            if registry.is_empty() {
                return Err(Error::NotCalledYet(action));
            }

            let matched = registry.take_matching(matcher);
            if matched.is_empty() {
                return Err(Error::NoMatchingCall {
                    action,
                    expected: matcher.describe(),
                    outstanding: registry.describe_outstanding(),
                });
            }
            matched
        };

        let flushes = matched
            .into_iter()
            .map(|call| self.apply("matching calls", call, make()))
            .collect();
        Ok(FlushAll::new(flushes))
    }

    /// Settles a call already removed from the registry.
    fn apply(
        &self,
        policy: &'static str,
        call: PendingCall<A, T, E>,
        settlement: Settlement<T, E>,
    ) -> Flush {
        let id = call.id;
        let action = settlement.action();

        if !call.settle(settlement) {
            tracing::trace!(
                mock = %self.inner.config.name,
                call = %id,
                "call future dropped, settled value discarded"
            );
        }
        tracing::debug!(
            mock = %self.inner.config.name,
            call = %id,
            %action,
            policy,
            "call settled"
        );

        Flush::new(self.inner.config.flush_ticks)
    }
}

impl<A: Clone, T, E> AsyncFn<A, T, E, CallHistory<A>> {
    /// The call history, including settled calls.
    #[must_use]
    pub fn history(&self) -> &CallHistory<A> {
        &self.inner.mock_fn
    }

    /// Get all recorded calls, settled or not.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall<A>> {
        self.history().calls()
    }

    /// Get the number of times the mock was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.history().call_count()
    }

    /// Check if the mock was called at least once.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.history().was_called()
    }

    /// Check if the mock was called exactly N times.
    #[must_use]
    pub fn was_called_times(&self, n: usize) -> bool {
        self.history().was_called_times(n)
    }

    /// Check if the mock was called with specific arguments.
    #[must_use]
    pub fn was_called_with(&self, expected: &A) -> bool
    where
        A: PartialEq,
    {
        self.history().was_called_with(expected)
    }

    /// Get the Nth call (0-indexed).
    #[must_use]
    pub fn nth_call(&self, n: usize) -> Option<RecordedCall<A>> {
        self.history().nth_call(n)
    }

    /// Get the most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall<A>> {
        self.history().last_call()
    }

    /// Forget the call history. Outstanding calls stay outstanding.
    pub fn reset_history(&self) {
        self.history().reset();
    }
}

impl<A, T, E, M> Clone for AsyncFn<A, T, E, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T, E, M> Debug for AsyncFn<A, T, E, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFn")
            .field("name", &self.inner.config.name)
            .field("pending", &self.inner.registry.lock().len())
            .finish()
    }
}
