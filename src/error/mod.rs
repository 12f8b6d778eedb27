//! Error definitions
//!
//! Every variant is a usage error: it is returned synchronously from the
//! offending method and never travels through a [`CallFuture`]. Rejection
//! values passed to `reject*` are plain data of the mock's `E` type.
//!
//! [`CallFuture`]: crate::mock::CallFuture

use std::fmt;

use thiserror::Error;

/// Which way a settlement goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettleAction {
    /// Fulfill the call's result.
    Resolve,
    /// Reject the call's result.
    Reject,
}

impl fmt::Display for SettleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Main error type for async-fn-mock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fixed implementation or return value was configured.
    #[error(
        "Using a mock implementation with AsyncFn is not supported: calls are settled by the test \
         (attempted `{0}`)"
    )]
    MockImplementation(&'static str),

    /// Settlement was requested while no call is outstanding.
    #[error("Tried to {0} an AsyncFn call that has not been made yet.")]
    NotCalledYet(SettleAction),

    /// A matcher selected none of the outstanding calls.
    #[error(
        "Tried to {action} an AsyncFn call with arguments matching `{expected}`, but no \
         outstanding call matched.\nOutstanding calls:\n{outstanding}"
    )]
    NoMatchingCall {
        /// The settlement that was attempted.
        action: SettleAction,
        /// Description of the matcher.
        expected: String,
        /// Arguments of every outstanding call, one per line.
        outstanding: String,
    },
}

impl Error {
    /// Create a mock implementation usage error for the named method.
    #[must_use]
    pub fn mock_implementation(method: &'static str) -> Self {
        Self::MockImplementation(method)
    }

    /// Returns `true` for the "has not been made yet" error.
    #[must_use]
    pub fn is_not_called_yet(&self) -> bool {
        matches!(self, Self::NotCalledYet(_))
    }

    /// Returns `true` if a matcher selected nothing.
    #[must_use]
    pub fn is_no_matching_call(&self) -> bool {
        matches!(self, Self::NoMatchingCall { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
