//! # async-fn-mock
//!
//! > Mock async functions that resolve when your test says so
//!
//! An [`AsyncFn`] stands in for an async dependency. Every call returns a
//! pending [`CallFuture`]; the test later resolves or rejects specific calls,
//! in whatever order it likes, and awaits the returned completion signal so
//! that everything chained on the settled call has run before it asserts.
//!
//! ## Quick Start
//!
//! ```rust
//! use async_fn_mock::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let fetch_user: AsyncFn<u32, String, String> = AsyncFn::new();
//!
//! // Code under test calls the mock...
//! let pending = fetch_user.call(7);
//!
//! // ...and the test decides when and how the call settles.
//! fetch_user.resolve("ada".to_string())?.await;
//!
//! assert_eq!(pending.await, Ok("ada".to_string()));
//! # Ok::<(), async_fn_mock::Error>(())
//! # }).unwrap();
//! ```
//!
//! ## Features
//!
//! - **Last / first / matching call** - settle in stack order, queue order, or
//!   by argument [`matcher`]
//! - **Flushing** - settlement returns a future that lets woken continuations run
//! - **Call history** - framework-style assertions on every call made
//! - **`macros`** - `#[async_fn_mock::test]` injects fresh mocks into tests

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod matcher;
pub mod mock;

/// Prelude for convenient imports
///
/// ```rust
/// use async_fn_mock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result, SettleAction};
    pub use crate::matcher::{anything, eq, partial, predicate, satisfies, Matcher};
    pub use crate::mock::{
        flush_pending, AsyncFn, CallFuture, CallHistory, Flush, FlushAll, MockFunction,
        Settlement,
    };
}

// Re-exports
pub use error::{Error, Result};
pub use mock::{flush_pending, AsyncFn, CallFuture, Flush, FlushAll};

// Re-export the test macro when macros feature is enabled
#[cfg(feature = "macros")]
pub use async_fn_mock_macros::test;
