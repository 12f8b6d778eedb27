//! Mock async functions settled by the test.
//!
//! - [`AsyncFn`] - the mock itself
//! - [`CallFuture`] - the pending result returned by each call
//! - [`Flush`] / [`FlushAll`] - completion signals returned by settlements
//! - [`MockFunction`] / [`CallHistory`] - the seam observing every call
//!
//! # Settling calls
//!
//! ```rust
//! use async_fn_mock::AsyncFn;
//!
//! # futures::executor::block_on(async {
//! let save: AsyncFn<&'static str, (), &'static str> = AsyncFn::new();
//!
//! let a = save.call("a");
//! let b = save.call("b");
//! let c = save.call("c");
//!
//! save.resolve_last_call(()).unwrap().await;             // settles "c"
//! save.resolve_first_unresolved_call(()).unwrap().await; // settles "a"
//! save.reject("disk full").unwrap().await;               // settles "b"
//!
//! assert_eq!(a.await, Ok(()));
//! assert_eq!(b.await, Err("disk full"));
//! assert_eq!(c.await, Ok(()));
//! # });
//! ```
//!
//! # No payload
//!
//! Rust has no omitted arguments: a call that resolves "with nothing" is a
//! mock with `T = ()` resolved with `()`.

mod async_fn;
mod config;
mod flush;
mod history;
mod pending;
mod registry;

pub use async_fn::AsyncFn;
pub use config::{AsyncFnBuilder, AsyncFnConfig, DEFAULT_NAME};
pub use flush::{flush_pending, Flush, FlushAll};
pub use history::{CallHistory, MockFunction, RecordedCall};
pub use pending::{CallFuture, CallId, Settlement};
