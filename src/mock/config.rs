//! Configuration and construction of [`AsyncFn`] instances.

use std::marker::PhantomData;

use super::async_fn::AsyncFn;
use super::history::MockFunction;
use crate::error::{Error, Result};

/// Name used in log events when none is configured.
pub const DEFAULT_NAME: &str = "AsyncFn";

/// Configuration for an [`AsyncFn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncFnConfig {
    /// Name shown in log events.
    pub name: String,
    /// Scheduler yields performed by each completion signal. Never below 1.
    pub flush_ticks: usize,
}

impl Default for AsyncFnConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            flush_ticks: 1,
        }
    }
}

impl AsyncFnConfig {
    /// Create a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name shown in log events.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set how many times a completion signal yields to the scheduler.
    ///
    /// Zero is raised to one.
    #[must_use]
    pub fn flush_ticks(mut self, ticks: usize) -> Self {
        self.flush_ticks = ticks.max(1);
        self
    }
}

/// Builder for an [`AsyncFn`].
///
/// Fixed behaviour cannot be configured: [`returning`](Self::returning) and
/// [`implementation`](Self::implementation) exist only to make
/// [`build`](Self::build) fail with [`Error::MockImplementation`].
///
/// # Example
///
/// ```rust
/// use async_fn_mock::AsyncFn;
///
/// let fetch = AsyncFn::<u32, String, ()>::builder()
///     .name("fetch_user")
///     .flush_ticks(2)
///     .build()
///     .unwrap();
/// assert_eq!(fetch.name(), "fetch_user");
///
/// let err = AsyncFn::<u32, String, ()>::builder()
///     .returning("fixed".to_string())
///     .build()
///     .unwrap_err();
/// assert!(err.to_string().contains("not supported"));
/// ```
#[must_use]
pub struct AsyncFnBuilder<A, T, E, M> {
    config: AsyncFnConfig,
    mock_fn: M,
    disallowed: Option<&'static str>,
    _marker: PhantomData<fn(A) -> (T, E)>,
}

impl<A, T, E, M> AsyncFnBuilder<A, T, E, M> {
    pub(crate) fn new(mock_fn: M) -> Self {
        Self {
            config: AsyncFnConfig::default(),
            mock_fn,
            disallowed: None,
            _marker: PhantomData,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: AsyncFnConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the name shown in log events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.name(name);
        self
    }

    /// Set how many times a completion signal yields to the scheduler.
    pub fn flush_ticks(mut self, ticks: usize) -> Self {
        self.config = self.config.flush_ticks(ticks);
        self
    }

    /// Use the mock function produced by `factory` instead of the default
    /// call history.
    pub fn with_factory<N, F>(self, factory: F) -> AsyncFnBuilder<A, T, E, N>
    where
        F: FnOnce() -> N,
    {
        AsyncFnBuilder {
            config: self.config,
            mock_fn: factory(),
            disallowed: self.disallowed,
            _marker: PhantomData,
        }
    }

    /// Not supported: calls are settled by the test. Makes `build` fail.
    pub fn returning(self, _value: T) -> Self {
        self.disallow("returning")
    }

    /// Not supported: calls are settled by the test. Makes `build` fail.
    pub fn implementation<F, R>(self, _implementation: F) -> Self
    where
        F: Fn(A) -> R,
    {
        self.disallow("implementation")
    }

    fn disallow(mut self, method: &'static str) -> Self {
        self.disallowed.get_or_insert(method);
        self
    }

    /// Build the mock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MockImplementation`] if a fixed return value or
    /// implementation was configured.
    pub fn build(self) -> Result<AsyncFn<A, T, E, M>>
    where
        M: MockFunction<A>,
    {
        if let Some(method) = self.disallowed {
            return Err(Error::mock_implementation(method));
        }
        Ok(AsyncFn::from_parts(self.config, self.mock_fn))
    }
}
