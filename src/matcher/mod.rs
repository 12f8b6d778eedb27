#![allow(clippy::must_use_candidate)]

//! Selecting outstanding calls by their arguments.
//!
//! [`AsyncFn::resolve_specific`] and [`AsyncFn::reject_specific`] settle every
//! outstanding call whose arguments a [`Matcher`] accepts. The matcher's
//! description ends up in [`Error::NoMatchingCall`] when nothing is selected.
//!
//! - [`eq`] selects calls made with exactly these arguments
//! - [`anything`] selects every outstanding call
//! - [`satisfies`] and [`predicate`] select by closure
//! - [`partial`] selects by a structural subset of the serialized arguments
//!
//! # Example
//!
//! ```rust
//! use async_fn_mock::matcher::{eq, predicate, Matcher};
//!
//! assert!(eq(("users", 7)).matches(&("users", 7)));
//!
//! let recent = predicate(|(_, id): &(&str, u32)| *id > 10);
//! assert!(recent.matches(&("posts", 11u32)));
//! assert!(!recent.matches(&("posts", 3u32)));
//! ```
//!
//! [`AsyncFn::resolve_specific`]: crate::AsyncFn::resolve_specific
//! [`AsyncFn::reject_specific`]: crate::AsyncFn::reject_specific
//! [`Error::NoMatchingCall`]: crate::Error::NoMatchingCall

mod partial;

use std::fmt::{self, Debug};

pub use partial::{partial, PartialMatcher};

/// Decides whether an outstanding call is selected, given its arguments.
///
/// ```rust
/// use async_fn_mock::matcher::Matcher;
///
/// /// Selects requests for one tenant.
/// struct Tenant(&'static str);
///
/// impl Matcher<(&'static str, u32)> for Tenant {
///     fn matches(&self, args: &(&'static str, u32)) -> bool {
///         args.0 == self.0
///     }
///
///     fn describe(&self) -> String {
///         format!("tenant {}", self.0)
///     }
/// }
///
/// assert!(Tenant("acme").matches(&("acme", 1)));
/// assert_eq!(Tenant("acme").describe_mismatch(&("initech", 1)), "expected tenant acme");
/// ```
pub trait Matcher<A: ?Sized> {
    /// Whether a call made with `args` is selected.
    fn matches(&self, args: &A) -> bool;

    /// What the matcher selects, as shown in error messages.
    fn describe(&self) -> String;

    /// Why a call made with `args` was passed over. Logged at trace level.
    fn describe_mismatch(&self, _args: &A) -> String {
        format!("expected {}", self.describe())
    }
}

/// Select calls whose arguments equal `expected`.
pub fn eq<A: PartialEq + Debug>(expected: A) -> Equals<A> {
    Equals(expected)
}

/// Matcher returned by [`eq`].
#[derive(Debug, Clone)]
pub struct Equals<A>(A);

impl<A: PartialEq + Debug> Matcher<A> for Equals<A> {
    fn matches(&self, args: &A) -> bool {
        *args == self.0
    }

    fn describe(&self) -> String {
        format!("equal to {:?}", self.0)
    }

    fn describe_mismatch(&self, args: &A) -> String {
        format!("{args:?} is not equal to {:?}", self.0)
    }
}

/// Select every outstanding call.
pub fn anything() -> Anything {
    Anything
}

/// Matcher returned by [`anything`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Anything;

impl<A: ?Sized> Matcher<A> for Anything {
    fn matches(&self, _args: &A) -> bool {
        true
    }

    fn describe(&self) -> String {
        "any arguments".to_string()
    }
}

/// Select calls whose arguments pass `check`; `description` names the
/// condition in error messages.
///
/// ```rust
/// use async_fn_mock::matcher::{satisfies, Matcher};
///
/// let even = satisfies(|page: &u32| page % 2 == 0, "an even page");
/// assert!(even.matches(&4u32));
/// assert_eq!(even.describe_mismatch(&3u32), "expected an even page");
/// ```
pub fn satisfies<A, F>(check: F, description: impl Into<String>) -> Satisfies<F>
where
    A: ?Sized,
    F: Fn(&A) -> bool,
{
    Satisfies {
        check,
        description: description.into(),
    }
}

/// Select calls whose arguments pass `check`.
pub fn predicate<A, F>(check: F) -> Satisfies<F>
where
    A: ?Sized,
    F: Fn(&A) -> bool,
{
    satisfies(check, "arguments accepted by a predicate")
}

/// Matcher returned by [`satisfies`] and [`predicate`].
#[derive(Clone)]
pub struct Satisfies<F> {
    check: F,
    description: String,
}

impl<A: ?Sized, F: Fn(&A) -> bool> Matcher<A> for Satisfies<F> {
    fn matches(&self, args: &A) -> bool {
        (self.check)(args)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

impl<F> Debug for Satisfies<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satisfies")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
