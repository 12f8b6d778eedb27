//! Structural partial matching of call arguments.
//!
//! Arguments are serialized with `serde_json` and compared against a pattern
//! value. Object patterns only constrain the keys they mention.

use serde::Serialize;
use serde_json::Value;

use super::Matcher;

/// Create a matcher that matches arguments containing `pattern`.
///
/// - an object pattern matches an object holding every pattern key, each with
///   a partially matching value; extra keys are ignored
/// - an array pattern matches an array of the same length, element by element
/// - any other pattern compares by equality
///
/// Arguments that fail to serialize never match.
///
/// # Example
///
/// ```rust
/// use async_fn_mock::matcher::{partial, Matcher};
/// use serde_json::json;
///
/// let m = partial(json!({ "type": "y" }));
/// assert!(m.matches(&json!({ "type": "y", "id": 2 })));
/// assert!(!m.matches(&json!({ "type": "x", "id": 1 })));
/// ```
pub fn partial(pattern: Value) -> PartialMatcher {
    PartialMatcher { pattern }
}

/// Matcher for a partial structural pattern.
#[derive(Debug, Clone)]
pub struct PartialMatcher {
    pattern: Value,
}

impl PartialMatcher {
    /// The pattern this matcher looks for.
    #[must_use]
    pub fn pattern(&self) -> &Value {
        &self.pattern
    }
}

impl<T: Serialize> Matcher<T> for PartialMatcher {
    fn matches(&self, value: &T) -> bool {
        serde_json::to_value(value).is_ok_and(|actual| contains(&actual, &self.pattern))
    }

    fn describe(&self) -> String {
        format!("contains {}", self.pattern)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        match serde_json::to_value(value) {
            Ok(actual) => format!("{actual} does not contain {}", self.pattern),
            Err(err) => format!("arguments could not be serialized: {err}"),
        }
    }
}

fn contains(actual: &Value, pattern: &Value) -> bool {
    match (actual, pattern) {
        (Value::Object(actual), Value::Object(pattern)) => pattern
            .iter()
            .all(|(key, expected)| actual.get(key).is_some_and(|v| contains(v, expected))),
        (Value::Array(actual), Value::Array(pattern)) => {
            actual.len() == pattern.len()
                && actual.iter().zip(pattern).all(|(a, p)| contains(a, p))
        }
        _ => actual == pattern,
    }
}
