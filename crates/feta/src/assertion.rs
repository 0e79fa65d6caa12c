//! Deep-equality assertions over canonical serialized form.
//!
//! Two values are equal when their compact `serde_json` serializations are
//! byte-identical. Containers compare element by element in order, and maps
//! compare in insertion order: `{"a":1,"b":2}` and `{"b":2,"a":1}` are NOT
//! equal.

use crate::result::{FetaError, FetaResult};
use serde::Serialize;
use serde_json::Value;

/// Canonical form of an argument slot that was never passed
pub(crate) const UNDEFINED: &str = "undefined";

/// Result of a non-failing comparison
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

/// Serialize a value into its canonical comparison form
pub fn canonical_form<T: Serialize + ?Sized>(value: &T) -> FetaResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Assert that `actual` and `expected` have identical canonical forms.
///
/// Returns `Ok(true)` on a match; a mismatch fails with
/// [`FetaError::AssertionFailed`] carrying both serialized forms.
pub fn assert_equals<A, E>(actual: &A, expected: &E) -> FetaResult<bool>
where
    A: Serialize + ?Sized,
    E: Serialize + ?Sized,
{
    compare(canonical_form(actual)?, canonical_form(expected)?)
}

/// Compare without failing, reporting the outcome as an [`AssertionResult`]
#[must_use]
pub fn check_equals<A, E>(actual: &A, expected: &E) -> AssertionResult
where
    A: Serialize + ?Sized,
    E: Serialize + ?Sized,
{
    match assert_equals(actual, expected) {
        Ok(_) => AssertionResult::pass(),
        Err(err) => AssertionResult::fail(err.to_string()),
    }
}

/// Compare one positional argument; a missing argument never matches
pub(crate) fn assert_arg_equals<E>(actual: Option<&Value>, expected: &E) -> FetaResult<bool>
where
    E: Serialize + ?Sized,
{
    let actual = match actual {
        Some(value) => canonical_form(value)?,
        None => UNDEFINED.to_string(),
    };
    compare(actual, canonical_form(expected)?)
}

fn compare(actual: String, expected: String) -> FetaResult<bool> {
    if actual == expected {
        Ok(true)
    } else {
        Err(FetaError::AssertionFailed { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod assert_equals_tests {
        use super::*;

        #[test]
        fn test_equal_scalars() {
            assert!(assert_equals(&42, &42).unwrap());
            assert!(assert_equals("hi", "hi").unwrap());
        }

        #[test]
        fn test_mismatch_reports_both_forms() {
            let err = assert_equals(&vec![1, 2], &vec![2, 1]).unwrap_err();
            match err {
                FetaError::AssertionFailed { expected, actual } => {
                    assert_eq!(expected, "[2,1]");
                    assert_eq!(actual, "[1,2]");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_key_order_is_significant() {
            let a = json!({"a": 1, "b": 2});
            let b = json!({"b": 2, "a": 1});
            assert!(assert_equals(&a, &b).is_err());
        }

        #[test]
        fn test_different_types_same_form_are_equal() {
            #[derive(Serialize)]
            struct Point {
                x: i32,
                y: i32,
            }
            let value = json!({"x": 1, "y": 2});
            assert!(assert_equals(&Point { x: 1, y: 2 }, &value).unwrap());
        }

        #[test]
        fn test_int_and_string_differ() {
            assert!(assert_equals(&1, "1").is_err());
        }
    }

    mod check_equals_tests {
        use super::*;

        #[test]
        fn test_pass() {
            let result = check_equals(&json!([1, "a"]), &json!([1, "a"]));
            assert!(result.passed);
            assert!(result.message.is_empty());
        }

        #[test]
        fn test_fail_keeps_message() {
            let result = check_equals(&true, &false);
            assert!(!result.passed);
            assert!(result.message.contains("Expected: false"));
            assert!(result.message.contains("Actual:   true"));
        }
    }

    mod arg_tests {
        use super::*;

        #[test]
        fn test_missing_argument_never_matches() {
            let err = assert_arg_equals(None, &Value::Null).unwrap_err();
            assert!(err.to_string().contains("Actual:   undefined"));
        }

        #[test]
        fn test_present_argument() {
            assert!(assert_arg_equals(Some(&json!("x")), &json!("x")).unwrap());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_reflexive(words in proptest::collection::vec(".*", 0..8), n in any::<i64>()) {
                let value = json!({"words": words, "n": n});
                prop_assert!(assert_equals(&value, &value).unwrap());
            }

            #[test]
            fn prop_distinct_forms_fail(a in any::<i64>(), b in any::<i64>()) {
                prop_assume!(a != b);
                prop_assert!(assert_equals(&a, &b).unwrap_err().is_assertion_failure());
            }
        }
    }
}
