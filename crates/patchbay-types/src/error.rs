//! Unified error interface for patchbay crates.
//!
//! Every patchbay error enum implements [`ErrorCode`] so that callers
//! (and log pipelines) can branch on a stable machine-readable code
//! instead of matching display strings.
//!
//! # Code Convention
//!
//! | Crate | Prefix |
//! |-------|--------|
//! | patchbay-provider | `PROVIDER_` |
//! | patchbay-runtime  | `RUNTIME_` |
//!
//! Codes are UPPER_SNAKE_CASE and stable once defined; changing one is
//! a breaking change.

/// Stable machine-readable code plus recoverability for an error.
///
/// An error is **recoverable** when retrying the operation may
/// succeed (a timeout, a transient lookup miss). Structural errors -
/// malformed definitions, unknown names that will not appear on retry -
/// are not.
///
/// # Example
///
/// ```
/// use patchbay_types::ErrorCode;
///
/// #[derive(Debug)]
/// enum StoreError {
///     Busy,
///     Corrupt,
/// }
///
/// impl ErrorCode for StoreError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::Busy => "STORE_BUSY",
///             Self::Corrupt => "STORE_CORRUPT",
///         }
///     }
///
///     fn is_recoverable(&self) -> bool {
///         matches!(self, Self::Busy)
///     }
/// }
///
/// assert_eq!(StoreError::Busy.code(), "STORE_BUSY");
/// assert!(StoreError::Busy.is_recoverable());
/// ```
pub trait ErrorCode {
    /// Returns the machine-readable error code.
    ///
    /// UPPER_SNAKE_CASE, prefixed with the owning crate's domain,
    /// stable across versions.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the failed operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows the patchbay conventions.
///
/// Checks the code is non-empty, UPPER_SNAKE_CASE, and carries the
/// expected prefix. Intended for use in each error enum's test module.
///
/// # Panics
///
/// Panics with a descriptive message when a check fails.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts conventions for every variant of an error enum at once.
///
/// # Example
///
/// ```
/// use patchbay_types::{assert_error_codes, ErrorCode};
///
/// #[derive(Debug)]
/// enum E { A, B }
///
/// impl ErrorCode for E {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::A => "X_A",
///             Self::B => "X_B",
///         }
///     }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_codes(&[E::A, E::B], "X_");
/// ```
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum SampleError {
        Transient,
        Fatal,
    }

    impl ErrorCode for SampleError {
        fn code(&self) -> &'static str {
            match self {
                Self::Transient => "SAMPLE_TRANSIENT",
                Self::Fatal => "SAMPLE_FATAL",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[test]
    fn code_and_recoverability() {
        assert_eq!(SampleError::Transient.code(), "SAMPLE_TRANSIENT");
        assert!(SampleError::Transient.is_recoverable());
        assert!(!SampleError::Fatal.is_recoverable());
    }

    #[test]
    fn assert_helpers_accept_valid_codes() {
        assert_error_codes(&[SampleError::Transient, SampleError::Fatal], "SAMPLE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn wrong_prefix_panics() {
        assert_error_code(&SampleError::Fatal, "OTHER_");
    }

    #[test]
    fn upper_snake_case_rules() {
        assert!(is_upper_snake_case("RUNTIME_WIRE_NOT_FOUND"));
        assert!(is_upper_snake_case("A_1"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("lower_case"));
        assert!(!is_upper_snake_case("_LEADING"));
        assert!(!is_upper_snake_case("TRAILING_"));
        assert!(!is_upper_snake_case("DOUBLE__SCORE"));
    }
}
