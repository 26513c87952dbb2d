//! Two-pointer palindrome check

use std::fmt;

use pal_testing::{ErrorKind, KindClassifier, Raise};
use thiserror::Error;

use crate::value::{Value, ValueKind};

/// Raised when the checked value is not text
pub const INVALID_INPUT: ErrorKind = ErrorKind::derived("InvalidInput", &ErrorKind::VALUE);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PalindromeError {
    #[error("Input must be a string, got {found}")]
    InvalidInput { found: ValueKind },
}

impl Raise for PalindromeError {
    fn kind(&self) -> ErrorKind {
        match self {
            PalindromeError::InvalidInput { .. } => INVALID_INPUT,
        }
    }
}

fn classify_palindrome_error(err: &(dyn std::error::Error + 'static)) -> Option<ErrorKind> {
    err.downcast_ref::<PalindromeError>().map(Raise::kind)
}

inventory::submit! {
    KindClassifier {
        name: "palindrome",
        classify: classify_palindrome_error,
    }
}

/// Check whether `input` reads the same forwards and backwards, ignoring
/// whitespace and letter case.
///
/// # Errors
///
/// Returns [`PalindromeError::InvalidInput`] when `input` is not text.
pub fn is_palindrome(input: impl Into<Value>) -> Result<bool, PalindromeError> {
    let value = input.into();
    match value.as_text() {
        Some(text) => Ok(is_palindrome_str(text)),
        None => Err(PalindromeError::InvalidInput {
            found: value.kind(),
        }),
    }
}

/// Palindrome check for input that is already textual.
pub fn is_palindrome_str(text: &str) -> bool {
    let cleaned: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    if cleaned.is_empty() {
        return true;
    }

    let mut left = 0;
    let mut right = cleaned.len() - 1;

    while left < right {
        if cleaned[left] != cleaned[right] {
            return false;
        }
        left += 1;
        right -= 1;
    }

    true
}

/// Result of comparing a palindrome check with an expected answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => f.write_str("Test Passed ✅"),
            Verdict::Failed => f.write_str("Test Failed ❌"),
        }
    }
}

/// Run the check on `input` and compare it with `expected`.
pub fn check_expectation(input: impl Into<Value>, expected: bool) -> Result<Verdict, PalindromeError> {
    if is_palindrome(input)? == expected {
        Ok(Verdict::Passed)
    } else {
        Ok(Verdict::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_words() {
        assert_eq!(is_palindrome("racecar"), Ok(true));
        assert_eq!(is_palindrome("hello"), Ok(false));
        assert_eq!(is_palindrome("abba"), Ok(true));
        assert_eq!(is_palindrome("ab"), Ok(false));
    }

    #[test]
    fn test_spaces_and_case_ignored() {
        assert_eq!(is_palindrome("A man a plan a canal Panama"), Ok(true));
        assert_eq!(is_palindrome("Never\todd or\neven"), Ok(true));
    }

    #[test]
    fn test_empty_and_single_character() {
        assert_eq!(is_palindrome(""), Ok(true));
        assert_eq!(is_palindrome("   "), Ok(true));
        assert_eq!(is_palindrome("x"), Ok(true));
    }

    #[test]
    fn test_unicode_lowercasing() {
        assert!(is_palindrome_str("Ésé"));
        assert!(!is_palindrome_str("Éso"));
    }

    #[test]
    fn test_non_text_is_invalid_input() {
        let err = is_palindrome(123).unwrap_err();
        assert_eq!(
            err,
            PalindromeError::InvalidInput {
                found: ValueKind::Integer
            }
        );
        assert_eq!(err.kind(), INVALID_INPUT);
        assert!(err.kind().is_a(&ErrorKind::VALUE));
        assert_eq!(err.to_string(), "Input must be a string, got integer");

        assert!(is_palindrome(Value::Nil).is_err());
        assert!(is_palindrome(vec!["a"]).is_err());
    }

    #[test]
    fn test_invalid_input_kind_survives_question_mark() {
        let err: anyhow::Error = is_palindrome(123).map_err(anyhow::Error::from).unwrap_err();
        assert_eq!(Raise::kind(&err), INVALID_INPUT);

        let mut case = pal_testing::TestCase::new("Propagation");
        let passed = case.assert_raises(
            INVALID_INPUT,
            || -> anyhow::Result<bool> { Ok(is_palindrome(123)?) },
            None,
        );
        assert!(passed);
        assert_eq!(case.failed(), 0);
    }

    #[test]
    fn test_check_expectation() {
        assert_eq!(check_expectation("racecar", true), Ok(Verdict::Passed));
        assert_eq!(check_expectation("hello", true), Ok(Verdict::Failed));
        assert_eq!(Verdict::Passed.to_string(), "Test Passed ✅");
        assert!(check_expectation(123, false).is_err());
    }
}
