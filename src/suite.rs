//! The `TestIsPalindrome` test case

use pal_testing::{DiscoveryError, ErrorKind, TestCase};

use crate::palindrome::{check_expectation, is_palindrome, Verdict, INVALID_INPUT};
use crate::value::{Value, ValueKind};

pub const CASE_NAME: &str = "TestIsPalindrome";

/// Build the palindrome test case with every test method registered.
pub fn palindrome_case() -> Result<TestCase, DiscoveryError> {
    TestCase::new(CASE_NAME)
        .with_test("test_valid_palindrome", test_valid_palindrome)?
        .with_test("test_valid_palindrome_with_spaces", test_valid_palindrome_with_spaces)?
        .with_test("test_non_palindrome", test_non_palindrome)?
        .with_test("test_empty_string", test_empty_string)?
        .with_test("test_equality_style", test_equality_style)?
        .with_test("test_invalid_input", test_invalid_input)?
        .with_test("test_invalid_input_is_value_error", test_invalid_input_is_value_error)?
        .with_test("test_argument_kinds", test_argument_kinds)?
        .with_test("test_expectation_verdicts", test_expectation_verdicts)
}

fn test_valid_palindrome(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_true(is_palindrome("racecar")?, None);
    Ok(())
}

fn test_valid_palindrome_with_spaces(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_true(is_palindrome("A man a plan a canal Panama")?, None);
    Ok(())
}

fn test_non_palindrome(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_false(is_palindrome("hello")?, None);
    Ok(())
}

fn test_empty_string(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_true(is_palindrome("")?, Some("empty input reads the same both ways"));
    Ok(())
}

fn test_equality_style(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_equal(is_palindrome("racecar")?, true, None);
    t.assert_equal(is_palindrome("hello")?, false, None);
    t.assert_equal(is_palindrome("A man a plan a canal Panama")?, true, None);
    t.assert_equal(is_palindrome("")?, true, None);
    Ok(())
}

fn test_invalid_input(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_raises(
        INVALID_INPUT,
        || is_palindrome(123),
        Some("Expected InvalidInput for non-string input"),
    );
    Ok(())
}

fn test_invalid_input_is_value_error(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_raises(ErrorKind::VALUE, || is_palindrome(Value::Nil), None);
    Ok(())
}

fn test_argument_kinds(t: &mut TestCase) -> anyhow::Result<()> {
    let word = Value::from("racecar");
    t.assert_is_instance(&word, ValueKind::Text, None);
    t.assert_not_is_instance(&Value::from(123), ValueKind::Text, None);
    t.assert_in("car", "racecar", None);
    t.assert_not_in(&' ', "racecar", None);
    Ok(())
}

fn test_expectation_verdicts(t: &mut TestCase) -> anyhow::Result<()> {
    t.assert_equal(check_expectation("racecar", true)?, Verdict::Passed, None);
    t.assert_equal(check_expectation("hello", false)?, Verdict::Passed, None);
    t.assert_not_equal(check_expectation("hello", true)?, Verdict::Passed, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pal_testing::TestRunner;

    #[test]
    fn test_suite_registers_all_methods() {
        let case = palindrome_case().unwrap();
        assert_eq!(case.name(), CASE_NAME);
        assert_eq!(case.methods().len(), 9);
        assert!(case.methods().iter().all(|m| m.name.starts_with("test_")));
    }

    #[test]
    fn test_suite_passes() {
        let mut case = palindrome_case().unwrap();
        TestRunner::default().run(&mut case);

        assert_eq!(case.failed(), 0);
        assert_eq!(case.passed(), 17);
    }
}
