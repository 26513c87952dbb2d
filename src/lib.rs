//! Two-pointer palindrome check exercised by the `pal-testing` framework

pub mod palindrome;
pub mod suite;
pub mod value;

pub use palindrome::{
    check_expectation, is_palindrome, is_palindrome_str, PalindromeError, Verdict, INVALID_INPUT,
};
pub use value::{Value, ValueKind};
