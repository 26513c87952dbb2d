//! Error kinds observed by `assert_raises`
//!
//! Kinds form a small tree: every kind may declare a parent, and a raised
//! kind satisfies an expected one when it is the same kind or one of its
//! declared descendants.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Classification tag for a raised error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorKind {
    name: &'static str,
    parent: Option<&'static ErrorKind>,
}

impl ErrorKind {
    /// Root of every kind
    pub const ERROR: ErrorKind = ErrorKind::root("Error");

    /// A value had the right type but an unacceptable content or shape
    pub const VALUE: ErrorKind = ErrorKind::derived("ValueError", &ErrorKind::ERROR);

    /// A value had the wrong type
    pub const TYPE: ErrorKind = ErrorKind::derived("TypeError", &ErrorKind::ERROR);

    /// The observed code panicked instead of returning an error
    pub const PANIC: ErrorKind = ErrorKind::derived("Panic", &ErrorKind::ERROR);

    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    pub const fn derived(name: &'static str, parent: &'static ErrorKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static ErrorKind> {
        self.parent
    }

    /// This kind followed by its declared ancestors, nearest first
    pub fn ancestry(&self) -> impl Iterator<Item = ErrorKind> {
        std::iter::successors(Some(*self), |kind| kind.parent.copied())
    }

    /// True when `self` is `other` or a declared descendant of it.
    pub fn is_a(&self, other: &ErrorKind) -> bool {
        self.ancestry().any(|kind| kind == *other)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// An error whose kind can be compared by `assert_raises`
pub trait Raise: fmt::Display {
    fn kind(&self) -> ErrorKind;

    /// Human readable message without the kind prefix
    fn message(&self) -> String {
        self.to_string()
    }
}

/// General purpose error carrying an explicit kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct Raised {
    pub kind: ErrorKind,
    pub message: String,
}

impl Raised {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Self::new(ErrorKind::PANIC, message)
    }
}

impl Raise for Raised {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

/// Recovers the kind of a concrete error type once it has been erased
///
/// Crates submit one per error type with `inventory::submit!` so kinds
/// survive a trip through `anyhow::Error` or any `dyn Error` chain.
#[derive(Clone, Copy)]
pub struct KindClassifier {
    pub name: &'static str,
    pub classify: fn(&(dyn StdError + 'static)) -> Option<ErrorKind>,
}

inventory::collect!(KindClassifier);

/// Kind of an erased error: a wrapped [`Raised`] or any registered type.
pub fn classify(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    if let Some(raised) = err.downcast_ref::<Raised>() {
        return Some(raised.kind);
    }

    inventory::iter::<KindClassifier>
        .into_iter()
        .find_map(|classifier| (classifier.classify)(err))
}

impl Raise for anyhow::Error {
    fn kind(&self) -> ErrorKind {
        self.chain()
            .find_map(classify)
            .unwrap_or(ErrorKind::ERROR)
    }

    fn message(&self) -> String {
        format!("{:#}", self)
    }
}
