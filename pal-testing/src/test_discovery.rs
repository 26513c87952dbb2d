//! Test discovery module
//!
//! Test methods are registered explicitly as `(name, function)` pairs when a
//! test case is built. Discovery selects the registered members whose name
//! carries the reserved prefix, in registration order.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::test_case::TestCase;

/// Reserved name prefix identifying test methods
pub const DEFAULT_PREFIX: &str = "test_";

/// Body of a test method
///
/// Returning `Err` (or panicking) is reported as an unexpected error, distinct
/// from assertion failures.
pub type TestFn = fn(&mut TestCase) -> anyhow::Result<()>;

/// A named, zero-argument unit of behaviour owned by a test case
#[derive(Clone)]
pub struct TestMethod {
    pub name: String,
    pub body: TestFn,
}

impl fmt::Debug for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMethod").field("name", &self.name).finish()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Test method name must not be empty")]
    EmptyName,

    #[error("Duplicate test method: {name}")]
    Duplicate { name: String },
}

/// Ordered registration list of a test case
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    methods: Vec<TestMethod>,
}

impl Registry {
    pub(crate) fn register(&mut self, name: &str, body: TestFn) -> Result<(), DiscoveryError> {
        if name.is_empty() {
            return Err(DiscoveryError::EmptyName);
        }

        if self.methods.iter().any(|method| method.name == name) {
            return Err(DiscoveryError::Duplicate {
                name: name.to_string(),
            });
        }

        self.methods.push(TestMethod {
            name: name.to_string(),
            body,
        });

        Ok(())
    }

    pub(crate) fn methods(&self) -> &[TestMethod] {
        &self.methods
    }

    /// Registered members carrying `prefix`, optionally narrowed by a substring filter
    pub(crate) fn discover(&self, prefix: &str, filter: Option<&str>) -> Vec<TestMethod> {
        self.methods
            .iter()
            .filter(|method| {
                if !method.name.starts_with(prefix) {
                    debug!("Skipping '{}': missing '{}' prefix", method.name, prefix);
                    return false;
                }

                match filter {
                    Some(pattern) => method.name.contains(pattern),
                    None => true,
                }
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut TestCase) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_discovery_by_prefix_keeps_registration_order() {
        let mut registry = Registry::default();
        registry.register("test_b", noop).unwrap();
        registry.register("helper", noop).unwrap();
        registry.register("test_a", noop).unwrap();

        let names: Vec<String> = registry
            .discover(DEFAULT_PREFIX, None)
            .into_iter()
            .map(|method| method.name)
            .collect();

        assert_eq!(names, vec!["test_b", "test_a"]);
    }

    #[test]
    fn test_discovery_with_filter() {
        let mut registry = Registry::default();
        registry.register("test_valid", noop).unwrap();
        registry.register("test_invalid", noop).unwrap();
        registry.register("test_other", noop).unwrap();

        let found = registry.discover(DEFAULT_PREFIX, Some("valid"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_registration_rejects_duplicates_and_empty_names() {
        let mut registry = Registry::default();
        registry.register("test_one", noop).unwrap();

        assert_eq!(
            registry.register("test_one", noop),
            Err(DiscoveryError::Duplicate {
                name: "test_one".to_string()
            })
        );
        assert_eq!(registry.register("", noop), Err(DiscoveryError::EmptyName));
        assert_eq!(registry.methods().len(), 1);
    }
}
