//! Test case state and the assertion engine
//!
//! A [`TestCase`] owns the pass/fail counters for one run. Every assertion
//! increments exactly one counter, appends an [`AssertionRecord`] to the
//! case's log and returns `true` on pass. Assertions never abort the calling
//! test method.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::{BuildHasher, Hash};

use serde::Serialize;
use tracing::debug;

use crate::error_kind::{ErrorKind, Raise, Raised};
use crate::panic_hook;
use crate::test_discovery::{DiscoveryError, Registry, TestFn, TestMethod};

/// Outcome of one assertion or test method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    /// Unexpected error escaping a test method
    Error,
}

/// One entry of the structured result log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionRecord {
    pub test_name: String,
    pub assertion: &'static str,
    pub outcome: Outcome,
    pub message: Option<String>,
}

impl AssertionRecord {
    /// Console line for a failing record, `None` for passes.
    pub fn diagnostic(&self) -> Option<String> {
        match self.outcome {
            Outcome::Pass => None,
            Outcome::Fail => Some(match &self.message {
                Some(message) => format!("AssertionError: {}", message),
                None => "AssertionError".to_string(),
            }),
            Outcome::Error => Some(format!(
                "Unexpected error in {}: {}",
                self.test_name,
                self.message.as_deref().unwrap_or("unknown error")
            )),
        }
    }
}

/// Per-method execution summary written by the runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRun {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl TestRun {
    pub fn outcome(&self) -> Outcome {
        if self.error.is_some() {
            Outcome::Error
        } else if self.failed > 0 {
            Outcome::Fail
        } else {
            Outcome::Pass
        }
    }
}

/// Values that can report a kind descriptor for instance checks
pub trait Typed {
    type Kind: PartialEq + fmt::Display;

    fn kind(&self) -> Self::Kind;
}

/// Collections usable with `assert_in` / `assert_not_in`
pub trait Container<T: ?Sized> {
    fn contains_member(&self, member: &T) -> bool;
}

impl<T: PartialEq> Container<T> for [T] {
    fn contains_member(&self, member: &T) -> bool {
        self.contains(member)
    }
}

impl<T: PartialEq, const N: usize> Container<T> for [T; N] {
    fn contains_member(&self, member: &T) -> bool {
        self.as_slice().contains(member)
    }
}

impl<T: PartialEq> Container<T> for Vec<T> {
    fn contains_member(&self, member: &T) -> bool {
        self.as_slice().contains(member)
    }
}

impl<T: PartialEq> Container<T> for VecDeque<T> {
    fn contains_member(&self, member: &T) -> bool {
        self.contains(member)
    }
}

impl<T: Eq + Hash, S: BuildHasher> Container<T> for HashSet<T, S> {
    fn contains_member(&self, member: &T) -> bool {
        self.contains(member)
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> Container<K> for HashMap<K, V, S> {
    fn contains_member(&self, member: &K) -> bool {
        self.contains_key(member)
    }
}

impl<T: Ord> Container<T> for BTreeSet<T> {
    fn contains_member(&self, member: &T) -> bool {
        self.contains(member)
    }
}

impl<K: Ord, V> Container<K> for BTreeMap<K, V> {
    fn contains_member(&self, member: &K) -> bool {
        self.contains_key(member)
    }
}

impl Container<str> for str {
    fn contains_member(&self, member: &str) -> bool {
        self.contains(member)
    }
}

impl Container<char> for str {
    fn contains_member(&self, member: &char) -> bool {
        self.contains(*member)
    }
}

impl Container<str> for String {
    fn contains_member(&self, member: &str) -> bool {
        self.as_str().contains(member)
    }
}

impl Container<char> for String {
    fn contains_member(&self, member: &char) -> bool {
        self.as_str().contains(*member)
    }
}

/// Owner of assertion state and registered test methods
///
/// `passed + failed` always equals the number of completed assertion
/// evaluations plus the unexpected errors recorded by the runner.
#[derive(Debug)]
pub struct TestCase {
    name: String,
    passed: usize,
    failed: usize,
    records: Vec<AssertionRecord>,
    runs: Vec<TestRun>,
    current: Option<String>,
    registry: Registry,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: 0,
            failed: 0,
            records: Vec::new(),
            runs: Vec::new(),
            current: None,
            registry: Registry::default(),
        }
    }

    /// Register a member under `name`. Only names with the runner's prefix
    /// are executed.
    pub fn register(&mut self, name: &str, body: TestFn) -> Result<&mut Self, DiscoveryError> {
        self.registry.register(name, body)?;
        Ok(self)
    }

    pub fn with_test(mut self, name: &str, body: TestFn) -> Result<Self, DiscoveryError> {
        self.registry.register(name, body)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn records(&self) -> &[AssertionRecord] {
        &self.records
    }

    pub fn runs(&self) -> &[TestRun] {
        &self.runs
    }

    pub fn methods(&self) -> &[TestMethod] {
        self.registry.methods()
    }

    pub(crate) fn discover(&self, prefix: &str, filter: Option<&str>) -> Vec<TestMethod> {
        self.registry.discover(prefix, filter)
    }

    pub(crate) fn begin_test(&mut self, name: &str) {
        self.current = Some(name.to_string());
    }

    pub(crate) fn finish_test(&mut self, run: TestRun) {
        self.current = None;
        self.runs.push(run);
    }

    /// Count an error that escaped a test method.
    pub(crate) fn record_unexpected(&mut self, test_name: &str, error: String) {
        self.failed += 1;
        self.records.push(AssertionRecord {
            test_name: test_name.to_string(),
            assertion: "unexpected_error",
            outcome: Outcome::Error,
            message: Some(error),
        });
    }

    fn check(
        &mut self,
        assertion: &'static str,
        ok: bool,
        msg: Option<&str>,
        detail: impl FnOnce() -> String,
    ) -> bool {
        let test_name = self.current.clone().unwrap_or_else(|| self.name.clone());

        // counters move only once the record is ready
        let message = if ok {
            None
        } else {
            let detail = detail();
            Some(match msg {
                Some(msg) => format!("{}: {}", msg, detail),
                None => detail,
            })
        };

        if let Some(message) = &message {
            self.failed += 1;
            debug!("{} failed in {}: {}", assertion, test_name, message);
        } else {
            self.passed += 1;
        }

        self.records.push(AssertionRecord {
            test_name,
            assertion,
            outcome: if ok { Outcome::Pass } else { Outcome::Fail },
            message,
        });

        ok
    }

    pub fn assert_true(&mut self, expr: bool, msg: Option<&str>) -> bool {
        self.check("assert_true", expr, msg, || "expected true, got false".to_string())
    }

    pub fn assert_false(&mut self, expr: bool, msg: Option<&str>) -> bool {
        self.check("assert_false", !expr, msg, || "expected false, got true".to_string())
    }

    pub fn assert_equal<A, B>(&mut self, first: A, second: B, msg: Option<&str>) -> bool
    where
        A: PartialEq<B> + fmt::Debug,
        B: fmt::Debug,
    {
        let ok = first == second;
        self.check("assert_equal", ok, msg, || {
            format!("Expected {:?}, but got {:?}", second, first)
        })
    }

    pub fn assert_not_equal<A, B>(&mut self, first: A, second: B, msg: Option<&str>) -> bool
    where
        A: PartialEq<B> + fmt::Debug,
        B: fmt::Debug,
    {
        let ok = first != second;
        self.check("assert_not_equal", ok, msg, || {
            format!("Expected values to be not equal: {:?} and {:?}", first, second)
        })
    }

    pub fn assert_in<T, C>(&mut self, member: &T, container: &C, msg: Option<&str>) -> bool
    where
        T: ?Sized + fmt::Debug,
        C: ?Sized + Container<T> + fmt::Debug,
    {
        let ok = container.contains_member(member);
        self.check("assert_in", ok, msg, || {
            format!("{:?} not found in {:?}", member, container)
        })
    }

    pub fn assert_not_in<T, C>(&mut self, member: &T, container: &C, msg: Option<&str>) -> bool
    where
        T: ?Sized + fmt::Debug,
        C: ?Sized + Container<T> + fmt::Debug,
    {
        let ok = !container.contains_member(member);
        self.check("assert_not_in", ok, msg, || {
            format!("{:?} unexpectedly found in {:?}", member, container)
        })
    }

    pub fn assert_is_instance<V>(&mut self, obj: &V, kind: V::Kind, msg: Option<&str>) -> bool
    where
        V: Typed + fmt::Debug,
    {
        let actual = obj.kind();
        let ok = actual == kind;
        self.check("assert_is_instance", ok, msg, || {
            format!(
                "Expected to be an instance of {}, but got {}",
                kind, actual
            )
        })
    }

    pub fn assert_not_is_instance<V>(&mut self, obj: &V, kind: V::Kind, msg: Option<&str>) -> bool
    where
        V: Typed + fmt::Debug,
    {
        let ok = obj.kind() != kind;
        self.check("assert_not_is_instance", ok, msg, || {
            format!("{:?} is an instance of {}", obj, kind)
        })
    }

    /// Invoke `op` and pass when it raises `expected` or a declared subkind.
    ///
    /// A panic inside `op` counts as a raised error of kind
    /// [`ErrorKind::PANIC`] and is not printed. Arguments are captured by the closure.
    pub fn assert_raises<T, E, F>(&mut self, expected: ErrorKind, op: F, msg: Option<&str>) -> bool
    where
        F: FnOnce() -> Result<T, E>,
        E: Raise,
    {
        let operation = std::any::type_name::<F>();

        let raised = match panic_hook::catch_silent(op) {
            Ok(Ok(_)) => None,
            Ok(Err(err)) => Some((err.kind(), err.message())),
            Err(payload) => {
                let raised = Raised::from_panic(payload);
                Some((raised.kind, raised.message))
            }
        };

        match raised {
            Some((kind, _)) if kind.is_a(&expected) => {
                self.check("assert_raises", true, msg, String::new)
            }
            Some((kind, message)) => self.check("assert_raises", false, msg, || {
                format!("Expected {}, but got {}: {}", expected, kind, message)
            }),
            None => self.check("assert_raises", false, msg, || {
                format!(
                    "Expected {}, but no exception was raised by {}",
                    expected, operation
                )
            }),
        }
    }
}
