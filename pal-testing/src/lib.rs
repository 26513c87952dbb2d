//! Minimal xUnit-style test framework
//!
//! A [`TestCase`] owns pass/fail counters and a list of registered test
//! methods. The [`TestRunner`] discovers methods by name prefix, runs each one
//! in isolation and leaves the aggregate counts on the case. Every assertion
//! also appends a structured record so reporters can render results after the
//! fact.

pub mod error_kind;
mod panic_hook;
pub mod test_case;
pub mod test_discovery;
pub mod test_runner;
pub mod test_report;

pub use error_kind::{classify, ErrorKind, KindClassifier, Raise, Raised};
pub use test_case::{AssertionRecord, Container, Outcome, TestCase, TestRun, Typed};
pub use test_discovery::{DiscoveryError, TestFn, TestMethod, DEFAULT_PREFIX};
pub use test_runner::{TestRunner, TestRunnerConfig};
pub use test_report::{
    ConsoleReporter, JUnitReporter, JsonReporter, ReportError, TestReport, TestReporter, TestStats,
};
