//! Test runner
//!
//! Runs the discovered methods of a test case one after another. Errors and
//! panics escaping a method are caught, counted as one failure for that
//! method, and the run moves on to the next method.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error_kind::Raised;
use crate::panic_hook;
use crate::test_case::{TestCase, TestRun};
use crate::test_discovery::{TestMethod, DEFAULT_PREFIX};
use crate::test_report::{ConsoleReporter, TestReporter};

/// Test runner configuration
#[derive(Debug, Clone)]
pub struct TestRunnerConfig {
    /// Reserved name prefix identifying test methods
    pub prefix: String,

    /// Only run methods whose name contains this pattern
    pub filter: Option<String>,

    /// Whether to show detailed output
    pub verbose: bool,
}

impl Default for TestRunnerConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            filter: None,
            verbose: false,
        }
    }
}

impl TestRunnerConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Stateless test runner, reusable across test cases
#[derive(Debug, Clone, Default)]
pub struct TestRunner {
    config: TestRunnerConfig,
}

impl TestRunner {
    pub fn new(config: TestRunnerConfig) -> Self {
        Self { config }
    }

    /// Run every discovered test method, printing diagnostics to stdout.
    ///
    /// Results are left on the case's counters.
    pub fn run(&self, case: &mut TestCase) {
        let reporter = ConsoleReporter::stdout(self.config.verbose);
        self.run_with_reporter(case, &reporter);
    }

    /// Run every discovered test method, streaming results to `reporter`.
    pub fn run_with_reporter(&self, case: &mut TestCase, reporter: &dyn TestReporter) {
        let methods = case.discover(&self.config.prefix, self.config.filter.as_deref());
        info!("Running {} ({} tests)", case.name(), methods.len());

        if let Err(e) = reporter.on_case_start(case, methods.len()) {
            warn!("Reporter failed on case start: {}", e);
        }

        for method in &methods {
            if let Err(e) = reporter.on_test_start(&method.name) {
                warn!("Reporter failed on test start: {}", e);
            }

            let first_record = case.records().len();
            self.run_method(case, method);

            if let (Some(run), Some(records)) = (case.runs().last(), case.records().get(first_record..)) {
                if let Err(e) = reporter.on_test_finish(run, records) {
                    warn!("Reporter failed on test finish: {}", e);
                }
            }
        }

        info!(
            "Finished {}: {} passed, {} failed",
            case.name(),
            case.passed(),
            case.failed()
        );

        if let Err(e) = reporter.on_case_finish(case) {
            warn!("Reporter failed on case finish: {}", e);
        }
    }

    fn run_method(&self, case: &mut TestCase, method: &TestMethod) {
        debug!("Running {}::{}", case.name(), method.name);

        let passed_before = case.passed();
        let failed_before = case.failed();
        let start = Instant::now();

        case.begin_test(&method.name);
        let body = method.body;
        let result = panic_hook::catch_silent(|| body(case));

        let error = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("{:#}", e)),
            Err(payload) => Some(Raised::from_panic(payload).to_string()),
        };

        if let Some(error) = &error {
            warn!("Unexpected error in {}: {}", method.name, error);
            case.record_unexpected(&method.name, error.clone());
        }

        let run = TestRun {
            name: method.name.clone(),
            passed: case.passed() - passed_before,
            failed: case.failed() - failed_before,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
        };
        case.finish_test(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_kind::ErrorKind;
    use crate::test_case::Outcome;
    use crate::test_report::tests::RecordingReporter;

    fn passing(case: &mut TestCase) -> anyhow::Result<()> {
        case.assert_true(true, None);
        Ok(())
    }

    fn failing(case: &mut TestCase) -> anyhow::Result<()> {
        case.assert_equal(1, 2, None);
        Ok(())
    }

    fn erroring(case: &mut TestCase) -> anyhow::Result<()> {
        case.assert_true(true, None);
        anyhow::bail!("database unavailable")
    }

    fn panicking(_: &mut TestCase) -> anyhow::Result<()> {
        panic!("index out of range")
    }

    fn raising(case: &mut TestCase) -> anyhow::Result<()> {
        case.assert_raises(
            ErrorKind::VALUE,
            || -> Result<(), Raised> { Err(Raised::new(ErrorKind::VALUE, "expected")) },
            None,
        );
        Ok(())
    }

    fn helper(case: &mut TestCase) -> anyhow::Result<()> {
        case.assert_true(false, Some("helpers must not run"));
        Ok(())
    }

    fn case_with(methods: &[(&str, crate::test_discovery::TestFn)]) -> TestCase {
        let mut case = TestCase::new("RunnerCase");
        for (name, body) in methods {
            case.register(name, *body).unwrap();
        }
        case
    }

    #[test]
    fn test_one_assertion_per_method_totals_n() {
        let mut case = case_with(&[
            ("test_a", passing),
            ("test_b", failing),
            ("test_c", passing),
            ("test_d", raising),
        ]);

        TestRunner::default().run_with_reporter(&mut case, &RecordingReporter::default());

        assert_eq!(case.passed() + case.failed(), 4);
        assert_eq!(case.passed(), 3);
        assert_eq!(case.failed(), 1);
    }

    #[test]
    fn test_unexpected_error_does_not_stop_run() {
        let mut case = case_with(&[
            ("test_error", erroring),
            ("test_panic", panicking),
            ("test_after", passing),
        ]);

        TestRunner::default().run_with_reporter(&mut case, &RecordingReporter::default());

        // erroring: one pass then one unexpected error; panicking: one error; after: one pass
        assert_eq!(case.passed(), 2);
        assert_eq!(case.failed(), 2);

        let errors: Vec<_> = case
            .records()
            .iter()
            .filter(|record| record.outcome == Outcome::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].test_name, "test_error");
        assert!(errors[0].message.as_deref().unwrap().contains("database unavailable"));
        assert_eq!(errors[1].test_name, "test_panic");
        assert!(errors[1].message.as_deref().unwrap().contains("index out of range"));

        let runs = case.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].outcome(), Outcome::Error);
        assert_eq!(runs[2].outcome(), Outcome::Pass);
    }

    #[test]
    fn test_panicking_method_is_not_printed() {
        let mut case = case_with(&[("test_panic", panicking)]);
        let before = panic_hook::silenced_panics();

        TestRunner::default().run_with_reporter(&mut case, &RecordingReporter::default());

        assert_eq!(panic_hook::silenced_panics(), before + 1);
        assert_eq!(case.failed(), 1);
    }

    #[test]
    fn test_members_without_prefix_are_not_run() {
        let mut case = case_with(&[("helper", helper), ("test_ok", passing)]);

        TestRunner::default().run_with_reporter(&mut case, &RecordingReporter::default());

        assert_eq!(case.failed(), 0);
        assert_eq!(case.runs().len(), 1);
    }

    #[test]
    fn test_custom_prefix_and_filter() {
        let mut case = case_with(&[
            ("check_one", passing),
            ("check_two", failing),
            ("test_three", failing),
        ]);

        let config = TestRunnerConfig::default()
            .with_prefix("check_")
            .with_filter("one");
        TestRunner::new(config).run_with_reporter(&mut case, &RecordingReporter::default());

        assert_eq!(case.passed(), 1);
        assert_eq!(case.failed(), 0);
    }

    #[test]
    fn test_runner_is_reusable() {
        let runner = TestRunner::default();
        let reporter = RecordingReporter::default();

        let mut first = case_with(&[("test_a", passing)]);
        let mut second = case_with(&[("test_a", failing), ("test_b", failing)]);
        runner.run_with_reporter(&mut first, &reporter);
        runner.run_with_reporter(&mut second, &reporter);

        assert_eq!((first.passed(), first.failed()), (1, 0));
        assert_eq!((second.passed(), second.failed()), (0, 2));
    }

    #[test]
    fn test_reporter_sees_each_method_with_its_records() {
        let mut case = case_with(&[("test_a", passing), ("test_b", failing)]);
        let reporter = RecordingReporter::default();

        TestRunner::default().run_with_reporter(&mut case, &reporter);

        let events = reporter.events.borrow();
        assert_eq!(
            *events,
            vec![
                "start RunnerCase 2".to_string(),
                "test test_a".to_string(),
                "finish test_a 1".to_string(),
                "test test_b".to_string(),
                "finish test_b 1".to_string(),
                "end RunnerCase".to_string(),
            ]
        );
    }
}
