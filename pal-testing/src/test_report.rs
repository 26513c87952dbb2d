//! Test reporting module
//!
//! Reporters consume the structured result log of a test case. They receive
//! streaming callbacks from the runner and may also render a [`TestReport`]
//! snapshot once the case has finished.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use thiserror::Error;

use crate::test_case::{AssertionRecord, Outcome, TestCase, TestRun};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Test report
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    /// Test case name
    pub name: String,

    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,

    /// Total duration in milliseconds
    pub duration_ms: u64,

    /// Summary statistics
    pub stats: TestStats,

    /// Per-method results in execution order
    pub tests: Vec<TestRun>,

    /// Every assertion and unexpected error in invocation order
    pub records: Vec<AssertionRecord>,
}

/// Test statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestStats {
    /// Test methods executed
    pub tests: usize,
    /// Assertions passed
    pub passed: usize,
    /// Assertions failed plus unexpected errors
    pub failed: usize,
    /// Test methods that ended in an unexpected error
    pub errors: usize,
}

impl TestReport {
    pub fn from_case(case: &TestCase) -> Self {
        let tests = case.runs().to_vec();

        Self {
            name: case.name().to_string(),
            generated_at: Utc::now(),
            duration_ms: tests.iter().map(|run| run.duration_ms).sum(),
            stats: TestStats {
                tests: tests.len(),
                passed: case.passed(),
                failed: case.failed(),
                errors: tests.iter().filter(|run| run.error.is_some()).count(),
            },
            tests,
            records: case.records().to_vec(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.stats.failed == 0
    }

    /// Failing records belonging to `test_name`
    pub fn failures_of<'a>(&'a self, test_name: &'a str) -> impl Iterator<Item = &'a AssertionRecord> {
        self.records
            .iter()
            .filter(move |record| record.test_name == test_name && record.outcome != Outcome::Pass)
    }
}

/// Test reporter trait
pub trait TestReporter {
    /// Called before the first test method runs
    fn on_case_start(&self, case: &TestCase, count: usize) -> Result<(), ReportError>;

    /// Called when a test method starts
    fn on_test_start(&self, name: &str) -> Result<(), ReportError>;

    /// Called when a test method finishes, with the records it produced
    fn on_test_finish(&self, run: &TestRun, records: &[AssertionRecord]) -> Result<(), ReportError>;

    /// Called after the last test method
    fn on_case_finish(&self, case: &TestCase) -> Result<(), ReportError>;
}

/// Console test reporter
///
/// Prints each failure diagnostic as soon as its test method finishes.
pub struct ConsoleReporter<W: Write = Stdout> {
    verbose: bool,
    out: RefCell<W>,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            verbose,
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn print_test_result(&self, run: &TestRun) -> io::Result<()> {
        let status = match run.outcome() {
            Outcome::Pass => format!("{} ({}ms)", "PASS".green(), run.duration_ms),
            Outcome::Fail => format!(
                "{} ({}ms): {} failed assertion(s)",
                "FAIL".red(),
                run.duration_ms,
                run.failed
            ),
            Outcome::Error => format!("{} ({}ms)", "ERROR".red().bold(), run.duration_ms),
        };

        writeln!(self.out.borrow_mut(), "{} ... {}", run.name, status)
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_case_start(&self, case: &TestCase, count: usize) -> Result<(), ReportError> {
        if self.verbose {
            writeln!(
                self.out.borrow_mut(),
                "\n{} {} ({} tests)\n",
                "Running".bold(),
                case.name(),
                count
            )?;
        }
        Ok(())
    }

    fn on_test_start(&self, name: &str) -> Result<(), ReportError> {
        if self.verbose {
            writeln!(self.out.borrow_mut(), "Running {} ...", name)?;
        }
        Ok(())
    }

    fn on_test_finish(&self, run: &TestRun, records: &[AssertionRecord]) -> Result<(), ReportError> {
        {
            let mut out = self.out.borrow_mut();
            for diagnostic in records.iter().filter_map(AssertionRecord::diagnostic) {
                writeln!(out, "{}", diagnostic)?;
            }
        }

        if self.verbose {
            self.print_test_result(run)?;
        }
        Ok(())
    }

    fn on_case_finish(&self, case: &TestCase) -> Result<(), ReportError> {
        if !self.verbose {
            return Ok(());
        }

        let mut out = self.out.borrow_mut();
        let failed: Vec<&TestRun> = case
            .runs()
            .iter()
            .filter(|run| run.outcome() != Outcome::Pass)
            .collect();

        if failed.is_empty() {
            writeln!(out, "\n{}", "All tests passed!".green().bold())?;
        } else {
            writeln!(out, "\n{}", "Some tests failed.".red().bold())?;
            writeln!(out, "\nFailed tests:")?;
            for run in failed {
                writeln!(out, "  - {}", run.name)?;
            }
        }
        Ok(())
    }
}

/// JSON test reporter
///
/// Writes a pretty-printed [`TestReport`] when the case finishes.
pub struct JsonReporter<W: Write> {
    out: RefCell<W>,
}

impl JsonReporter<File> {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out: RefCell::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_case_start(&self, _case: &TestCase, _count: usize) -> Result<(), ReportError> {
        Ok(())
    }

    fn on_test_start(&self, _name: &str) -> Result<(), ReportError> {
        Ok(())
    }

    fn on_test_finish(&self, _run: &TestRun, _records: &[AssertionRecord]) -> Result<(), ReportError> {
        Ok(())
    }

    fn on_case_finish(&self, case: &TestCase) -> Result<(), ReportError> {
        let report = TestReport::from_case(case);
        let mut out = self.out.borrow_mut();
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// JUnit XML test reporter
pub struct JUnitReporter<W: Write> {
    out: RefCell<W>,
}

impl JUnitReporter<File> {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> JUnitReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out: RefCell::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn render(report: &TestReport) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"{}\" timestamp=\"{}\">\n",
            escape_xml(&report.name),
            report.stats.tests,
            report
                .tests
                .iter()
                .filter(|run| run.outcome() == Outcome::Fail)
                .count(),
            report.stats.errors,
            report.duration_ms as f64 / 1000.0,
            report.generated_at.to_rfc3339(),
        ));

        for run in &report.tests {
            let time = run.duration_ms as f64 / 1000.0;
            if run.outcome() == Outcome::Pass {
                xml.push_str(&format!(
                    "  <testcase classname=\"{}\" name=\"{}\" time=\"{}\" />\n",
                    escape_xml(&report.name),
                    escape_xml(&run.name),
                    time,
                ));
                continue;
            }

            xml.push_str(&format!(
                "  <testcase classname=\"{}\" name=\"{}\" time=\"{}\">\n",
                escape_xml(&report.name),
                escape_xml(&run.name),
                time,
            ));

            for record in report.failures_of(&run.name) {
                let element = match record.outcome {
                    Outcome::Error => "error",
                    _ => "failure",
                };
                xml.push_str(&format!(
                    "    <{} type=\"{}\" message=\"{}\" />\n",
                    element,
                    record.assertion,
                    escape_xml(record.message.as_deref().unwrap_or_default()),
                ));
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

impl<W: Write> TestReporter for JUnitReporter<W> {
    fn on_case_start(&self, _case: &TestCase, _count: usize) -> Result<(), ReportError> {
        Ok(())
    }

    fn on_test_start(&self, _name: &str) -> Result<(), ReportError> {
        Ok(())
    }

    fn on_test_finish(&self, _run: &TestRun, _records: &[AssertionRecord]) -> Result<(), ReportError> {
        Ok(())
    }

    fn on_case_finish(&self, case: &TestCase) -> Result<(), ReportError> {
        let xml = Self::render(&TestReport::from_case(case));
        let mut out = self.out.borrow_mut();
        out.write_all(xml.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
