//! Runs the palindrome test case and prints the pass/fail summary

use anyhow::Result;
use pal_testing::TestRunner;
use palindrome::suite;
use tracing::{error, info};

fn main() -> Result<()> {
    init_logging()?;

    let runner = TestRunner::default();
    let mut test_case = suite::palindrome_case()?;

    runner.run(&mut test_case);

    println!("Tests Passed: {}", test_case.passed());
    println!("Tests Failed: {}", test_case.failed());

    if test_case.failed() > 0 {
        error!("{} assertion(s) failed", test_case.failed());
        std::process::exit(1);
    }

    info!("All tests passed");
    Ok(())
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
