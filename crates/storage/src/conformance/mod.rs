//! Conformance test suite for `Ledger` implementations.
//!
//! A backend-agnostic suite that any `Ledger` implementation can run to
//! verify the idempotency-fence contract. The suite covers:
//!
//! - **Recording**: empty ledger, record-then-exists, independent keys
//! - **Idempotence**: duplicate inserts absorbed, first timestamp preserved
//! - **Listing**: single-entry lookup and ordered enumeration
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory that creates
//! a fresh, empty ledger for each test:
//!
//! ```ignore
//! use hvlink_storage::conformance::run_conformance_suite;
//!
//! #[test]
//! fn sqlite_conformance() {
//!     let report = run_conformance_suite(|| SqliteLedger::in_memory().unwrap());
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod listing;
mod record;

use std::fmt;

use crate::Ledger;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "record", "listing").
    pub category: String,
    /// Test name (e.g. "duplicate_record_is_absorbed").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a ledger backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// ledger, ensuring test isolation.
pub fn run_conformance_suite<L, F>(factory: F) -> ConformanceReport
where
    L: Ledger,
    F: Fn() -> L,
{
    let mut results = Vec::new();

    results.extend(record::run_record_tests(&factory));
    results.extend(listing::run_listing_tests(&factory));

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}
