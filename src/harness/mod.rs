//! The runner loop.
//!
//! Reads the mapping file, builds each kernel, resolves its suite, runs
//! every test with the shared device context, and tallies pass/fail.
//! Every error class is converted into the tally; the loop always moves on
//! to the next mapping entry.

pub mod compare;
pub mod data;
pub mod registry;

use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::gpu::{GpuContext, KernelProgram};
use crate::mapping::{self, MappingEntry};
use registry::TestSuite;

pub struct RunOptions {
    pub mapping_path: PathBuf,
    pub kernels_dir: PathBuf,
    /// Restrict the run to entries whose suite name matches.
    pub filter: Option<String>,
}

/// What a mapping entry resolved to, before any dispatch.
pub enum EntryStatus {
    /// Kernel file missing. Warned about, not a failure.
    Skipped { kernel: String, reason: String },
    /// Source unreadable or WGSL build error. One failure.
    BuildFailed {
        kernel: String,
        source: String,
        error: Diagnostic,
    },
    /// Empty or unregistered suite name. One failure.
    UnknownSuite { kernel: String, test: String },
    Ready {
        program: KernelProgram,
        suite: &'static TestSuite,
    },
}

/// Resolve a mapping entry to a runnable state. Pure bookkeeping, needs no
/// device.
pub fn prepare_entry(kernels_dir: &Path, entry: &MappingEntry) -> EntryStatus {
    let path = kernels_dir.join(&entry.kernel);
    if !path.exists() {
        return EntryStatus::Skipped {
            kernel: entry.kernel.clone(),
            reason: format!("kernel file '{}' not found", path.display()),
        };
    }

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            return EntryStatus::BuildFailed {
                kernel: entry.kernel.clone(),
                source: String::new(),
                error: Diagnostic::error(format!("cannot read kernel '{}': {}", path.display(), e)),
            }
        }
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("kernel")
        .to_string();
    let program = match KernelProgram::compile(&name, &path, &source) {
        Ok(program) => program,
        Err(error) => {
            return EntryStatus::BuildFailed {
                kernel: entry.kernel.clone(),
                source,
                error,
            }
        }
    };

    match registry::resolve(&entry.test) {
        Some(suite) => EntryStatus::Ready { program, suite },
        None => EntryStatus::UnknownSuite {
            kernel: entry.kernel.clone(),
            test: entry.test.clone(),
        },
    }
}

#[derive(Clone, Debug)]
pub struct TestOutcome {
    pub suite: String,
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct HarnessReport {
    pub outcomes: Vec<TestOutcome>,
    /// Kernel paths skipped because the source file is missing.
    pub skipped: Vec<String>,
    pub build_failures: usize,
    pub resolve_failures: usize,
}

impl HarnessReport {
    pub fn tests_run(&self) -> usize {
        self.outcomes.len()
    }

    pub fn test_failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    pub fn total_failures(&self) -> usize {
        self.test_failures() + self.build_failures + self.resolve_failures
    }

    pub fn passed(&self) -> bool {
        self.total_failures() == 0
    }

    pub fn format(&self) -> String {
        let mut report = String::new();
        let total = self.tests_run();
        let failed = self.test_failures();
        let passed = total - failed;

        report.push_str(&format!(
            "running {} test{}\n",
            total,
            if total == 1 { "" } else { "s" }
        ));

        for outcome in &self.outcomes {
            let status = if outcome.passed { "ok" } else { "FAILED" };
            report.push_str(&format!(
                "  test {}::{} ... {}\n",
                outcome.suite, outcome.name, status
            ));
            if let Some(ref err) = outcome.error {
                report.push_str(&format!("    error: {}\n", err));
            }
        }

        if !self.skipped.is_empty() {
            report.push_str(&format!(
                "skipped {} kernel(s) with missing sources: {}\n",
                self.skipped.len(),
                self.skipped.join(", ")
            ));
        }
        if self.build_failures > 0 {
            report.push_str(&format!("{} kernel(s) failed to build\n", self.build_failures));
        }
        if self.resolve_failures > 0 {
            report.push_str(&format!(
                "{} mapping entr{} had no registered suite\n",
                self.resolve_failures,
                if self.resolve_failures == 1 { "y" } else { "ies" }
            ));
        }

        report.push('\n');
        if self.total_failures() == 0 {
            report.push_str(&format!("test result: ok. {} passed; 0 failed\n", passed));
        } else {
            report.push_str(&format!(
                "test result: FAILED. {} passed; {} failed\n",
                passed,
                self.total_failures()
            ));
        }
        report
    }
}

/// Run every mapping entry against the shared device context, in file order.
pub fn run(ctx: &GpuContext, options: &RunOptions) -> Result<HarnessReport, Diagnostic> {
    let entries = mapping::load(&options.mapping_path)?;
    let mut report = HarnessReport::default();

    for entry in &entries {
        if let Some(ref filter) = options.filter {
            if entry.test != *filter {
                continue;
            }
        }

        let suite_label = if entry.test.is_empty() {
            "no suite"
        } else {
            entry.test.as_str()
        };
        println!("--- {} ({}) ---", entry.kernel, suite_label);

        match prepare_entry(&options.kernels_dir, entry) {
            EntryStatus::Skipped { kernel, reason } => {
                Diagnostic::warning(format!("skipping '{}': {}", kernel, reason)).render_plain();
                report.skipped.push(kernel);
            }
            EntryStatus::BuildFailed {
                kernel,
                source,
                error,
            } => {
                if source.is_empty() {
                    error.render_plain();
                } else {
                    let filename = options.kernels_dir.join(&kernel).display().to_string();
                    error.render(&filename, &source);
                }
                report.build_failures += 1;
            }
            EntryStatus::UnknownSuite { kernel, test } => {
                let diag = if test.is_empty() {
                    Diagnostic::error(format!("no test suite assigned for kernel '{}'", kernel))
                        .with_help(
                            "fill in the \"test\" field in the mapping file".to_string(),
                        )
                } else {
                    Diagnostic::error(format!(
                        "no registered test suite '{}' for kernel '{}'",
                        test, kernel
                    ))
                    .with_help(format!(
                        "registered suites: {}",
                        registry::all()
                            .iter()
                            .map(|s| s.name)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                };
                diag.render_plain();
                report.resolve_failures += 1;
            }
            EntryStatus::Ready { program, suite } => {
                for case in suite.tests {
                    println!("running {}::{}", suite.name, case.name);
                    match (case.run)(ctx, &program) {
                        Ok(()) => report.outcomes.push(TestOutcome {
                            suite: suite.name.to_string(),
                            name: case.name.to_string(),
                            passed: true,
                            error: None,
                        }),
                        Err(diag) => {
                            diag.render_plain();
                            report.outcomes.push(TestOutcome {
                                suite: suite.name.to_string(),
                                name: case.name.to_string(),
                                passed: false,
                                error: Some(diag.message.clone()),
                            });
                        }
                    }
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(suite: &str, name: &str, passed: bool, error: Option<&str>) -> TestOutcome {
        TestOutcome {
            suite: suite.to_string(),
            name: name.to_string(),
            passed,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_report_all_passing() {
        let report = HarnessReport {
            outcomes: vec![
                outcome("vector_add", "matches_host_reference", true, None),
                outcome("relu", "matches_host_reference", true, None),
            ],
            ..Default::default()
        };
        assert!(report.passed());
        insta::assert_snapshot!(report.format(), @r"
        running 2 tests
          test vector_add::matches_host_reference ... ok
          test relu::matches_host_reference ... ok

        test result: ok. 2 passed; 0 failed
        ");
    }

    #[test]
    fn test_report_with_failures_and_skips() {
        let report = HarnessReport {
            outcomes: vec![
                outcome("sigmoid", "matches_host_reference", true, None),
                outcome(
                    "matrix_mul",
                    "matches_host_reference",
                    false,
                    Some("matrix_mul does not match the host reference"),
                ),
            ],
            skipped: vec!["old_kernel.wgsl".to_string()],
            build_failures: 1,
            resolve_failures: 1,
        };
        assert!(!report.passed());
        assert_eq!(report.total_failures(), 3);
        insta::assert_snapshot!(report.format(), @r#"
        running 2 tests
          test sigmoid::matches_host_reference ... ok
          test matrix_mul::matches_host_reference ... FAILED
            error: matrix_mul does not match the host reference
        skipped 1 kernel(s) with missing sources: old_kernel.wgsl
        1 kernel(s) failed to build
        1 mapping entry had no registered suite

        test result: FAILED. 1 passed; 3 failed
        "#);
    }

    #[test]
    fn test_report_singular_test_count() {
        let report = HarnessReport {
            outcomes: vec![outcome("relu", "negative_input_is_zeroed", true, None)],
            ..Default::default()
        };
        assert!(report.format().starts_with("running 1 test\n"));
    }
}
