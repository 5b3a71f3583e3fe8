//! The static test-suite registry.
//!
//! The mapping file names a suite; the registry resolves that name to a set
//! of test functions. Suites register themselves in `kerneltests::SUITES`.

use crate::diagnostic::Diagnostic;
use crate::gpu::{GpuContext, KernelProgram};

/// A single test: synthesize inputs, dispatch the kernel, compare against
/// the host reference.
pub type TestFn = fn(&GpuContext, &KernelProgram) -> Result<(), Diagnostic>;

#[derive(Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub run: TestFn,
}

#[derive(Clone, Copy)]
pub struct TestSuite {
    /// The name the mapping file's "test" field refers to.
    pub name: &'static str,
    pub tests: &'static [TestCase],
}

/// Look up a suite by mapping-file name.
pub fn resolve(name: &str) -> Option<&'static TestSuite> {
    crate::kerneltests::SUITES.iter().find(|s| s.name == name)
}

/// Every registered suite.
pub fn all() -> &'static [TestSuite] {
    crate::kerneltests::SUITES
}
