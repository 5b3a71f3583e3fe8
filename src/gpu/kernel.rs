//! WGSL kernel building.
//!
//! A kernel is built ahead of dispatch with naga's WGSL front-end and
//! validator, so build failures are reported as source diagnostics rather
//! than surfacing from deep inside the device at dispatch time.

use std::path::{Path, PathBuf};

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// A parsed and validated kernel, ready to dispatch.
#[derive(Debug)]
pub struct KernelProgram {
    /// File stem, used as the label for device objects.
    pub name: String,
    pub path: PathBuf,
    pub source: String,
    module: naga::Module,
}

impl KernelProgram {
    /// Read a kernel source file and build it.
    pub fn load(path: &Path) -> Result<Self, Diagnostic> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Diagnostic::error(format!("cannot read kernel '{}': {}", path.display(), e))
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("kernel")
            .to_string();
        Self::compile(&name, path, &source)
    }

    /// Parse and validate WGSL source.
    pub fn compile(name: &str, path: &Path, source: &str) -> Result<Self, Diagnostic> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| parse_diagnostic(&e))?;

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        validator
            .validate(&module)
            .map_err(|e| validation_diagnostic(&e))?;

        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            source: source.to_string(),
            module,
        })
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.module.entry_points.iter().map(|ep| ep.name.as_str())
    }

    pub fn has_entry(&self, entry: &str) -> bool {
        self.entry_points().any(|name| name == entry)
    }
}

fn parse_diagnostic(err: &naga::front::wgsl::ParseError) -> Diagnostic {
    let mut diag = Diagnostic::error(format!("WGSL parse error: {}", err.message()));
    if let Some((span, label)) = err.labels().next() {
        if let Some(range) = span.to_range() {
            diag = diag.with_span(Span::from_range(range));
        }
        if !label.is_empty() {
            diag = diag.with_note(label.to_string());
        }
    }
    diag
}

fn validation_diagnostic(err: &naga::WithSpan<naga::valid::ValidationError>) -> Diagnostic {
    let mut diag = Diagnostic::error(format!("WGSL validation error: {}", err.as_inner()));
    if let Some((span, context)) = err.spans().next() {
        if let Some(range) = span.to_range() {
            diag = diag.with_span(Span::from_range(range));
        }
        if !context.is_empty() {
            diag = diag.with_note(context.clone());
        }
    }
    diag
}
