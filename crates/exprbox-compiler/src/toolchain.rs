//! The external compiler contract.
//!
//! A [`Toolchain`] accepts one source unit, the reference set and an output
//! kind, and answers with a success flag, ordered diagnostics and, on
//! success, the compiled [`BinaryImage`]. It does not interpret diagnostics;
//! that is the invoker's job.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use exprbox_core::{BinaryImage, ToolchainError};
use xxhash_rust::xxh64::xxh64;

use crate::references::ReferenceSet;

/// Prefix of every generated crate name.
pub const CRATE_PREFIX: &str = "exprbox";

static NEXT_UNIT: AtomicU64 = AtomicU64::new(0);

/// What the toolchain should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A loadable library.
    Library,
}

impl OutputKind {
    /// `--crate-type` value for this output kind.
    pub fn crate_type(self) -> &'static str {
        match self {
            OutputKind::Library => "cdylib",
        }
    }
}

/// One compilation submitted to a [`Toolchain`].
#[derive(Debug)]
pub struct CompilationRequest<'a> {
    crate_name: String,
    source: String,
    references: &'a ReferenceSet,
    output_kind: OutputKind,
}

impl<'a> CompilationRequest<'a> {
    /// A library request for `source` against `references`.
    ///
    /// The crate name is derived from the source hash plus a process-wide
    /// sequence number, so concurrent requests never share artifacts.
    pub fn library(source: String, references: &'a ReferenceSet) -> Self {
        let unit = NEXT_UNIT.fetch_add(1, Ordering::Relaxed);
        let crate_name = format!("{CRATE_PREFIX}_{:016x}_{unit}", xxh64(source.as_bytes(), 0));
        Self {
            crate_name,
            source,
            references,
            output_kind: OutputKind::Library,
        }
    }

    /// Generated crate name.
    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    /// Complete source unit.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Modules the unit may refer to.
    pub fn references(&self) -> &'a ReferenceSet {
        self.references
    }

    /// Requested output.
    pub fn output_kind(&self) -> OutputKind {
        self.output_kind
    }
}

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    /// Map a rustc `level` string.
    ///
    /// Internal compiler errors count as errors; unknown levels as notes.
    pub fn from_level(level: &str) -> Self {
        match level {
            "error" | "error: internal compiler error" => Severity::Error,
            "warning" => Severity::Warning,
            "help" => Severity::Help,
            _ => Severity::Note,
        }
    }
}

/// One compiler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Short primary message.
    pub message: String,
    /// Full human-readable rendering, when the toolchain provides one.
    pub rendered: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            rendered: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    pub success: bool,
    /// Diagnostics in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Present iff compilation succeeded.
    pub image: Option<BinaryImage>,
}

impl CompilationResult {
    /// First diagnostic with error severity.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_error())
    }
}

/// An external compiler.
pub trait Toolchain: Send + Sync {
    /// Compile one request.
    ///
    /// Errors here mean the toolchain itself could not be driven; a source
    /// that fails to compile is reported through [`CompilationResult`].
    fn compile(&self, request: &CompilationRequest<'_>) -> Result<CompilationResult, ToolchainError>;

    /// Directory holding the toolchain's own target libraries (`std`, `core`).
    fn target_libdir(&self) -> Result<PathBuf, ToolchainError>;
}
