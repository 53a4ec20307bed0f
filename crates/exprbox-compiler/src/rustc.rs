//! `rustc` as the external toolchain.
//!
//! Each request is written into a fresh scratch directory and compiled as a
//! `cdylib` with JSON diagnostics. On success the library bytes are read back
//! into memory and the directory is removed before returning.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use exprbox_core::{BinaryImage, ToolchainError};
use serde::Deserialize;
use tempfile::TempDir;
use tracing::{debug, trace};

use crate::toolchain::{CompilationRequest, CompilationResult, Diagnostic, Severity, Toolchain};

/// Optimization level passed as `-C opt-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    #[default]
    O0,
    O1,
    O2,
    O3,
}

impl OptLevel {
    fn as_flag(self) -> &'static str {
        match self {
            OptLevel::O0 => "opt-level=0",
            OptLevel::O1 => "opt-level=1",
            OptLevel::O2 => "opt-level=2",
            OptLevel::O3 => "opt-level=3",
        }
    }
}

/// Drives a `rustc` executable.
#[derive(Debug, Clone)]
pub struct RustcToolchain {
    program: PathBuf,
    edition: String,
    opt_level: OptLevel,
    extra_args: Vec<String>,
    scratch_dir: Option<PathBuf>,
}

impl Default for RustcToolchain {
    fn default() -> Self {
        Self::new("rustc")
    }
}

impl RustcToolchain {
    /// Use the `rustc` at `program` (a path or a name looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            edition: "2021".to_string(),
            opt_level: OptLevel::default(),
            extra_args: Vec::new(),
            scratch_dir: None,
        }
    }

    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }

    pub fn with_opt_level(mut self, opt_level: OptLevel) -> Self {
        self.opt_level = opt_level;
        self
    }

    /// Extra arguments appended after the generated ones.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Parent directory for per-call scratch directories. Defaults to the
    /// system temporary directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn scratch(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("exprbox-");
        match &self.scratch_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }

    fn run(&self, command: &mut Command) -> Result<Output, ToolchainError> {
        command.output().map_err(|source| ToolchainError::Spawn {
            program: self.program.clone(),
            source,
        })
    }

    fn build_command(&self, request: &CompilationRequest<'_>, source: &Path, out_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--crate-type")
            .arg(request.output_kind().crate_type())
            .arg("--crate-name")
            .arg(request.crate_name())
            .arg("--edition")
            .arg(&self.edition)
            .arg("--error-format=json")
            .arg("-C")
            .arg(self.opt_level.as_flag())
            .arg("-C")
            .arg("prefer-dynamic=no")
            .arg("--out-dir")
            .arg(out_dir);

        for module in request.references().externs() {
            let mut arg = std::ffi::OsString::from(format!("{}=", module.name));
            arg.push(&module.path);
            command.arg("--extern").arg(arg);
        }
        for dir in request.references().search_dirs() {
            let mut arg = std::ffi::OsString::from("dependency=");
            arg.push(dir);
            command.arg("-L").arg(arg);
        }

        command.args(&self.extra_args).arg(source);
        command
    }
}

impl Toolchain for RustcToolchain {
    fn compile(&self, request: &CompilationRequest<'_>) -> Result<CompilationResult, ToolchainError> {
        let scratch = self.scratch()?;
        let source_path = scratch.path().join("lib.rs");
        fs::write(&source_path, request.source())?;

        let output = self.run(&mut self.build_command(request, &source_path, scratch.path()))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = parse_diagnostics(&stderr);
        let success = output.status.success();
        debug!(
            crate_name = request.crate_name(),
            status = %output.status,
            diagnostics = diagnostics.len(),
            "rustc finished"
        );

        if !success && !diagnostics.iter().any(Diagnostic::is_error) {
            return Err(ToolchainError::Failed {
                status: output.status,
                stderr: stderr.into_owned(),
            });
        }

        let image = if success {
            let artifact = scratch
                .path()
                .join(format!("{DLL_PREFIX}{}{DLL_SUFFIX}", request.crate_name()));
            match fs::read(&artifact) {
                Ok(bytes) => Some(
                    BinaryImage::new(bytes)
                        .with_dependencies(request.references().dynamic_dependencies()),
                ),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };

        Ok(CompilationResult {
            success,
            diagnostics,
            image,
        })
    }

    fn target_libdir(&self) -> Result<PathBuf, ToolchainError> {
        let output = self.run(Command::new(&self.program).args(["--print", "target-libdir"]))?;
        if !output.status.success() {
            return Err(ToolchainError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        let libdir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if libdir.is_empty() {
            return Err(ToolchainError::UnexpectedOutput(
                "empty target-libdir".to_string(),
            ));
        }
        Ok(PathBuf::from(libdir))
    }
}

// ============================================================================
// JSON diagnostics
// ============================================================================

/// One line of `--error-format=json` output.
#[derive(Debug, Deserialize)]
struct RustcMessage {
    #[serde(rename = "$message_type", default)]
    message_type: Option<String>,
    message: String,
    level: String,
    #[serde(default)]
    rendered: Option<String>,
}

/// Parse rustc's JSON diagnostics, in order. Non-JSON lines are skipped.
pub(crate) fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    stderr
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<RustcMessage>(line) {
            Ok(message) => Some(message),
            Err(e) => {
                trace!(error = %e, line, "skipping unparseable rustc output");
                None
            }
        })
        .filter(|m| m.message_type.as_deref().is_none_or(|t| t == "diagnostic"))
        .map(|m| Diagnostic {
            severity: Severity::from_level(&m.level),
            message: m.message,
            rendered: m.rendered,
        })
        .collect()
}
