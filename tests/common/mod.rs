//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use exprbox::{Compiler, CompilerOptions, ModuleRef, QualifiedName, TypeDescriptor};
use tempfile::TempDir;

/// Source of a small caller crate that expressions can reference.
pub const PREDS_SOURCE: &str = r#"
pub mod filters {
    pub struct Range {
        pub lo: i64,
        pub hi: i64,
    }

    impl Range {
        pub fn new(lo: i64, hi: i64) -> Self {
            Range { lo, hi }
        }

        pub fn contains(&self, value: i64) -> bool {
            self.lo <= value && value < self.hi
        }
    }

    pub fn double(value: i64) -> i64 {
        value * 2
    }
}
"#;

/// A compiler with no caller references or namespaces.
pub fn empty_compiler() -> Compiler {
    Compiler::new(Vec::new(), Vec::<String>::new())
        .unwrap_or_else(|e| panic!("Failed to create compiler: {e}"))
}

/// Compile [`PREDS_SOURCE`] to `libpreds.rlib` inside a fresh directory.
///
/// The directory must outlive every compiler that references the crate.
pub fn build_preds_crate() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let source = dir.path().join("preds.rs");
    std::fs::write(&source, PREDS_SOURCE).expect("Failed to write preds.rs");
    let rlib = dir.path().join("libpreds.rlib");
    compile_rlib(&source, &rlib, "preds");
    (dir, rlib)
}

fn compile_rlib(source: &Path, output: &Path, crate_name: &str) {
    let options = CompilerOptions::from_env();
    let status = Command::new(&options.rustc)
        .args(["--crate-type", "rlib", "--edition", "2021", "--crate-name", crate_name])
        .arg("-o")
        .arg(output)
        .arg(source)
        .status()
        .unwrap_or_else(|e| panic!("Failed to run {}: {e}", options.rustc.display()));
    assert!(status.success(), "rustc failed to build {crate_name}");
}

/// Descriptor for `preds::filters::Range`, declared in the crate at `rlib`.
pub fn range_descriptor(rlib: &Path) -> TypeDescriptor {
    TypeDescriptor::new(
        QualifiedName::from_path("preds::filters::Range"),
        ModuleRef::at("preds", rlib),
    )
}
