//! Evaluate Rust expressions at runtime.
//!
//! A [`Compiler`] takes the text of a single Rust expression, compiles it
//! with `rustc` against a configured set of referenced crates and imported
//! modules, loads the result into an isolated scope and hands back the
//! computed value as an owned, typed Rust value.
//!
//! # Example
//!
//! ```ignore
//! use exprbox::prelude::*;
//!
//! let compiler = Compiler::new(Vec::new(), ["std::ops"])?;
//! let total: i64 = compiler.evaluate("(1..=10i64).sum()")?;
//! assert_eq!(total, 55);
//!
//! let err = compiler.evaluate::<i32>("1 +").unwrap_err();
//! assert!(err.is_invalid_expression());
//! ```
//!
//! Compiled code runs in-process with full trust. Nothing compiled is cached
//! between calls.
//!
//! # Crates
//!
//! - `exprbox-core`: type descriptors, reflection, rendering and errors
//! - `exprbox-compiler`: reference resolution, source synthesis and `rustc`
//! - `exprbox-runtime`: isolated loading and value extraction

mod compiler;
mod options;

pub use compiler::Compiler;
pub use options::{CompilerOptions, RUSTC_ENV};

pub use exprbox_compiler::{
    CompilationRequest, CompilationResult, Diagnostic, ImportHeader, OptLevel, ReferenceSet,
    ResolvedModule, RustcToolchain, Severity, Toolchain,
};
pub use exprbox_core::{
    ExprError, ExprResult, ExtractionError, LoadError, ModuleRef, QualifiedName, Reflect,
    ResolutionError, ToolchainError, TypeDescriptor, render_type_name,
};
pub use exprbox_runtime::live_scopes;

/// The types most callers need.
pub mod prelude {
    pub use crate::{Compiler, CompilerOptions, ExprError, ModuleRef, Reflect, TypeDescriptor};
}
