//! exprbox compiler front half.
//!
//! Turns an expression plus a configured set of references and namespaces
//! into a compiled, in-memory library.
//!
//! ## Modules
//!
//! - [`references`]: reference resolution and the foundational sysroot crates
//! - [`imports`]: the import header
//! - [`synthesize`]: source synthesis around the synthetic container
//! - [`toolchain`]: the external compiler contract
//! - [`rustc`]: the `rustc` implementation of that contract
//! - [`invoke`]: compiler invocation and diagnostic handling

pub mod imports;
pub mod invoke;
pub mod references;
pub mod rustc;
pub mod synthesize;
pub mod toolchain;

pub use imports::{BASELINE_NAMESPACES, ImportHeader};
pub use invoke::compile;
pub use references::{
    Foundation, Linkage, ReferenceSet, ResolvedModule, baseline_types, resolve_references,
};
pub use rustc::{OptLevel, RustcToolchain};
pub use synthesize::synthesize;
pub use toolchain::{
    CompilationRequest, CompilationResult, Diagnostic, OutputKind, Severity, Toolchain,
};
