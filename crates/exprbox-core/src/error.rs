//! Unified error types for expression evaluation.
//!
//! Every phase of the pipeline has its own error type; [`ExprError`] wraps
//! them for callers of `evaluate`.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ExprError (top-level wrapper)
//! ├── Resolution        - a referenced module has no location (construction)
//! ├── InvalidExpression - the expression did not compile (first error only)
//! ├── Toolchain         - rustc could not be run or its output read
//! ├── MissingImage      - rustc succeeded without producing a library (internal)
//! ├── Load              - the isolated scope could not load the library
//! ├── Extraction        - the synthetic shape is missing (internal)
//! └── Panicked          - the expression panicked while being evaluated
//! ```
//!
//! `InvalidExpression` and `Panicked` describe the caller's input. `MissingImage`
//! and `Extraction` indicate a defect in source synthesis and are never
//! reported as `InvalidExpression`.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

// ============================================================================
// Resolution Errors
// ============================================================================

/// Errors raised while building the reference set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A type's declaring module has no library location.
    #[error("module '{module}' declaring '{type_name}' has no resolvable location")]
    Unlocated {
        /// Crate name of the module.
        module: String,
        /// Type whose module could not be located.
        type_name: String,
    },

    /// A foundational sysroot crate could not be found.
    #[error("foundational module '{module}' could not be located: {detail}")]
    Foundational {
        /// Crate name (`core` or `std`).
        module: String,
        /// What went wrong.
        detail: String,
    },
}

// ============================================================================
// Toolchain Errors
// ============================================================================

/// Errors driving the external compiler, as opposed to errors in the expression.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// The compiler process could not be started.
    #[error("failed to run '{program}': {source}", program = .program.display())]
    Spawn {
        /// Program that was invoked.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Scratch files could not be written or read back.
    #[error("toolchain I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The compiler failed without reporting any error diagnostic.
    #[error("compiler exited with {status} without diagnostics: {stderr}")]
    Failed {
        /// Exit status of the compiler.
        status: ExitStatus,
        /// Raw standard error output.
        stderr: String,
    },

    /// The compiler's output could not be interpreted.
    #[error("unexpected toolchain output: {0}")]
    UnexpectedOutput(String),
}

// ============================================================================
// Load Errors
// ============================================================================

/// Errors loading a binary image into an isolated scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The image needs a dependency the scope refuses to resolve.
    #[error("dependency '{0}' cannot be resolved inside an isolated scope")]
    UnresolvedDependency(String),

    /// The image could not be staged for loading.
    #[error("failed to stage binary image: {0}")]
    Staging(String),

    /// The platform loader rejected the image.
    #[error("failed to load binary image: {0}")]
    Open(String),

    /// The platform loader failed to release the image.
    #[error("failed to unload binary image: {0}")]
    Close(String),
}

// ============================================================================
// Extraction Errors
// ============================================================================

/// The loaded library does not have the synthetic shape.
///
/// Unreachable for images produced from synthesized source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The container marker symbol is absent.
    #[error("synthetic container '{0}' not found")]
    MissingContainer(String),

    /// The value accessor symbol is absent.
    #[error("synthetic field '{0}' not found")]
    MissingField(String),

    /// The container was produced for a different accessor signature.
    #[error("synthetic container has shape version {found}, expected {expected}")]
    ShapeMismatch {
        /// Version this crate emits.
        expected: u32,
        /// Version found in the image.
        found: u32,
    },
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Any error produced while constructing a compiler or evaluating an expression.
#[derive(Debug, Error)]
pub enum ExprError {
    /// A reference could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The expression failed to compile. Carries the first error diagnostic.
    #[error("invalid expression: {message}")]
    InvalidExpression {
        /// Message of the first error diagnostic.
        message: String,
    },

    /// The external compiler could not be driven.
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// Compilation reported success but produced no binary image.
    #[error("compilation succeeded without producing a binary image")]
    MissingImage,

    /// The binary image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The loaded image lacks the synthetic shape.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The expression panicked during evaluation.
    #[error("expression panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl ExprError {
    /// Check if this is a compile error in the expression itself.
    pub fn is_invalid_expression(&self) -> bool {
        matches!(self, ExprError::InvalidExpression { .. })
    }

    /// Check if this is a reference resolution error.
    pub fn is_resolution(&self) -> bool {
        matches!(self, ExprError::Resolution(_))
    }

    /// Check if this indicates a defect in source synthesis rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, ExprError::MissingImage | ExprError::Extraction(_))
    }
}

/// Result type alias using [`ExprError`].
pub type ExprResult<T> = Result<T, ExprError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_converts_into_expr_error() {
        let err: ExprError = ResolutionError::Unlocated {
            module: "preds".into(),
            type_name: "preds::Range".into(),
        }
        .into();
        assert!(err.is_resolution());
        assert!(!err.is_internal());
        assert_eq!(
            err.to_string(),
            "module 'preds' declaring 'preds::Range' has no resolvable location"
        );
    }

    #[test]
    fn internal_errors_are_not_invalid_expressions() {
        let missing = ExprError::MissingImage;
        assert!(missing.is_internal());
        assert!(!missing.is_invalid_expression());

        let extraction: ExprError = ExtractionError::MissingField("x".into()).into();
        assert!(extraction.is_internal());
        assert!(!extraction.is_invalid_expression());
    }

    #[test]
    fn invalid_expression_display() {
        let err = ExprError::InvalidExpression {
            message: "expected expression, found `}`".into(),
        };
        assert!(err.is_invalid_expression());
        assert_eq!(err.to_string(), "invalid expression: expected expression, found `}`");
    }
}
