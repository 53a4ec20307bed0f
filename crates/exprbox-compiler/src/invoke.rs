//! Compiler invocation and diagnostic handling.

use exprbox_core::{BinaryImage, ExprError, ToolchainError};
use tracing::{debug, trace};

use crate::toolchain::{CompilationRequest, Toolchain};

/// Compile `request` and return its binary image.
///
/// # Errors
///
/// - [`ExprError::InvalidExpression`] with the first error diagnostic's
///   message when compilation fails. All other diagnostics are dropped.
/// - [`ExprError::MissingImage`] when the toolchain reports success without
///   an image.
/// - [`ExprError::Toolchain`] when the toolchain cannot be driven.
pub fn compile(toolchain: &dyn Toolchain, request: &CompilationRequest<'_>) -> Result<BinaryImage, ExprError> {
    let result = toolchain.compile(request)?;

    if !result.success {
        let first = result.diagnostics.iter().position(|d| d.is_error());
        for (idx, diagnostic) in result.diagnostics.iter().enumerate() {
            if Some(idx) != first {
                trace!(severity = ?diagnostic.severity, message = %diagnostic.message, "discarded diagnostic");
            }
        }
        return match first {
            Some(idx) => Err(ExprError::InvalidExpression {
                message: result.diagnostics[idx].message.clone(),
            }),
            None => Err(ToolchainError::UnexpectedOutput(
                "compilation failed without an error diagnostic".to_string(),
            )
            .into()),
        };
    }

    let image = result.image.ok_or(ExprError::MissingImage)?;
    debug!(crate_name = request.crate_name(), bytes = image.len(), "compiled binary image");
    Ok(image)
}
