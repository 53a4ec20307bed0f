//! Value extraction from a loaded module.

use exprbox_core::shape::{CONTAINER_NAME, SHAPE_VERSION, field_symbol};
use exprbox_core::{ExprError, ExtractionError, Reflect};
use libloading::Symbol;

use crate::module::LoadedModule;

/// Signature of the synthetic value accessor.
pub type Accessor<T> = extern "Rust" fn() -> Result<T, String>;

/// Locate the synthetic container and field in `module` and read the value.
///
/// # Errors
///
/// - [`ExtractionError`] when the container or field is missing, or the
///   container was emitted for a different shape version.
/// - [`ExprError::Panicked`] when evaluating the expression panicked.
///
/// # Safety
///
/// `module` must have been compiled from source synthesized for exactly `T`,
/// i.e. with the accessor's return type spelled from `T::descriptor()`.
pub unsafe fn extract<T: Reflect>(module: &LoadedModule) -> Result<T, ExprError> {
    let library = module.library();

    // SAFETY: the container symbol is declared as a `u32` static.
    let version = unsafe {
        let marker: Symbol<*const u32> = library
            .get(CONTAINER_NAME.as_bytes())
            .map_err(|_| ExtractionError::MissingContainer(CONTAINER_NAME.to_string()))?;
        **marker
    };
    if version != SHAPE_VERSION {
        return Err(ExtractionError::ShapeMismatch {
            expected: SHAPE_VERSION,
            found: version,
        }
        .into());
    }

    let field = field_symbol();
    // SAFETY: the caller guarantees the accessor returns `Result<T, String>`.
    let accessor: Symbol<Accessor<T>> = unsafe { library.get(field.as_bytes()) }
        .map_err(|_| ExtractionError::MissingField(field.clone()))?;

    accessor().map_err(|message| ExprError::Panicked { message })
}
