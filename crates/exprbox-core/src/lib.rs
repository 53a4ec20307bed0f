//! Shared vocabulary for exprbox.
//!
//! ## Modules
//!
//! - [`qualified_name`]: path-qualified type names
//! - [`module_id`]: binary-module identity ([`ModuleRef`], [`ModuleId`])
//! - [`descriptor`]: reflected type descriptors
//! - [`reflect`]: the [`Reflect`] trait and its std implementations
//! - [`render`]: type-name rendering back to source syntax
//! - [`shape`]: reserved names shared by synthesis and extraction
//! - [`image`]: in-memory compiled output
//! - [`error`]: the error hierarchy

pub mod descriptor;
pub mod error;
pub mod image;
pub mod module_id;
pub mod qualified_name;
pub mod reflect;
pub mod render;
pub mod shape;

pub use descriptor::TypeDescriptor;
pub use error::{
    ExprError, ExprResult, ExtractionError, LoadError, ResolutionError, ToolchainError,
};
pub use image::BinaryImage;
pub use module_id::{FOUNDATIONAL_MODULES, ModuleId, ModuleRef, ModuleSource};
pub use qualified_name::QualifiedName;
pub use reflect::Reflect;
pub use render::render_type_name;
