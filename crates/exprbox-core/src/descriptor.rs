//! Reflected type descriptors.
//!
//! A [`TypeDescriptor`] mirrors the metadata view of a type rather than its
//! source spelling:
//!
//! - Generic definitions carry an arity marker in their reflected name
//!   (`` Vec`1 ``, `` HashMap`2 ``).
//! - A constructed generic carries a single, flattened list of type
//!   arguments covering every enclosing generic level, outermost first.
//! - A nested type points at its declaring type *definition*; the declaring
//!   type never carries arguments of its own.
//!
//! [`render_type_name`](crate::render_type_name) turns this view back into
//! source syntax.

use std::fmt;

use crate::{ModuleRef, QualifiedName};

/// Separator between a reflected generic name and its parameter count.
pub const ARITY_MARKER: char = '`';

/// Metadata view of a type, as seen through reflection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: QualifiedName,
    module: ModuleRef,
    /// Number of generic parameters this level declares itself.
    generic_params: usize,
    /// Flattened arguments for this type and all its declaring types.
    generic_args: Vec<TypeDescriptor>,
    declaring_type: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// A non-generic type.
    pub fn new(name: impl Into<QualifiedName>, module: ModuleRef) -> Self {
        Self {
            name: name.into(),
            module,
            generic_params: 0,
            generic_args: Vec::new(),
            declaring_type: None,
        }
    }

    /// A generic type definition declaring `params` parameters of its own.
    ///
    /// The reflected name gains an arity marker, e.g. `Vec` becomes `` Vec`1 ``.
    pub fn generic(name: impl Into<QualifiedName>, module: ModuleRef, params: usize) -> Self {
        let mut name = name.into();
        if params > 0 {
            name = name.with_suffix(&format!("{ARITY_MARKER}{params}"));
        }
        Self {
            name,
            module,
            generic_params: params,
            generic_args: Vec::new(),
            declaring_type: None,
        }
    }

    /// Declare this type as nested inside `declaring`.
    ///
    /// `declaring` should be the generic *definition* of the outer type; its
    /// arguments are supplied through [`instantiate`](Self::instantiate) on the
    /// nested type.
    ///
    /// Rust has no nested types, so a nested descriptor renders to a
    /// reflective spelling such as `Outer<i32>::Inner<String>` that `rustc`
    /// does not accept as a type path. No [`Reflect`](crate::Reflect) impl
    /// produces one, and such a descriptor cannot be an evaluation's return
    /// type.
    pub fn nested_in(mut self, declaring: TypeDescriptor) -> Self {
        self.declaring_type = Some(Box::new(declaring));
        self
    }

    /// Construct the type with a flattened argument list, outermost level first.
    pub fn instantiate(mut self, args: Vec<TypeDescriptor>) -> Self {
        self.generic_args = args;
        self
    }

    /// Reflected name, arity marker included.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Module declaring this type.
    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    /// Parameters declared by this level only.
    pub fn generic_params(&self) -> usize {
        self.generic_params
    }

    /// Flattened argument list across all declaring levels.
    pub fn generic_args(&self) -> &[TypeDescriptor] {
        &self.generic_args
    }

    /// Declaring type for nested types.
    pub fn declaring_type(&self) -> Option<&TypeDescriptor> {
        self.declaring_type.as_deref()
    }

    /// Whether this type or any declaring level is generic.
    pub fn is_generic(&self) -> bool {
        self.generic_params > 0 || self.declaring_type().is_some_and(|d| d.is_generic())
    }

    /// Every module this type mentions: its own, its declaring types', and
    /// those of its arguments, recursively. May contain duplicates.
    pub fn modules(&self) -> Vec<&ModuleRef> {
        let mut modules = Vec::new();
        self.collect_modules(&mut modules);
        modules
    }

    fn collect_modules<'a>(&'a self, out: &mut Vec<&'a ModuleRef>) {
        out.push(&self.module);
        if let Some(declaring) = self.declaring_type() {
            declaring.collect_modules(out);
        }
        for arg in &self.generic_args {
            arg.collect_modules(out);
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render_type_name(self))
    }
}
