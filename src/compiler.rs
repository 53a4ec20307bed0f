//! The evaluation pipeline.
//!
//! ```text
//! Compiler::new ─► resolve references ─► build import header      (once)
//!
//! evaluate::<T>(expr)
//!   render T ─► synthesize ─► compile ─► load into scope ─► extract ─► unload
//! ```

use std::path::PathBuf;

use exprbox_compiler::{
    CompilationRequest, Foundation, ImportHeader, ReferenceSet, Toolchain, compile,
    resolve_references, synthesize,
};
use exprbox_core::{ExprError, Reflect, TypeDescriptor, render_type_name};
use exprbox_runtime::{LoadedModule, extract};
use tracing::{debug, debug_span, trace, warn};

use crate::options::CompilerOptions;

/// Compiles and evaluates single expressions against a fixed set of
/// references and imported namespaces.
///
/// The reference set and import header are built once, in the constructor,
/// and shared read-only by every [`evaluate`](Self::evaluate) call. Calls are
/// independent of each other and may run concurrently.
///
/// # Example
///
/// ```ignore
/// use exprbox::Compiler;
///
/// let compiler = Compiler::new(Vec::new(), Vec::<String>::new())?;
/// assert_eq!(compiler.evaluate::<i32>("1 + 1")?, 2);
/// ```
pub struct Compiler {
    references: ReferenceSet,
    header: ImportHeader,
    toolchain: Box<dyn Toolchain>,
    staging_dir: Option<PathBuf>,
}

impl Compiler {
    /// Create a compiler with options read from the environment.
    ///
    /// `referenced_types` name the types whose declaring modules expressions
    /// may use; `usings` are module paths glob-imported into every
    /// expression, after the baseline namespaces.
    ///
    /// # Errors
    ///
    /// [`ExprError::Resolution`] if a referenced module has no location or the
    /// toolchain's foundational crates cannot be found.
    pub fn new<T, U, S>(referenced_types: T, usings: U) -> Result<Self, ExprError>
    where
        T: IntoIterator<Item = TypeDescriptor>,
        U: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(referenced_types, usings, CompilerOptions::from_env())
    }

    /// Create a compiler with explicit options.
    pub fn with_options<T, U, S>(
        referenced_types: T,
        usings: U,
        options: CompilerOptions,
    ) -> Result<Self, ExprError>
    where
        T: IntoIterator<Item = TypeDescriptor>,
        U: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let staging_dir = options.scratch_dir.clone();
        let mut compiler = Self::with_toolchain(referenced_types, usings, options.toolchain())?;
        compiler.staging_dir = staging_dir;
        Ok(compiler)
    }

    /// Create a compiler that drives a custom toolchain.
    pub fn with_toolchain<T, U, S>(
        referenced_types: T,
        usings: U,
        toolchain: impl Toolchain + 'static,
    ) -> Result<Self, ExprError>
    where
        T: IntoIterator<Item = TypeDescriptor>,
        U: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<TypeDescriptor> = referenced_types.into_iter().collect();
        let foundation = Foundation::get_or_locate(&toolchain)?;
        let references = resolve_references(&types, foundation)?;
        let header = ImportHeader::build(usings);

        debug!(
            types = types.len(),
            references = references.len(),
            namespaces = header.namespaces().len(),
            "compiler ready"
        );

        Ok(Self {
            references,
            header,
            toolchain: Box::new(toolchain),
            staging_dir: None,
        })
    }

    /// The modules every compilation links against.
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// The imports prepended to every expression.
    pub fn import_header(&self) -> &ImportHeader {
        &self.header
    }

    /// The complete source unit `evaluate::<T>(expression)` would compile.
    pub fn synthesize<T: Reflect>(&self, expression: &str) -> String {
        let return_type = render_type_name(&T::descriptor());
        synthesize(&self.header, &return_type, expression)
    }

    /// Compile `expression`, run it, and return its value as a `T`.
    ///
    /// The compiled library is loaded into a private scope that is released
    /// before this returns, on success and failure alike.
    ///
    /// # Errors
    ///
    /// - [`ExprError::InvalidExpression`] with the compiler's first error when
    ///   the expression does not compile as a `T`.
    /// - [`ExprError::Panicked`] when evaluating the expression panics.
    /// - [`ExprError::Toolchain`] or [`ExprError::Load`] when the compiler
    ///   cannot be run or its output cannot be loaded.
    /// - [`ExprError::MissingImage`] or [`ExprError::Extraction`] on internal
    ///   defects.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn evaluate<T: Reflect>(&self, expression: &str) -> Result<T, ExprError> {
        let source = self.synthesize::<T>(expression);
        let request = CompilationRequest::library(source, &self.references);
        let span = debug_span!("evaluate", crate_name = request.crate_name());
        let _entered = span.enter();
        trace!(source = request.source(), "synthesized source");

        let image = {
            #[cfg(feature = "profiling")]
            profiling::scope!("compilation");

            compile(self.toolchain.as_ref(), &request)?
        };

        let module = {
            #[cfg(feature = "profiling")]
            profiling::scope!("loading");

            LoadedModule::load(&image, self.staging_dir.as_deref())?
        };

        // SAFETY: the source was synthesized for exactly `T` above.
        let value = unsafe { extract::<T>(&module) };

        if let Err(e) = module.unload() {
            warn!(error = %e, "failed to unload evaluated module");
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn compiler_is_send_sync() {
        assert_send_sync::<Compiler>();
    }
}
