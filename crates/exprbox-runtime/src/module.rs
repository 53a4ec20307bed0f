use std::path::Path;

use exprbox_core::{BinaryImage, LoadError};
use libloading::Library;

use crate::scope::{IsolatedScope, Unresolvable};

/// A binary image loaded for a single evaluation.
///
/// Owns its scope exclusively. Values read from it must be moved out as owned
/// data before [`unload`](Self::unload) or drop.
pub struct LoadedModule {
    scope: IsolatedScope,
}

impl LoadedModule {
    /// Load `image` into a fresh scope that resolves no dependencies.
    pub fn load(image: &BinaryImage, staging_dir: Option<&Path>) -> Result<Self, LoadError> {
        IsolatedScope::load(image, &Unresolvable, staging_dir).map(|scope| Self { scope })
    }

    pub(crate) fn library(&self) -> &Library {
        self.scope.library()
    }

    /// Release the scope.
    pub fn unload(self) -> Result<(), LoadError> {
        self.scope.unload()
    }
}
