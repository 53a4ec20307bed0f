//! Isolated, unloadable execution scopes.
//!
//! A scope holds exactly one loaded binary image. Dependencies the image
//! declares are requested from the scope's [`DependencyLoader`]; the only
//! loader this crate ships, [`Unresolvable`], never resolves anything, so an
//! image must be self-contained relative to the references it was compiled
//! against.
//!
//! The image is staged from memory into a scope-private temporary file and
//! opened `RTLD_NOW | RTLD_LOCAL` on unix, keeping its symbols out of the
//! process-wide namespace. Dropping or unloading the scope closes the library
//! and removes the staged file. The platform loader may reclaim the mapping
//! later than that.

use std::env::consts::DLL_SUFFIX;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use exprbox_core::{BinaryImage, LoadError};
use libloading::Library;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

static LIVE_SCOPES: AtomicUsize = AtomicUsize::new(0);

/// Number of scopes in this process currently holding a loaded image.
pub fn live_scopes() -> usize {
    LIVE_SCOPES.load(Ordering::SeqCst)
}

/// Resolves a dependency an image asks for while being loaded.
pub trait DependencyLoader: Send + Sync {
    /// Path of the library providing `name`, or `None` to refuse.
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// A dependency loader that refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolvable;

impl DependencyLoader for Unresolvable {
    fn resolve(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

/// One loaded image and everything it pulled in.
pub struct IsolatedScope {
    // Field order is drop order: the image closes before its dependencies,
    // and both close before the staged file is removed.
    library: Option<Library>,
    dependencies: Vec<Library>,
    staging: Option<NamedTempFile>,
}

impl IsolatedScope {
    /// Load `image` into a fresh scope.
    ///
    /// The image is staged under `staging_dir`, or the system temporary
    /// directory when `None`.
    pub fn load(
        image: &BinaryImage,
        loader: &dyn DependencyLoader,
        staging_dir: Option<&Path>,
    ) -> Result<Self, LoadError> {
        let mut dependencies = Vec::with_capacity(image.dependencies().len());
        for name in image.dependencies() {
            let path = loader
                .resolve(name)
                .ok_or_else(|| LoadError::UnresolvedDependency(name.clone()))?;
            dependencies.push(open_isolated(&path)?);
        }

        let staging = stage(image.bytes(), staging_dir)?;
        let library = open_isolated(staging.path())?;

        LIVE_SCOPES.fetch_add(1, Ordering::SeqCst);
        debug!(
            bytes = image.len(),
            path = %staging.path().display(),
            "loaded image into isolated scope"
        );

        Ok(Self {
            library: Some(library),
            dependencies,
            staging: Some(staging),
        })
    }

    /// The loaded image.
    pub fn library(&self) -> &Library {
        match &self.library {
            Some(library) => library,
            // Only `release` takes the library, and it runs when the scope is
            // consumed or dropped.
            None => unreachable!("isolated scope used after release"),
        }
    }

    /// Release the scope, reporting a failure to close the image.
    pub fn unload(mut self) -> Result<(), LoadError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), LoadError> {
        let Some(library) = self.library.take() else {
            return Ok(());
        };
        let closed = library.close().map_err(|e| LoadError::Close(e.to_string()));
        self.dependencies.clear();
        if let Some(staging) = self.staging.take() {
            if let Err(e) = staging.close() {
                warn!(error = %e, "failed to remove staged image");
            }
        }
        LIVE_SCOPES.fetch_sub(1, Ordering::SeqCst);
        debug!("released isolated scope");
        closed
    }
}

impl Drop for IsolatedScope {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release isolated scope");
        }
    }
}

fn stage(bytes: &[u8], dir: Option<&Path>) -> Result<NamedTempFile, LoadError> {
    let staging_error = |e: std::io::Error| LoadError::Staging(e.to_string());

    let mut builder = tempfile::Builder::new();
    builder.prefix("exprbox-image-").suffix(DLL_SUFFIX);
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(staging_error)?;

    file.write_all(bytes).map_err(staging_error)?;
    file.flush().map_err(staging_error)?;
    Ok(file)
}

#[cfg(unix)]
fn open_isolated(path: &Path) -> Result<Library, LoadError> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LOCAL, RTLD_NOW};

    // SAFETY: running the image's initializers is the point of loading it;
    // compiled expressions are trusted.
    unsafe { UnixLibrary::open(Some(path), RTLD_NOW | RTLD_LOCAL) }
        .map(Library::from)
        .map_err(|e| LoadError::Open(e.to_string()))
}

#[cfg(not(unix))]
fn open_isolated(path: &Path) -> Result<Library, LoadError> {
    // SAFETY: as above.
    unsafe { Library::new(path) }.map_err(|e| LoadError::Open(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(PathBuf);

    impl DependencyLoader for Fixed {
        fn resolve(&self, _name: &str) -> Option<PathBuf> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn unresolvable_refuses_everything() {
        assert_eq!(Unresolvable.resolve("std"), None);
        assert_eq!(Unresolvable.resolve("libc"), None);
    }

    #[test]
    fn declared_dependency_is_refused() {
        let image = BinaryImage::new(vec![1, 2, 3]).with_dependencies(vec!["shared".into()]);
        let err = IsolatedScope::load(&image, &Unresolvable, None).err().unwrap();
        assert_eq!(err, LoadError::UnresolvedDependency("shared".into()));
    }

    #[test]
    fn garbage_image_fails_to_open() {
        let image = BinaryImage::new(b"definitely not a shared object".to_vec());
        let err = IsolatedScope::load(&image, &Unresolvable, None).err().unwrap();
        assert!(matches!(err, LoadError::Open(_)));
    }

    #[test]
    fn resolved_dependency_must_exist() {
        let image = BinaryImage::new(Vec::new()).with_dependencies(vec!["shared".into()]);
        let loader = Fixed(PathBuf::from("/nonexistent/libshared.so"));
        let err = IsolatedScope::load(&image, &loader, None).err().unwrap();
        assert!(matches!(err, LoadError::Open(_)));
    }

    #[test]
    fn staging_dir_must_exist() {
        let image = BinaryImage::new(vec![0]);
        let err = IsolatedScope::load(&image, &Unresolvable, Some(Path::new("/nonexistent/exprbox")))
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Staging(_)));
    }
}
