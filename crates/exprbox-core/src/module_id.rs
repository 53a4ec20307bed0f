//! Deterministic identity for the binary modules that declare reflected types.
//!
//! A [`ModuleRef`] names a Rust library as the compiler sees it: either a
//! sysroot crate that ships with the toolchain (`core`, `std`) or a compiled
//! library file handed to `rustc` through `--extern`. [`ModuleId`] is a 64-bit
//! hash of that identity, used to deduplicate references regardless of how
//! many types a module contributes.
//!
//! # Examples
//!
//! ```
//! use exprbox_core::{ModuleId, ModuleRef};
//!
//! let a = ModuleRef::at("preds", "/tmp/libpreds.rlib");
//! let b = ModuleRef::at("preds", "/tmp/libpreds.rlib");
//! assert_eq!(ModuleId::of(&a), ModuleId::of(&b));
//!
//! let other = ModuleRef::at("preds", "/opt/libpreds.rlib");
//! assert_ne!(ModuleId::of(&a), ModuleId::of(&other));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for module identity.
///
/// A sysroot crate and a file-backed crate of the same name never collide.
pub mod hash_constants {
    /// Separator mixed between the crate name and its location
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for sysroot crates
    pub const SYSROOT: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for file-backed crates
    pub const FILE: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for crates without a location
    pub const UNLOCATED: u64 = 0x7d3c8b4a92e15f6d;
}

/// Crate names of the foundational modules every compilation links against.
///
/// Reflected primitives live in `core`; everything else the baseline reaches
/// is reachable through `std`.
pub const FOUNDATIONAL_MODULES: [&str; 2] = ["core", "std"];

/// Where a module's compiled library can be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleSource {
    /// Shipped with the toolchain; located through its target library directory.
    Sysroot,
    /// A compiled `.rlib` or dynamic Rust library on disk.
    File(PathBuf),
    /// Declared without any location. Resolution fails for such modules.
    Unlocated,
}

/// A binary module declaring one or more reflected types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleRef {
    name: String,
    source: ModuleSource,
}

impl ModuleRef {
    /// The `core` sysroot crate.
    pub fn core() -> Self {
        Self::sysroot("core")
    }

    /// The `std` sysroot crate.
    pub fn std() -> Self {
        Self::sysroot("std")
    }

    /// A crate shipped with the toolchain.
    pub fn sysroot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ModuleSource::Sysroot,
        }
    }

    /// A crate compiled to the library at `path`.
    ///
    /// `name` is the crate name the expression uses in paths.
    pub fn at(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: ModuleSource::File(path.into()),
        }
    }

    /// A crate whose library location is not known.
    pub fn unlocated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ModuleSource::Unlocated,
        }
    }

    /// Crate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library location.
    pub fn source(&self) -> &ModuleSource {
        &self.source
    }

    /// Library path, when the module is file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ModuleSource::File(path) => Some(path),
            _ => None,
        }
    }

    /// Identity of this module.
    pub fn id(&self) -> ModuleId {
        ModuleId::of(self)
    }

    /// Whether this is one of [`FOUNDATIONAL_MODULES`] from the sysroot.
    pub fn is_foundational(&self) -> bool {
        self.source == ModuleSource::Sysroot && FOUNDATIONAL_MODULES.contains(&self.name.as_str())
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ModuleSource::Sysroot => write!(f, "{} (sysroot)", self.name),
            ModuleSource::File(path) => write!(f, "{} ({})", self.name, path.display()),
            ModuleSource::Unlocated => write!(f, "{} (unlocated)", self.name),
        }
    }
}

/// A deterministic 64-bit hash identifying a binary module.
///
/// Computed from the crate name and its location, so the same library
/// referenced through different types always yields the same id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ModuleId(pub u64);

impl ModuleId {
    /// Compute the identity of a module.
    #[inline]
    pub fn of(module: &ModuleRef) -> Self {
        let name = xxh64(module.name.as_bytes(), 0);
        match &module.source {
            ModuleSource::Sysroot => ModuleId(hash_constants::SYSROOT ^ name),
            ModuleSource::File(path) => {
                let location = xxh64(path.as_os_str().as_encoded_bytes(), 0);
                ModuleId(
                    (hash_constants::FILE ^ name)
                        .wrapping_mul(hash_constants::SEP)
                        .wrapping_add(location),
                )
            }
            ModuleSource::Unlocated => ModuleId(hash_constants::UNLOCATED ^ name),
        }
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({:#018x})", self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysroot_and_file_never_collide() {
        let sysroot = ModuleRef::sysroot("std");
        let file = ModuleRef::at("std", "/usr/lib/libstd.rlib");
        let unlocated = ModuleRef::unlocated("std");
        assert_ne!(sysroot.id(), file.id());
        assert_ne!(sysroot.id(), unlocated.id());
        assert_ne!(file.id(), unlocated.id());
    }

    #[test]
    fn identity_ignores_construction_path() {
        assert_eq!(ModuleRef::std().id(), ModuleRef::sysroot("std").id());
        assert_eq!(ModuleRef::core().id(), ModuleRef::sysroot("core").id());
        assert_ne!(ModuleRef::std().id(), ModuleRef::core().id());
    }

    #[test]
    fn foundational_only_from_sysroot() {
        assert!(ModuleRef::std().is_foundational());
        assert!(ModuleRef::core().is_foundational());
        assert!(!ModuleRef::sysroot("alloc").is_foundational());
        assert!(!ModuleRef::at("std", "/tmp/libstd.rlib").is_foundational());
    }

    #[test]
    fn display_formats() {
        assert_eq!(ModuleRef::std().to_string(), "std (sysroot)");
        assert_eq!(ModuleRef::unlocated("x").to_string(), "x (unlocated)");
        assert_eq!(format!("{:?}", ModuleId(1)), "ModuleId(0x0000000000000001)");
    }
}
