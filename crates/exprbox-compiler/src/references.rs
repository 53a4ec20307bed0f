//! Reference resolution.
//!
//! Computes the set of binary modules a compilation may link against: the
//! modules declaring the baseline types and the caller's types, plus the
//! foundational sysroot crates. Entries are deduplicated by [`ModuleId`] and
//! kept in a canonical order, so the same inputs in any order produce equal
//! sets.

use std::env::consts::DLL_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use exprbox_core::{
    FOUNDATIONAL_MODULES, ModuleId, ModuleRef, ModuleSource, Reflect, ResolutionError,
    TypeDescriptor,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::toolchain::Toolchain;

/// How a resolved module is linked into the compiled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Linkage {
    /// Found by the compiler in its own sysroot; no flags needed.
    Sysroot,
    /// Statically linked `.rlib`, passed through `--extern`.
    Static,
    /// Dynamic Rust library, passed through `--extern` and needed at load time.
    Dynamic,
}

/// A module with a concrete library location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedModule {
    pub name: String,
    pub path: PathBuf,
    pub linkage: Linkage,
    pub id: ModuleId,
}

impl ResolvedModule {
    fn sysroot(name: &str, path: PathBuf) -> Self {
        Self {
            id: ModuleRef::sysroot(name).id(),
            name: name.to_string(),
            path,
            linkage: Linkage::Sysroot,
        }
    }

    fn file(module: &ModuleRef, path: &Path) -> Self {
        let linkage = match path.extension() {
            Some(ext) if ext == DLL_EXTENSION => Linkage::Dynamic,
            _ => Linkage::Static,
        };
        Self {
            id: module.id(),
            name: module.name().to_string(),
            path: path.to_path_buf(),
            linkage,
        }
    }
}

// ============================================================================
// Foundational modules
// ============================================================================

static FOUNDATION: OnceLock<Foundation> = OnceLock::new();

/// The toolchain's target library directory and the foundational crates in it.
#[derive(Debug, Clone)]
pub struct Foundation {
    libdir: PathBuf,
    modules: Vec<ResolvedModule>,
}

impl Foundation {
    /// The process-wide foundation, located through `toolchain` on first use.
    ///
    /// Later calls return the cached value regardless of the toolchain passed.
    /// A failed lookup is not cached.
    pub fn get_or_locate(toolchain: &dyn Toolchain) -> Result<&'static Foundation, ResolutionError> {
        if let Some(foundation) = FOUNDATION.get() {
            return Ok(foundation);
        }
        let libdir = toolchain
            .target_libdir()
            .map_err(|e| ResolutionError::Foundational {
                module: FOUNDATIONAL_MODULES.join(", "),
                detail: e.to_string(),
            })?;
        let located = Foundation::locate(libdir)?;
        debug!(libdir = %located.libdir.display(), "located foundational modules");
        Ok(FOUNDATION.get_or_init(|| located))
    }

    /// Locate every foundational crate inside `libdir`.
    pub fn locate(libdir: impl Into<PathBuf>) -> Result<Self, ResolutionError> {
        let libdir = libdir.into();
        let modules = FOUNDATIONAL_MODULES
            .iter()
            .map(|name| {
                find_sysroot_rlib(&libdir, name)
                    .map(|path| ResolvedModule::sysroot(name, path))
                    .ok_or_else(|| ResolutionError::Foundational {
                        module: name.to_string(),
                        detail: format!("no lib{name}-*.rlib in {}", libdir.display()),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { libdir, modules })
    }

    /// Target library directory.
    pub fn libdir(&self) -> &Path {
        &self.libdir
    }

    /// The located foundational crates.
    pub fn modules(&self) -> &[ResolvedModule] {
        &self.modules
    }

    /// Resolve any sysroot crate by name.
    fn sysroot_module(&self, name: &str) -> Option<ResolvedModule> {
        if let Some(module) = self.modules.iter().find(|m| m.name == name) {
            return Some(module.clone());
        }
        find_sysroot_rlib(&self.libdir, name).map(|path| ResolvedModule::sysroot(name, path))
    }
}

/// Find `lib<name>-<hash>.rlib` in a sysroot library directory.
///
/// Multiple matches are broken by file name so the choice is stable.
fn find_sysroot_rlib(libdir: &Path, name: &str) -> Option<PathBuf> {
    let prefix = format!("lib{name}-");
    let mut matches: Vec<PathBuf> = fs::read_dir(libdir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.starts_with(&prefix) && f.ends_with(".rlib"))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

// ============================================================================
// Reference set
// ============================================================================

/// Types every compilation can name without the caller listing them.
pub fn baseline_types() -> Vec<TypeDescriptor> {
    vec![
        bool::descriptor(),
        i32::descriptor(),
        String::descriptor(),
        TypeDescriptor::generic("std::vec::Vec", ModuleRef::std(), 1),
        TypeDescriptor::generic("std::option::Option", ModuleRef::std(), 1),
        TypeDescriptor::generic("std::collections::HashMap", ModuleRef::std(), 2),
    ]
}

/// Deduplicated, canonically ordered set of modules a compilation links against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    modules: Vec<ResolvedModule>,
}

impl ReferenceSet {
    /// Number of distinct modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All modules in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.iter()
    }

    /// Whether the set contains the module with this identity.
    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.iter().any(|m| m.id == id)
    }

    /// Modules that must be passed to the compiler explicitly.
    pub fn externs(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.iter().filter(|m| m.linkage != Linkage::Sysroot)
    }

    /// Directories the compiler may search for the externs' own dependencies.
    pub fn search_dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self.externs().filter_map(|m| m.path.parent()).collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    /// Names of modules the compiled image will need at load time.
    pub fn dynamic_dependencies(&self) -> Vec<String> {
        self.modules
            .iter()
            .filter(|m| m.linkage == Linkage::Dynamic)
            .map(|m| m.name.clone())
            .collect()
    }
}

/// Resolve the baseline types, `types`, and the foundational crates into a
/// [`ReferenceSet`].
///
/// Every module a descriptor mentions is included: its own, its declaring
/// types', and its generic arguments'. Fails if any of them has no location.
pub fn resolve_references(
    types: &[TypeDescriptor],
    foundation: &Foundation,
) -> Result<ReferenceSet, ResolutionError> {
    let mut seen = FxHashSet::default();
    let mut modules = Vec::new();

    for module in foundation.modules() {
        if seen.insert(module.id) {
            modules.push(module.clone());
        }
    }

    let baseline = baseline_types();
    for ty in baseline.iter().chain(types) {
        for module in ty.modules() {
            let id = module.id();
            if seen.contains(&id) {
                continue;
            }
            let unlocated = || ResolutionError::Unlocated {
                module: module.name().to_string(),
                type_name: ty.name().to_string(),
            };
            let resolved = match module.source() {
                ModuleSource::Sysroot => {
                    foundation.sysroot_module(module.name()).ok_or_else(unlocated)?
                }
                ModuleSource::File(path) => ResolvedModule::file(module, path),
                ModuleSource::Unlocated => return Err(unlocated()),
            };
            seen.insert(id);
            modules.push(resolved);
        }
    }

    modules.sort_by(|a, b| (&a.name, &a.path).cmp(&(&b.name, &b.path)));
    Ok(ReferenceSet { modules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_sysroot() -> (TempDir, Foundation) {
        let dir = TempDir::new().unwrap();
        for file in ["libcore-1a2b.rlib", "libstd-3c4d.rlib", "liballoc-5e6f.rlib"] {
            fs::write(dir.path().join(file), b"").unwrap();
        }
        let foundation = Foundation::locate(dir.path()).unwrap();
        (dir, foundation)
    }

    fn preds_type(name: &str, path: &Path) -> TypeDescriptor {
        TypeDescriptor::new(
            format!("preds::{name}").as_str(),
            ModuleRef::at("preds", path),
        )
    }

    #[test]
    fn locate_finds_foundational_rlibs() {
        let (dir, foundation) = fake_sysroot();
        assert_eq!(foundation.libdir(), dir.path());
        let names: Vec<_> = foundation.modules().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["core", "std"]);
        assert!(foundation.modules()[1].path.ends_with("libstd-3c4d.rlib"));
    }

    #[test]
    fn locate_fails_without_std() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("libcore-1a2b.rlib"), b"").unwrap();
        let err = Foundation::locate(dir.path()).unwrap_err();
        assert!(matches!(err, ResolutionError::Foundational { ref module, .. } if module == "std"));
    }

    #[test]
    fn baseline_only_resolves_to_foundation() {
        let (_dir, foundation) = fake_sysroot();
        let set = resolve_references(&[], &foundation).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(ModuleRef::std().id()));
        assert!(set.contains(ModuleRef::core().id()));
        assert_eq!(set.externs().count(), 0);
    }

    #[test]
    fn dedups_by_module_not_type() {
        let (dir, foundation) = fake_sysroot();
        let lib = dir.path().join("libpreds.rlib");
        let types = vec![
            preds_type("Range", &lib),
            preds_type("Threshold", &lib),
            preds_type("Window", &lib),
        ];
        let set = resolve_references(&types, &foundation).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.externs().count(), 1);
        assert_eq!(set.search_dirs(), vec![dir.path()]);
    }

    #[test]
    fn order_independent() {
        let (dir, foundation) = fake_sysroot();
        let a = preds_type("Range", &dir.path().join("libpreds.rlib"));
        let b = TypeDescriptor::new("geo::Point", ModuleRef::at("geo", dir.path().join("libgeo.rlib")));
        let c = <Vec<std::collections::BTreeMap<u8, u8>>>::descriptor();

        let forward = resolve_references(&[a.clone(), b.clone(), c.clone()], &foundation).unwrap();
        let backward = resolve_references(&[c, b, a], &foundation).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 4);
    }

    #[test]
    fn generic_arguments_contribute_modules() {
        let (dir, foundation) = fake_sysroot();
        let point = TypeDescriptor::new("geo::Point", ModuleRef::at("geo", dir.path().join("libgeo.rlib")));
        let list = TypeDescriptor::generic("std::vec::Vec", ModuleRef::std(), 1).instantiate(vec![point]);
        let set = resolve_references(&[list], &foundation).unwrap();
        assert!(set.contains(ModuleRef::at("geo", dir.path().join("libgeo.rlib")).id()));
    }

    #[test]
    fn non_foundational_sysroot_crate_resolves() {
        let (_dir, foundation) = fake_sysroot();
        let ty = TypeDescriptor::new("alloc::rc::Rc", ModuleRef::sysroot("alloc"));
        let set = resolve_references(&[ty], &foundation).unwrap();
        assert!(set.contains(ModuleRef::sysroot("alloc").id()));
        assert_eq!(set.externs().count(), 0);
    }

    #[test]
    fn unlocated_module_fails() {
        let (_dir, foundation) = fake_sysroot();
        let ghost = TypeDescriptor::new("ghost::Thing", ModuleRef::unlocated("ghost"));
        let err = resolve_references(&[ghost], &foundation).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Unlocated {
                module: "ghost".into(),
                type_name: "ghost::Thing".into(),
            }
        );

        let missing = TypeDescriptor::new("proc_macro::TokenStream", ModuleRef::sysroot("proc_macro"));
        assert!(resolve_references(&[missing], &foundation).is_err());
    }

    #[test]
    fn dynamic_libraries_are_load_time_dependencies() {
        let (dir, foundation) = fake_sysroot();
        let dylib = dir.path().join(format!("libshared.{DLL_EXTENSION}"));
        let ty = TypeDescriptor::new("shared::Handle", ModuleRef::at("shared", dylib));
        let set = resolve_references(&[ty], &foundation).unwrap();
        assert_eq!(set.dynamic_dependencies(), vec!["shared".to_string()]);
    }
}
