//! Compiler configuration.

use std::env;
use std::path::PathBuf;

use exprbox_compiler::{OptLevel, RustcToolchain};

/// Environment variable naming the `rustc` to drive. Checked before `RUSTC`.
pub const RUSTC_ENV: &str = "EXPRBOX_RUSTC";

/// How expressions are compiled.
///
/// `Default` reads the environment through [`from_env`](Self::from_env).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// The `rustc` executable, as a path or a name looked up on `PATH`.
    pub rustc: PathBuf,
    pub opt_level: OptLevel,
    /// Edition the synthesized crate is compiled as.
    pub edition: String,
    /// Arguments appended to every compiler invocation.
    pub extra_args: Vec<String>,
    /// Parent directory for per-call scratch and staging files. The system
    /// temporary directory when `None`.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self::from_env()
    }
}

impl CompilerOptions {
    /// Options with the compiler taken from `EXPRBOX_RUSTC`, else `RUSTC`,
    /// else `rustc` on `PATH`.
    pub fn from_env() -> Self {
        let rustc = env::var_os(RUSTC_ENV)
            .or_else(|| env::var_os("RUSTC"))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("rustc"));
        Self::with_rustc(rustc)
    }

    /// Options driving the `rustc` at `rustc`, ignoring the environment.
    pub fn with_rustc(rustc: impl Into<PathBuf>) -> Self {
        Self {
            rustc: rustc.into(),
            opt_level: OptLevel::O0,
            edition: "2021".to_string(),
            extra_args: Vec::new(),
            scratch_dir: None,
        }
    }

    pub fn opt_level(mut self, opt_level: OptLevel) -> Self {
        self.opt_level = opt_level;
        self
    }

    pub fn edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// The toolchain these options describe.
    pub fn toolchain(&self) -> RustcToolchain {
        let toolchain = RustcToolchain::new(&self.rustc)
            .with_opt_level(self.opt_level)
            .with_edition(&self.edition)
            .with_extra_args(self.extra_args.clone());
        match &self.scratch_dir {
            Some(dir) => toolchain.with_scratch_dir(dir),
            None => toolchain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn explicit_rustc_defaults() {
        let options = CompilerOptions::with_rustc("/opt/rust/bin/rustc");
        assert_eq!(options.rustc, Path::new("/opt/rust/bin/rustc"));
        assert_eq!(options.opt_level, OptLevel::O0);
        assert_eq!(options.edition, "2021");
        assert!(options.extra_args.is_empty());
        assert!(options.scratch_dir.is_none());
    }

    #[test]
    fn builder_accumulates() {
        let options = CompilerOptions::with_rustc("rustc")
            .opt_level(OptLevel::O2)
            .edition("2024")
            .extra_arg("-Cdebuginfo=0")
            .extra_arg("-Ccodegen-units=1")
            .scratch_dir("/tmp/exprbox");
        assert_eq!(options.opt_level, OptLevel::O2);
        assert_eq!(options.edition, "2024");
        assert_eq!(options.extra_args, vec!["-Cdebuginfo=0", "-Ccodegen-units=1"]);
        assert_eq!(options.scratch_dir.as_deref(), Some(Path::new("/tmp/exprbox")));
    }

    #[test]
    fn toolchain_uses_configured_program() {
        let toolchain = CompilerOptions::with_rustc("/usr/local/bin/rustc").toolchain();
        assert_eq!(toolchain.program(), Path::new("/usr/local/bin/rustc"));
    }
}
