//! exprbox runtime half: isolated loading and value extraction.
//!
//! ## Modules
//!
//! - [`scope`]: isolated, unloadable scopes and the dependency loader
//! - [`module`]: a binary image loaded for one evaluation
//! - [`extract`]: reading the synthetic field back out

pub mod extract;
pub mod module;
pub mod scope;

pub use extract::{Accessor, extract};
pub use module::LoadedModule;
pub use scope::{DependencyLoader, IsolatedScope, Unresolvable, live_scopes};
