//! Scripting
//!
//! Script components, built-in scripts and the behavior module loader that
//! lets externally compiled code register new component types at runtime.

pub mod script;
pub mod builtin;
pub mod module;
pub mod backend;
pub mod loader;

pub use script::{CollisionEvent, Script};
pub use builtin::{register_builtin_scripts, Oscillator, Rotator};
pub use module::{ModuleDeclaration, ModuleRegistrar, ABI_VERSION, DECLARATION_SYMBOL, ENGINE_VERSION};
pub use backend::{DynamicLibraryBackend, ModuleBackend, ModuleLibrary, StaticModuleBackend};
pub use loader::{ModuleError, ModuleLoader};
