//! Behavior module entry point
//!
//! A behavior module exports one static, [`ModuleDeclaration`], under the
//! symbol name [`DECLARATION_SYMBOL`]. The loader checks its ABI version and
//! then calls its `register` function with a [`ModuleRegistrar`].
//!
//! ```rust,ignore
//! use molga_engine::prelude::*;
//!
//! fn register(registrar: &mut ModuleRegistrar<'_>) {
//!     registrar.register_default::<Spinner>();
//! }
//!
//! molga_engine::declare_module!(register);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::ecs::{Component, ComponentRegistry, ModuleTag};

/// Version of the module boundary; bumped whenever `ModuleDeclaration`,
/// `ModuleRegistrar` or the `Component` trait change shape
pub const ABI_VERSION: u32 = 1;

/// Version of the engine crate a module was built against
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exported symbol name, NUL terminated for the platform loader
pub const DECLARATION_SYMBOL: &[u8] = b"molga_module_declaration\0";

/// Static description of a behavior module
#[derive(Clone, Copy)]
pub struct ModuleDeclaration {
    /// Must equal [`ABI_VERSION`] of the host
    pub abi_version: u32,
    /// Engine version the module was built against
    pub engine_version: &'static str,
    /// Registers every type the module provides
    pub register: fn(&mut ModuleRegistrar<'_>),
}

impl fmt::Debug for ModuleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDeclaration")
            .field("abi_version", &self.abi_version)
            .field("engine_version", &self.engine_version)
            .finish_non_exhaustive()
    }
}

/// Registration handle given to a module's `register` function
///
/// Forwards to the host registry, tagging each entry with the module's
/// origin, and records which names the module provided.
pub struct ModuleRegistrar<'a> {
    registry: &'a mut ComponentRegistry,
    origin: &'a Rc<ModuleTag>,
    type_names: Vec<String>,
}

impl<'a> ModuleRegistrar<'a> {
    pub(crate) fn new(registry: &'a mut ComponentRegistry, origin: &'a Rc<ModuleTag>) -> Self {
        Self {
            registry,
            origin,
            type_names: Vec::new(),
        }
    }

    /// Install or replace the factory for `type_name`
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        let type_name = type_name.into();
        if !self.type_names.contains(&type_name) {
            self.type_names.push(type_name.clone());
        }
        self.registry.register_from_module(type_name, Box::new(factory), self.origin);
    }

    /// Register `T` under its own type name, built with `T::default()`
    pub fn register_default<T: Component + Default>(&mut self) {
        let type_name = T::default().type_name();
        self.register(type_name, || Box::new(T::default()));
    }

    /// Names registered so far
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    pub(crate) fn into_type_names(self) -> Vec<String> {
        self.type_names
    }
}

/// Export a [`ModuleDeclaration`] from a behavior module crate
///
/// The argument is a `fn(&mut ModuleRegistrar<'_>)` that registers the
/// module's types.
#[macro_export]
macro_rules! declare_module {
    ($register:path) => {
        #[doc(hidden)]
        #[allow(unsafe_code, non_upper_case_globals)]
        #[no_mangle]
        pub static molga_module_declaration: $crate::scripting::ModuleDeclaration =
            $crate::scripting::ModuleDeclaration {
                abi_version: $crate::scripting::ABI_VERSION,
                engine_version: $crate::scripting::ENGINE_VERSION,
                register: $register,
            };
    };
}
