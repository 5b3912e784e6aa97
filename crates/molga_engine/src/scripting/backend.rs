//! Module backends
//!
//! A [`ModuleBackend`] turns a path into an open [`ModuleLibrary`]. The
//! dynamic backend goes through the platform loader; the static backend
//! serves declarations that were linked into the host binary, for builds
//! and platforms without dynamic loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scripting::module::{ModuleDeclaration, DECLARATION_SYMBOL};
use crate::scripting::ModuleError;

/// An opened behavior module
///
/// Dropping the library releases it. The loader leaks a library instead of
/// dropping it while components or factories from it are still around.
pub trait ModuleLibrary {
    /// Exported declaration, `None` if the module exports none
    fn declaration(&self) -> Option<ModuleDeclaration>;
}

/// Strategy for opening behavior modules
pub trait ModuleBackend {
    /// Open the module at `path`
    ///
    /// Fails with [`ModuleError::NotFound`] if nothing exists at `path` and
    /// [`ModuleError::LoadFailed`] if the module is rejected.
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleLibrary>, ModuleError>;
}

/// Backend loading shared libraries through `libloading`
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLibraryBackend;

impl DynamicLibraryBackend {
    /// Create the backend
    pub fn new() -> Self {
        Self
    }
}

struct DynamicLibrary {
    library: libloading::Library,
}

#[allow(unsafe_code)]
impl ModuleBackend for DynamicLibraryBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleLibrary>, ModuleError> {
        if !path.exists() {
            return Err(ModuleError::NotFound(path.to_path_buf()));
        }

        // SAFETY: loading runs the library's initializers. Behavior modules
        // are trusted code built against this engine.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| ModuleError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Box::new(DynamicLibrary { library }))
    }
}

#[allow(unsafe_code)]
impl ModuleLibrary for DynamicLibrary {
    fn declaration(&self) -> Option<ModuleDeclaration> {
        // SAFETY: the symbol is the `ModuleDeclaration` static emitted by
        // `declare_module!`; it is copied out while the library is loaded.
        unsafe {
            let symbol = self
                .library
                .get::<*const ModuleDeclaration>(DECLARATION_SYMBOL)
                .ok()?;
            let declaration: *const ModuleDeclaration = *symbol;
            if declaration.is_null() {
                return None;
            }
            Some(declaration.read())
        }
    }
}

/// Backend serving declarations linked into the host
#[derive(Debug, Default, Clone)]
pub struct StaticModuleBackend {
    modules: HashMap<PathBuf, Option<ModuleDeclaration>>,
}

impl StaticModuleBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `declaration` when `path` is opened
    pub fn with_module(mut self, path: impl Into<PathBuf>, declaration: ModuleDeclaration) -> Self {
        self.modules.insert(path.into(), Some(declaration));
        self
    }

    /// Serve a module that exports no declaration when `path` is opened
    pub fn with_empty_module(mut self, path: impl Into<PathBuf>) -> Self {
        self.modules.insert(path.into(), None);
        self
    }
}

struct StaticLibrary {
    declaration: Option<ModuleDeclaration>,
}

impl ModuleLibrary for StaticLibrary {
    fn declaration(&self) -> Option<ModuleDeclaration> {
        self.declaration
    }
}

impl ModuleBackend for StaticModuleBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleLibrary>, ModuleError> {
        let declaration = self
            .modules
            .get(path)
            .ok_or_else(|| ModuleError::NotFound(path.to_path_buf()))?;

        Ok(Box::new(StaticLibrary {
            declaration: *declaration,
        }))
    }
}
