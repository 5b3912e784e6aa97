//! Behavior module loader
//!
//! Loads behavior modules, lets them register their component types and
//! removes those types again on unload. Every component built from a
//! module's factories carries that module's provenance; a module with live
//! instances refuses to unload, so no component can outlive the code it
//! came from.
//!
//! Dropping the loader releases only libraries nothing points into any
//! more. A library whose factories are still registered or whose components
//! are still alive is leaked and reported; call [`ModuleLoader::shutdown`]
//! first to unload cleanly.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use slotmap::SlotMap;
use thiserror::Error;

use crate::ecs::provenance::{live_instances, ModuleKey, ModuleTag};
use crate::ecs::ComponentRegistry;
use crate::scripting::backend::{DynamicLibraryBackend, ModuleBackend, ModuleLibrary};
use crate::scripting::module::{ModuleRegistrar, ABI_VERSION, ENGINE_VERSION};

/// Module loading errors
#[derive(Error, Debug)]
pub enum ModuleError {
    /// No file at the given path
    #[error("module not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The platform loader rejected the module
    #[error("failed to load module {}: {reason}", path.display())]
    LoadFailed {
        /// Module path
        path: PathBuf,
        /// Platform loader diagnostic
        reason: String,
    },

    /// The module was built for a different module ABI
    #[error("module {} uses ABI version {found}, expected {expected}", path.display())]
    IncompatibleAbi {
        /// Module path
        path: PathBuf,
        /// ABI version declared by the module
        found: u32,
        /// ABI version of this engine
        expected: u32,
    },

    /// Components built by the module are still alive
    #[error("module {} still has {live_instances} live component instance(s)", path.display())]
    InUse {
        /// Module path
        path: PathBuf,
        /// Number of live instances
        live_instances: usize,
    },
}

struct LoadedModule {
    path: PathBuf,
    type_names: Vec<String>,
    tag: Rc<ModuleTag>,
    // None once leaked by Drop.
    library: Option<Box<dyn ModuleLibrary>>,
}

impl Drop for LoadedModule {
    fn drop(&mut self) {
        let live = live_instances(&self.tag);
        let factories = Rc::weak_count(&self.tag);
        if live == 0 && factories == 0 {
            return;
        }

        log::error!(
            "Module {} dropped while still referenced ({} live instance(s), {} registered factory(ies)); leaking its library",
            self.path.display(),
            live,
            factories
        );
        if let Some(library) = self.library.take() {
            std::mem::forget(library);
        }
    }
}

/// Loader for behavior modules
pub struct ModuleLoader {
    backend: Box<dyn ModuleBackend>,
    modules: SlotMap<ModuleKey, LoadedModule>,
    order: Vec<ModuleKey>,
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader {
    /// Create a loader using the platform's dynamic loader
    pub fn new() -> Self {
        Self::with_backend(DynamicLibraryBackend::new())
    }

    /// Create a loader with a custom backend
    pub fn with_backend(backend: impl ModuleBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            modules: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Load a module and register its types
    ///
    /// Loading an already loaded path does nothing. On failure nothing is
    /// registered.
    pub fn load_module(
        &mut self,
        path: impl AsRef<Path>,
        registry: &mut ComponentRegistry,
    ) -> Result<(), ModuleError> {
        let path = path.as_ref();
        if self.find(path).is_some() {
            log::debug!("Module {} already loaded", path.display());
            return Ok(());
        }

        let library = self.backend.open(path)?;
        let declaration = library.declaration();

        if let Some(declaration) = &declaration {
            if declaration.abi_version != ABI_VERSION {
                return Err(ModuleError::IncompatibleAbi {
                    path: path.to_path_buf(),
                    found: declaration.abi_version,
                    expected: ABI_VERSION,
                });
            }
            if declaration.engine_version != ENGINE_VERSION {
                log::warn!(
                    "Module {} was built against engine {}, host is {}",
                    path.display(),
                    declaration.engine_version,
                    ENGINE_VERSION
                );
            }
        } else {
            log::debug!("Module {} exports no declaration", path.display());
        }

        let key = self.modules.insert_with_key(|key| LoadedModule {
            path: path.to_path_buf(),
            type_names: Vec::new(),
            tag: Rc::new(ModuleTag::new(key, path)),
            library: Some(library),
        });
        self.order.push(key);

        let module = &mut self.modules[key];
        if let Some(declaration) = declaration {
            let mut registrar = ModuleRegistrar::new(registry, &module.tag);
            (declaration.register)(&mut registrar);
            module.type_names = registrar.into_type_names();
        }

        log::info!(
            "Loaded module {} ({} type(s): {})",
            path.display(),
            module.type_names.len(),
            module.type_names.join(", ")
        );
        Ok(())
    }

    /// Unload a module and remove its types from the registry
    ///
    /// Unloading a path that is not loaded does nothing. Refuses with
    /// [`ModuleError::InUse`] while any component built by the module is
    /// alive.
    pub fn unload_module(
        &mut self,
        path: impl AsRef<Path>,
        registry: &mut ComponentRegistry,
    ) -> Result<(), ModuleError> {
        let path = path.as_ref();
        let Some(key) = self.find(path) else {
            log::debug!("Module {} not loaded, nothing to unload", path.display());
            return Ok(());
        };

        self.ensure_unused(key)?;

        self.order.retain(|loaded| *loaded != key);
        if let Some(module) = self.modules.remove(key) {
            let removed = registry.unregister_owned_by(module.type_names.as_slice(), &module.tag);
            log::info!("Unloaded module {} ({} type(s) removed)", path.display(), removed);
        }
        Ok(())
    }

    /// Unload every module and load them again in their original order
    ///
    /// Nothing is touched if any module still has live instances. A module
    /// that fails to reload is skipped; the first such failure is returned
    /// after the others have been attempted.
    pub fn reload_all(&mut self, registry: &mut ComponentRegistry) -> Result<(), ModuleError> {
        for &key in &self.order {
            self.ensure_unused(key)?;
        }

        let paths = self.loaded_paths();
        log::info!("Reloading {} module(s)", paths.len());

        for path in &paths {
            self.unload_module(path, registry)?;
        }

        let mut first_error = None;
        for path in paths {
            if let Err(e) = self.load_module(&path, registry) {
                log::error!("Failed to reload module {}: {}", path.display(), e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Unload every module, newest first
    ///
    /// Modules with live instances stay loaded; the first refusal is
    /// returned after the others have been unloaded.
    pub fn shutdown(&mut self, registry: &mut ComponentRegistry) -> Result<(), ModuleError> {
        let mut first_error = None;
        for path in self.loaded_paths().into_iter().rev() {
            if let Err(e) = self.unload_module(&path, registry) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Whether `path` is loaded
    pub fn is_loaded(&self, path: impl AsRef<Path>) -> bool {
        self.find(path.as_ref()).is_some()
    }

    /// Loaded module paths in load order
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.order
            .iter()
            .filter_map(|key| self.modules.get(*key))
            .map(|module| module.path.clone())
            .collect()
    }

    /// Type names registered by a loaded module
    pub fn module_types(&self, path: impl AsRef<Path>) -> Option<&[String]> {
        let key = self.find(path.as_ref())?;
        Some(&self.modules[key].type_names)
    }

    /// Live component instances built by a loaded module
    pub fn live_instances(&self, path: impl AsRef<Path>) -> Option<usize> {
        let key = self.find(path.as_ref())?;
        Some(live_instances(&self.modules[key].tag))
    }

    /// Loader key of a loaded module
    pub fn module_key(&self, path: impl AsRef<Path>) -> Option<ModuleKey> {
        self.find(path.as_ref())
    }

    /// Number of loaded modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is loaded
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn find(&self, path: &Path) -> Option<ModuleKey> {
        self.order
            .iter()
            .copied()
            .find(|key| self.modules.get(*key).is_some_and(|module| module.path == path))
    }

    fn ensure_unused(&self, key: ModuleKey) -> Result<(), ModuleError> {
        let Some(module) = self.modules.get(key) else {
            return Ok(());
        };

        let live = live_instances(&module.tag);
        if live > 0 {
            log::warn!(
                "Refusing to unload module {}: {} live component instance(s)",
                module.path.display(),
                live
            );
            return Err(ModuleError::InUse {
                path: module.path.clone(),
                live_instances: live,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("modules", &self.loaded_paths())
            .finish_non_exhaustive()
    }
}
