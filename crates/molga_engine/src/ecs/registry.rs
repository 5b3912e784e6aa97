//! Component type registry
//!
//! Maps type names to factories producing fresh, unattached components.
//! The registry is an explicit object owned by the engine and passed by
//! reference to whatever needs to construct components by name (the
//! scene serializer, editor tooling, the module loader).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::ecs::component::{Component, ComponentInstance};
use crate::ecs::provenance::{ModuleTag, Provenance};

/// Boxed component factory
pub type ComponentFactory = Box<dyn Fn() -> Box<dyn Component>>;

struct RegistryEntry {
    factory: ComponentFactory,
    origin: Option<Weak<ModuleTag>>,
}

/// Registry of constructible component types
#[derive(Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the factory for `type_name`
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        self.insert(type_name.into(), Box::new(factory), None);
    }

    /// Register `T` under its own type name, built with `T::default()`
    pub fn register_default<T: Component + Default>(&mut self) {
        let type_name = T::default().type_name();
        self.register(type_name, || Box::new(T::default()));
    }

    pub(crate) fn register_from_module(
        &mut self,
        type_name: String,
        factory: ComponentFactory,
        origin: &Rc<ModuleTag>,
    ) {
        self.insert(type_name, factory, Some(Rc::downgrade(origin)));
    }

    fn insert(&mut self, type_name: String, factory: ComponentFactory, origin: Option<Weak<ModuleTag>>) {
        let replaced = self
            .entries
            .insert(type_name.clone(), RegistryEntry { factory, origin })
            .is_some();

        if replaced {
            log::debug!("Replaced component factory '{}'", type_name);
        } else {
            log::debug!("Registered component type '{}'", type_name);
        }
    }

    /// Remove a single type; returns whether it was registered
    pub fn unregister(&mut self, type_name: &str) -> bool {
        let removed = self.entries.remove(type_name).is_some();
        if removed {
            log::debug!("Unregistered component type '{}'", type_name);
        }
        removed
    }

    /// Remove every listed type; returns how many were registered
    pub fn unregister_all<I, S>(&mut self, type_names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        type_names
            .into_iter()
            .filter(|name| self.unregister(name.as_ref()))
            .count()
    }

    /// Remove the listed types that still belong to `origin`
    ///
    /// Names another module has since re-registered stay with their new owner.
    pub(crate) fn unregister_owned_by<S: AsRef<str>>(&mut self, type_names: &[S], origin: &Rc<ModuleTag>) -> usize {
        let mut removed = 0;
        for name in type_names {
            let name = name.as_ref();
            let owned = self
                .entries
                .get(name)
                .and_then(|entry| entry.origin.as_ref())
                .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Rc::as_ptr(origin)));

            if owned {
                self.unregister(name);
                removed += 1;
            } else {
                log::debug!("Keeping '{}': re-registered by another provider", name);
            }
        }
        removed
    }

    /// Build a fresh, unattached component
    ///
    /// Returns `None` if `type_name` is unknown.
    pub fn create(&self, type_name: &str) -> Option<ComponentInstance> {
        let entry = self.entries.get(type_name)?;
        let provenance = entry
            .origin
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Provenance::new);

        Some(
            ComponentInstance::new((entry.factory)())
                .with_provenance(provenance)
                .with_registered_name(type_name),
        )
    }

    /// Registered type names in sorted order
    ///
    /// The iterator borrows the registry, so the set cannot change while it
    /// is alive; clone it to walk the same names again.
    pub fn list_registered(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Owned snapshot of the registered type names
    pub fn registered_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Whether `type_name` is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Module that registered `type_name`, `None` for built-ins or unknown names
    pub fn origin_of(&self, type_name: &str) -> Option<Rc<ModuleTag>> {
        self.entries.get(type_name)?.origin.as_ref()?.upgrade()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
