//! Component provenance
//!
//! Every component built from a factory that a behavior module registered
//! carries a [`Provenance`] pointing back at that module's [`ModuleTag`].
//! The loader owns one strong reference to each tag, the registry only weak
//! ones, so the number of live instances a module produced is simply the
//! tag's strong count minus the loader's own reference.

use std::path::{Path, PathBuf};
use std::rc::Rc;

slotmap::new_key_type! {
    /// Key of a loaded behavior module
    pub struct ModuleKey;
}

/// Identity of one loaded behavior module
#[derive(Debug)]
pub struct ModuleTag {
    key: ModuleKey,
    path: PathBuf,
}

impl ModuleTag {
    pub(crate) fn new(key: ModuleKey, path: impl Into<PathBuf>) -> Self {
        Self { key, path: path.into() }
    }

    /// Loader key of the module
    pub fn key(&self) -> ModuleKey {
        self.key
    }

    /// Path the module was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Origin marker held by a component instance
#[derive(Debug, Clone)]
pub struct Provenance(Rc<ModuleTag>);

impl Provenance {
    pub(crate) fn new(tag: Rc<ModuleTag>) -> Self {
        Self(tag)
    }

    /// Key of the module that produced the instance
    pub fn module(&self) -> ModuleKey {
        self.0.key
    }

    /// Path of the module that produced the instance
    pub fn path(&self) -> &Path {
        &self.0.path
    }
}

/// Number of outstanding [`Provenance`] markers for a tag owned by the loader
pub(crate) fn live_instances(tag: &Rc<ModuleTag>) -> usize {
    Rc::strong_count(tag).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_live_count_tracks_markers() {
        let mut keys: SlotMap<ModuleKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let tag = Rc::new(ModuleTag::new(key, "libgame.so"));
        assert_eq!(live_instances(&tag), 0);

        let first = Provenance::new(Rc::clone(&tag));
        let second = first.clone();
        assert_eq!(live_instances(&tag), 2);
        assert_eq!(first.module(), key);
        assert_eq!(second.path(), Path::new("libgame.so"));

        drop(first);
        drop(second);
        assert_eq!(live_instances(&tag), 0);
    }
}
