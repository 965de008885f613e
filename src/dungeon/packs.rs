//! # Pack Registry
//!
//! Maps case-insensitive pack names to packs, keeping registration order.

use super::{DungeonPack, DungeonPackConfig, PackId};
use log::warn;
use std::collections::HashMap;

/// Owner of every registered pack.
#[derive(Debug, Clone, Default)]
pub struct PackRegistry {
    packs: Vec<DungeonPack>,
    by_name: HashMap<String, PackId>,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pack under the uppercased name.
    ///
    /// Registering a name twice keeps the first pack and its config; the new
    /// config is dropped and a naming-conflict warning is logged.
    ///
    /// # Examples
    ///
    /// ```
    /// use pocketdim::{DungeonPackConfig, PackRegistry};
    ///
    /// let mut packs = PackRegistry::new();
    /// let first = packs.register_pack("ruins", DungeonPackConfig::new("", ["Hub"]));
    /// let second = packs.register_pack("Ruins", DungeonPackConfig::new("", ["Maze"]));
    /// assert_eq!(first, second);
    /// assert_eq!(packs.get(first).unwrap().name(), "RUINS");
    /// assert!(packs.get(first).unwrap().is_known_type("Hub"));
    /// ```
    pub fn register_pack(&mut self, name: &str, mut config: DungeonPackConfig) -> PackId {
        let key = name.to_uppercase();
        if let Some(&existing) = self.by_name.get(&key) {
            warn!(
                "A dungeon pack named {} has already been loaded; keeping its config",
                key
            );
            return existing;
        }

        let id = PackId(self.packs.len());
        config.set_name(key.clone());
        self.packs.push(DungeonPack::new(id, config));
        self.by_name.insert(key, id);
        id
    }

    /// Looks up a pack id by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<PackId> {
        self.by_name.get(&name.to_uppercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn get(&self, id: PackId) -> Option<&DungeonPack> {
        self.packs.get(id.0)
    }

    pub fn get_mut(&mut self, id: PackId) -> Option<&mut DungeonPack> {
        self.packs.get_mut(id.0)
    }

    /// Gets every pack in registration order.
    pub fn all_packs(&self) -> &[DungeonPack] {
        &self.packs
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}
