//! # Dungeon Module
//!
//! Dungeon templates, their types, and the packs and registries that own them.
//!
//! This module contains the data side of the engine:
//! - Templates and the types that scope them to a pack
//! - Template naming convention and validation
//! - Pack configuration files and their chain rules
//! - Packs, the pack registry, and the registration pipeline

pub mod config;
pub mod naming;
pub mod pack;
pub mod packs;
pub mod registry;
pub mod resources;

pub use config::*;
pub use naming::*;
pub use pack::*;
pub use packs::*;
pub use registry::*;
pub use resources::*;

use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a pack inside a [`PackRegistry`].
///
/// Ids are assigned in registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackId(pub usize);

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pack#{}", self.0)
    }
}

/// A category of templates scoped to one owning pack.
///
/// The special unknown type has no owner and marks templates whose names
/// failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DungeonType {
    name: String,
    owner: Option<PackId>,
}

impl DungeonType {
    /// Name given to the ownerless unknown type.
    pub const UNKNOWN_NAME: &'static str = "UNKNOWN";

    /// Creates a type owned by the given pack.
    pub fn new(name: impl Into<String>, owner: PackId) -> Self {
        Self {
            name: name.into(),
            owner: Some(owner),
        }
    }

    /// Creates the unknown type.
    ///
    /// # Examples
    ///
    /// ```
    /// use pocketdim::DungeonType;
    ///
    /// let unknown = DungeonType::unknown();
    /// assert!(unknown.is_unknown());
    /// assert_eq!(unknown.owner(), None);
    /// ```
    pub fn unknown() -> Self {
        Self {
            name: Self::UNKNOWN_NAME.to_string(),
            owner: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<PackId> {
        self.owner
    }

    pub fn is_unknown(&self) -> bool {
        self.owner.is_none()
    }
}

/// A single selectable dungeon: weight, schematic path, open flag and type.
///
/// Immutable once registered. Identity is the source path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DungeonTemplate {
    weight: u32,
    source_path: String,
    is_open: bool,
    dungeon_type: DungeonType,
}

impl DungeonTemplate {
    /// Creates a new template.
    ///
    /// # Examples
    ///
    /// ```
    /// use pocketdim::{DungeonTemplate, DungeonType, PackId};
    ///
    /// let hub = DungeonType::new("Hub", PackId(0));
    /// let template = DungeonTemplate::new(250, "/ruins/Hub_Crossroads_open_250.schematic", true, hub);
    /// assert_eq!(template.weight(), 250);
    /// assert_eq!(template.name(), "Hub_Crossroads_open_250");
    /// assert_eq!(template.owner(), Some(PackId(0)));
    /// ```
    pub fn new(
        weight: u32,
        source_path: impl Into<String>,
        is_open: bool,
        dungeon_type: DungeonType,
    ) -> Self {
        Self {
            weight,
            source_path: source_path.into(),
            is_open,
            dungeon_type,
        }
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn dungeon_type(&self) -> &DungeonType {
        &self.dungeon_type
    }

    /// Gets the pack owning this template's type, if any.
    pub fn owner(&self) -> Option<PackId> {
        self.dungeon_type.owner()
    }

    /// Gets the template's file name with the schematic extension removed.
    pub fn name(&self) -> &str {
        utils::template_name(&self.source_path)
    }
}
