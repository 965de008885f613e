//! # Pocketdim
//!
//! Dungeon pack selection and link-graph traversal for chained pocket dimensions.
//!
//! ## Architecture Overview
//!
//! Pocketdim decides which dungeon template to build next when a link into a
//! fresh pocket dimension is followed. The core architecture revolves around a
//! few key concepts:
//!
//! - **Templates and Packs**: validated dungeon templates grouped by type into
//!   named, weighted packs loaded from disk at startup
//! - **Registry**: the explicitly constructed owner of every pack and template,
//!   including the fixed fallback templates
//! - **Link Graph**: a read-mostly view over the dimensions and the links
//!   between them, used for ancestor and descendant queries
//! - **Selection Engine**: depth-scaled pack switching followed by weighted
//!   template selection, with a guaranteed fallback result
//!
//! Registration happens once, before any selection query. Every query after
//! that is synchronous and bounded.

pub mod dungeon;
pub mod generation;
pub mod utils;
pub mod world;

pub use dungeon::*;
pub use generation::*;
pub use utils::*;
pub use world::*;

/// Core error type for the pocketdim engine.
#[derive(thiserror::Error, Debug)]
pub enum PocketDimError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A pack configuration could not be loaded
    #[error("Pack configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A template resource path has no usable file name
    #[error("Invalid template path: {0}")]
    InvalidTemplatePath(String),

    /// A weighted or uniform selection had nothing to choose from
    #[error("Empty selection: {0}")]
    EmptySelection(String),

    /// A weight outside the accepted range reached the sampler
    #[error("Invalid weight {weight} for {item}")]
    InvalidWeight { item: String, weight: u32 },

    /// A template was offered to a pack that does not own its type
    #[error("Template {path} does not belong to pack {pack}")]
    ForeignTemplate { path: String, pack: String },

    /// A pack id or name is not registered
    #[error("Unknown dungeon pack: {0}")]
    UnknownPack(String),

    /// A dimension id is not present in the link graph
    #[error("Unknown dimension: {0}")]
    UnknownDimension(DimensionId),

    /// Registration ordering was violated
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Startup-ordering violations. These indicate a bug in the caller, not bad data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("dungeon templates have already been registered")]
    AlreadyRegistered,

    #[error("dungeon registry queried before templates were registered")]
    NotRegistered,
}

/// Result type used throughout the pocketdim codebase.
pub type PocketDimResult<T> = Result<T, PocketDimError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Lowest pack switch chance, before per-level increments
    pub const MIN_PACK_SWITCH_CHANCE: u32 = 0;

    /// Switch chance added for every consecutive level spent in one pack
    pub const PACK_SWITCH_CHANCE_PER_LEVEL: u32 = 1;

    /// Scale of the switch chance; a draw in `[0, MAX)` is compared against it
    pub const MAX_PACK_SWITCH_CHANCE: u32 = 500;

    /// Switch chance for links leaving a root dimension
    pub const START_PACK_SWITCH_CHANCE: u32 = MAX_PACK_SWITCH_CHANCE / 9;

    /// Weight given to templates whose name carries no weight segment
    pub const DEFAULT_DUNGEON_WEIGHT: u32 = 100;

    /// Smallest accepted template weight
    pub const MIN_DUNGEON_WEIGHT: u32 = 1;

    /// Largest accepted template weight
    pub const MAX_DUNGEON_WEIGHT: u32 = 10000;

    /// Default weight of a pack when its config does not set one
    pub const DEFAULT_PACK_WEIGHT: u32 = 100;

    /// File extension every template resource must carry
    pub const SCHEMATIC_FILE_EXTENSION: &str = ".schematic";

    /// Name of the config file inside each pack directory
    pub const STANDARD_CONFIG_FILE_NAME: &str = "rules.json";

    /// Name of the catch-all pack that also receives stray templates
    pub const RUINS_PACK_NAME: &str = "RUINS";

    /// Fallback template used when a link leads upward
    pub const DEFAULT_UP_SCHEMATIC_PATH: &str = "/schematics/core/simpleStairsUp.schematic";

    /// Fallback template used when a link leads downward
    pub const DEFAULT_DOWN_SCHEMATIC_PATH: &str = "/schematics/core/simpleStairsDown.schematic";

    /// Fallback template used when selection fails entirely
    pub const DEFAULT_ERROR_SCHEMATIC_PATH: &str = "/schematics/core/somethingBroke.schematic";

    /// Longest chain history inspected when duplicates are not allowed
    pub const MAX_HISTORY_LENGTH: usize = 30;

    /// Most descendants collected when excluding duplicates from a subtree
    pub const MAX_SUBTREE_LIST_SIZE: usize = 30;
}
