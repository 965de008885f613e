//! # World Module
//!
//! The dimension/link graph the selection engine reads from and writes its
//! choice into.
//!
//! Dimensions and links are owned by the host world. This module defines the
//! [`LinkGraph`] surface the engine needs, an in-memory [`DimensionGraph`]
//! implementing it, and the traversal queries over it.

pub mod graph;
pub mod queries;

pub use graph::*;
pub use queries::*;

use crate::{DungeonTemplate, PocketDimResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier of a dimension in the host world.
pub type DimensionId = i32;

/// A block position inside a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A one-way connection from a position in one dimension to a position in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: DimensionId,
    pub source_coords: Coordinates,
    pub destination: DimensionId,
    pub dest_coords: Coordinates,
}

impl Link {
    pub fn new(
        source: DimensionId,
        source_coords: Coordinates,
        destination: DimensionId,
        dest_coords: Coordinates,
    ) -> Self {
        Self {
            source,
            source_coords,
            destination,
            dest_coords,
        }
    }
}

/// A dimension as seen by the engine.
///
/// Depth is fixed when the dimension is created.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionNode {
    pub id: DimensionId,
    pub depth: u32,
    pub template: Option<Arc<DungeonTemplate>>,
    /// Outbound links in creation order
    pub links: Vec<Link>,
    /// The link leading back out of this dimension, if it has one
    pub exit_link: Option<Link>,
}

impl DimensionNode {
    pub fn new(id: DimensionId, depth: u32) -> Self {
        Self {
            id,
            depth,
            template: None,
            links: Vec::new(),
            exit_link: None,
        }
    }
}

/// Read access to the dimension graph plus the single write the engine makes.
pub trait LinkGraph {
    /// Gets a dimension by id.
    fn dimension(&self, id: DimensionId) -> Option<&DimensionNode>;

    /// Finds the link that starts at the given position, if any.
    fn link_at(&self, dimension: DimensionId, coords: Coordinates) -> Option<&Link>;

    /// Records the template chosen for a dimension.
    fn set_assigned_template(
        &mut self,
        id: DimensionId,
        template: Arc<DungeonTemplate>,
    ) -> PocketDimResult<()>;

    /// Gets a dimension's outbound links in iteration order.
    ///
    /// Unknown dimensions have no links.
    fn links_from(&self, id: DimensionId) -> &[Link] {
        self.dimension(id)
            .map(|node| node.links.as_slice())
            .unwrap_or(&[])
    }
}
