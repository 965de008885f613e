//! # In-Memory Dimension Graph
//!
//! A [`LinkGraph`] kept entirely in memory. Used by the command line simulator
//! and throughout the tests.

use super::{Coordinates, DimensionId, DimensionNode, Link, LinkGraph};
use crate::{DungeonTemplate, PocketDimError, PocketDimResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Dimensions keyed by id, each holding its outbound links in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DimensionGraph {
    dimensions: HashMap<DimensionId, DimensionNode>,
}

impl DimensionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dimension at depth 0.
    pub fn create_root(&mut self, id: DimensionId) -> &mut DimensionNode {
        self.create_dimension(id, 0)
    }

    /// Creates a dimension at a fixed depth, replacing any previous one with that id.
    pub fn create_dimension(&mut self, id: DimensionId, depth: u32) -> &mut DimensionNode {
        let node = self
            .dimensions
            .entry(id)
            .or_insert_with(|| DimensionNode::new(id, depth));
        *node = DimensionNode::new(id, depth);
        node
    }

    /// Creates a pocket one level below `source`, reached from `coords`.
    ///
    /// The pocket gets a forward link from the source and a link back out to
    /// the same position. Its exit link is inherited from the source, so every
    /// pocket of one tree exits where the tree was entered; a pocket made from a
    /// dimension without an exit link exits through its back link. Returns the
    /// forward link.
    ///
    /// # Examples
    ///
    /// ```
    /// use pocketdim::{Coordinates, DimensionGraph, LinkGraph};
    ///
    /// let mut graph = DimensionGraph::new();
    /// graph.create_root(0);
    /// let link = graph.create_pocket(0, Coordinates::new(1, 64, 1), 1).unwrap();
    ///
    /// assert_eq!(link.destination, 1);
    /// assert_eq!(graph.dimension(1).unwrap().depth, 1);
    /// assert_eq!(graph.links_from(1)[0].destination, 0);
    /// ```
    pub fn create_pocket(
        &mut self,
        source: DimensionId,
        coords: Coordinates,
        id: DimensionId,
    ) -> PocketDimResult<Link> {
        let (depth, inherited_exit) = self
            .dimensions
            .get(&source)
            .map(|node| (node.depth + 1, node.exit_link))
            .ok_or(PocketDimError::UnknownDimension(source))?;

        let entrance = Coordinates::default();
        let forward = Link::new(source, coords, id, entrance);
        let back = Link::new(id, entrance, source, coords);

        let pocket = self.create_dimension(id, depth);
        pocket.links.push(back);
        pocket.exit_link = Some(inherited_exit.unwrap_or(back));
        self.add_link(forward)?;
        Ok(forward)
    }

    /// Adds an outbound link to its source dimension.
    pub fn add_link(&mut self, link: Link) -> PocketDimResult<()> {
        let node = self
            .dimensions
            .get_mut(&link.source)
            .ok_or(PocketDimError::UnknownDimension(link.source))?;
        node.links.push(link);
        Ok(())
    }

    /// Sets the link leading back out of a dimension.
    pub fn set_exit_link(&mut self, id: DimensionId, link: Link) -> PocketDimResult<()> {
        let node = self
            .dimensions
            .get_mut(&id)
            .ok_or(PocketDimError::UnknownDimension(id))?;
        node.exit_link = Some(link);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

impl LinkGraph for DimensionGraph {
    fn dimension(&self, id: DimensionId) -> Option<&DimensionNode> {
        self.dimensions.get(&id)
    }

    fn link_at(&self, dimension: DimensionId, coords: Coordinates) -> Option<&Link> {
        self.dimensions
            .get(&dimension)?
            .links
            .iter()
            .find(|link| link.source_coords == coords)
    }

    fn set_assigned_template(
        &mut self,
        id: DimensionId,
        template: Arc<DungeonTemplate>,
    ) -> PocketDimResult<()> {
        let node = self
            .dimensions
            .get_mut(&id)
            .ok_or(PocketDimError::UnknownDimension(id))?;
        node.template = Some(template);
        Ok(())
    }
}
