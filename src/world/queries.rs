//! # Link Graph Queries
//!
//! Parent and child relations are inferred from links and depths: a parent is
//! a linked dimension one level shallower, a child one level deeper. The graph
//! is not guaranteed to be a tree, so when several links qualify the first one
//! in link order is taken. Every query is read-only and bounded.

use super::{DimensionId, DimensionNode, Link, LinkGraph};
use crate::{DungeonTemplate, PackId, PocketDimError, PocketDimResult};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Finds the first linked dimension one level up whose template belongs to `pack`.
fn same_pack_parent<'g, G>(graph: &'g G, node: &DimensionNode, pack: PackId) -> Option<&'g DimensionNode>
where
    G: LinkGraph + ?Sized,
{
    let parent_depth = node.depth.checked_sub(1)?;
    graph.links_from(node.id).iter().find_map(|link| {
        graph.dimension(link.destination).filter(|neighbor| {
            neighbor.depth == parent_depth
                && neighbor
                    .template
                    .as_ref()
                    .is_some_and(|template| template.owner() == Some(pack))
        })
    })
}

/// Counts the consecutive same-pack levels ending at the link's destination.
///
/// The destination itself counts as 1; each same-pack parent found by walking
/// up adds one. Depth strictly decreases on every step, so the walk ends.
pub fn pack_depth<G>(graph: &G, inbound: &Link, pack: PackId) -> PocketDimResult<u32>
where
    G: LinkGraph + ?Sized,
{
    let mut tail = graph
        .dimension(inbound.destination)
        .ok_or(PocketDimError::UnknownDimension(inbound.destination))?;
    let mut depth = 1;

    while let Some(parent) = same_pack_parent(graph, tail, pack) {
        tail = parent;
        depth += 1;
    }

    Ok(depth)
}

/// Collects the templates of the same-pack chain ending at `node`, most recent first.
///
/// Empty when `node` is unknown, has no template, or its template belongs to
/// another pack.
pub fn ancestor_chain<G>(
    graph: &G,
    node: DimensionId,
    pack: PackId,
    max_size: usize,
) -> Vec<Arc<DungeonTemplate>>
where
    G: LinkGraph + ?Sized,
{
    let mut history = Vec::new();
    if max_size == 0 {
        return history;
    }

    let Some(mut tail) = graph.dimension(node) else {
        return history;
    };
    match &tail.template {
        Some(template) if template.owner() == Some(pack) => history.push(Arc::clone(template)),
        _ => return history,
    }

    while history.len() < max_size {
        let Some(parent) = same_pack_parent(graph, tail, pack) else {
            break;
        };
        if let Some(template) = &parent.template {
            history.push(Arc::clone(template));
        }
        tail = parent;
    }

    history
}

/// Finds the first dimension of the tree `node` belongs to.
///
/// That is the dimension behind the link found where `node`'s exit link leads.
fn tree_root<'g, G>(graph: &'g G, node: DimensionId) -> Option<&'g DimensionNode>
where
    G: LinkGraph + ?Sized,
{
    let exit = graph.dimension(node)?.exit_link?;
    let entrance = graph.link_at(exit.destination, exit.dest_coords)?;
    graph.dimension(entrance.destination)
}

/// Lists templates below the root of `node`'s tree, breadth first.
///
/// The root's own template is not included, and the root must have one.
/// Nodes without a template are skipped along with everything below them.
/// Each dimension is visited once even when several links reach it.
pub fn descendant_tree<G>(graph: &G, node: DimensionId, max_size: usize) -> Vec<Arc<DungeonTemplate>>
where
    G: LinkGraph + ?Sized,
{
    let mut templates = Vec::new();
    let Some(root) = tree_root(graph, node) else {
        return templates;
    };
    if root.template.is_none() || max_size == 0 {
        return templates;
    }

    let mut visited = HashSet::new();
    let mut pending = VecDeque::new();
    visited.insert(root.id);
    pending.push_back(root);

    while let Some(current) = pending.pop_front() {
        for link in graph.links_from(current.id) {
            let Some(child) = graph.dimension(link.destination) else {
                continue;
            };
            if child.depth != current.depth + 1 {
                continue;
            }
            let Some(template) = &child.template else {
                continue;
            };
            if !visited.insert(child.id) {
                continue;
            }

            templates.push(Arc::clone(template));
            if templates.len() == max_size {
                return templates;
            }
            pending.push_back(child);
        }
    }

    templates
}
