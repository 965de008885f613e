//! # Selection Engine
//!
//! Decides which template to build at the far end of a link.
//!
//! The current pack may hand over to another pack with a probability that
//! grows with the number of consecutive levels already spent in it. The pack
//! that ends up selected then picks the template. Any failure along the way
//! falls back to a uniform pick from the current pack, and then to the fixed
//! error template.

use super::{sample, SelectionOutcome, WeightedItem};
use crate::config::{
    MAX_PACK_SWITCH_CHANCE, MIN_PACK_SWITCH_CHANCE, PACK_SWITCH_CHANCE_PER_LEVEL,
    START_PACK_SWITCH_CHANCE,
};
use crate::world::{pack_depth, Link, LinkGraph};
use crate::{DungeonRegistry, DungeonTemplate, PackId, PocketDimError, PocketDimResult};
use log::{debug, error};
use rand::Rng;
use std::sync::Arc;

/// Switch chance for a link leaving a non-root dimension, on the `[0, 500]` scale.
///
/// # Examples
///
/// ```
/// use pocketdim::pack_switch_chance;
///
/// assert_eq!(pack_switch_chance(1), 0);
/// assert_eq!(pack_switch_chance(11), 10);
/// assert_eq!(pack_switch_chance(10_000), 500);
/// ```
pub fn pack_switch_chance(pack_depth: u32) -> u32 {
    let chance = MIN_PACK_SWITCH_CHANCE
        .saturating_add(pack_depth.saturating_sub(1).saturating_mul(PACK_SWITCH_CHANCE_PER_LEVEL));
    chance.min(MAX_PACK_SWITCH_CHANCE)
}

impl DungeonRegistry {
    /// Chooses the template for the destination of `inbound` and records it there.
    ///
    /// `current` is the pack of the dimension the link leaves from. The
    /// outcome is `Fatal` only when templates have not been registered yet;
    /// in that case the graph is left untouched.
    pub fn generate_next_dungeon<G, R>(
        &self,
        graph: &mut G,
        inbound: &Link,
        current: PackId,
        rng: &mut R,
    ) -> SelectionOutcome
    where
        G: LinkGraph + ?Sized,
        R: Rng + ?Sized,
    {
        if let Err(e) = self.ensure_registered() {
            error!("Cannot select a dungeon for dimension {}: {}", inbound.destination, e);
            return SelectionOutcome::Fatal(e);
        }

        let outcome = match self.select_template(&*graph, inbound, current, rng) {
            Ok(template) => SelectionOutcome::Selected(template),
            Err(reason) => {
                error!(
                    "An error occurred while selecting a dungeon for dimension {}: {}",
                    inbound.destination, reason
                );
                let template = self
                    .pack(current)
                    .and_then(|pack| pack.random_template(rng).ok())
                    .unwrap_or_else(|| Arc::clone(self.default_error()));
                SelectionOutcome::Fallback { template, reason }
            }
        };

        if let Some(template) = outcome.template() {
            if let Err(e) = graph.set_assigned_template(inbound.destination, Arc::clone(template)) {
                error!(
                    "Could not record dungeon {} for dimension {}: {}",
                    template.name(),
                    inbound.destination,
                    e
                );
            }
        }

        outcome
    }

    /// Runs pack switching and template selection without any fallback.
    pub fn select_template<G, R>(
        &self,
        graph: &G,
        inbound: &Link,
        current: PackId,
        rng: &mut R,
    ) -> PocketDimResult<Arc<DungeonTemplate>>
    where
        G: LinkGraph + ?Sized,
        R: Rng + ?Sized,
    {
        let pack = self
            .pack(current)
            .ok_or_else(|| PocketDimError::UnknownPack(current.to_string()))?;
        let mut selected = current;

        if pack.config().allow_switch_out() {
            let source = graph
                .dimension(inbound.source)
                .ok_or(PocketDimError::UnknownDimension(inbound.source))?;
            let chance = if source.depth == 0 {
                START_PACK_SWITCH_CHANCE
            } else {
                pack_switch_chance(pack_depth(graph, inbound, current)?)
            };

            if rng.gen_range(0..MAX_PACK_SWITCH_CHANCE) < chance {
                selected = self.random_other_pack(current, rng)?;
            }
        }

        let pack = self
            .pack(selected)
            .ok_or_else(|| PocketDimError::UnknownPack(selected.to_string()))?;
        if selected != current {
            debug!("Switching dungeon packs for dimension {} to {}", inbound.destination, pack.name());
        }
        pack.next_template(graph, inbound, rng)
    }

    /// Picks a pack other than `current` by pack weight.
    ///
    /// Only non-empty packs that allow switching in are candidates. With no
    /// candidates, `current` is returned and no switch happens.
    pub fn random_other_pack<R>(&self, current: PackId, rng: &mut R) -> PocketDimResult<PackId>
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<WeightedItem<PackId>> = self
            .packs()
            .all_packs()
            .iter()
            .filter(|pack| {
                pack.id() != current && pack.config().allow_switch_in() && !pack.is_empty()
            })
            .map(|pack| WeightedItem::new(pack.id(), pack.config().pack_weight()))
            .collect();

        if candidates.is_empty() {
            return Ok(current);
        }
        Ok(*sample(&candidates, rng)?)
    }
}
