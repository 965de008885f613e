//! # Dungeon Packs
//!
//! A pack is a named, weighted collection of templates grouped by the types
//! its config declares. Packs pick their own next template from the chain of
//! templates leading up to a link.

use super::{ChainRule, DungeonPackConfig, DungeonTemplate, DungeonType, PackId};
use crate::config::{MAX_HISTORY_LENGTH, MAX_SUBTREE_LIST_SIZE};
use crate::generation::{sample, sample_index, WeightedItem};
use crate::world::{ancestor_chain, descendant_tree, Link, LinkGraph};
use crate::{PocketDimError, PocketDimResult};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A named collection of templates sharing thematic types.
#[derive(Debug, Clone)]
pub struct DungeonPack {
    id: PackId,
    config: DungeonPackConfig,
    types: HashMap<String, DungeonType>,
    grouped: HashMap<String, Vec<Arc<DungeonTemplate>>>,
    templates: Vec<Arc<DungeonTemplate>>,
    /// Config rules, longest condition first
    rules: Vec<ChainRule>,
    max_rule_length: usize,
}

impl DungeonPack {
    /// Creates an empty pack owning one type per declared type name.
    pub fn new(id: PackId, config: DungeonPackConfig) -> Self {
        let types = config
            .declared_types()
            .iter()
            .map(|name| (name.clone(), DungeonType::new(name.clone(), id)))
            .collect();

        let mut rules = config.rules.clone();
        // Stable sort keeps file order among rules of equal length.
        rules.sort_by(|a, b| b.condition.len().cmp(&a.condition.len()));
        let max_rule_length = rules.first().map_or(0, |rule| rule.condition.len());

        Self {
            id,
            config,
            types,
            grouped: HashMap::new(),
            templates: Vec::new(),
            rules,
            max_rule_length,
        }
    }

    pub fn id(&self) -> PackId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn config(&self) -> &DungeonPackConfig {
        &self.config
    }

    /// Checks whether the pack's config declares a type (case-sensitive).
    pub fn is_known_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get_type(&self, name: &str) -> Option<&DungeonType> {
        self.types.get(name)
    }

    /// A pack is empty when it owns no templates of any type.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Gets every template in insertion order.
    pub fn templates(&self) -> &[Arc<DungeonTemplate>] {
        &self.templates
    }

    /// Gets the templates of one type in insertion order.
    pub fn templates_of_type(&self, type_name: &str) -> &[Arc<DungeonTemplate>] {
        self.grouped
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Adds a template whose type this pack owns.
    pub fn add_template(&mut self, template: Arc<DungeonTemplate>) -> PocketDimResult<()> {
        let type_name = template.dungeon_type().name();
        if template.owner() != Some(self.id) || !self.is_known_type(type_name) {
            return Err(PocketDimError::ForeignTemplate {
                path: template.source_path().to_string(),
                pack: self.name().to_string(),
            });
        }

        self.grouped
            .entry(type_name.to_string())
            .or_default()
            .push(Arc::clone(&template));
        self.templates.push(template);
        Ok(())
    }

    /// Picks any template with equal probability.
    pub fn random_template<R: Rng + ?Sized>(&self, rng: &mut R) -> PocketDimResult<Arc<DungeonTemplate>> {
        if self.templates.is_empty() {
            return Err(PocketDimError::EmptySelection(format!(
                "dungeon pack {} has no templates",
                self.name()
            )));
        }
        let index = rng.gen_range(0..self.templates.len());
        Ok(Arc::clone(&self.templates[index]))
    }

    /// Picks the template to build at the far end of `inbound`.
    ///
    /// The chain of same-pack templates leading to the link's source drives
    /// the chain rules. When duplicates are not allowed, templates already in
    /// the chain or in the surrounding tree are avoided while alternatives exist.
    pub fn next_template<G, R>(
        &self,
        graph: &G,
        inbound: &Link,
        rng: &mut R,
    ) -> PocketDimResult<Arc<DungeonTemplate>>
    where
        G: LinkGraph + ?Sized,
        R: Rng + ?Sized,
    {
        if self.is_empty() {
            return Err(PocketDimError::EmptySelection(format!(
                "dungeon pack {} has no templates",
                self.name()
            )));
        }

        let allow_duplicates = self.config.allow_duplicates_in_chain();
        let history_limit = if allow_duplicates {
            self.max_rule_length
        } else {
            MAX_HISTORY_LENGTH
        };
        let history = ancestor_chain(graph, inbound.source, self.id, history_limit);

        let subtree = if allow_duplicates {
            Vec::new()
        } else {
            descendant_tree(graph, inbound.source, MAX_SUBTREE_LIST_SIZE)
        };
        let excluded: HashSet<&str> = if allow_duplicates {
            HashSet::new()
        } else {
            history
                .iter()
                .chain(subtree.iter())
                .map(|template| template.source_path())
                .collect()
        };

        self.select_from_history(&history, &excluded, rng)
    }

    /// Applies the chain rules to a history given most recent first.
    pub fn select_from_history<R: Rng + ?Sized>(
        &self,
        history: &[Arc<DungeonTemplate>],
        excluded: &HashSet<&str>,
        rng: &mut R,
    ) -> PocketDimResult<Arc<DungeonTemplate>> {
        let type_history: Vec<&str> = history
            .iter()
            .rev()
            .map(|template| template.dungeon_type().name())
            .collect();

        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&type_history)) {
            let mut products: Vec<WeightedItem<&str>> = rule
                .products
                .iter()
                .map(|product| WeightedItem::new(product.type_name.as_str(), product.weight))
                .collect();

            while !products.is_empty() {
                let index = sample_index(&products, rng)?;
                let type_name = products.remove(index).into_value();
                let candidates = weighted(self.templates_of_type(type_name), excluded);
                if !candidates.is_empty() {
                    return Ok(Arc::clone(sample(&candidates, rng)?));
                }
            }
        }

        let mut candidates = weighted(&self.templates, excluded);
        if candidates.is_empty() {
            candidates = weighted(&self.templates, &HashSet::new());
        }
        Ok(Arc::clone(sample(&candidates, rng)?))
    }
}

fn weighted<'a>(
    templates: &'a [Arc<DungeonTemplate>],
    excluded: &HashSet<&str>,
) -> Vec<WeightedItem<&'a Arc<DungeonTemplate>>> {
    templates
        .iter()
        .filter(|template| !excluded.contains(template.source_path()))
        .map(|template| WeightedItem::new(template, template.weight()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::create_rng;

    fn template(pack: &DungeonPack, type_name: &str, name: &str, weight: u32) -> Arc<DungeonTemplate> {
        let dungeon_type = pack.get_type(type_name).cloned().unwrap();
        Arc::new(DungeonTemplate::new(
            weight,
            format!("/packs/test/{}_{}_open.schematic", type_name, name),
            true,
            dungeon_type,
        ))
    }

    fn rule_pack() -> DungeonPack {
        let config = DungeonPackConfig::new("TEST", ["Hub", "Maze", "Exit"])
            .with_rule(ChainRule::new(&[], &[("Hub", 1)]))
            .with_rule(ChainRule::new(&["Hub"], &[("Maze", 1)]))
            .with_rule(ChainRule::new(&["Hub", "Maze"], &[("Exit", 1)]));
        let mut pack = DungeonPack::new(PackId(0), config);
        for (type_name, name) in [("Hub", "A"), ("Maze", "B"), ("Exit", "C")] {
            let template = template(&pack, type_name, name, 100);
            pack.add_template(template).unwrap();
        }
        pack
    }

    #[test]
    fn test_new_pack_is_empty() {
        let pack = DungeonPack::new(PackId(2), DungeonPackConfig::new("EMPTY", ["Hub"]));
        assert!(pack.is_empty());
        assert!(pack.is_known_type("Hub"));
        assert!(!pack.is_known_type("hub"));
        assert_eq!(pack.get_type("Hub").unwrap().owner(), Some(PackId(2)));
        assert!(pack.random_template(&mut create_rng(1)).is_err());
    }

    #[test]
    fn test_add_template_rejects_foreign_type() {
        let mut pack = DungeonPack::new(PackId(0), DungeonPackConfig::new("A", ["Hub"]));
        let foreign = Arc::new(DungeonTemplate::new(
            100,
            "/x/Hub_X_open.schematic",
            true,
            DungeonType::new("Hub", PackId(1)),
        ));
        assert!(matches!(
            pack.add_template(foreign),
            Err(PocketDimError::ForeignTemplate { .. })
        ));

        let unknown = Arc::new(DungeonTemplate::new(100, "/x/junk.schematic", true, DungeonType::unknown()));
        assert!(pack.add_template(unknown).is_err());
        assert!(pack.is_empty());
    }

    #[test]
    fn test_templates_grouped_by_type() {
        let pack = rule_pack();
        assert_eq!(pack.len(), 3);
        assert_eq!(pack.templates_of_type("Maze").len(), 1);
        assert!(pack.templates_of_type("Trap").is_empty());
    }

    #[test]
    fn test_longest_matching_rule_wins() {
        let pack = rule_pack();
        let hub = pack.templates_of_type("Hub")[0].clone();
        let maze = pack.templates_of_type("Maze")[0].clone();
        let mut rng = create_rng(7);
        let none = HashSet::new();

        for _ in 0..20 {
            let first = pack.select_from_history(&[], &none, &mut rng).unwrap();
            assert_eq!(first.dungeon_type().name(), "Hub");

            let second = pack.select_from_history(&[hub.clone()], &none, &mut rng).unwrap();
            assert_eq!(second.dungeon_type().name(), "Maze");

            // History is most recent first.
            let third = pack
                .select_from_history(&[maze.clone(), hub.clone()], &none, &mut rng)
                .unwrap();
            assert_eq!(third.dungeon_type().name(), "Exit");
        }
    }

    #[test]
    fn test_excluded_product_falls_through_to_next_product() {
        let config = DungeonPackConfig::new("TEST", ["Hub", "Maze"])
            .with_rule(ChainRule::new(&[], &[("Hub", 10_000), ("Maze", 1)]));
        let mut pack = DungeonPack::new(PackId(0), config);
        let hub = template(&pack, "Hub", "Only", 100);
        let maze = template(&pack, "Maze", "Only", 100);
        pack.add_template(hub.clone()).unwrap();
        pack.add_template(maze.clone()).unwrap();

        let excluded: HashSet<&str> = [hub.source_path()].into_iter().collect();
        let mut rng = create_rng(3);
        for _ in 0..20 {
            let selection = pack.select_from_history(&[], &excluded, &mut rng).unwrap();
            assert_eq!(selection, maze);
        }
    }

    #[test]
    fn test_everything_excluded_still_selects() {
        let pack = rule_pack();
        let excluded: HashSet<&str> = pack.templates().iter().map(|t| t.source_path()).collect();
        let mut rng = create_rng(11);
        let selection = pack.select_from_history(&[], &excluded, &mut rng).unwrap();
        assert!(pack.templates().contains(&selection));
    }
}
