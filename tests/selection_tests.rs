//! Integration tests for pack switching and template selection.

use pocketdim::config::{MAX_PACK_SWITCH_CHANCE, START_PACK_SWITCH_CHANCE};
use pocketdim::{
    create_rng, pack_depth, pack_switch_chance, Coordinates, DimensionGraph, DungeonRegistry,
    LifecycleError, LinkGraph, MemoryResources, PackId, PocketDimError, RegistrationConfig,
    SelectionOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Registry with a Ruins pack plus the packs given as `(name, rules.json, templates)`.
fn registry_with(packs: &[(&str, &str, &[&str])]) -> DungeonRegistry {
    let mut resources = MemoryResources::new()
        .with_bundle_list(
            "bundled/ruins.txt",
            "ruins/Hub_Atrium_open.schematic\nruins/Maze_Hall_open.schematic\nruins/Exit_Gate_open.schematic",
        )
        .with_config(
            "bundled/ruins/rules.json",
            r#"{ "types": ["Hub", "Maze", "Exit"], "settings": { "allow_duplicates_in_chain": false } }"#,
        )
        .with_templates("custom", Vec::<String>::new());

    for (name, rules, templates) in packs {
        let directory = format!("custom/{}", name);
        resources = resources
            .with_pack_directory("custom", directory.clone())
            .with_templates(
                directory.clone(),
                templates.iter().map(|t| format!("{}/{}", directory, t)),
            )
            .with_config(format!("{}/rules.json", directory), *rules);
    }

    let mut registry = DungeonRegistry::new();
    let config = RegistrationConfig::new("bundled").with_custom_directory("custom");
    registry.register_all_templates(&config, &resources).unwrap();
    registry
}

fn ruins(registry: &DungeonRegistry) -> PackId {
    registry.ruins_pack().unwrap()
}

#[test]
fn test_switch_chance_values() {
    assert_eq!(START_PACK_SWITCH_CHANCE, MAX_PACK_SWITCH_CHANCE / 9);
    assert_eq!(pack_switch_chance(1), 0);
    assert_eq!(pack_switch_chance(30), 29);
    assert_eq!(pack_switch_chance(501), MAX_PACK_SWITCH_CHANCE);
    assert_eq!(pack_switch_chance(2000), MAX_PACK_SWITCH_CHANCE);
}

#[test]
fn test_selection_before_registration_is_fatal() {
    let registry = DungeonRegistry::new();
    let mut graph = DimensionGraph::new();
    graph.create_root(0);
    let link = graph.create_pocket(0, Coordinates::new(0, 64, 0), 1).unwrap();

    let outcome = registry.generate_next_dungeon(&mut graph, &link, PackId(0), &mut create_rng(1));
    assert!(matches!(
        outcome,
        SelectionOutcome::Fatal(PocketDimError::Lifecycle(LifecycleError::NotRegistered))
    ));
    assert!(graph.dimension(1).unwrap().template.is_none());
}

#[test]
fn test_selected_template_is_written_to_destination() {
    let registry = registry_with(&[]);
    let mut graph = DimensionGraph::new();
    graph.create_root(0);
    let link = graph.create_pocket(0, Coordinates::new(0, 64, 0), 1).unwrap();

    let outcome = registry.generate_next_dungeon(&mut graph, &link, ruins(&registry), &mut create_rng(5));
    assert!(outcome.is_selected());
    assert_eq!(graph.dimension(1).unwrap().template.as_ref(), outcome.template());
    assert_eq!(registry.pack_for_dimension(&graph, 1), Some(ruins(&registry)));
}

#[test]
fn test_no_switch_out_never_leaves_pack() {
    let registry = registry_with(&[
        (
            "locked",
            r#"{ "types": ["Cell"], "settings": { "allow_switch_out": false } }"#,
            &["Cell_A_open.schematic", "Cell_B_open.schematic"],
        ),
        ("open", r#"{ "types": ["Room"] }"#, &["Room_A_open.schematic"]),
    ]);
    let locked = registry.lookup_pack("LOCKED").unwrap();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = DimensionGraph::new();
        graph.create_root(0);
        let mut current = locked;
        for level in 1..=40 {
            let link = graph
                .create_pocket(level - 1, Coordinates::new(level, 64, 0), level)
                .unwrap();
            let outcome = registry.generate_next_dungeon(&mut graph, &link, current, &mut rng);
            assert_eq!(outcome.template().unwrap().owner(), Some(locked));
            current = registry.pack_for_dimension(&graph, level).unwrap();
        }
    }
}

#[test]
fn test_root_links_switch_at_start_chance() {
    let registry = registry_with(&[("open", r#"{ "types": ["Room"] }"#, &["Room_A_open.schematic"])]);
    let ruins = ruins(&registry);
    let mut rng = create_rng(2024);
    let trials = 20_000;
    let mut switched = 0;

    for _ in 0..trials {
        let mut graph = DimensionGraph::new();
        graph.create_root(0);
        let link = graph.create_pocket(0, Coordinates::new(0, 64, 0), 1).unwrap();
        let outcome = registry.generate_next_dungeon(&mut graph, &link, ruins, &mut rng);
        if outcome.template().unwrap().owner() != Some(ruins) {
            switched += 1;
        }
    }

    let observed = switched as f64 / trials as f64;
    let expected = START_PACK_SWITCH_CHANCE as f64 / MAX_PACK_SWITCH_CHANCE as f64;
    assert!((observed - expected).abs() < 0.01, "observed {}", observed);
}

#[test]
fn test_switch_target_must_allow_switch_in_and_be_non_empty() {
    let registry = registry_with(&[
        (
            "closed",
            r#"{ "types": ["Room"], "settings": { "allow_switch_in": false } }"#,
            &["Room_A_open.schematic"],
        ),
        ("empty", r#"{ "types": ["Room"] }"#, &[]),
        ("target", r#"{ "types": ["Room"] }"#, &["Room_B_open.schematic"]),
    ]);
    let target = registry.lookup_pack("target").unwrap();
    let mut rng = create_rng(9);

    for _ in 0..50 {
        assert_eq!(registry.random_other_pack(ruins(&registry), &mut rng).unwrap(), target);
    }
    // With no eligible candidate the current pack is kept.
    assert_eq!(registry.random_other_pack(target, &mut rng).unwrap(), ruins(&registry));
    let only_ruins = registry_with(&[]);
    assert_eq!(
        only_ruins.random_other_pack(ruins(&only_ruins), &mut rng).unwrap(),
        ruins(&only_ruins)
    );
}

#[test]
fn test_empty_pack_falls_back_to_error_template() {
    let registry = registry_with(&[(
        "hollow",
        r#"{ "types": ["Room"], "settings": { "allow_switch_out": false } }"#,
        &[],
    )]);
    let hollow = registry.lookup_pack("hollow").unwrap();
    let mut graph = DimensionGraph::new();
    graph.create_root(0);
    let link = graph.create_pocket(0, Coordinates::new(0, 64, 0), 1).unwrap();

    let outcome = registry.generate_next_dungeon(&mut graph, &link, hollow, &mut create_rng(3));
    match &outcome {
        SelectionOutcome::Fallback { template, reason } => {
            assert_eq!(template, registry.default_error());
            assert!(matches!(reason, PocketDimError::EmptySelection(_)));
        }
        other => panic!("expected a fallback, got {:?}", other),
    }
    assert_eq!(graph.dimension(1).unwrap().template.as_ref(), Some(registry.default_error()));
}

#[test]
fn test_missing_source_dimension_falls_back_within_pack() {
    let registry = registry_with(&[]);
    let ruins = ruins(&registry);
    let mut graph = DimensionGraph::new();
    graph.create_dimension(7, 3);
    let link = pocketdim::Link::new(99, Coordinates::default(), 7, Coordinates::default());

    let outcome = registry.generate_next_dungeon(&mut graph, &link, ruins, &mut create_rng(4));
    assert!(outcome.is_fallback());
    assert_eq!(outcome.template().unwrap().owner(), Some(ruins));
    assert!(graph.dimension(7).unwrap().template.is_some());
}

#[test]
fn test_chain_avoids_duplicates_when_disallowed() {
    let registry = registry_with(&[]);
    let ruins = ruins(&registry);

    for seed in 0..10 {
        let mut rng = create_rng(seed);
        let mut graph = DimensionGraph::new();
        graph.create_root(0);
        let mut names = Vec::new();
        for level in 1..=3 {
            let link = graph
                .create_pocket(level - 1, Coordinates::new(level, 64, 0), level)
                .unwrap();
            // Only the Ruins pack exists, so a decided switch keeps it.
            let outcome = registry.generate_next_dungeon(&mut graph, &link, ruins, &mut rng);
            names.push(outcome.template().unwrap().name().to_string());
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3, "seed {}", seed);
    }
}

#[test]
fn test_pack_depth_follows_assigned_templates() {
    let registry = registry_with(&[]);
    let ruins = ruins(&registry);
    let mut rng = create_rng(77);
    let mut graph = DimensionGraph::new();
    graph.create_root(0);

    let mut last = None;
    for level in 1..=5 {
        let link = graph
            .create_pocket(level - 1, Coordinates::new(level, 64, 0), level)
            .unwrap();
        registry.generate_next_dungeon(&mut graph, &link, ruins, &mut rng);
        last = Some(link);
    }

    let next = graph.create_pocket(5, Coordinates::new(6, 64, 0), 6).unwrap();
    assert_eq!(pack_depth(&graph, &next, ruins).unwrap(), 6);
    assert_eq!(pack_depth(&graph, &last.unwrap(), ruins).unwrap(), 5);
}
