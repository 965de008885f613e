//! # Pocketdim Command Line Entry Point
//!
//! Registers dungeon packs from disk and lists them, or simulates a chain of
//! pocket dimensions with the selection engine.

use clap::{Parser, Subcommand};
use log::info;
use pocketdim::config::RUINS_PACK_NAME;
use pocketdim::{
    create_rng, Coordinates, DimensionGraph, DungeonRegistry, FsResources, PocketDimError,
    PocketDimResult, RegistrationConfig, SelectionOutcome,
};
use std::path::PathBuf;

/// Command line arguments for pocketdim.
#[derive(Parser, Debug)]
#[command(name = "pocketdim")]
#[command(about = "Dungeon pack selection for chained pocket dimensions")]
#[command(version)]
struct Args {
    /// Root directory of the bundled schematics
    #[arg(long)]
    bundled: Option<PathBuf>,

    /// Directory of custom dungeons and dungeon packs
    #[arg(long)]
    custom: Option<PathBuf>,

    /// Registration config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for selection
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the name of every known dungeon
    List,
    /// Print every registered pack with its settings
    Packs,
    /// Follow a chain of links from a root dimension
    Simulate {
        /// Number of pockets to create
        #[arg(long, default_value_t = 10)]
        levels: u32,
    },
}

fn main() -> PocketDimResult<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level)).init();

    info!("Starting pocketdim v{}", pocketdim::VERSION);

    let registry = load_registry(&args)?;
    match args.command {
        Command::List => {
            for name in registry.list_known_template_names()? {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Packs => {
            print_packs(&registry);
            Ok(())
        }
        Command::Simulate { levels } => simulate(&registry, levels, args.seed.unwrap_or(12345)),
    }
}

fn load_registry(args: &Args) -> PocketDimResult<DungeonRegistry> {
    let mut config = match &args.config {
        Some(path) => RegistrationConfig::from_json_file(path)?,
        None => RegistrationConfig::default(),
    };
    if let Some(bundled) = &args.bundled {
        config.bundled_root = bundled.clone();
    }
    if let Some(custom) = &args.custom {
        config.custom_directory = Some(custom.clone());
    }

    let mut registry = DungeonRegistry::new();
    registry.register_all_templates(&config, &FsResources::new())?;
    Ok(registry)
}

fn print_packs(registry: &DungeonRegistry) {
    println!("{:<16} {:>6} {:>4} {:>4} {:>9}", "PACK", "WEIGHT", "IN", "OUT", "TEMPLATES");
    for pack in registry.packs().all_packs() {
        let config = pack.config();
        println!(
            "{:<16} {:>6} {:>4} {:>4} {:>9}",
            pack.name(),
            config.pack_weight(),
            yes_no(config.allow_switch_in()),
            yes_no(config.allow_switch_out()),
            pack.len()
        );
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn simulate(registry: &DungeonRegistry, levels: u32, seed: u64) -> PocketDimResult<()> {
    info!("Simulating {} levels with seed {}", levels, seed);

    let mut rng = create_rng(seed);
    let mut graph = DimensionGraph::new();
    graph.create_root(0);

    let mut current = registry
        .pack_for_dimension(&graph, 0)
        .ok_or_else(|| PocketDimError::UnknownPack(RUINS_PACK_NAME.to_string()))?;

    for level in 1..=levels as i32 {
        let link = graph.create_pocket(level - 1, Coordinates::new(level, 64, 0), level)?;
        let outcome = registry.generate_next_dungeon(&mut graph, &link, current, &mut rng);

        let (template, fallback) = match outcome {
            SelectionOutcome::Fatal(reason) => return Err(reason),
            SelectionOutcome::Selected(template) => (template, false),
            SelectionOutcome::Fallback { template, .. } => (template, true),
        };

        let pack_name = template
            .owner()
            .and_then(|id| registry.pack(id))
            .map_or("-", |pack| pack.name());
        let marker = if fallback { " (fallback)" } else { "" };
        println!("{:>3}  {:<16} {}{}", level, pack_name, template.source_path(), marker);

        current = registry.pack_for_dimension(&graph, level).unwrap_or(current);
    }

    Ok(())
}
