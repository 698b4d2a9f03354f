use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tilescape::config::{self, GeneratorConfig};
use tilescape::errors::TilescapeResult;
use tilescape::generator::{Landscape, LandscapeBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod mapgen {
    pub mod cli_utils;
}

use mapgen::cli_utils::*;

#[derive(Parser, Clone)]
#[command(name = "mapgen")]
#[command(about = "Generate a tile landscape with lakes, rivers, settlements and roads")]
struct Args {
    /// Grid size in tiles (format: WIDTHxHEIGHT)
    #[arg(long, default_value = "50x50")]
    size: String,

    /// Random seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,

    /// Output file; `.json` writes JSON, anything else bincode
    #[arg(long, default_value = "landscape.json")]
    output: String,

    /// Generator config (TOML). Defaults to the user config if one exists
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default config to the user config directory and exit
    #[arg(long)]
    write_default_config: bool,

    /// Skip placing unused catalog tiles after baking
    #[arg(long)]
    no_coverage: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .init();
}

fn resolve_config(args: &Args) -> TilescapeResult<GeneratorConfig> {
    let mut generator_config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };
    if args.no_coverage {
        generator_config.resolver.coverage_enabled = false;
    }
    Ok(generator_config)
}

fn main() -> TilescapeResult<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    if args.write_default_config {
        let path = config::save_config(&GeneratorConfig::default())?;
        println!("Default config written to: {}", path.display());
        return Ok(());
    }

    let (width, height) = parse_size(&args.size)?;
    validate_output_path(&args.output)?;
    let generator_config = resolve_config(&args)?;

    let generator = LandscapeBuilder::new(width, height)
        .seed(args.seed)
        .config(generator_config)
        .build()?;
    let landscape = generator.generate()?;

    landscape.to_document().save_to_file(&args.output)?;
    info!("Landscape written to {}", args.output);

    print_landscape_summary(&landscape, &args.output);
    Ok(())
}

fn print_landscape_summary(landscape: &Landscape, output: &str) {
    println!("Landscape saved successfully to: {output}");
    println!("\nLandscape summary:");
    println!(
        "  Grid: {}x{} ({} tiles), seed {}",
        landscape.width(),
        landscape.height(),
        landscape.grid.len(),
        landscape.seed
    );
    if landscape.degenerate {
        println!("  Grid too small for features; all tiles are default");
        return;
    }
    println!(
        "  Water bodies: {} covering {} cells",
        landscape.water_bodies.len(),
        landscape.water_bodies.iter().map(|b| b.len()).sum::<usize>()
    );
    println!(
        "  Settlements: {} ({} primary)",
        landscape.settlements.len(),
        landscape.settlements.iter().filter(|s| s.is_primary).count()
    );
    println!("  Rivers: {}", landscape.rivers.len());
    println!("  Roads: {}", landscape.roads.len());
    println!(
        "  Relaxation: {} passes, {} replacements, {} edge conflicts left",
        landscape.relaxation.passes, landscape.relaxation.changes, landscape.edge_conflicts
    );
    if !landscape.coverage.unplaced.is_empty() {
        println!("  Unplaced tile types: {}", landscape.coverage.unplaced.join(", "));
    }

    let mut type_counts = BTreeMap::new();
    for cell in &landscape.grid.cells {
        *type_counts.entry(cell.tile_type_id.as_str()).or_insert(0usize) += 1;
    }
    println!("  Tile types:");
    for (tile_type, count) in type_counts {
        println!("    {tile_type}: {count} tiles");
    }
}
