use crate::config::GeneratorConfig;
use crate::errors::{TilescapeError, TilescapeResult};
use crate::map::{DocumentMetadata, Grid, LandscapeDocument, TileRecord};
use crate::terrain::constants::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, MIN_FEATURE_GRID_CELLS};
use crate::terrain::coordinates::GridCoord;
use crate::terrain::decorations::{finalize_decorative_rotations, place_mountains};
use crate::terrain::fields::{TerrainFields, generate_fields};
use crate::terrain::noise::NoiseField;
use crate::terrain::river_router::{River, RiverRouter};
use crate::terrain::roads::RoadNetworkBuilder;
use crate::terrain::settlements::{Settlement, SettlementPlanner};
use crate::terrain::water::{WaterBody, generate_water_bodies};
use crate::tiles::catalog::{TileCatalog, TileFamily};
use crate::tiles::resolver::{CoverageReport, RelaxationReport, TileResolver};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::collections::HashSet;
use tracing::{info, warn};

pub struct LandscapeBuilder {
    width: u32,
    height: u32,
    seed: Option<u64>,
    config: GeneratorConfig,
    catalog: TileCatalog,
}

impl LandscapeBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seed: None,
            config: GeneratorConfig::default(),
            catalog: TileCatalog::default(),
        }
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: TileCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn build(self) -> TilescapeResult<LandscapeGenerator> {
        if self.width == 0 || self.height == 0 {
            return Err(TilescapeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if let Some(missing) = self
            .catalog
            .palette()
            .ids()
            .into_iter()
            .find(|id| !self.catalog.contains(id))
        {
            return Err(TilescapeError::MissingPaletteTile {
                tile_id: missing.to_string(),
            });
        }

        self.config.check()?;

        Ok(LandscapeGenerator {
            width: self.width,
            height: self.height,
            seed: self.seed.unwrap_or_else(rand::random),
            config: self.config,
            catalog: self.catalog,
            noise: NoiseField::new(),
        })
    }
}

/// Immutable generator; every `generate` call is an independent, seeded run
#[derive(Debug, Clone)]
pub struct LandscapeGenerator {
    width: u32,
    height: u32,
    seed: u64,
    config: GeneratorConfig,
    catalog: TileCatalog,
    noise: NoiseField,
}

/// Per-run state threaded through the stages
struct GenerationContext {
    seed: u64,
    rng: Pcg64,
    grid: Grid,
    fields: TerrainFields,
    water_bodies: Vec<WaterBody>,
    settlements: Vec<Settlement>,
    rivers: Vec<River>,
    roads: Vec<Vec<GridCoord>>,
    protected: HashSet<usize>,
}

/// A finished run: the baked grid plus the artifacts it was built from
#[derive(Debug, Clone)]
pub struct Landscape {
    pub grid: Grid,
    pub seed: u64,
    pub water_bodies: Vec<WaterBody>,
    pub settlements: Vec<Settlement>,
    pub rivers: Vec<River>,
    pub roads: Vec<Vec<GridCoord>>,
    pub relaxation: RelaxationReport,
    pub coverage: CoverageReport,
    pub edge_conflicts: usize,
    /// Set when the grid was too small for any features
    pub degenerate: bool,
}

impl Default for LandscapeGenerator {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            seed: rand::random(),
            config: GeneratorConfig::default(),
            catalog: TileCatalog::default(),
            noise: NoiseField::new(),
        }
    }
}

impl LandscapeGenerator {
    /// Generator with the default config and catalog
    pub fn new(width: u32, height: u32) -> TilescapeResult<Self> {
        LandscapeBuilder::new(width, height).build()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn new_context(&self) -> TilescapeResult<GenerationContext> {
        Ok(GenerationContext {
            seed: self.seed,
            rng: Pcg64::seed_from_u64(self.seed),
            grid: Grid::new(self.width, self.height, self.catalog.default_tile())?,
            fields: TerrainFields::flat(self.width, self.height, 0.0),
            water_bodies: Vec::new(),
            settlements: Vec::new(),
            rivers: Vec::new(),
            roads: Vec::new(),
            protected: HashSet::new(),
        })
    }

    pub fn generate(&self) -> TilescapeResult<Landscape> {
        info!(
            "Generating {}x{} landscape with seed {}",
            self.width, self.height, self.seed
        );
        let mut ctx = self.new_context()?;

        if ctx.grid.len() < MIN_FEATURE_GRID_CELLS {
            warn!(
                "Grid {}x{} is too small for terrain features, emitting default tiles only",
                self.width, self.height
            );
            return Ok(Self::finish(ctx, RelaxationReport::default(), CoverageReport::default(), 0, true));
        }

        self.build_terrain(&mut ctx);
        self.place_features(&mut ctx);
        let (relaxation, edge_conflicts) = self.bake(&mut ctx);

        let resolver = TileResolver::new(&self.catalog);
        finalize_decorative_rotations(&mut ctx.grid, &self.catalog, &ctx.protected, &mut ctx.rng);

        let coverage = if self.config.resolver.coverage_enabled {
            resolver.complete_coverage(
                &mut ctx.grid,
                &ctx.protected,
                self.config.resolver.coverage_attempts,
                &mut ctx.rng,
            )
        } else {
            CoverageReport::default()
        };

        info!(
            "Generated landscape with {} settlements, {} water bodies, {} rivers, and {} roads",
            ctx.settlements.len(),
            ctx.water_bodies.len(),
            ctx.rivers.len(),
            ctx.roads.len()
        );
        Ok(Self::finish(ctx, relaxation, coverage, edge_conflicts, false))
    }

    /// Elevation, moisture and lakes
    fn build_terrain(&self, ctx: &mut GenerationContext) {
        ctx.fields = generate_fields(self.width, self.height, &self.noise, &mut ctx.rng);
        ctx.fields.write_into(&mut ctx.grid);

        let water = generate_water_bodies(
            self.width,
            self.height,
            &self.noise,
            &self.catalog,
            &self.config.water,
            &mut ctx.rng,
        );
        ctx.grid.apply(&water.placements);
        ctx.water_bodies = water.bodies;
    }

    /// Settlements, rivers and roads as artifacts; nothing is stamped yet
    fn place_features(&self, ctx: &mut GenerationContext) {
        ctx.settlements = SettlementPlanner::new(
            self.width,
            self.height,
            &ctx.water_bodies,
            self.catalog.palette(),
            &self.config.settlements,
        )
        .generate(&mut ctx.rng);

        ctx.rivers = RiverRouter::new(&ctx.fields, &ctx.water_bodies, &self.config.rivers)
            .route_rivers(&mut ctx.rng);

        ctx.roads = RoadNetworkBuilder::new(self.width, self.height, &ctx.settlements, &self.config.roads)
            .build(&mut ctx.rng);
    }

    /// Commit every artifact to the grid and relax the seams
    fn bake(&self, ctx: &mut GenerationContext) -> (RelaxationReport, usize) {
        let resolver = TileResolver::new(&self.catalog);

        ctx.protected = resolver.bake_settlements(&mut ctx.grid, &ctx.settlements, &mut ctx.rng);
        for river in &ctx.rivers {
            resolver.stamp_path(&mut ctx.grid, &river.points, TileFamily::Water, &ctx.protected);
        }
        for road in &ctx.roads {
            resolver.stamp_path(&mut ctx.grid, road, TileFamily::Road, &ctx.protected);
        }

        place_mountains(&mut ctx.grid, &self.catalog, &self.config.decorations, &mut ctx.rng);

        let report = resolver.relax(
            &mut ctx.grid,
            &ctx.protected,
            self.config.resolver.relaxation_passes,
        );
        info!(
            "Relaxation finished after {} passes with {} replacements",
            report.passes, report.changes
        );
        let conflicts = resolver.log_conflicts(&ctx.grid);
        (report, conflicts)
    }

    fn finish(
        ctx: GenerationContext,
        relaxation: RelaxationReport,
        coverage: CoverageReport,
        edge_conflicts: usize,
        degenerate: bool,
    ) -> Landscape {
        Landscape {
            grid: ctx.grid,
            seed: ctx.seed,
            water_bodies: ctx.water_bodies,
            settlements: ctx.settlements,
            rivers: ctx.rivers,
            roads: ctx.roads,
            relaxation,
            coverage,
            edge_conflicts,
            degenerate,
        }
    }
}

impl Landscape {
    pub fn width(&self) -> u32 {
        self.grid.width
    }

    pub fn height(&self) -> u32 {
        self.grid.height
    }

    /// Row-major records for the placement front-end
    pub fn export_tiles(&self) -> Vec<TileRecord> {
        self.grid.to_records()
    }

    /// Export with metadata, stamped with the current time
    pub fn to_document(&self) -> LandscapeDocument {
        LandscapeDocument {
            width: self.grid.width,
            height: self.grid.height,
            tiles: self.export_tiles(),
            metadata: DocumentMetadata {
                settlement_count: self.settlements.len(),
                river_count: self.rivers.len(),
                road_count: self.roads.len(),
                generated_at_timestamp: chrono::Utc::now().to_rfc3339(),
            },
        }
    }
}
