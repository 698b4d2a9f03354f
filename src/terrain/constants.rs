/// Constants for landscape generation

/// Grid defaults
pub const DEFAULT_GRID_WIDTH: u32 = 50;
pub const DEFAULT_GRID_HEIGHT: u32 = 50;

/// Elevation octaves as (frequency, amplitude), large features first
pub const ELEVATION_OCTAVES: [(f64, f64); 4] = [(0.02, 100.0), (0.05, 50.0), (0.1, 25.0), (0.2, 12.0)];

/// Moisture seed points and falloff
pub const MOISTURE_SEED_POINTS: usize = 5;
pub const MOISTURE_MAX: f64 = 100.0;
pub const MOISTURE_FALLOFF_PER_CELL: f64 = 2.0;

/// Water body generation
pub const DEFAULT_WATER_BODIES_MIN: u32 = 1;
pub const DEFAULT_WATER_BODIES_MAX: u32 = 3;
pub const WATER_RADIUS_MIN: u32 = 3;
pub const WATER_RADIUS_MAX: u32 = 7;
pub const WATER_CENTER_MARGIN: f64 = 0.2;
pub const WATER_CENTER_SPAN: f64 = 0.6;
pub const WATER_EDGE_NOISE_FREQUENCY: f64 = 0.2;
pub const WATER_EDGE_NOISE_AMPLITUDE: f64 = 2.0;

/// Settlement clusters
pub const DEFAULT_CLUSTERS_MIN: u32 = 2;
pub const DEFAULT_CLUSTERS_MAX: u32 = 4;
pub const DEFAULT_SATELLITES_MIN: u32 = 1;
pub const DEFAULT_SATELLITES_MAX: u32 = 4;
pub const CLUSTER_CENTER_ATTEMPTS: u32 = 20;
pub const CLUSTER_CENTER_MARGIN: f64 = 0.15;
pub const CLUSTER_CENTER_SPAN: f64 = 0.7;
pub const CLUSTER_MIN_WATER_DISTANCE: f64 = 6.0;
pub const SATELLITE_RADIUS_MIN: u32 = 3;
pub const SATELLITE_RADIUS_MAX: u32 = 6;
pub const SATELLITE_MIN_SPACING: f64 = 2.0;
pub const MIXED_CLUSTER_CHANCE: f64 = 0.5;
pub const MIXED_PRIMARY_TYPE_CHANCE: f64 = 0.7;

/// River routing
pub const DEFAULT_RIVERS_MIN: u32 = 2;
pub const DEFAULT_RIVERS_MAX: u32 = 4;
pub const RIVER_FROM_LAKE_CHANCE: f64 = 0.6;
pub const RIVER_TO_LAKE_CHANCE: f64 = 0.7;
pub const RIVER_SOURCE_MIN_ELEVATION: f64 = 60.0;
pub const RIVER_MOUTH_MAX_ELEVATION: f64 = 30.0;
pub const RIVER_ENDPOINT_CANDIDATES: usize = 5;
pub const DOWNHILL_COST_FACTOR: f64 = 0.5;
pub const UPHILL_COST_FACTOR: f64 = 2.0;
pub const STEP_JITTER_MIN: f64 = 0.8;
pub const STEP_JITTER_MAX: f64 = 1.2;
pub const MEANDER_CHANCE: f64 = 0.7;
pub const MEANDER_MIN_PATH_LENGTH: usize = 5;
pub const MEANDER_MIN_SEGMENT_LENGTH: f64 = 2.0;
pub const MEANDER_BEND_MIN: f64 = 0.5;
pub const MEANDER_BEND_MAX: f64 = 1.0;

/// A* works on fixed-point costs so they stay `Ord`
pub const ASTAR_COST_SCALE: f64 = 1000.0;

/// Biased random walk
pub const DEFAULT_WALK_BIAS: f64 = 0.8;
pub const DETOUR_OUTBOUND_BIAS: f64 = 0.6;
pub const DETOUR_RETURN_BIAS: f64 = 0.7;
pub const DETOUR_MIDPOINT_JITTER: i64 = 3;

/// Road network
pub const CLUSTER_LINK_DISTANCE: f64 = 6.0;
pub const FALLBACK_LINKED_SETTLEMENTS: usize = 3;
pub const DEFAULT_BRANCHES_MIN: u32 = 1;
pub const DEFAULT_BRANCHES_MAX: u32 = 3;
pub const SPUR_CHANCE: f64 = 0.5;
pub const SPUR_SAMPLE_RATE: f64 = 0.1;
pub const DETOUR_MIN_ROAD_LENGTH: usize = 10;

/// Decorations
pub const DEFAULT_MOUNTAIN_ATTEMPTS_MIN: u32 = 1;
pub const DEFAULT_MOUNTAIN_ATTEMPTS_MAX: u32 = 3;
pub const MOUNTAIN_MIN_ELEVATION: f64 = 50.0;

/// Tile resolution
pub const DEFAULT_RELAXATION_PASSES: u32 = 3;
pub const COVERAGE_PLACEMENT_ATTEMPTS: u32 = 50;

/// Grids with fewer cells than this skip every feature stage
pub const MIN_FEATURE_GRID_CELLS: usize = 2;
