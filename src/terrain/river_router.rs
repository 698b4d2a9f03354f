use super::constants::*;
use super::coordinates::{GridCoord, perimeter_cells};
use super::fields::TerrainFields;
use super::walk::biased_walk;
use super::water::WaterBody;
use crate::config::range_types::{CountRange, JitterRange, Probability};
use pathfinding::prelude::astar;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RiverConfig {
    #[validate(nested)]
    pub count: CountRange,
    pub from_lake_chance: Probability,
    pub to_lake_chance: Probability,
    /// Per-step random cost multiplier
    #[validate(nested)]
    pub step_jitter: JitterRange,
    pub meander_chance: Probability,
    /// Bias of the fallback walk when A* finds nothing
    pub walk_bias: Probability,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            count: CountRange::new(DEFAULT_RIVERS_MIN, DEFAULT_RIVERS_MAX),
            from_lake_chance: Probability::new(RIVER_FROM_LAKE_CHANCE),
            to_lake_chance: Probability::new(RIVER_TO_LAKE_CHANCE),
            step_jitter: JitterRange::new(STEP_JITTER_MIN, STEP_JITTER_MAX),
            meander_chance: Probability::new(MEANDER_CHANCE),
            walk_bias: Probability::new(DEFAULT_WALK_BIAS),
        }
    }
}

/// How a river path was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    AStar,
    Walk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct River {
    pub points: Vec<GridCoord>,
    pub method: RouteMethod,
}

/// Routes rivers downhill between lakes, peaks and lowlands
pub struct RiverRouter<'a> {
    fields: &'a TerrainFields,
    water_bodies: &'a [WaterBody],
    config: &'a RiverConfig,
}

impl<'a> RiverRouter<'a> {
    pub fn new(fields: &'a TerrainFields, water_bodies: &'a [WaterBody], config: &'a RiverConfig) -> Self {
        Self {
            fields,
            water_bodies,
            config,
        }
    }

    pub fn route_rivers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<River> {
        let count = self.config.count.sample(rng);
        let rivers: Vec<River> = (0..count).map(|_| self.route_single(rng)).collect();

        info!(
            "Routed {} rivers ({} by fallback walk)",
            rivers.len(),
            rivers.iter().filter(|r| r.method == RouteMethod::Walk).count()
        );
        rivers
    }

    fn route_single<R: Rng + ?Sized>(&self, rng: &mut R) -> River {
        let start = self.pick_source(rng);
        let target = self.pick_mouth(start, rng);
        debug!(
            "River from ({}, {}) to ({}, {})",
            start.x, start.y, target.x, target.y
        );
        self.route(start, target, rng)
    }

    fn elevation(&self, coord: GridCoord) -> f64 {
        self.fields
            .elevation
            .get(coord.index(self.fields.width))
            .copied()
            .unwrap_or(0.0)
    }

    fn random_lake_cell<R: Rng + ?Sized>(bodies: &[&WaterBody], rng: &mut R) -> Option<GridCoord> {
        if bodies.is_empty() {
            return None;
        }
        bodies[rng.gen_range(0..bodies.len())].random_cell(rng)
    }

    /// Pick uniformly among the first few of `cells` after ordering by elevation
    fn pick_ranked<R: Rng + ?Sized>(&self, mut cells: Vec<GridCoord>, highest: bool, rng: &mut R) -> GridCoord {
        cells.sort_by(|a, b| {
            let (ea, eb) = (self.elevation(*a), self.elevation(*b));
            if highest { eb.total_cmp(&ea) } else { ea.total_cmp(&eb) }
        });
        let pool = cells.len().min(RIVER_ENDPOINT_CANDIDATES);
        if pool == 0 {
            return GridCoord::new(0, 0);
        }
        cells[rng.gen_range(0..pool)]
    }

    fn cells_where(&self, accept: impl Fn(f64) -> bool) -> Vec<GridCoord> {
        self.fields
            .elevation
            .iter()
            .enumerate()
            .filter(|&(_, &e)| accept(e))
            .map(|(i, _)| GridCoord::from_index(i, self.fields.width))
            .collect()
    }

    fn pick_source<R: Rng + ?Sized>(&self, rng: &mut R) -> GridCoord {
        if !self.water_bodies.is_empty() && self.config.from_lake_chance.roll(rng) {
            let bodies: Vec<&WaterBody> = self.water_bodies.iter().collect();
            if let Some(cell) = Self::random_lake_cell(&bodies, rng) {
                return cell;
            }
        }

        let mut peaks = self.cells_where(|e| e > RIVER_SOURCE_MIN_ELEVATION);
        if peaks.is_empty() {
            peaks = perimeter_cells(self.fields.width, self.fields.height);
        }
        self.pick_ranked(peaks, true, rng)
    }

    fn pick_mouth<R: Rng + ?Sized>(&self, start: GridCoord, rng: &mut R) -> GridCoord {
        if self.water_bodies.len() > 1 && self.config.to_lake_chance.roll(rng) {
            let others: Vec<&WaterBody> = self
                .water_bodies
                .iter()
                .filter(|body| !body.contains(start))
                .collect();
            if let Some(cell) = Self::random_lake_cell(&others, rng) {
                return cell;
            }
        }

        let mut lowlands = self.cells_where(|e| e < RIVER_MOUTH_MAX_ELEVATION);
        if lowlands.is_empty() {
            lowlands = perimeter_cells(self.fields.width, self.fields.height);
        }
        self.pick_ranked(lowlands, false, rng)
    }

    /// Cheapest downhill-preferring route; falls back to a biased walk
    pub fn route<R: Rng + ?Sized>(&self, start: GridCoord, target: GridCoord, rng: &mut R) -> River {
        let (width, height) = (self.fields.width, self.fields.height);
        let jitter = self.config.step_jitter;

        let result = astar(
            &start,
            |&pos| {
                let here = self.elevation(pos);
                pos.neighbors(width, height)
                    .map(|(_, next)| {
                        let slope = if self.elevation(next) < here {
                            DOWNHILL_COST_FACTOR
                        } else {
                            UPHILL_COST_FACTOR
                        };
                        let cost = (slope * jitter.sample(rng) * ASTAR_COST_SCALE).round() as u32;
                        (next, cost.max(1))
                    })
                    .collect::<Vec<_>>()
            },
            |pos| pos.manhattan(&target) * ASTAR_COST_SCALE as u32,
            |pos| *pos == target,
        );

        match result {
            Some((path, _cost)) => River {
                points: self.meander(path, rng),
                method: RouteMethod::AStar,
            },
            None => River {
                points: biased_walk(start, target, self.config.walk_bias, width, height, rng),
                method: RouteMethod::Walk,
            },
        }
    }

    /// Insert perpendicular bend points on long segments.
    ///
    /// Only segments of length >= 2 qualify, so a 4-connected path comes back unchanged.
    /// The final segment never bends.
    pub fn meander<R: Rng + ?Sized>(&self, path: Vec<GridCoord>, rng: &mut R) -> Vec<GridCoord> {
        if path.len() < MEANDER_MIN_PATH_LENGTH {
            return path;
        }

        let mut bent = Vec::with_capacity(path.len());
        bent.push(path[0]);

        for i in 1..path.len() {
            let (prev, current) = (path[i - 1], path[i]);

            if i < path.len() - 1 && prev.distance(&current) >= MEANDER_MIN_SEGMENT_LENGTH {
                if self.config.meander_chance.roll(rng) {
                    let bend = rng.gen_range(MEANDER_BEND_MIN..=MEANDER_BEND_MAX);
                    let dx = current.x as f64 - prev.x as f64;
                    let dy = current.y as f64 - prev.y as f64;
                    let bend_x = ((prev.x as f64 + current.x as f64) / 2.0 - dy * bend).round() as i64;
                    let bend_y = ((prev.y as f64 + current.y as f64) / 2.0 + dx * bend).round() as i64;

                    if let Some(point) =
                        GridCoord::checked(bend_x, bend_y, self.fields.width, self.fields.height)
                    {
                        bent.push(point);
                    }
                }
            }

            bent.push(current);
        }

        bent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn flat_config() -> RiverConfig {
        RiverConfig {
            step_jitter: JitterRange::fixed(1.0),
            meander_chance: Probability::new(0.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_flat_astar_is_manhattan() {
        let fields = TerrainFields::flat(20, 20, 10.0);
        let config = flat_config();
        let router = RiverRouter::new(&fields, &[], &config);
        let mut rng = Pcg64::seed_from_u64(6);

        let cases = [((0, 0), (7, 5)), ((19, 3), (2, 18)), ((5, 5), (5, 12))];
        for ((sx, sy), (tx, ty)) in cases {
            let start = GridCoord::new(sx, sy);
            let target = GridCoord::new(tx, ty);
            let river = router.route(start, target, &mut rng);

            assert_eq!(river.method, RouteMethod::AStar);
            assert_eq!(river.points.len() as u32, start.manhattan(&target) + 1);
            assert_eq!(river.points[0], start);
            assert_eq!(*river.points.last().unwrap(), target);
        }
    }

    #[test]
    fn test_route_prefers_downhill() {
        // Elevation drops along x, so a river from the high side hugs the slope
        let mut fields = TerrainFields::flat(10, 3, 0.0);
        for y in 0..3u32 {
            for x in 0..10u32 {
                fields.elevation[GridCoord::new(x, y).index(10)] = 100.0 - x as f64 * 10.0;
            }
        }
        let config = flat_config();
        let router = RiverRouter::new(&fields, &[], &config);
        let river = router.route(GridCoord::new(0, 1), GridCoord::new(9, 1), &mut Pcg64::seed_from_u64(1));
        assert!(river.points.iter().all(|p| p.y == 1));
    }

    #[test]
    fn test_rivers_stay_in_bounds() {
        let noise = crate::terrain::noise::NoiseField::new();
        let mut rng = Pcg64::seed_from_u64(77);
        let fields = crate::terrain::fields::generate_fields(25, 25, &noise, &mut rng);
        let config = RiverConfig::default();
        let router = RiverRouter::new(&fields, &[], &config);
        let rivers = router.route_rivers(&mut rng);

        assert!((2..=4).contains(&rivers.len()));
        for river in &rivers {
            assert!(!river.points.is_empty());
            assert!(river.points.iter().all(|p| p.x < 25 && p.y < 25));
        }
    }

    #[test]
    fn test_river_leaves_source_lake_for_another() {
        let fields = TerrainFields::flat(30, 30, 40.0);
        let lake_a = WaterBody::new(vec![GridCoord::new(3, 3), GridCoord::new(4, 3)], 30);
        let lake_b = WaterBody::new(vec![GridCoord::new(25, 25)], 30);
        let lakes = [lake_a, lake_b];
        let config = RiverConfig {
            count: CountRange::exactly(1),
            from_lake_chance: Probability::new(1.0),
            to_lake_chance: Probability::new(1.0),
            ..flat_config()
        };
        let router = RiverRouter::new(&fields, &lakes, &config);

        for seed in 0..10 {
            let rivers = router.route_rivers(&mut Pcg64::seed_from_u64(seed));
            let points = &rivers[0].points;
            let start = points[0];
            let end = *points.last().unwrap();
            let start_lake = lakes.iter().position(|l| l.contains(start)).unwrap();
            let end_lake = lakes.iter().position(|l| l.contains(end)).unwrap();
            assert_ne!(start_lake, end_lake);
        }
    }

    #[test]
    fn test_meander_bends_long_segments() {
        let fields = TerrainFields::flat(20, 20, 0.0);
        let config = RiverConfig {
            meander_chance: Probability::new(1.0),
            ..Default::default()
        };
        let router = RiverRouter::new(&fields, &[], &config);
        let sparse: Vec<GridCoord> = [(2, 10), (6, 10), (10, 10), (14, 10), (18, 10)]
            .into_iter()
            .map(|(x, y)| GridCoord::new(x, y))
            .collect();

        let bent = router.meander(sparse.clone(), &mut Pcg64::seed_from_u64(3));
        // Every segment except the last gains a bend below the line
        assert_eq!(bent.len(), sparse.len() + 3);
        assert!(bent[1].y > 10);

        let adjacent: Vec<GridCoord> = (0..8).map(|x| GridCoord::new(x, 4)).collect();
        assert_eq!(router.meander(adjacent.clone(), &mut Pcg64::seed_from_u64(3)), adjacent);
    }
}
