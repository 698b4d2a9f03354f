use super::constants::*;
use super::coordinates::GridCoord;
use super::water::WaterBody;
use crate::config::range_types::{CountRange, Probability};
use crate::tiles::catalog::TilePalette;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, info, warn};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementKind {
    Village,
    Castle,
}

impl SettlementKind {
    pub fn opposite(self) -> Self {
        match self {
            SettlementKind::Village => SettlementKind::Castle,
            SettlementKind::Castle => SettlementKind::Village,
        }
    }

    pub fn tile_id(self, palette: &TilePalette) -> &str {
        match self {
            SettlementKind::Village => &palette.village,
            SettlementKind::Castle => &palette.castle,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.r#gen::<f64>() < 0.5 {
            SettlementKind::Village
        } else {
            SettlementKind::Castle
        }
    }
}

/// Composition of a generated cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterStyle {
    Villages,
    Castles,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub coord: GridCoord,
    pub kind: SettlementKind,
    pub tile_type_id: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SettlementConfig {
    #[validate(nested)]
    pub clusters: CountRange,
    #[validate(nested)]
    pub satellites: CountRange,
    #[validate(range(min = 1, max = 1000))]
    pub center_attempts: u32,
    pub min_water_distance: f64,
    pub mixed_cluster_chance: Probability,
    pub mixed_primary_type_chance: Probability,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            clusters: CountRange::new(DEFAULT_CLUSTERS_MIN, DEFAULT_CLUSTERS_MAX),
            satellites: CountRange::new(DEFAULT_SATELLITES_MIN, DEFAULT_SATELLITES_MAX),
            center_attempts: CLUSTER_CENTER_ATTEMPTS,
            min_water_distance: CLUSTER_MIN_WATER_DISTANCE,
            mixed_cluster_chance: Probability::new(MIXED_CLUSTER_CHANCE),
            mixed_primary_type_chance: Probability::new(MIXED_PRIMARY_TYPE_CHANCE),
        }
    }
}

/// Places settlement clusters on dry land
pub struct SettlementPlanner<'a> {
    width: u32,
    height: u32,
    water_bodies: &'a [WaterBody],
    palette: &'a TilePalette,
    config: &'a SettlementConfig,
}

impl<'a> SettlementPlanner<'a> {
    pub fn new(
        width: u32,
        height: u32,
        water_bodies: &'a [WaterBody],
        palette: &'a TilePalette,
        config: &'a SettlementConfig,
    ) -> Self {
        Self {
            width,
            height,
            water_bodies,
            palette,
            config,
        }
    }

    /// Generate 2-4 clusters; clusters without a dry center are skipped
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Settlement> {
        let mut settlements = Vec::new();
        let cluster_count = self.config.clusters.sample(rng);

        for cluster in 0..cluster_count {
            match self.find_cluster_center(rng) {
                Some(center) => self.place_cluster(center, &mut settlements, rng),
                None => warn!(
                    "Could not find valid settlement cluster location after {} attempts, skipping cluster {}",
                    self.config.center_attempts, cluster
                ),
            }
        }

        info!(
            "Placed {} settlements ({} primary)",
            settlements.len(),
            settlements.iter().filter(|s| s.is_primary).count()
        );
        settlements
    }

    fn is_dry(&self, coord: GridCoord) -> bool {
        self.water_bodies.iter().all(|body| {
            body.cells()
                .iter()
                .all(|cell| coord.distance(cell) >= self.config.min_water_distance)
        })
    }

    fn find_cluster_center<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridCoord> {
        for _ in 0..self.config.center_attempts {
            let x = (rng.r#gen::<f64>() * (self.width as f64 * CLUSTER_CENTER_SPAN)
                + self.width as f64 * CLUSTER_CENTER_MARGIN)
                .floor() as i64;
            let y = (rng.r#gen::<f64>() * (self.height as f64 * CLUSTER_CENTER_SPAN)
                + self.height as f64 * CLUSTER_CENTER_MARGIN)
                .floor() as i64;

            let candidate = GridCoord::clamped(x, y, self.width, self.height);
            if self.is_dry(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn pick_style<R: Rng + ?Sized>(&self, rng: &mut R) -> ClusterStyle {
        if self.config.mixed_cluster_chance.roll(rng) {
            ClusterStyle::Mixed
        } else if rng.r#gen::<f64>() < 0.5 {
            ClusterStyle::Villages
        } else {
            ClusterStyle::Castles
        }
    }

    fn make_settlement(&self, coord: GridCoord, kind: SettlementKind, is_primary: bool) -> Settlement {
        Settlement {
            coord,
            kind,
            tile_type_id: kind.tile_id(self.palette).to_string(),
            is_primary,
        }
    }

    fn place_cluster<R: Rng + ?Sized>(
        &self,
        center: GridCoord,
        settlements: &mut Vec<Settlement>,
        rng: &mut R,
    ) {
        let style = self.pick_style(rng);
        let primary_kind = match style {
            ClusterStyle::Villages => SettlementKind::Village,
            ClusterStyle::Castles => SettlementKind::Castle,
            ClusterStyle::Mixed => SettlementKind::random(rng),
        };
        settlements.push(self.make_settlement(center, primary_kind, true));

        let satellites = self.config.satellites.sample(rng);
        for _ in 0..satellites {
            let angle = rng.r#gen::<f64>() * TAU;
            let radius = rng.gen_range(SATELLITE_RADIUS_MIN..=SATELLITE_RADIUS_MAX) as f64;
            let x = (center.x as f64 + angle.cos() * radius).floor() as i64;
            let y = (center.y as f64 + angle.sin() * radius).floor() as i64;

            // Rejected satellites are not retried
            let Some(coord) = GridCoord::checked(x, y, self.width, self.height) else {
                continue;
            };
            if settlements
                .iter()
                .any(|s| s.coord.distance(&coord) < SATELLITE_MIN_SPACING)
            {
                continue;
            }

            let kind = match style {
                ClusterStyle::Villages => SettlementKind::Village,
                ClusterStyle::Castles => SettlementKind::Castle,
                ClusterStyle::Mixed => {
                    if self.config.mixed_primary_type_chance.roll(rng) {
                        primary_kind
                    } else {
                        primary_kind.opposite()
                    }
                }
            };
            settlements.push(self.make_settlement(coord, kind, false));
        }

        debug!(
            "Cluster {:?} at ({}, {}) now totals {} settlements",
            style,
            center.x,
            center.y,
            settlements.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_clusters_have_primary_at_center() {
        let palette = TilePalette::default();
        let config = SettlementConfig::default();
        let planner = SettlementPlanner::new(40, 40, &[], &palette, &config);
        let settlements = planner.generate(&mut Pcg64::seed_from_u64(8));

        let primaries = settlements.iter().filter(|s| s.is_primary).count();
        assert!((2..=4).contains(&primaries));
        assert!(settlements[0].is_primary);
        for s in &settlements {
            assert!(s.coord.x < 40 && s.coord.y < 40);
            assert_eq!(s.tile_type_id, s.kind.tile_id(&palette));
        }
    }

    #[test]
    fn test_satellites_keep_spacing_and_radius() {
        let palette = TilePalette::default();
        let config = SettlementConfig {
            clusters: CountRange::exactly(1),
            satellites: CountRange::exactly(4),
            ..Default::default()
        };
        let planner = SettlementPlanner::new(50, 50, &[], &palette, &config);

        for seed in 0..20 {
            let settlements = planner.generate(&mut Pcg64::seed_from_u64(seed));
            let center = settlements[0].coord;
            for (i, a) in settlements.iter().enumerate() {
                if i > 0 {
                    assert!(!a.is_primary);
                    assert!(a.coord.distance(&center) <= SATELLITE_RADIUS_MAX as f64 + 1.5);
                }
                for b in &settlements[i + 1..] {
                    assert!(a.coord.distance(&b.coord) >= SATELLITE_MIN_SPACING);
                }
            }
        }
    }

    #[test]
    fn test_single_style_clusters_are_uniform() {
        let palette = TilePalette::default();
        let config = SettlementConfig {
            clusters: CountRange::exactly(1),
            satellites: CountRange::exactly(4),
            mixed_cluster_chance: Probability::new(0.0),
            ..Default::default()
        };
        let planner = SettlementPlanner::new(50, 50, &[], &palette, &config);
        for seed in 0..10 {
            let settlements = planner.generate(&mut Pcg64::seed_from_u64(seed));
            let kind = settlements[0].kind;
            assert!(settlements.iter().all(|s| s.kind == kind));
        }
    }

    #[test]
    fn test_clusters_avoid_water() {
        let palette = TilePalette::default();
        let config = SettlementConfig::default();
        // Lake covering the whole center of the map
        let mut cells = Vec::new();
        for y in 10..30 {
            for x in 10..30 {
                cells.push(GridCoord::new(x, y));
            }
        }
        let lake = [WaterBody::new(cells, 40)];
        let planner = SettlementPlanner::new(40, 40, &lake, &palette, &config);
        let settlements = planner.generate(&mut Pcg64::seed_from_u64(21));

        for s in settlements.iter().filter(|s| s.is_primary) {
            assert!(lake[0].cells().iter().all(|c| c.distance(&s.coord) >= 6.0));
        }
    }

    #[test]
    fn test_unplaceable_clusters_are_skipped() {
        let palette = TilePalette::default();
        let config = SettlementConfig::default();
        let mut cells = Vec::new();
        for y in 0..10 {
            for x in 0..10 {
                cells.push(GridCoord::new(x, y));
            }
        }
        let flooded = [WaterBody::new(cells, 10)];
        let planner = SettlementPlanner::new(10, 10, &flooded, &palette, &config);
        assert!(planner.generate(&mut Pcg64::seed_from_u64(4)).is_empty());
    }
}
