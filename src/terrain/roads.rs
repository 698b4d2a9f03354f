use super::constants::*;
use super::coordinates::GridCoord;
use super::settlements::Settlement;
use super::walk::{biased_walk, detour_path};
use crate::config::range_types::{CountRange, Probability};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoadConfig {
    /// Settlements closer than this share a cluster
    pub cluster_link_distance: f64,
    pub link_bias: Probability,
    #[validate(nested)]
    pub branches: CountRange,
    pub spur_chance: Probability,
    pub spur_sample_rate: Probability,
    #[validate(range(min = 2))]
    pub detour_min_road_length: usize,
    pub detour_outbound_bias: Probability,
    pub detour_return_bias: Probability,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            cluster_link_distance: CLUSTER_LINK_DISTANCE,
            link_bias: Probability::new(DEFAULT_WALK_BIAS),
            branches: CountRange::new(DEFAULT_BRANCHES_MIN, DEFAULT_BRANCHES_MAX),
            spur_chance: Probability::new(SPUR_CHANCE),
            spur_sample_rate: Probability::new(SPUR_SAMPLE_RATE),
            detour_min_road_length: DETOUR_MIN_ROAD_LENGTH,
            detour_outbound_bias: Probability::new(DETOUR_OUTBOUND_BIAS),
            detour_return_bias: Probability::new(DETOUR_RETURN_BIAS),
        }
    }
}

/// Group settlements transitively by proximity.
///
/// Returns indices into `settlements`; clusters are ordered by their first
/// member and members keep placement order.
pub fn detect_clusters(settlements: &[Settlement], link_distance: f64) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; settlements.len()];
    let mut clusters = Vec::new();

    for seed in 0..settlements.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            for other in 0..settlements.len() {
                if !assigned[other]
                    && settlements[current].coord.distance(&settlements[other].coord) < link_distance
                {
                    assigned[other] = true;
                    members.push(other);
                    queue.push_back(other);
                }
            }
        }

        members.sort_unstable();
        clusters.push(members);
    }

    clusters
}

/// Lays roads between settlements: spokes inside clusters, a chain between
/// cluster capitals, then a few spurs and detours
pub struct RoadNetworkBuilder<'a> {
    width: u32,
    height: u32,
    settlements: &'a [Settlement],
    config: &'a RoadConfig,
}

impl<'a> RoadNetworkBuilder<'a> {
    pub fn new(width: u32, height: u32, settlements: &'a [Settlement], config: &'a RoadConfig) -> Self {
        Self {
            width,
            height,
            settlements,
            config,
        }
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec<GridCoord>> {
        let mut roads = Vec::new();

        self.connect_clusters(&mut roads, rng);
        let intra = roads.len();
        self.connect_primaries(&mut roads, rng);
        let inter = roads.len() - intra;
        self.add_branches(&mut roads, rng);

        info!(
            "Built {} roads ({} intra-cluster, {} inter-cluster, {} branches)",
            roads.len(),
            intra,
            inter,
            roads.len() - intra - inter
        );
        roads
    }

    fn link<R: Rng + ?Sized>(&self, from: GridCoord, to: GridCoord, rng: &mut R) -> Vec<GridCoord> {
        biased_walk(from, to, self.config.link_bias, self.width, self.height, rng)
    }

    fn connect_clusters<R: Rng + ?Sized>(&self, roads: &mut Vec<Vec<GridCoord>>, rng: &mut R) {
        for members in detect_clusters(self.settlements, self.config.cluster_link_distance) {
            if members.len() <= 1 {
                continue;
            }

            let hub = members
                .iter()
                .copied()
                .find(|&i| self.settlements[i].is_primary)
                .unwrap_or(members[0]);
            let hub_coord = self.settlements[hub].coord;

            for &member in members.iter().filter(|&&i| i != hub) {
                roads.push(self.link(hub_coord, self.settlements[member].coord, rng));
            }
        }
    }

    fn connect_primaries<R: Rng + ?Sized>(&self, roads: &mut Vec<Vec<GridCoord>>, rng: &mut R) {
        let mut chain: Vec<GridCoord> = self
            .settlements
            .iter()
            .filter(|s| s.is_primary)
            .map(|s| s.coord)
            .collect();

        if chain.is_empty() {
            chain = self
                .settlements
                .choose_multiple(rng, FALLBACK_LINKED_SETTLEMENTS)
                .map(|s| s.coord)
                .collect();
            debug!("No primary settlements, chaining {} random ones", chain.len());
        } else {
            chain.sort_by_key(|c| c.x + c.y);
        }

        for pair in chain.windows(2) {
            roads.push(self.link(pair[0], pair[1], rng));
        }
    }

    fn add_branches<R: Rng + ?Sized>(&self, roads: &mut Vec<Vec<GridCoord>>, rng: &mut R) {
        let branches = self.config.branches.sample(rng);

        for _ in 0..branches {
            if self.config.spur_chance.roll(rng) && !self.settlements.is_empty() && !roads.is_empty() {
                if let Some(spur) = self.spur(roads, rng) {
                    roads.push(spur);
                }
            } else if !roads.is_empty() {
                if let Some(detour) = self.detour(roads, rng) {
                    roads.push(detour);
                }
            }
        }
    }

    /// Road from a random settlement to a sampled point on the network
    fn spur<R: Rng + ?Sized>(&self, roads: &[Vec<GridCoord>], rng: &mut R) -> Option<Vec<GridCoord>> {
        let settlement = self.settlements.choose(rng)?.coord;

        let mut samples = Vec::new();
        for road in roads {
            for &point in road {
                if self.config.spur_sample_rate.roll(rng) {
                    samples.push(point);
                }
            }
        }

        let target = *samples.choose(rng)?;
        Some(self.link(settlement, target, rng))
    }

    /// Alternative route between the two halves of an existing long road
    fn detour<R: Rng + ?Sized>(&self, roads: &[Vec<GridCoord>], rng: &mut R) -> Option<Vec<GridCoord>> {
        let road = roads.choose(rng)?;
        if road.len() < self.config.detour_min_road_length {
            return None;
        }

        let half = road.len() / 2;
        let first = rng.gen_range(0..half);
        let second = rng.gen_range(half..road.len());

        Some(detour_path(
            road[first],
            road[second],
            self.config.detour_outbound_bias,
            self.config.detour_return_bias,
            self.width,
            self.height,
            rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::settlements::SettlementKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn settlement(x: u32, y: u32, is_primary: bool) -> Settlement {
        Settlement {
            coord: GridCoord::new(x, y),
            kind: SettlementKind::Village,
            tile_type_id: "grass_village".to_string(),
            is_primary,
        }
    }

    fn no_branches() -> RoadConfig {
        RoadConfig {
            branches: CountRange::exactly(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_cluster_detection_is_transitive() {
        // Chain a-b-c links even though a and c are far apart; d stands alone
        let settlements = vec![
            settlement(0, 0, true),
            settlement(20, 20, true),
            settlement(5, 0, false),
            settlement(10, 0, false),
        ];
        let clusters = detect_clusters(&settlements, 6.0);
        assert_eq!(clusters, vec![vec![0, 2, 3], vec![1]]);
    }

    #[test]
    fn test_intra_cluster_roads_start_at_primary() {
        let settlements = vec![
            settlement(10, 10, false),
            settlement(12, 10, true),
            settlement(12, 13, false),
        ];
        let config = no_branches();
        let builder = RoadNetworkBuilder::new(30, 30, &settlements, &config);
        let roads = builder.build(&mut Pcg64::seed_from_u64(5));

        assert_eq!(roads.len(), 2);
        for road in &roads {
            assert_eq!(road[0], GridCoord::new(12, 10));
        }
    }

    #[test]
    fn test_primaries_chain_by_coordinate_sum() {
        let settlements = vec![
            settlement(25, 25, true),
            settlement(2, 3, true),
            settlement(12, 14, true),
        ];
        let config = no_branches();
        let builder = RoadNetworkBuilder::new(30, 30, &settlements, &config);
        let roads = builder.build(&mut Pcg64::seed_from_u64(9));

        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0][0], GridCoord::new(2, 3));
        assert_eq!(*roads[0].last().unwrap(), GridCoord::new(12, 14));
        assert_eq!(roads[1][0], GridCoord::new(12, 14));
        assert_eq!(*roads[1].last().unwrap(), GridCoord::new(25, 25));
    }

    #[test]
    fn test_without_primaries_random_settlements_are_chained() {
        let settlements = vec![
            settlement(1, 1, false),
            settlement(20, 1, false),
            settlement(1, 20, false),
            settlement(20, 20, false),
        ];
        let config = no_branches();
        let builder = RoadNetworkBuilder::new(30, 30, &settlements, &config);
        let roads = builder.build(&mut Pcg64::seed_from_u64(12));
        assert_eq!(roads.len(), 2);
    }

    #[test]
    fn test_single_settlement_gets_no_roads() {
        let settlements = vec![settlement(4, 4, true)];
        let config = RoadConfig::default();
        let builder = RoadNetworkBuilder::new(10, 10, &settlements, &config);
        assert!(builder.build(&mut Pcg64::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn test_branches_extend_network() {
        let settlements = vec![settlement(2, 2, true), settlement(27, 27, true)];
        let config = RoadConfig {
            branches: CountRange::exactly(3),
            spur_sample_rate: Probability::new(1.0),
            ..Default::default()
        };
        let builder = RoadNetworkBuilder::new(30, 30, &settlements, &config);
        let roads = builder.build(&mut Pcg64::seed_from_u64(40));

        // The first branch always lands: the trunk is long and fully sampled.
        // Later detours may pick a short spur and be dropped.
        assert!((2..=4).contains(&roads.len()));
        for road in &roads {
            assert!(road.windows(2).all(|w| w[0].manhattan(&w[1]) == 1));
            assert!(road.iter().all(|p| p.x < 30 && p.y < 30));
        }
    }
}
