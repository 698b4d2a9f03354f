use super::catalog::{ConnectionSignature, EdgeLabel, TileCatalog, TileFamily};
use crate::map::Grid;
use crate::terrain::coordinates::{Direction, GridCoord};
use crate::terrain::settlements::Settlement;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// How well `actual` edges satisfy `required` edges
pub fn connection_score(required: &ConnectionSignature, actual: &ConnectionSignature) -> i32 {
    required
        .0
        .iter()
        .zip(actual.0.iter())
        .map(|(&want, &have)| {
            if want == have {
                2
            } else if want == EdgeLabel::Grass && !have.is_specialized() {
                1
            } else if have == EdgeLabel::Wildcard {
                1
            } else if want != EdgeLabel::Grass {
                -1
            } else {
                0
            }
        })
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileChoice {
    pub tile_type_id: String,
    pub rotation: u8,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaxationReport {
    pub passes: u32,
    pub changes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub placed: Vec<String>,
    pub unplaced: Vec<String>,
}

/// Picks concrete tiles and rotations so neighbouring edges agree
pub struct TileResolver<'a> {
    catalog: &'a TileCatalog,
}

impl<'a> TileResolver<'a> {
    pub fn new(catalog: &'a TileCatalog) -> Self {
        Self { catalog }
    }

    /// Best tile and rotation among the family's candidates.
    /// Ties keep the earliest catalog entry and the lowest rotation.
    pub fn find_best(&self, required: &ConnectionSignature, family: TileFamily) -> Option<TileChoice> {
        let mut best: Option<TileChoice> = None;

        for (id, signature) in self.catalog.candidates(family) {
            for rotation in 0..4u8 {
                let score = connection_score(required, &signature.rotated(rotation));
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(TileChoice {
                        tile_type_id: id.to_string(),
                        rotation,
                        score,
                    });
                }
            }
        }

        best
    }

    /// Effective edges of the tile committed at `coord`
    pub fn edges_at(&self, grid: &Grid, coord: GridCoord) -> Option<ConnectionSignature> {
        let cell = grid.cell(coord)?;
        self.catalog.rotated_signature(&cell.tile_type_id, cell.rotation)
    }

    /// Label the neighbour in `direction` presents toward `coord`
    fn facing_label(&self, grid: &Grid, coord: GridCoord, direction: Direction) -> Option<EdgeLabel> {
        let neighbor = coord.neighbor(direction, grid.width, grid.height)?;
        self.edges_at(grid, neighbor)
            .map(|edges| edges.edge(direction.opposite()))
    }

    /// Grass everywhere except where a neighbour presents a road or water edge
    pub fn neighbor_requirements(&self, grid: &Grid, coord: GridCoord) -> ConnectionSignature {
        let mut required = ConnectionSignature::uniform(EdgeLabel::Grass);
        for direction in Direction::ALL {
            if let Some(label) = self.facing_label(grid, coord, direction) {
                if label.is_specialized() {
                    required.0[direction.index()] = label;
                }
            }
        }
        required
    }

    /// Commit settlement tiles with a cosmetic rotation; returns the protected cell indices
    pub fn bake_settlements<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        settlements: &[Settlement],
        rng: &mut R,
    ) -> HashSet<usize> {
        let mut protected = HashSet::new();
        for settlement in settlements {
            if !grid.contains(settlement.coord) {
                continue;
            }
            grid.set_tile(settlement.coord, &settlement.tile_type_id, rng.gen_range(0..4));
            protected.insert(settlement.coord.index(grid.width));
        }
        protected
    }

    /// Stamp a river or road, one cell at a time in path order
    pub fn stamp_path(
        &self,
        grid: &mut Grid,
        path: &[GridCoord],
        family: TileFamily,
        protected: &HashSet<usize>,
    ) {
        let label = family.label();

        for (i, &coord) in path.iter().enumerate() {
            if !grid.contains(coord) || protected.contains(&coord.index(grid.width)) {
                continue;
            }

            let mut required = ConnectionSignature::uniform(EdgeLabel::Grass);

            let links = [
                i.checked_sub(1).and_then(|p| path.get(p)),
                path.get(i + 1),
            ];
            for other in links.into_iter().flatten() {
                if let Some(direction) = coord.direction_to(other) {
                    required.0[direction.index()] = label;
                }
            }

            // Join up with the same feature already on the map
            for direction in Direction::ALL {
                if self.facing_label(grid, coord, direction) == Some(label) {
                    required.0[direction.index()] = label;
                }
            }

            if let Some(choice) = self.find_best(&required, family) {
                grid.set_tile(coord, &choice.tile_type_id, choice.rotation);
            }
        }
    }

    /// Gauss-Seidel sweeps replacing tiles that disagree with a neighbour's
    /// road or water edge. Stops early after a pass without changes.
    pub fn relax(&self, grid: &mut Grid, protected: &HashSet<usize>, max_passes: u32) -> RelaxationReport {
        let mut report = RelaxationReport::default();

        for _ in 0..max_passes {
            report.passes += 1;
            let mut changes = 0;

            for index in 0..grid.len() {
                if protected.contains(&index) {
                    continue;
                }
                let coord = GridCoord::from_index(index, grid.width);
                let Some(current) = self.edges_at(grid, coord) else {
                    continue;
                };

                let required = self.neighbor_requirements(grid, coord);
                let needs_update = Direction::ALL.iter().any(|&dir| {
                    let want = required.edge(dir);
                    let have = current.edge(dir);
                    want.is_specialized() && have != want && have != EdgeLabel::Wildcard
                });
                if !needs_update {
                    continue;
                }

                let family = grid
                    .cell(coord)
                    .map(|cell| self.catalog.family_of(&cell.tile_type_id))
                    .unwrap_or(TileFamily::Grass);
                let current_score = connection_score(&required, &current);

                if let Some(choice) = self.find_best(&required, family) {
                    if choice.score > current_score {
                        grid.set_tile(coord, &choice.tile_type_id, choice.rotation);
                        changes += 1;
                    }
                }
            }

            report.changes += changes;
            debug!("Relaxation pass {} changed {} tiles", report.passes, changes);
            if changes == 0 {
                break;
            }
        }

        report
    }

    /// Try to get every connectable catalog tile onto the map at least once.
    /// Each missing tile gets `attempts` random cells; only unprotected default-tile
    /// cells are eligible.
    pub fn complete_coverage<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        protected: &HashSet<usize>,
        attempts: u32,
        rng: &mut R,
    ) -> CoverageReport {
        let used: HashSet<String> = grid.cells.iter().map(|c| c.tile_type_id.clone()).collect();
        let missing: Vec<(String, ConnectionSignature)> = self
            .catalog
            .connectable()
            .filter(|(id, _)| !used.contains(*id))
            .map(|(id, sig)| (id.to_string(), sig))
            .collect();

        let mut report = CoverageReport::default();
        for (id, signature) in missing {
            if self.place_single(grid, protected, signature, &id, attempts, rng) {
                debug!("Placed missing tile type {}", id);
                report.placed.push(id);
            } else {
                warn!("Could not place tile type {} after {} attempts", id, attempts);
                report.unplaced.push(id);
            }
        }
        report
    }

    fn place_single<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        protected: &HashSet<usize>,
        signature: ConnectionSignature,
        id: &str,
        attempts: u32,
        rng: &mut R,
    ) -> bool {
        for _ in 0..attempts {
            let coord = GridCoord::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
            if protected.contains(&coord.index(grid.width)) {
                continue;
            }
            // Only plain ground is overwritten so features and earlier placements survive
            let is_plain = grid
                .cell(coord)
                .is_some_and(|cell| cell.tile_type_id == self.catalog.default_tile());
            if !is_plain {
                continue;
            }

            let required = self.neighbor_requirements(grid, coord);
            let fits = (0..4u8).find(|&rotation| {
                let edges = signature.rotated(rotation);
                Direction::ALL.iter().all(|&dir| {
                    let want = required.edge(dir);
                    let have = edges.edge(dir);
                    !want.is_specialized() || have == want || have == EdgeLabel::Wildcard
                })
            });

            if let Some(rotation) = fits {
                grid.set_tile(coord, id, rotation);
                return true;
            }
        }
        false
    }

    /// Adjacent pairs whose shared edge carries two different road/water labels
    pub fn count_edge_conflicts(&self, grid: &Grid) -> usize {
        let mut conflicts = 0;
        for (coord, _) in grid.iter() {
            let Some(edges) = self.edges_at(grid, coord) else {
                continue;
            };
            // East and south cover each pair once
            for direction in [Direction::East, Direction::South] {
                let here = edges.edge(direction);
                let Some(there) = self.facing_label(grid, coord, direction) else {
                    continue;
                };
                if here.is_specialized() && there.is_specialized() && here != there {
                    conflicts += 1;
                }
            }
        }
        conflicts
    }

    pub fn log_conflicts(&self, grid: &Grid) -> usize {
        let conflicts = self.count_edge_conflicts(grid);
        info!("{} edge conflicts remain after relaxation", conflicts);
        conflicts
    }
}
