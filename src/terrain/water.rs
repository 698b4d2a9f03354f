use super::constants::*;
use super::coordinates::{Direction, GridCoord};
use super::noise::NoiseField;
use crate::config::range_types::CountRange;
use crate::map::TilePlacement;
use crate::tiles::catalog::{EdgeLabel, TileCatalog};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WaterConfig {
    #[validate(nested)]
    pub bodies: CountRange,
    #[validate(nested)]
    pub radius: CountRange,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            bodies: CountRange::new(DEFAULT_WATER_BODIES_MIN, DEFAULT_WATER_BODIES_MAX),
            radius: CountRange::new(WATER_RADIUS_MIN, WATER_RADIUS_MAX),
        }
    }
}

/// An immutable lake footprint
#[derive(Debug, Clone, PartialEq)]
pub struct WaterBody {
    cells: Vec<GridCoord>,
    members: HashSet<usize>,
    width: u32,
}

impl WaterBody {
    pub fn new(cells: Vec<GridCoord>, width: u32) -> Self {
        let members = cells.iter().map(|c| c.index(width)).collect();
        Self {
            cells,
            members,
            width,
        }
    }

    pub fn cells(&self) -> &[GridCoord] {
        &self.cells
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.width && self.members.contains(&coord.index(self.width))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridCoord> {
        if self.cells.is_empty() {
            None
        } else {
            Some(self.cells[rng.gen_range(0..self.cells.len())])
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaterStageOutput {
    pub bodies: Vec<WaterBody>,
    /// Full-water and shoreline tiles, in commit order
    pub placements: Vec<TilePlacement>,
}

/// Grow one noisy disc of water cells
pub fn grow_water_body<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    noise: &NoiseField,
    radius_range: CountRange,
    rng: &mut R,
) -> WaterBody {
    let center_x = (rng.r#gen::<f64>() * (width as f64 * WATER_CENTER_SPAN)
        + width as f64 * WATER_CENTER_MARGIN)
        .floor() as i64;
    let center_y = (rng.r#gen::<f64>() * (height as f64 * WATER_CENTER_SPAN)
        + height as f64 * WATER_CENTER_MARGIN)
        .floor() as i64;
    let radius = radius_range.sample(rng) as i64;

    let mut cells = Vec::new();
    let y_range = (center_y - radius).max(0)..=(center_y + radius).min(height as i64 - 1);
    for y in y_range {
        for x in (center_x - radius).max(0)..=(center_x + radius).min(width as i64 - 1) {
            let dx = (x - center_x) as f64;
            let dy = (y - center_y) as f64;
            let distance = (dx * dx + dy * dy).sqrt();
            let wobble = noise.sample(
                x as f64 * WATER_EDGE_NOISE_FREQUENCY,
                y as f64 * WATER_EDGE_NOISE_FREQUENCY,
            ) * WATER_EDGE_NOISE_AMPLITUDE;

            if distance < radius as f64 + wobble {
                cells.push(GridCoord::new(x as u32, y as u32));
            }
        }
    }

    WaterBody::new(cells, width)
}

/// Transition tiles for the ring of cells around a body.
///
/// Cells with water on one side get the split tile, two 90°-apart sides get the
/// corner tile. Anything else is left for the relaxation pass.
pub fn shoreline_placements(
    body: &WaterBody,
    width: u32,
    height: u32,
    catalog: &TileCatalog,
) -> Vec<TilePlacement> {
    let palette = catalog.palette();
    let mut seen = HashSet::new();
    let mut shore = Vec::new();

    for cell in body.cells() {
        for (_, neighbor) in cell.neighbors(width, height) {
            if !body.contains(neighbor) && seen.insert(neighbor) {
                shore.push(neighbor);
            }
        }
    }

    let mut placements = Vec::new();
    for coord in shore {
        let water_sides: Vec<Direction> = coord
            .neighbors(width, height)
            .filter(|(_, n)| body.contains(*n))
            .map(|(dir, _)| dir)
            .collect();

        let hint = match water_sides.as_slice() {
            [side] => catalog
                .find_rotation(&palette.shore_split, |sig| sig.edge(*side) == EdgeLabel::Water)
                .map(|rotation| (palette.shore_split.as_str(), rotation)),
            [a, b] if a.is_adjacent_to(*b) => catalog
                .find_rotation(&palette.shore_corner, |sig| {
                    sig.edge(*a) == EdgeLabel::Water && sig.edge(*b) == EdgeLabel::Water
                })
                .map(|rotation| (palette.shore_corner.as_str(), rotation)),
            _ => None,
        };

        match hint {
            Some((tile, rotation)) => placements.push(TilePlacement {
                coord,
                tile_type_id: tile.to_string(),
                rotation,
            }),
            None => debug!(
                "Leaving shore cell ({}, {}) with water on {:?} for relaxation",
                coord.x, coord.y, water_sides
            ),
        }
    }

    placements
}

/// Place 1-3 lakes and their shorelines
pub fn generate_water_bodies<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    noise: &NoiseField,
    catalog: &TileCatalog,
    config: &WaterConfig,
    rng: &mut R,
) -> WaterStageOutput {
    let count = config.bodies.sample(rng);
    let water_tile = catalog.palette().water_full.clone();
    let mut output = WaterStageOutput::default();

    for _ in 0..count {
        let body = grow_water_body(width, height, noise, config.radius, rng);

        output
            .placements
            .extend(body.cells().iter().map(|&coord| TilePlacement {
                coord,
                tile_type_id: water_tile.clone(),
                rotation: 0,
            }));
        output
            .placements
            .extend(shoreline_placements(&body, width, height, catalog));

        output.bodies.push(body);
    }

    info!(
        "Generated {} water bodies covering {} cells",
        output.bodies.len(),
        output.bodies.iter().map(WaterBody::len).sum::<usize>()
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn square_body(x0: u32, y0: u32, size: u32, width: u32) -> WaterBody {
        let mut cells = Vec::new();
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                cells.push(GridCoord::new(x, y));
            }
        }
        WaterBody::new(cells, width)
    }

    fn placement_at<'a>(placements: &'a [TilePlacement], x: u32, y: u32) -> Option<&'a TilePlacement> {
        placements.iter().find(|p| p.coord == GridCoord::new(x, y))
    }

    #[test]
    fn test_body_membership() {
        let body = square_body(2, 2, 2, 10);
        assert!(body.contains(GridCoord::new(3, 3)));
        assert!(!body.contains(GridCoord::new(4, 3)));
        assert!(!body.contains(GridCoord::new(12, 0)));
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_grown_body_stays_in_bounds_and_contains_center_region() {
        let noise = NoiseField::new();
        let mut rng = Pcg64::seed_from_u64(5);
        for _ in 0..20 {
            let body = grow_water_body(30, 20, &noise, CountRange::new(3, 7), &mut rng);
            assert!(!body.is_empty());
            assert!(body.cells().iter().all(|c| c.x < 30 && c.y < 20));
        }
    }

    #[test]
    fn test_single_side_shore_faces_water() {
        let catalog = TileCatalog::default();
        let body = square_body(3, 3, 2, 10);
        let placements = shoreline_placements(&body, 10, 10, &catalog);

        // Directly north of the lake: water lies to the south
        let north = placement_at(&placements, 3, 2).unwrap();
        assert_eq!(north.tile_type_id, "water_grass_split_LR");
        let sig = catalog
            .rotated_signature(&north.tile_type_id, north.rotation)
            .unwrap();
        assert_eq!(sig.edge(Direction::South), EdgeLabel::Water);

        // West of the lake: water lies to the east
        let west = placement_at(&placements, 2, 4).unwrap();
        let sig = catalog.rotated_signature(&west.tile_type_id, west.rotation).unwrap();
        assert_eq!(sig.edge(Direction::East), EdgeLabel::Water);
    }

    #[test]
    fn test_inner_corner_gets_corner_tile() {
        let catalog = TileCatalog::default();
        // L-shaped lake: (4,4) has water to the north and west
        let cells = vec![
            GridCoord::new(3, 3),
            GridCoord::new(4, 3),
            GridCoord::new(3, 4),
        ];
        let body = WaterBody::new(cells, 10);
        let placements = shoreline_placements(&body, 10, 10, &catalog);

        let corner = placement_at(&placements, 4, 4).unwrap();
        assert_eq!(corner.tile_type_id, "water_corner");
        let sig = catalog
            .rotated_signature(&corner.tile_type_id, corner.rotation)
            .unwrap();
        assert_eq!(sig.edge(Direction::North), EdgeLabel::Water);
        assert_eq!(sig.edge(Direction::West), EdgeLabel::Water);
    }

    #[test]
    fn test_opposite_sides_are_left_unresolved() {
        let catalog = TileCatalog::default();
        // Two columns of water with a one-cell gap at x=4
        let cells = vec![GridCoord::new(3, 5), GridCoord::new(5, 5)];
        let body = WaterBody::new(cells, 10);
        let placements = shoreline_placements(&body, 10, 10, &catalog);
        assert!(placement_at(&placements, 4, 5).is_none());
        assert!(placement_at(&placements, 3, 4).is_some());
    }

    #[test]
    fn test_generate_water_bodies_respects_count() {
        let noise = NoiseField::new();
        let catalog = TileCatalog::default();
        let mut rng = Pcg64::seed_from_u64(11);
        let config = WaterConfig {
            bodies: CountRange::exactly(2),
            ..Default::default()
        };
        let output = generate_water_bodies(40, 40, &noise, &catalog, &config, &mut rng);
        assert_eq!(output.bodies.len(), 2);
        let water_cells: usize = output.bodies.iter().map(WaterBody::len).sum();
        let full_water = output
            .placements
            .iter()
            .filter(|p| p.tile_type_id == "water_full")
            .count();
        assert_eq!(full_water, water_cells);
    }

    #[test]
    fn test_no_water_bodies() {
        let noise = NoiseField::new();
        let catalog = TileCatalog::default();
        let config = WaterConfig {
            bodies: CountRange::exactly(0),
            ..Default::default()
        };
        let output =
            generate_water_bodies(10, 10, &noise, &catalog, &config, &mut Pcg64::seed_from_u64(3));
        assert!(output.bodies.is_empty());
        assert!(output.placements.is_empty());
    }
}
