use super::constants::*;
use super::coordinates::GridCoord;
use crate::config::range_types::CountRange;
use crate::map::Grid;
use crate::tiles::catalog::TileCatalog;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecorationConfig {
    #[validate(nested)]
    pub mountain_attempts: CountRange,
    pub mountain_min_elevation: f64,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            mountain_attempts: CountRange::new(
                DEFAULT_MOUNTAIN_ATTEMPTS_MIN,
                DEFAULT_MOUNTAIN_ATTEMPTS_MAX,
            ),
            mountain_min_elevation: MOUNTAIN_MIN_ELEVATION,
        }
    }
}

/// Drop mountains on a few random high grass cells. Returns how many landed.
pub fn place_mountains<R: Rng + ?Sized>(
    grid: &mut Grid,
    catalog: &TileCatalog,
    config: &DecorationConfig,
    rng: &mut R,
) -> usize {
    let palette = catalog.palette();
    let attempts = config.mountain_attempts.sample(rng);
    let mut placed = 0;

    for _ in 0..attempts {
        let coord = GridCoord::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        let is_plain = grid
            .cell(coord)
            .is_some_and(|cell| cell.tile_type_id == palette.default_tile);

        if is_plain && grid.elevation(coord) > config.mountain_min_elevation {
            grid.set_tile(coord, &palette.mountain, 0);
            placed += 1;
        }
    }

    debug!("Placed {} of {} mountain attempts", placed, attempts);
    placed
}

/// Give unrotated decorative tiles a random rotation, leaving settlement cells alone
pub fn finalize_decorative_rotations<R: Rng + ?Sized>(
    grid: &mut Grid,
    catalog: &TileCatalog,
    settlement_cells: &HashSet<usize>,
    rng: &mut R,
) -> usize {
    let mut rotated = 0;
    for (index, cell) in grid.cells.iter_mut().enumerate() {
        if settlement_cells.contains(&index) || cell.rotation != 0 {
            continue;
        }
        if catalog.is_decorative(&cell.tile_type_id) {
            cell.rotation = rng.gen_range(0..4);
            rotated += 1;
        }
    }
    rotated
}
