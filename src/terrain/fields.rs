use super::constants::*;
use super::coordinates::GridCoord;
use super::noise::NoiseField;
use crate::map::Grid;
use rand::Rng;
use tracing::debug;

/// Per-cell elevation and moisture, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainFields {
    pub width: u32,
    pub height: u32,
    pub elevation: Vec<f64>,
    pub moisture: Vec<f64>,
    /// Points the moisture field was measured from
    pub moisture_sources: Vec<GridCoord>,
}

impl TerrainFields {
    /// Flat fields for tests and callers that bring their own terrain
    pub fn flat(width: u32, height: u32, elevation: f64) -> Self {
        let total = width as usize * height as usize;
        Self {
            width,
            height,
            elevation: vec![elevation; total],
            moisture: vec![0.0; total],
            moisture_sources: Vec::new(),
        }
    }

    /// Copy both fields into the grid cells
    pub fn write_into(&self, grid: &mut Grid) {
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            cell.elevation = self.elevation.get(i).copied().unwrap_or(0.0);
            cell.moisture = self.moisture.get(i).copied().unwrap_or(0.0);
        }
    }
}

/// Layered noise elevation at one coordinate
pub fn elevation_at(noise: &NoiseField, x: u32, y: u32) -> f64 {
    ELEVATION_OCTAVES
        .iter()
        .map(|&(frequency, amplitude)| noise.sample(x as f64 * frequency, y as f64 * frequency) * amplitude)
        .sum()
}

pub fn generate_elevation(width: u32, height: u32, noise: &NoiseField) -> Vec<f64> {
    let mut elevation = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            elevation.push(elevation_at(noise, x, y));
        }
    }
    elevation
}

/// Moisture falls off linearly with distance to the nearest source point
pub fn moisture_from_sources(width: u32, height: u32, sources: &[GridCoord]) -> Vec<f64> {
    let mut moisture = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let here = GridCoord::new(x, y);
            let min_distance = sources
                .iter()
                .map(|source| here.distance(source))
                .fold(f64::INFINITY, f64::min);
            moisture.push((MOISTURE_MAX - min_distance * MOISTURE_FALLOFF_PER_CELL).max(0.0));
        }
    }
    moisture
}

/// Build both fields. Moisture sources are random points, unrelated to the lakes placed later.
pub fn generate_fields<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    noise: &NoiseField,
    rng: &mut R,
) -> TerrainFields {
    let elevation = generate_elevation(width, height, noise);

    let moisture_sources: Vec<GridCoord> = (0..MOISTURE_SEED_POINTS)
        .map(|_| GridCoord::new(rng.gen_range(0..width), rng.gen_range(0..height)))
        .collect();
    let moisture = moisture_from_sources(width, height, &moisture_sources);

    debug!(
        "Built elevation/moisture fields for {}x{} grid from {} moisture sources",
        width,
        height,
        moisture_sources.len()
    );

    TerrainFields {
        width,
        height,
        elevation,
        moisture,
        moisture_sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_elevation_is_octave_sum() {
        let noise = NoiseField::new();
        let expected = noise.sample(3.0 * 0.02, 7.0 * 0.02) * 100.0
            + noise.sample(3.0 * 0.05, 7.0 * 0.05) * 50.0
            + noise.sample(3.0 * 0.1, 7.0 * 0.1) * 25.0
            + noise.sample(3.0 * 0.2, 7.0 * 0.2) * 12.0;
        assert!((elevation_at(&noise, 3, 7) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_bounds() {
        let noise = NoiseField::new();
        let elevation = generate_elevation(20, 10, &noise);
        assert_eq!(elevation.len(), 200);
        assert!(elevation.iter().all(|e| e.abs() <= 187.0));
    }

    #[test]
    fn test_moisture_falloff() {
        let sources = [GridCoord::new(0, 0)];
        let moisture = moisture_from_sources(60, 1, &sources);
        assert_eq!(moisture[0], 100.0);
        assert_eq!(moisture[10], 80.0);
        assert_eq!(moisture[50], 0.0);
        assert_eq!(moisture[59], 0.0);
    }

    #[test]
    fn test_fields_are_reproducible_from_seed() {
        let noise = NoiseField::new();
        let a = generate_fields(16, 12, &noise, &mut Pcg64::seed_from_u64(99));
        let b = generate_fields(16, 12, &noise, &mut Pcg64::seed_from_u64(99));
        assert_eq!(a, b);
        assert_eq!(a.moisture_sources.len(), MOISTURE_SEED_POINTS);
        assert!(a.moisture.iter().all(|m| (0.0..=100.0).contains(m)));
    }

    #[test]
    fn test_write_into_grid() {
        let mut grid = Grid::new(2, 2, "grass").unwrap();
        let mut fields = TerrainFields::flat(2, 2, 12.5);
        fields.moisture[3] = 40.0;
        fields.write_into(&mut grid);
        assert!(grid.cells.iter().all(|c| c.elevation == 12.5));
        assert_eq!(grid.cells[3].moisture, 40.0);
    }
}
