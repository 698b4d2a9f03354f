use crate::errors::{TilescapeError, TilescapeResult, describe_validation_errors};
use crate::terrain::coordinates::GridCoord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// One grid cell: the committed tile plus the terrain fields it was generated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub tile_type_id: String,
    pub rotation: u8,
    pub elevation: f64,
    pub moisture: f64,
}

/// Row-major tile grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>, // Flattened 2D array (row-major)
}

/// A tile + rotation a stage wants committed at a coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePlacement {
    pub coord: GridCoord,
    pub tile_type_id: String,
    pub rotation: u8,
}

/// Flattened export record consumed by the placement front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRecord {
    pub tile_type_id: String,
    pub x: u32,
    pub y: u32,
    pub rotation: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub settlement_count: usize,
    pub river_count: usize,
    pub road_count: usize,
    pub generated_at_timestamp: String,
}

/// Serializable landscape export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_tile_count"))]
pub struct LandscapeDocument {
    #[validate(range(min = 1, max = 4096))]
    pub width: u32,
    #[validate(range(min = 1, max = 4096))]
    pub height: u32,
    pub tiles: Vec<TileRecord>,
    pub metadata: DocumentMetadata,
}

fn validate_tile_count(document: &LandscapeDocument) -> Result<(), ValidationError> {
    let expected = document.width as usize * document.height as usize;
    if document.tiles.len() != expected {
        return Err(ValidationError::new("tile_count_mismatch"));
    }
    if document
        .tiles
        .iter()
        .any(|t| t.x >= document.width || t.y >= document.height || t.rotation > 3)
    {
        return Err(ValidationError::new("tile_out_of_range"));
    }
    Ok(())
}

impl Grid {
    /// Create a grid filled with `default_tile` at rotation 0
    pub fn new(width: u32, height: u32, default_tile: &str) -> TilescapeResult<Self> {
        if width == 0 || height == 0 {
            return Err(TilescapeError::InvalidDimensions { width, height });
        }

        let cell = Cell {
            tile_type_id: default_tile.to_string(),
            rotation: 0,
            elevation: 0.0,
            moisture: 0.0,
        };

        Ok(Self {
            width,
            height,
            cells: vec![cell; width as usize * height as usize],
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        if !self.contains(coord) {
            return None;
        }
        self.cells.get(coord.index(self.width))
    }

    pub fn cell_mut(&mut self, coord: GridCoord) -> Option<&mut Cell> {
        if !self.contains(coord) {
            return None;
        }
        let index = coord.index(self.width);
        self.cells.get_mut(index)
    }

    pub fn elevation(&self, coord: GridCoord) -> f64 {
        self.cell(coord).map(|c| c.elevation).unwrap_or(0.0)
    }

    /// Commit a tile; out-of-bounds coordinates are ignored
    pub fn set_tile(&mut self, coord: GridCoord, tile_type_id: &str, rotation: u8) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.tile_type_id = tile_type_id.to_string();
            cell.rotation = rotation % 4;
        }
    }

    pub fn apply(&mut self, placements: &[TilePlacement]) {
        for placement in placements {
            self.set_tile(placement.coord, &placement.tile_type_id, placement.rotation);
        }
    }

    /// Cells paired with their coordinates in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (GridCoord::from_index(i, width), cell))
    }

    /// Flatten to row-major export records
    pub fn to_records(&self) -> Vec<TileRecord> {
        self.iter()
            .map(|(coord, cell)| TileRecord {
                tile_type_id: cell.tile_type_id.clone(),
                x: coord.x,
                y: coord.y,
                rotation: cell.rotation,
            })
            .collect()
    }
}

impl LandscapeDocument {
    pub fn to_json(&self) -> TilescapeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> TilescapeResult<Self> {
        let document: LandscapeDocument =
            serde_json::from_str(json).map_err(|e| TilescapeError::CorruptedDocument {
                reason: format!("Failed to parse landscape JSON: {e}"),
            })?;
        document.check()?;
        Ok(document)
    }

    fn check(&self) -> TilescapeResult<()> {
        self.validate()
            .map_err(|validation_errors| TilescapeError::DocumentValidationFailed {
                reason: describe_validation_errors(&validation_errors),
            })
    }

    fn is_json_path(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// Save as pretty JSON for `.json` paths, bincode otherwise
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> TilescapeResult<()> {
        self.check()?;

        let file_path = path.as_ref();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = if Self::is_json_path(file_path) {
            self.to_json()?.into_bytes()
        } else {
            bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
                TilescapeError::EncodeFailed {
                    reason: format!("Failed to serialize landscape: {e}"),
                }
            })?
        };

        std::fs::write(file_path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TilescapeResult<Self> {
        let file_path = path.as_ref();
        if !file_path.exists() {
            return Err(TilescapeError::DocumentNotFound {
                path: file_path.to_path_buf(),
            });
        }

        if Self::is_json_path(file_path) {
            let json = std::fs::read_to_string(file_path)?;
            return Self::from_json(&json);
        }

        let data = std::fs::read(file_path)?;
        let (document, _): (LandscapeDocument, usize) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(|e| {
                TilescapeError::CorruptedDocument {
                    reason: format!("Failed to deserialize landscape data: {e}"),
                }
            })?;

        document.check()?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> LandscapeDocument {
        let mut grid = Grid::new(2, 2, "grass").unwrap();
        grid.set_tile(GridCoord::new(1, 0), "road_start", 2);
        LandscapeDocument {
            width: 2,
            height: 2,
            tiles: grid.to_records(),
            metadata: DocumentMetadata {
                settlement_count: 0,
                river_count: 0,
                road_count: 1,
                generated_at_timestamp: "2024-01-01T00:00:00+00:00".to_string(),
            },
        }
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(3, 2, "grass").unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.len(), 6);
        assert!(grid.cells.iter().all(|c| c.tile_type_id == "grass" && c.rotation == 0));
    }

    #[test]
    fn test_grid_rejects_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 5, "grass"),
            Err(TilescapeError::InvalidDimensions { width: 0, height: 5 })
        ));
        assert!(Grid::new(5, 0, "grass").is_err());
    }

    #[test]
    fn test_cell_access_bounds() {
        let mut grid = Grid::new(2, 2, "grass").unwrap();
        assert!(grid.cell(GridCoord::new(2, 0)).is_none());
        grid.set_tile(GridCoord::new(5, 5), "water_full", 0);
        assert!(grid.cells.iter().all(|c| c.tile_type_id == "grass"));

        grid.set_tile(GridCoord::new(0, 1), "water_full", 6);
        let cell = grid.cell(GridCoord::new(0, 1)).unwrap();
        assert_eq!(cell.tile_type_id, "water_full");
        assert_eq!(cell.rotation, 2);
    }

    #[test]
    fn test_elevation_lookup() {
        let mut grid = Grid::new(2, 2, "grass").unwrap();
        grid.cells[3].elevation = 64.0;
        assert_eq!(grid.elevation(GridCoord::new(1, 1)), 64.0);
        assert_eq!(grid.elevation(GridCoord::new(0, 0)), 0.0);
        assert_eq!(grid.elevation(GridCoord::new(7, 7)), 0.0);
    }

    #[test]
    fn test_records_are_row_major() {
        let grid = Grid::new(3, 2, "grass").unwrap();
        let coords: Vec<(u32, u32)> = grid.to_records().iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_document_json_field_names() {
        let json = sample_document().to_json().unwrap();
        assert!(json.contains("\"tileTypeId\""));
        assert!(json.contains("\"settlementCount\""));
        assert!(json.contains("\"generatedAtTimestamp\""));
        let parsed = LandscapeDocument::from_json(&json).unwrap();
        assert_eq!(parsed, sample_document());
    }

    #[test]
    fn test_document_validation_catches_missing_tiles() {
        let mut document = sample_document();
        document.tiles.pop();
        assert!(document.validate().is_err());
        let json = serde_json::to_string(&document).unwrap();
        assert!(matches!(
            LandscapeDocument::from_json(&json),
            Err(TilescapeError::DocumentValidationFailed { .. })
        ));
    }

    #[test]
    fn test_document_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("tilescape-doc-{}", std::process::id()));
        let document = sample_document();

        let bin_path = dir.join("landscape.bin");
        document.save_to_file(&bin_path).unwrap();
        assert_eq!(LandscapeDocument::load_from_file(&bin_path).unwrap(), document);

        let json_path = dir.join("landscape.json");
        document.save_to_file(&json_path).unwrap();
        assert_eq!(LandscapeDocument::load_from_file(&json_path).unwrap(), document);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_document_file() {
        let result = LandscapeDocument::load_from_file("/definitely/not/here.bin");
        assert!(matches!(result, Err(TilescapeError::DocumentNotFound { .. })));
    }
}
