pub mod config;
pub mod errors;
pub mod generator;
pub mod map;
pub mod terrain;
pub mod tiles;

// Selective re-exports for external consumers

pub use config::GeneratorConfig;
pub use errors::{TilescapeError, TilescapeResult};
pub use generator::{Landscape, LandscapeBuilder, LandscapeGenerator};
pub use map::{LandscapeDocument, TileRecord};
pub use tiles::catalog::{ConnectionSignature, EdgeLabel, TileCatalog, TileDefinition, TilePalette};
