pub mod constants;
pub mod coordinates;
pub mod decorations;
pub mod fields;
pub mod noise;
pub mod river_router;
pub mod roads;
pub mod settlements;
pub mod walk;
pub mod water;
