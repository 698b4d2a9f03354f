//! Coordinate-hash noise.
//!
//! This is not gradient noise: neighbouring samples are uncorrelated, and any
//! smoothness comes from summing several frequencies.

/// Deterministic sine-hash scalar field
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoiseField;

impl NoiseField {
    pub fn new() -> Self {
        Self
    }

    /// Sample the field; always returns a value in [-1, 1]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let n = (x * 12.9898 + y * 78.233).sin() * 43758.5453;
        (n - n.floor()) * 2.0 - 1.0
    }
}
