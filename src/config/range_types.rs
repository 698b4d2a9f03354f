use derive_more::{Display, From};
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A probability constrained to [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct Probability(f64);

impl Probability {
    const MIN: f64 = 0.0;
    const MAX: f64 = 1.0;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Roll against this probability
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        rng.r#gen::<f64>() < self.0
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// A multiplicative cost factor constrained to [0.01, 100.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct CostFactor(f64);

impl CostFactor {
    const MIN: f64 = 0.01;
    const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for CostFactor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Inclusive integer range for "how many of X" settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_count_range"))]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(count: u32) -> Self {
        Self::new(count, count)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

fn validate_count_range(range: &CountRange) -> Result<(), ValidationError> {
    if range.min > range.max {
        return Err(ValidationError::new("count_range_inverted"));
    }
    Ok(())
}

/// Inclusive float interval a factor is drawn from uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_jitter_range"))]
pub struct JitterRange {
    pub min: CostFactor,
    pub max: CostFactor,
}

impl JitterRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: CostFactor::new(min),
            max: CostFactor::new(max),
        }
    }

    /// A degenerate range that always yields `value`
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (min, max) = (self.min.get(), self.max.get());
        if max <= min {
            min
        } else {
            rng.gen_range(min..=max)
        }
    }
}

fn validate_jitter_range(range: &JitterRange) -> Result<(), ValidationError> {
    if range.min > range.max {
        return Err(ValidationError::new("jitter_range_inverted"));
    }
    Ok(())
}
