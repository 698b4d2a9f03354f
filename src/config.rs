pub mod range_types;

use crate::errors::{TilescapeError, TilescapeResult, describe_validation_errors};
use crate::terrain::constants::{COVERAGE_PLACEMENT_ATTEMPTS, DEFAULT_RELAXATION_PASSES};
use crate::terrain::decorations::DecorationConfig;
use crate::terrain::river_router::RiverConfig;
use crate::terrain::roads::RoadConfig;
use crate::terrain::settlements::SettlementConfig;
use crate::terrain::water::WaterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolverConfig {
    #[validate(range(min = 1, max = 100))]
    pub relaxation_passes: u32,
    /// Place every unused catalog tile somewhere after baking
    pub coverage_enabled: bool,
    #[validate(range(min = 1, max = 10000))]
    pub coverage_attempts: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            relaxation_passes: DEFAULT_RELAXATION_PASSES,
            coverage_enabled: true,
            coverage_attempts: COVERAGE_PLACEMENT_ATTEMPTS,
        }
    }
}

/// Every tunable of a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GeneratorConfig {
    #[validate(nested)]
    pub water: WaterConfig,
    #[validate(nested)]
    pub settlements: SettlementConfig,
    #[validate(nested)]
    pub rivers: RiverConfig,
    #[validate(nested)]
    pub roads: RoadConfig,
    #[validate(nested)]
    pub decorations: DecorationConfig,
    #[validate(nested)]
    pub resolver: ResolverConfig,
}

impl GeneratorConfig {
    pub fn check(&self) -> TilescapeResult<()> {
        self.validate().map_err(|e| TilescapeError::InvalidConfig {
            reason: describe_validation_errors(&e),
        })
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("tilescape");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

/// Read and validate a config file
pub fn load_config_from(path: &Path) -> TilescapeResult<GeneratorConfig> {
    let contents = fs::read_to_string(path)?;
    let config: GeneratorConfig = toml::from_str(&contents)?;
    config.check()?;
    debug!("Loaded generator config from {}", path.display());
    Ok(config)
}

/// User config if present and valid, defaults otherwise
pub fn load_config() -> GeneratorConfig {
    let Some(config_path) = get_config_path() else {
        return GeneratorConfig::default();
    };
    if !config_path.exists() {
        return GeneratorConfig::default();
    }

    match load_config_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config at {}: {}", config_path.display(), e);
            GeneratorConfig::default()
        }
    }
}

pub fn save_config_to(config: &GeneratorConfig, path: &Path) -> TilescapeResult<()> {
    config.check()?;
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Write to the user config location, returning where it went
pub fn save_config(config: &GeneratorConfig) -> TilescapeResult<PathBuf> {
    let config_path = get_config_path().ok_or(TilescapeError::ConfigDirNotFound)?;
    save_config_to(config, &config_path)?;
    Ok(config_path)
}
