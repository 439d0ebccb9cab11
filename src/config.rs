use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::Path;

/// Configuration for the sun exposure computation.
///
/// Every field can be overridden from a JSON file; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Height of the ray origin above the ground (terrace table height), meters.
    pub table_height: f64,
    /// Maximum ray traversal distance, meters.
    pub max_ray_distance: f64,
    /// Time step used while a venue is sunny, minutes.
    pub sunny_step_minutes: i64,
    /// Time step used while a venue is shaded, minutes.
    pub shaded_step_minutes: i64,
    /// How far ahead predictions look, minutes.
    pub horizon_minutes: i64,
    /// Height assumed for buildings without height information, meters.
    pub default_building_height: f64,
}

impl ExposureConfig {
    pub fn new() -> Self {
        Self {
            table_height: 0.75,
            max_ray_distance: 2000.,
            sunny_step_minutes: 10,
            shaded_step_minutes: 15,
            horizon_minutes: 480,
            default_building_height: crate::building::DEFAULT_BUILDING_HEIGHT,
        }
    }

    /// Reads a config file. Missing fields fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.table_height.is_finite() || self.table_height < 0. {
            return Err(anyhow!("table_height must be >= 0, got {}", self.table_height));
        }
        if !self.max_ray_distance.is_finite() || self.max_ray_distance <= 0. {
            return Err(anyhow!(
                "max_ray_distance must be > 0, got {}",
                self.max_ray_distance
            ));
        }
        if self.sunny_step_minutes <= 0 || self.shaded_step_minutes <= 0 {
            return Err(anyhow!("Time steps must be positive"));
        }
        if self.horizon_minutes < self.sunny_step_minutes.max(self.shaded_step_minutes) {
            return Err(anyhow!(
                "horizon_minutes ({}) is shorter than a single time step",
                self.horizon_minutes
            ));
        }
        if !self.default_building_height.is_finite() || self.default_building_height <= 0. {
            return Err(anyhow!(
                "default_building_height must be > 0, got {}",
                self.default_building_height
            ));
        }
        Ok(())
    }
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self::new()
    }
}
