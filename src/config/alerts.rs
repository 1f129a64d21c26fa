//! Alert threshold and notification configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::domain::alert::ThresholdRules;

/// Telemetry thresholds for derived alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_temperature_high")]
    pub temperature_high: f64,

    #[serde(default = "default_temperature_critical")]
    pub temperature_critical: f64,

    #[serde(default = "default_vibration_high")]
    pub vibration_high: f64,

    #[serde(default = "default_vibration_critical")]
    pub vibration_critical: f64,

    #[serde(default = "default_energy_ceiling")]
    pub energy_ceiling: f64,

    #[serde(default = "default_health_floor")]
    pub health_floor: u8,

    /// JSON file listing who is notified for which equipment
    pub directory_path: Option<PathBuf>,
}

impl AlertsConfig {
    pub fn rules(&self) -> ThresholdRules {
        ThresholdRules {
            temperature_high: self.temperature_high,
            temperature_critical: self.temperature_critical,
            vibration_high: self.vibration_high,
            vibration_critical: self.vibration_critical,
            energy_ceiling: self.energy_ceiling,
            health_floor: self.health_floor,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.temperature_high >= self.temperature_critical {
            return Err(ValidationError::InvalidThresholds(
                "temperature_high must be below temperature_critical",
            ));
        }
        if self.vibration_high >= self.vibration_critical {
            return Err(ValidationError::InvalidThresholds(
                "vibration_high must be below vibration_critical",
            ));
        }
        if self.health_floor > 100 {
            return Err(ValidationError::InvalidThresholds("health_floor must be at most 100"));
        }
        if !self.rules().is_consistent() {
            return Err(ValidationError::InvalidThresholds("energy_ceiling must be positive"));
        }
        Ok(())
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            temperature_high: default_temperature_high(),
            temperature_critical: default_temperature_critical(),
            vibration_high: default_vibration_high(),
            vibration_critical: default_vibration_critical(),
            energy_ceiling: default_energy_ceiling(),
            health_floor: default_health_floor(),
            directory_path: None,
        }
    }
}

fn default_temperature_high() -> f64 {
    80.0
}

fn default_temperature_critical() -> f64 {
    100.0
}

fn default_vibration_high() -> f64 {
    10.0
}

fn default_vibration_critical() -> f64 {
    15.0
}

fn default_energy_ceiling() -> f64 {
    500.0
}

fn default_health_floor() -> u8 {
    30
}
