//! Alert classification value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// What an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    HighTemperature,
    AbnormalVibration,
    HighEnergyConsumption,
    LowHealthScore,
    EquipmentOffline,
    /// Equipment entered FAULTY; a human must decide whether it is a breakdown.
    EquipmentBreakdownCheck,
    BreakdownReported,
}

impl AlertType {
    const ALL: [AlertType; 7] = [
        AlertType::HighTemperature,
        AlertType::AbnormalVibration,
        AlertType::HighEnergyConsumption,
        AlertType::LowHealthScore,
        AlertType::EquipmentOffline,
        AlertType::EquipmentBreakdownCheck,
        AlertType::BreakdownReported,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HighTemperature => "HIGH_TEMPERATURE",
            AlertType::AbnormalVibration => "ABNORMAL_VIBRATION",
            AlertType::HighEnergyConsumption => "HIGH_ENERGY_CONSUMPTION",
            AlertType::LowHealthScore => "LOW_HEALTH_SCORE",
            AlertType::EquipmentOffline => "EQUIPMENT_OFFLINE",
            AlertType::EquipmentBreakdownCheck => "EQUIPMENT_BREAKDOWN_CHECK",
            AlertType::BreakdownReported => "BREAKDOWN_REPORTED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("type", format!("unknown alert type '{}'", s)))
    }

    /// Alerts of this type may not be closed through generic resolution.
    pub fn requires_breakdown_decision(&self) -> bool {
        matches!(self, AlertType::EquipmentBreakdownCheck)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert urgency, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPriority {
    Normal,
    High,
    Critical,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::Normal => "NORMAL",
            AlertPriority::High => "HIGH",
            AlertPriority::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "NORMAL" => Ok(AlertPriority::Normal),
            "HIGH" => Ok(AlertPriority::High),
            "CRITICAL" => Ok(AlertPriority::Critical),
            other => Err(ValidationError::invalid_format(
                "priority",
                format!("unknown priority '{}'", other),
            )),
        }
    }
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
