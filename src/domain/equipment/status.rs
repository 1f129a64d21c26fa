//! Operational status and health score value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Current operational state of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationalStatus {
    Operational,
    InUse,
    InClass,
    Idle,
    Maintenance,
    Faulty,
    Offline,
    Warning,
}

impl OperationalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalStatus::Operational => "OPERATIONAL",
            OperationalStatus::InUse => "IN_USE",
            OperationalStatus::InClass => "IN_CLASS",
            OperationalStatus::Idle => "IDLE",
            OperationalStatus::Maintenance => "MAINTENANCE",
            OperationalStatus::Faulty => "FAULTY",
            OperationalStatus::Offline => "OFFLINE",
            OperationalStatus::Warning => "WARNING",
        }
    }

    /// Parses the wire/storage name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        const ALL: [OperationalStatus; 8] = [
            OperationalStatus::Operational,
            OperationalStatus::InUse,
            OperationalStatus::InClass,
            OperationalStatus::Idle,
            OperationalStatus::Maintenance,
            OperationalStatus::Faulty,
            OperationalStatus::Offline,
            OperationalStatus::Warning,
        ];
        ALL.into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("status", format!("unknown status '{}'", s))
            })
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health score in the closed range 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct HealthScore(u8);

impl HealthScore {
    pub const MAX: HealthScore = HealthScore(100);

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=100).contains(&value) {
            return Err(ValidationError::out_of_range("health_score", 0, 100, value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for HealthScore {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<i64> for HealthScore {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HealthScore> for u8 {
    fn from(score: HealthScore) -> Self {
        score.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_name() {
        let json = serde_json::to_string(&OperationalStatus::InClass).unwrap();
        assert_eq!(json, "\"IN_CLASS\"");
        assert_eq!(
            OperationalStatus::parse("IN_CLASS").unwrap(),
            OperationalStatus::InClass
        );
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert!(OperationalStatus::parse("BROKEN").is_err());
    }

    #[test]
    fn health_score_bounds() {
        assert!(HealthScore::new(0).is_ok());
        assert!(HealthScore::new(100).is_ok());
        assert!(HealthScore::new(101).is_err());
        assert!(HealthScore::new(-1).is_err());
    }

    #[test]
    fn health_score_deserialize_validates() {
        let ok: Result<HealthScore, _> = serde_json::from_str("87");
        assert_eq!(ok.unwrap().value(), 87);
        let bad: Result<HealthScore, _> = serde_json::from_str("150");
        assert!(bad.is_err());
    }
}
