//! Anomaly rules that derive alerts from status snapshots.
//!
//! Rules are edge-triggered: a reading produces an alert only when its
//! severity rises compared with the previous snapshot, so a machine that sits
//! at 90°C does not raise a new alert on every report.

use crate::domain::equipment::{EquipmentStatusSnapshot, OperationalStatus};

use super::{AlertPriority, AlertType};

/// An alert the engine should raise, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub message: String,
}

/// Configurable anomaly thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRules {
    pub temperature_high: f64,
    pub temperature_critical: f64,
    pub vibration_high: f64,
    pub vibration_critical: f64,
    pub energy_ceiling: f64,
    pub health_floor: u8,
}

impl Default for ThresholdRules {
    fn default() -> Self {
        Self {
            temperature_high: 80.0,
            temperature_critical: 100.0,
            vibration_high: 10.0,
            vibration_critical: 15.0,
            energy_ceiling: 500.0,
            health_floor: 30,
        }
    }
}

fn graded(value: Option<f64>, high: f64, critical: f64) -> Option<AlertPriority> {
    match value {
        Some(v) if v > critical => Some(AlertPriority::Critical),
        Some(v) if v > high => Some(AlertPriority::High),
        _ => None,
    }
}

fn rose(previous: Option<AlertPriority>, current: Option<AlertPriority>) -> Option<AlertPriority> {
    match (previous, current) {
        (_, None) => None,
        (None, Some(c)) => Some(c),
        (Some(p), Some(c)) if c > p => Some(c),
        _ => None,
    }
}

impl ThresholdRules {
    fn temperature(&self, s: &EquipmentStatusSnapshot) -> Option<AlertPriority> {
        graded(s.telemetry.temperature, self.temperature_high, self.temperature_critical)
    }

    fn vibration(&self, s: &EquipmentStatusSnapshot) -> Option<AlertPriority> {
        graded(s.telemetry.vibration, self.vibration_high, self.vibration_critical)
    }

    fn energy(&self, s: &EquipmentStatusSnapshot) -> Option<AlertPriority> {
        s.telemetry
            .energy_consumption
            .filter(|e| *e > self.energy_ceiling)
            .map(|_| AlertPriority::Normal)
    }

    fn health(&self, s: &EquipmentStatusSnapshot) -> Option<AlertPriority> {
        (s.health_score.value() < self.health_floor).then_some(AlertPriority::High)
    }

    /// Derives the alerts `current` warrants given the snapshot it replaced.
    pub fn evaluate(
        &self,
        previous: Option<&EquipmentStatusSnapshot>,
        current: &EquipmentStatusSnapshot,
    ) -> Vec<AlertDraft> {
        let mut drafts = Vec::new();
        let t = &current.telemetry;

        if let Some(priority) = rose(previous.and_then(|p| self.temperature(p)), self.temperature(current)) {
            drafts.push(AlertDraft {
                alert_type: AlertType::HighTemperature,
                priority,
                message: format!(
                    "Temperature {:.1}°C exceeds {:.1}°C",
                    t.temperature.unwrap_or_default(),
                    self.temperature_high
                ),
            });
        }

        if let Some(priority) = rose(previous.and_then(|p| self.vibration(p)), self.vibration(current)) {
            drafts.push(AlertDraft {
                alert_type: AlertType::AbnormalVibration,
                priority,
                message: format!(
                    "Vibration {:.1} mm/s exceeds {:.1} mm/s",
                    t.vibration.unwrap_or_default(),
                    self.vibration_high
                ),
            });
        }

        if let Some(priority) = rose(previous.and_then(|p| self.energy(p)), self.energy(current)) {
            drafts.push(AlertDraft {
                alert_type: AlertType::HighEnergyConsumption,
                priority,
                message: format!(
                    "Energy consumption {:.1} W exceeds {:.1} W",
                    t.energy_consumption.unwrap_or_default(),
                    self.energy_ceiling
                ),
            });
        }

        if let Some(priority) = rose(previous.and_then(|p| self.health(p)), self.health(current)) {
            drafts.push(AlertDraft {
                alert_type: AlertType::LowHealthScore,
                priority,
                message: format!(
                    "Health score {} is below {}",
                    current.health_score.value(),
                    self.health_floor
                ),
            });
        }

        if current.entered(previous, OperationalStatus::Faulty) {
            drafts.push(AlertDraft {
                alert_type: AlertType::EquipmentBreakdownCheck,
                priority: AlertPriority::High,
                message: "Equipment reported FAULTY; confirm whether it has broken down".to_string(),
            });
        }

        if current.entered(previous, OperationalStatus::Offline) {
            drafts.push(AlertDraft {
                alert_type: AlertType::EquipmentOffline,
                priority: AlertPriority::Normal,
                message: "Equipment went offline".to_string(),
            });
        }

        drafts
    }

    /// Checks that every critical bound sits above its high bound.
    pub fn is_consistent(&self) -> bool {
        self.temperature_critical > self.temperature_high
            && self.vibration_critical > self.vibration_high
            && self.energy_ceiling > 0.0
            && self.health_floor <= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::{HealthScore, StatusReport, Telemetry};
    use crate::domain::foundation::{EquipmentId, Timestamp};

    fn snapshot(
        previous: Option<&EquipmentStatusSnapshot>,
        report: StatusReport,
    ) -> EquipmentStatusSnapshot {
        EquipmentStatusSnapshot::merge(EquipmentId::new("EQ-1").unwrap(), previous, &report, Timestamp::now())
    }

    fn temperature(value: f64) -> StatusReport {
        StatusReport {
            telemetry: Telemetry {
                temperature: Some(value),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn types(drafts: &[AlertDraft]) -> Vec<AlertType> {
        drafts.iter().map(|d| d.alert_type).collect()
    }

    #[test]
    fn normal_readings_raise_nothing() {
        let s = snapshot(None, temperature(40.0));
        assert!(ThresholdRules::default().evaluate(None, &s).is_empty());
    }

    #[test]
    fn temperature_above_high_is_high_priority() {
        let s = snapshot(None, temperature(85.0));
        let drafts = ThresholdRules::default().evaluate(None, &s);
        assert_eq!(types(&drafts), vec![AlertType::HighTemperature]);
        assert_eq!(drafts[0].priority, AlertPriority::High);
    }

    #[test]
    fn temperature_above_critical_is_critical() {
        let s = snapshot(None, temperature(105.0));
        let drafts = ThresholdRules::default().evaluate(None, &s);
        assert_eq!(drafts[0].priority, AlertPriority::Critical);
    }

    #[test]
    fn sustained_breach_does_not_repeat() {
        let rules = ThresholdRules::default();
        let first = snapshot(None, temperature(85.0));
        let second = snapshot(Some(&first), temperature(88.0));
        assert!(rules.evaluate(Some(&first), &second).is_empty());
    }

    #[test]
    fn escalation_raises_again() {
        let rules = ThresholdRules::default();
        let first = snapshot(None, temperature(85.0));
        let second = snapshot(Some(&first), temperature(101.0));
        let drafts = rules.evaluate(Some(&first), &second);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].priority, AlertPriority::Critical);
    }

    #[test]
    fn vibration_thresholds_follow_grades() {
        let rules = ThresholdRules::default();
        let report = StatusReport {
            telemetry: Telemetry {
                vibration: Some(16.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let drafts = rules.evaluate(None, &snapshot(None, report));
        assert_eq!(types(&drafts), vec![AlertType::AbnormalVibration]);
        assert_eq!(drafts[0].priority, AlertPriority::Critical);
    }

    #[test]
    fn low_health_raises_high() {
        let report = StatusReport {
            health_score: Some(HealthScore::new(12).unwrap()),
            ..Default::default()
        };
        let drafts = ThresholdRules::default().evaluate(None, &snapshot(None, report));
        assert_eq!(types(&drafts), vec![AlertType::LowHealthScore]);
        assert_eq!(drafts[0].priority, AlertPriority::High);
    }

    #[test]
    fn entering_faulty_raises_breakdown_check_once() {
        let rules = ThresholdRules::default();
        let ok = snapshot(None, StatusReport::default());
        let faulty = snapshot(
            Some(&ok),
            StatusReport {
                status: Some(OperationalStatus::Faulty),
                ..Default::default()
            },
        );
        let drafts = rules.evaluate(Some(&ok), &faulty);
        assert_eq!(types(&drafts), vec![AlertType::EquipmentBreakdownCheck]);
        assert_eq!(drafts[0].priority, AlertPriority::High);

        let still = snapshot(Some(&faulty), StatusReport::default());
        assert!(rules.evaluate(Some(&faulty), &still).is_empty());
    }

    #[test]
    fn entering_offline_is_normal_priority() {
        let offline = snapshot(
            None,
            StatusReport {
                status: Some(OperationalStatus::Offline),
                ..Default::default()
            },
        );
        let drafts = ThresholdRules::default().evaluate(None, &offline);
        assert_eq!(types(&drafts), vec![AlertType::EquipmentOffline]);
        assert_eq!(drafts[0].priority, AlertPriority::Normal);
    }

    #[test]
    fn default_rules_are_consistent() {
        assert!(ThresholdRules::default().is_consistent());
        let inverted = ThresholdRules {
            temperature_critical: 50.0,
            ..Default::default()
        };
        assert!(!inverted.is_consistent());
    }
}
