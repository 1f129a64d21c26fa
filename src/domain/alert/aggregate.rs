//! Alert aggregate.
//!
//! An alert is raised unresolved and may be resolved exactly once. Resolution
//! records who resolved it, when, and an optional note. A second resolution
//! is reported as `AlreadyResolved` with the stored alert, unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AlertId, BreakdownId, EquipmentId, Timestamp, UserId};

use super::{AlertPriority, AlertType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub equipment_id: EquipmentId,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub message: String,
    pub resolved: bool,
    pub resolved_by: Option<UserId>,
    pub resolution_note: Option<String>,
    /// Breakdown this alert refers to, if any. Reference only.
    pub breakdown_id: Option<BreakdownId>,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

/// Result of a resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// This call resolved the alert.
    Resolved(Alert),
    /// The alert was already resolved; nothing changed.
    AlreadyResolved(Alert),
}

impl ResolveOutcome {
    pub fn alert(&self) -> &Alert {
        match self {
            ResolveOutcome::Resolved(alert) | ResolveOutcome::AlreadyResolved(alert) => alert,
        }
    }

    pub fn into_alert(self) -> Alert {
        match self {
            ResolveOutcome::Resolved(alert) | ResolveOutcome::AlreadyResolved(alert) => alert,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, ResolveOutcome::Resolved(_))
    }
}

impl Alert {
    /// Creates a new unresolved alert.
    pub fn raise(
        equipment_id: EquipmentId,
        alert_type: AlertType,
        priority: AlertPriority,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            equipment_id,
            alert_type,
            priority,
            message: message.into(),
            resolved: false,
            resolved_by: None,
            resolution_note: None,
            breakdown_id: None,
            created_at: Timestamp::now(),
            resolved_at: None,
        }
    }

    pub fn with_breakdown(mut self, breakdown_id: BreakdownId) -> Self {
        self.breakdown_id = Some(breakdown_id);
        self
    }

    /// Applies resolution to a copy of this alert.
    ///
    /// Blank notes are stored as absent.
    pub fn resolve(&self, resolver: UserId, note: Option<String>, at: Timestamp) -> ResolveOutcome {
        if self.resolved {
            return ResolveOutcome::AlreadyResolved(self.clone());
        }
        let mut resolved = self.clone();
        resolved.resolved = true;
        resolved.resolved_by = Some(resolver);
        resolved.resolution_note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        resolved.resolved_at = Some(at);
        ResolveOutcome::Resolved(resolved)
    }

    /// Resolves a breakdown check as confirmed, linking it to `breakdown_id`.
    ///
    /// `existing` marks a breakdown that was already open before the check
    /// was answered.
    pub fn confirm_breakdown(
        &self,
        breakdown_id: BreakdownId,
        existing: bool,
        resolver: UserId,
        at: Timestamp,
    ) -> ResolveOutcome {
        let note = if existing {
            format!("Confirmed as existing breakdown {}", breakdown_id)
        } else {
            format!("Confirmed as breakdown {}", breakdown_id)
        };
        match self.resolve(resolver, Some(note), at) {
            ResolveOutcome::Resolved(alert) => ResolveOutcome::Resolved(alert.with_breakdown(breakdown_id)),
            already => already,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_alert() -> Alert {
        Alert::raise(
            EquipmentId::new("EQ-1").unwrap(),
            AlertType::HighTemperature,
            AlertPriority::High,
            "Temperature 85.0°C exceeds 80.0°C",
        )
    }

    fn manager() -> UserId {
        UserId::new("manager-1").unwrap()
    }

    #[test]
    fn raise_starts_unresolved() {
        let alert = test_alert();
        assert!(!alert.resolved);
        assert!(alert.resolved_by.is_none());
        assert!(alert.resolved_at.is_none());
    }

    #[test]
    fn resolve_records_resolver_and_note() {
        let outcome = test_alert().resolve(manager(), Some("fan replaced".into()), Timestamp::now());
        assert!(outcome.was_applied());
        let alert = outcome.alert();
        assert!(alert.resolved);
        assert_eq!(alert.resolved_by, Some(manager()));
        assert_eq!(alert.resolution_note.as_deref(), Some("fan replaced"));
        assert!(alert.resolved_at.is_some());
    }

    #[test]
    fn resolve_twice_reports_already_resolved_unchanged() {
        let first = test_alert().resolve(manager(), None, Timestamp::now()).into_alert();
        let other = UserId::new("manager-2").unwrap();
        let second = first.resolve(other, Some("again".into()), Timestamp::now());

        assert!(!second.was_applied());
        assert_eq!(second.alert(), &first);
    }

    #[test]
    fn blank_note_is_dropped() {
        let outcome = test_alert().resolve(manager(), Some("   ".into()), Timestamp::now());
        assert!(outcome.alert().resolution_note.is_none());
    }

    #[test]
    fn confirming_links_breakdown_and_notes_it() {
        let breakdown_id = BreakdownId::new();
        let outcome = test_alert().confirm_breakdown(breakdown_id, true, manager(), Timestamp::now());

        assert!(outcome.was_applied());
        let alert = outcome.alert();
        assert_eq!(alert.breakdown_id, Some(breakdown_id));
        assert_eq!(
            alert.resolution_note,
            Some(format!("Confirmed as existing breakdown {}", breakdown_id))
        );
    }

    #[test]
    fn confirming_resolved_alert_changes_nothing() {
        let dismissed = test_alert()
            .resolve(manager(), Some("False alarm".into()), Timestamp::now())
            .into_alert();
        let outcome = dismissed.confirm_breakdown(BreakdownId::new(), false, manager(), Timestamp::now());

        assert!(!outcome.was_applied());
        assert_eq!(outcome.alert(), &dismissed);
    }

    #[test]
    fn serializes_type_field_name() {
        let json = serde_json::to_value(test_alert()).unwrap();
        assert_eq!(json["type"], "HIGH_TEMPERATURE");
        assert_eq!(json["priority"], "HIGH");
        assert_eq!(json["resolved"], false);
        assert_eq!(json["equipmentId"], "EQ-1");
    }
}
