//! Notification ports - who to tell about an alert, and how to tell them.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::alert::{Alert, AlertPriority};
use crate::domain::foundation::{AlertId, DomainError, EquipmentId, Timestamp, UserId};

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient: UserId,
    pub title: String,
    pub message: String,
    pub priority: AlertPriority,
    pub equipment_id: EquipmentId,
    pub alert_id: Option<AlertId>,
    pub created_at: Timestamp,
}

impl Notification {
    /// Builds the notification for `recipient` about `alert`.
    pub fn for_alert(recipient: UserId, alert: &Alert) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            title: format!("{} on {}", alert.alert_type, alert.equipment_id),
            message: alert.message.clone(),
            priority: alert.priority,
            equipment_id: alert.equipment_id.clone(),
            alert_id: Some(alert.id),
            created_at: alert.created_at,
        }
    }
}

/// Delivers notifications to users.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: Notification) -> Result<(), DomainError>;
}

/// Resolves the users who should hear about events on a piece of equipment.
///
/// Expected recipients are all policy makers plus the managers and trainers
/// of the lab that owns the equipment. Order is unspecified; duplicates must
/// not be returned.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn recipients_for(&self, equipment_id: &EquipmentId) -> Result<Vec<UserId>, DomainError>;
}
