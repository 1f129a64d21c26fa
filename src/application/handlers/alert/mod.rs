//! Alert engine handlers.
//!
//! Alerts are announced to the policy-maker role room, to watchers of the
//! equipment, and to the personal rooms of the owning lab's staff as listed
//! by the recipient directory. Staff of other labs hear nothing. Resolution
//! is announced to the same rooms, once.

mod get_alert;
mod list_alerts;
mod raise_alert;
mod resolve_alert;

pub use get_alert::{GetAlertHandler, GetAlertQuery};
pub use list_alerts::{ListAlertsHandler, ListAlertsQuery};
pub use raise_alert::{RaiseAlertCommand, RaiseAlertHandler};
pub use resolve_alert::{ResolveAlertCommand, ResolveAlertHandler, ResolveAlertResult};

use crate::domain::alert::Alert;
use crate::domain::foundation::{EquipmentId, Role, UserId};
use crate::ports::{Gateway, GatewayEvent, RecipientDirectory, RoomKey};

/// Users who should hear about alerts on `equipment_id`.
///
/// A failed lookup is logged and yields nobody; the alert still reaches the
/// role and equipment rooms.
pub(crate) async fn lab_recipients(
    directory: &dyn RecipientDirectory,
    equipment_id: &EquipmentId,
) -> Vec<UserId> {
    match directory.recipients_for(equipment_id).await {
        Ok(recipients) => recipients,
        Err(e) => {
            tracing::warn!(equipment_id = %equipment_id, error = %e, "Recipient lookup failed");
            Vec::new()
        }
    }
}

/// Rooms that hear about alerts on `equipment_id`.
pub fn alert_rooms(equipment_id: &EquipmentId, recipients: &[UserId]) -> Vec<RoomKey> {
    let mut rooms = vec![RoomKey::Role(Role::PolicyMaker), RoomKey::equipment(equipment_id)];
    rooms.extend(recipients.iter().map(RoomKey::user));
    rooms
}

/// Announces a resolution. Callers publish only when their call resolved it.
pub(crate) async fn publish_resolved(
    gateway: &dyn Gateway,
    directory: &dyn RecipientDirectory,
    alert: &Alert,
) {
    let recipients = lab_recipients(directory, &alert.equipment_id).await;
    gateway
        .publish_to_rooms(
            alert_rooms(&alert.equipment_id, &recipients),
            GatewayEvent::AlertResolved(alert.clone()),
        )
        .await;
}
