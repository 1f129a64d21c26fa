//! Gateway port - room-addressed, best-effort event fan-out.
//!
//! Publishers and workflow handlers hold an `Arc<dyn Gateway>` and only
//! ever call the publish methods. Room membership belongs to the adapter.
//!
//! Delivery is best-effort: only connections joined at the moment of the
//! publish receive the event, nothing is buffered for later, and a room
//! with no members is a silent no-op.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::domain::alert::Alert;
use crate::domain::breakdown::{BreakdownRecord, ReorderRequest};
use crate::domain::equipment::{EquipmentStatusSnapshot, OperationalStatus};
use crate::domain::foundation::{EquipmentId, Role, Timestamp, UserId};

use super::Notification;

/// Name of a fan-out group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomKey {
    User(UserId),
    Role(Role),
    Equipment(EquipmentId),
}

impl RoomKey {
    pub fn user(id: &UserId) -> Self {
        RoomKey::User(id.clone())
    }

    pub fn equipment(id: &EquipmentId) -> Self {
        RoomKey::Equipment(id.clone())
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKey::User(id) => write!(f, "user:{}", id),
            RoomKey::Role(role) => write!(f, "role:{}", role),
            RoomKey::Equipment(id) => write!(f, "equipment:{}", id),
        }
    }
}

/// Compact status change carried on the global topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub equipment_id: EquipmentId,
    pub status: OperationalStatus,
    pub timestamp: Timestamp,
}

/// Refresh signal for overview consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewRefresh {
    pub equipment_id: EquipmentId,
    pub status: OperationalStatus,
}

/// Server-to-client events, serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum GatewayEvent {
    /// Full snapshot, sent to `equipment:<id>`.
    EquipmentStatus(EquipmentStatusSnapshot),
    /// Global status ticker.
    EquipmentStatusUpdate(StatusUpdate),
    AlertNew(Alert),
    AlertResolved(Alert),
    NotificationNew(Notification),
    BreakdownUpdated(BreakdownRecord),
    ReorderRequested(ReorderRequest),
    ReorderReviewed(ReorderRequest),
    OverviewRefresh(OverviewRefresh),
}

impl GatewayEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            GatewayEvent::EquipmentStatus(_) => "equipment-status",
            GatewayEvent::EquipmentStatusUpdate(_) => "equipment-status-update",
            GatewayEvent::AlertNew(_) => "alert-new",
            GatewayEvent::AlertResolved(_) => "alert-resolved",
            GatewayEvent::NotificationNew(_) => "notification-new",
            GatewayEvent::BreakdownUpdated(_) => "breakdown-updated",
            GatewayEvent::ReorderRequested(_) => "reorder-requested",
            GatewayEvent::ReorderReviewed(_) => "reorder-reviewed",
            GatewayEvent::OverviewRefresh(_) => "overview-refresh",
        }
    }
}

/// Port for publishing events to live connections.
///
/// Publishing never fails from the caller's point of view. Adapters log
/// delivery problems and move on.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Delivers to every connection currently joined to `room`.
    async fn publish(&self, room: RoomKey, event: GatewayEvent);

    /// Delivers once to each connection joined to any of `rooms`.
    async fn publish_to_rooms(&self, rooms: Vec<RoomKey>, event: GatewayEvent);

    /// Delivers to every connected client regardless of room.
    async fn publish_broadcast(&self, event: GatewayEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_keys_render_with_prefix() {
        assert_eq!(RoomKey::User(UserId::new("u-7").unwrap()).to_string(), "user:u-7");
        assert_eq!(RoomKey::Role(Role::LabManager).to_string(), "role:LAB_MANAGER");
        assert_eq!(
            RoomKey::Equipment(EquipmentId::new("EQ-1").unwrap()).to_string(),
            "equipment:EQ-1"
        );
    }

    #[test]
    fn event_serializes_with_name_and_data() {
        let event = GatewayEvent::OverviewRefresh(OverviewRefresh {
            equipment_id: EquipmentId::new("EQ-1").unwrap(),
            status: OperationalStatus::Faulty,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["data"]["equipmentId"], "EQ-1");
        assert_eq!(json["data"]["status"], "FAULTY");
    }

    #[test]
    fn status_update_event_name_matches_serde() {
        let event = GatewayEvent::EquipmentStatusUpdate(StatusUpdate {
            equipment_id: EquipmentId::new("EQ-1").unwrap(),
            status: OperationalStatus::Idle,
            timestamp: Timestamp::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "equipment-status-update");
        assert!(json["data"]["timestamp"].is_string());
    }

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Gateway) {}
}
