//! Integration tests for live fan-out through the room hub.
//!
//! These tests run the real hub task with the status publisher and alert
//! engine on top of the in-memory store and check what each connection's
//! outbound queue receives.

use std::sync::Arc;

use tokio::sync::mpsc;

use lab_monitor::adapters::memory::{InMemoryStore, StaticRecipientDirectory};
use lab_monitor::adapters::notification::GatewayNotificationDispatcher;
use lab_monitor::adapters::websocket::{spawn_hub, GatewayHandle, HubConfig, Outbound};
use lab_monitor::application::handlers::{
    PublishStatusCommand, PublishStatusHandler, RaiseAlertHandler,
};
use lab_monitor::domain::alert::ThresholdRules;
use lab_monitor::domain::equipment::{OperationalStatus, StatusReport};
use lab_monitor::domain::foundation::{AuthenticatedSubject, EquipmentId, Role, UserId};
use lab_monitor::ports::{Gateway, RoomKey};

// =============================================================================
// Test Infrastructure
// =============================================================================

const DIRECTORY: &str = r#"{
    "policyMakers": ["policy-1"],
    "labs": [{"labId": "LAB-A", "managers": ["manager-1"], "equipment": ["EQ-1"]}]
}"#;

fn subject(id: &str, role: Role) -> AuthenticatedSubject {
    AuthenticatedSubject::new(UserId::new(id).unwrap(), role)
}

fn eq(id: &str) -> EquipmentId {
    EquipmentId::new(id).unwrap()
}

fn publisher(hub: &GatewayHandle) -> PublishStatusHandler {
    let store = Arc::new(InMemoryStore::new());
    let gateway: Arc<dyn Gateway> = Arc::new(hub.clone());
    let raise = RaiseAlertHandler::new(
        store.clone(),
        gateway.clone(),
        Arc::new(StaticRecipientDirectory::from_json(DIRECTORY).unwrap()),
        Arc::new(GatewayNotificationDispatcher::new(gateway.clone())),
    );
    PublishStatusHandler::new(store, gateway, Arc::new(raise), ThresholdRules::default())
}

fn status(equipment: &str, status: OperationalStatus) -> PublishStatusCommand {
    PublishStatusCommand {
        equipment_id: equipment.to_string(),
        report: StatusReport {
            status: Some(status),
            ..StatusReport::default()
        },
    }
}

/// Names of everything queued so far.
fn drain(rx: &mut mpsc::Receiver<Outbound>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(item) = rx.try_recv() {
        names.push(item.name());
    }
    names
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn status_snapshot_reaches_only_subscribers_of_that_equipment() {
    let (hub, _task) = spawn_hub(HubConfig::default());
    let (a, _ta, mut rx_a) = hub.open_connection(subject("trainer-a", Role::Trainer)).await;
    let (b, _tb, mut rx_b) = hub.open_connection(subject("trainer-b", Role::Trainer)).await;
    hub.subscribe_equipment(a, &eq("EQ-1")).await;
    hub.subscribe_equipment(b, &eq("EQ-2")).await;

    publisher(&hub).handle(status("EQ-1", OperationalStatus::InUse)).await.unwrap();
    // Queries are answered after every earlier command.
    hub.connection_count().await;

    assert_eq!(
        drain(&mut rx_a),
        vec!["connected", "subscribed", "equipment-status", "equipment-status-update"]
    );
    assert_eq!(drain(&mut rx_b), vec!["connected", "subscribed", "equipment-status-update"]);
}

#[tokio::test]
async fn faulty_equipment_alerts_only_the_owning_labs_staff() {
    let (hub, _task) = spawn_hub(HubConfig::default());
    let (_m, _tm, mut rx_manager) = hub.open_connection(subject("manager-1", Role::LabManager)).await;
    let (_o, _to, mut rx_other) = hub.open_connection(subject("manager-2", Role::LabManager)).await;
    let (_t, _tt, mut rx_trainer) = hub.open_connection(subject("trainer-1", Role::Trainer)).await;

    let result = publisher(&hub)
        .handle(status("EQ-1", OperationalStatus::Faulty))
        .await
        .unwrap();
    hub.connection_count().await;

    assert_eq!(result.raised.len(), 1);
    assert_eq!(
        drain(&mut rx_manager),
        vec![
            "connected",
            "equipment-status-update",
            "overview-refresh",
            "alert-new",
            "notification-new"
        ]
    );
    // Same role, but another lab's manager.
    assert_eq!(
        drain(&mut rx_other),
        vec!["connected", "equipment-status-update", "overview-refresh"]
    );
    assert_eq!(
        drain(&mut rx_trainer),
        vec!["connected", "equipment-status-update", "overview-refresh"]
    );
}

#[tokio::test]
async fn disconnected_connection_receives_nothing_further() {
    let (hub, _task) = spawn_hub(HubConfig::default());
    let (id, _tx, mut rx) = hub.open_connection(subject("manager-1", Role::LabManager)).await;
    hub.subscribe_equipment(id, &eq("EQ-1")).await;
    hub.connection_count().await;
    assert_eq!(drain(&mut rx), vec!["connected", "subscribed"]);

    hub.disconnect(id).await;
    publisher(&hub).handle(status("EQ-1", OperationalStatus::Faulty)).await.unwrap();

    assert_eq!(hub.room_size(RoomKey::equipment(&eq("EQ-1"))).await, 0);
    assert_eq!(hub.room_size(RoomKey::user(&UserId::new("manager-1").unwrap())).await, 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn slow_connection_does_not_block_others() {
    let config = HubConfig {
        outbound_buffer: 2,
        ..HubConfig::default()
    };
    let (hub, _task) = spawn_hub(config);
    let (slow, _ts, mut rx_slow) = hub.open_connection(subject("slow", Role::Trainer)).await;
    let (fast, _tf, mut rx_fast) = hub.open_connection(subject("fast", Role::Trainer)).await;
    hub.subscribe_equipment(slow, &eq("EQ-1")).await;
    hub.subscribe_equipment(fast, &eq("EQ-1")).await;
    hub.connection_count().await;
    // Fast consumer keeps its queue empty; slow one never reads.
    assert_eq!(drain(&mut rx_fast), vec!["connected", "subscribed"]);

    let handler = publisher(&hub);
    handler.handle(status("EQ-1", OperationalStatus::InUse)).await.unwrap();
    hub.connection_count().await;

    assert_eq!(drain(&mut rx_fast), vec!["equipment-status", "equipment-status-update"]);
    assert_eq!(drain(&mut rx_slow), vec!["connected", "subscribed"]);
}
