//! RaiseAlertHandler - persists a new alert and announces it.
//!
//! After the alert is stored, the directory names the lab's recipients once.
//! `alert-new` goes to the alert rooms for them and each one gets a
//! `Notification`. Notification is best-effort: failures are logged and the
//! alert stands.

use std::sync::Arc;

use crate::domain::alert::{Alert, AlertDraft, AlertError, AlertPriority, AlertType};
use crate::domain::foundation::{BreakdownId, EquipmentId, UserId};
use crate::ports::{
    AlertRepository, Gateway, GatewayEvent, Notification, NotificationDispatcher, RecipientDirectory,
};

use super::{alert_rooms, lab_recipients};

/// Command to raise an alert.
#[derive(Debug, Clone)]
pub struct RaiseAlertCommand {
    pub equipment_id: EquipmentId,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub message: String,
    /// Breakdown the alert refers to, if any.
    pub breakdown_id: Option<BreakdownId>,
}

impl RaiseAlertCommand {
    pub fn from_draft(equipment_id: EquipmentId, draft: AlertDraft) -> Self {
        Self {
            equipment_id,
            alert_type: draft.alert_type,
            priority: draft.priority,
            message: draft.message,
            breakdown_id: None,
        }
    }
}

/// Handler for raising alerts.
pub struct RaiseAlertHandler {
    alerts: Arc<dyn AlertRepository>,
    gateway: Arc<dyn Gateway>,
    directory: Arc<dyn RecipientDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl RaiseAlertHandler {
    pub fn new(
        alerts: Arc<dyn AlertRepository>,
        gateway: Arc<dyn Gateway>,
        directory: Arc<dyn RecipientDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            alerts,
            gateway,
            directory,
            dispatcher,
        }
    }

    pub async fn handle(&self, cmd: RaiseAlertCommand) -> Result<Alert, AlertError> {
        let mut alert = Alert::raise(cmd.equipment_id, cmd.alert_type, cmd.priority, cmd.message);
        if let Some(breakdown_id) = cmd.breakdown_id {
            alert = alert.with_breakdown(breakdown_id);
        }

        self.alerts.insert(&alert).await?;
        tracing::info!(
            alert_id = %alert.id,
            equipment_id = %alert.equipment_id,
            alert_type = %alert.alert_type,
            priority = %alert.priority,
            "Alert raised"
        );

        let recipients = lab_recipients(self.directory.as_ref(), &alert.equipment_id).await;
        self.gateway
            .publish_to_rooms(
                alert_rooms(&alert.equipment_id, &recipients),
                GatewayEvent::AlertNew(alert.clone()),
            )
            .await;

        self.notify(&alert, recipients).await;
        Ok(alert)
    }

    async fn notify(&self, alert: &Alert, recipients: Vec<UserId>) {
        for recipient in recipients {
            let notification = Notification::for_alert(recipient.clone(), alert);
            if let Err(e) = self.dispatcher.dispatch(notification).await {
                tracing::warn!(
                    alert_id = %alert.id,
                    recipient = %recipient,
                    error = %e,
                    "Notification dispatch failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::Target;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::Role;
    use crate::ports::{AlertFilter, RoomKey};

    fn command() -> RaiseAlertCommand {
        RaiseAlertCommand {
            equipment_id: EquipmentId::new("EQ-1").unwrap(),
            alert_type: AlertType::HighTemperature,
            priority: AlertPriority::High,
            message: "Temperature 85.0°C exceeds 80.0°C".to_string(),
            breakdown_id: None,
        }
    }

    #[tokio::test]
    async fn raise_persists_unresolved_alert() {
        let fx = Fixture::new();
        let alert = fx.raise_alert_handler().handle(command()).await.unwrap();

        assert!(!alert.resolved);
        let stored = AlertRepository::list(fx.store.as_ref(), &AlertFilter::default())
            .await
            .unwrap();
        assert_eq!(stored, vec![alert]);
    }

    #[tokio::test]
    async fn alert_new_goes_to_policy_room_equipment_room_and_lab_staff() {
        let fx = Fixture::new();
        fx.raise_alert_handler().handle(command()).await.unwrap();

        let published = fx.gateway.named("alert-new");
        assert_eq!(published.len(), 1);
        let target = &published[0].target;
        assert!(target.includes(&RoomKey::Role(Role::PolicyMaker)));
        assert!(target.includes(&RoomKey::Equipment(EquipmentId::new("EQ-1").unwrap())));
        assert!(target.includes(&RoomKey::User(UserId::new("manager-1").unwrap())));
        assert!(target.includes(&RoomKey::User(UserId::new("trainer-1").unwrap())));
        assert!(!target.includes(&RoomKey::Role(Role::LabManager)));
        assert!(!target.includes(&RoomKey::Role(Role::Trainer)));
    }

    #[tokio::test]
    async fn alert_on_another_labs_equipment_skips_this_labs_staff() {
        let fx = Fixture::new();
        fx.raise_alert_handler()
            .handle(RaiseAlertCommand {
                equipment_id: EquipmentId::new("EQ-9").unwrap(),
                ..command()
            })
            .await
            .unwrap();

        let target = &fx.gateway.named("alert-new")[0].target;
        assert!(target.includes(&RoomKey::Role(Role::PolicyMaker)));
        assert!(!target.includes(&RoomKey::User(UserId::new("manager-1").unwrap())));
        assert!(!target.includes(&RoomKey::Role(Role::LabManager)));
    }

    #[tokio::test]
    async fn each_recipient_is_notified_in_their_room() {
        let fx = Fixture::new();
        fx.raise_alert_handler().handle(command()).await.unwrap();

        let targets: Vec<Target> = fx
            .gateway
            .named("notification-new")
            .into_iter()
            .map(|d| d.target)
            .collect();
        assert_eq!(targets.len(), 3);
        assert!(targets.contains(&Target::Room(RoomKey::User(UserId::new("manager-1").unwrap()))));
        assert!(targets.contains(&Target::Room(RoomKey::User(UserId::new("policy-1").unwrap()))));
    }

    #[tokio::test]
    async fn failed_notification_does_not_fail_the_alert() {
        let fx = Fixture::with_failing_dispatcher();
        let result = fx.raise_alert_handler().handle(command()).await;

        assert!(result.is_ok());
        assert_eq!(fx.gateway.named("alert-new").len(), 1);
    }

    #[tokio::test]
    async fn breakdown_reference_is_kept() {
        let fx = Fixture::new();
        let breakdown_id = BreakdownId::new();
        let alert = fx
            .raise_alert_handler()
            .handle(RaiseAlertCommand {
                breakdown_id: Some(breakdown_id),
                ..command()
            })
            .await
            .unwrap();
        assert_eq!(alert.breakdown_id, Some(breakdown_id));
    }
}
