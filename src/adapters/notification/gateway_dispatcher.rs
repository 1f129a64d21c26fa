use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{Gateway, GatewayEvent, Notification, NotificationDispatcher, RoomKey};

/// Publishes `notification-new` to the recipient's user room.
pub struct GatewayNotificationDispatcher {
    gateway: Arc<dyn Gateway>,
}

impl GatewayNotificationDispatcher {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl NotificationDispatcher for GatewayNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), DomainError> {
        let room = RoomKey::user(&notification.recipient);
        tracing::debug!(room = %room, notification_id = %notification.id, "Dispatching notification");
        self.gateway
            .publish(room, GatewayEvent::NotificationNew(notification))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::{RecordingGateway, Target};
    use crate::domain::alert::{Alert, AlertPriority, AlertType};
    use crate::domain::foundation::{EquipmentId, UserId};

    #[tokio::test]
    async fn notification_goes_to_recipient_room_only() {
        let gateway = Arc::new(RecordingGateway::new());
        let dispatcher = GatewayNotificationDispatcher::new(gateway.clone());
        let alert = Alert::raise(
            EquipmentId::new("EQ-1").unwrap(),
            AlertType::HighTemperature,
            AlertPriority::Critical,
            "Temperature 104.0 exceeds 100.0",
        );
        let recipient = UserId::new("u-7").unwrap();

        dispatcher
            .dispatch(Notification::for_alert(recipient.clone(), &alert))
            .await
            .unwrap();

        let deliveries = gateway.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].target, Target::Room(RoomKey::User(recipient)));
        assert_eq!(deliveries[0].event.name(), "notification-new");
    }
}
