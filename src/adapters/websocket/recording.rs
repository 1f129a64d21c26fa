//! In-process gateway that records publishes instead of delivering them.
//!
//! Used by handler tests to assert what was published, where, and in what
//! order, without running the hub.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{Gateway, GatewayEvent, RoomKey};

/// Where a recorded publish was addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Room(RoomKey),
    Rooms(Vec<RoomKey>),
    Broadcast,
}

impl Target {
    /// True if the publish would reach members of `room`.
    pub fn includes(&self, room: &RoomKey) -> bool {
        match self {
            Target::Room(r) => r == room,
            Target::Rooms(rs) => rs.contains(room),
            Target::Broadcast => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub target: Target,
    pub event: GatewayEvent,
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Event names in publish order.
    pub fn names(&self) -> Vec<&'static str> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.event.name())
            .collect()
    }

    /// Deliveries with the given event name.
    pub fn named(&self, name: &str) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.event.name() == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.deliveries.lock().unwrap().clear();
    }

    fn record(&self, target: Target, event: GatewayEvent) {
        self.deliveries.lock().unwrap().push(Delivery { target, event });
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn publish(&self, room: RoomKey, event: GatewayEvent) {
        self.record(Target::Room(room), event);
    }

    async fn publish_to_rooms(&self, rooms: Vec<RoomKey>, event: GatewayEvent) {
        self.record(Target::Rooms(rooms), event);
    }

    async fn publish_broadcast(&self, event: GatewayEvent) {
        self.record(Target::Broadcast, event);
    }
}
