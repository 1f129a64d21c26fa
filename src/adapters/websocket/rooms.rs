//! Room hub: the single owner of live connection membership.
//!
//! # Architecture
//!
//! ```text
//!  publishers ─┐                      ┌─> conn-a outbound (bounded) ─> socket
//!  handlers  ──┼─> HubCommand (mpsc) ─┼─> conn-b outbound (bounded) ─> socket
//!  sockets   ──┘        hub task      └─> conn-c outbound (bounded) ─> socket
//! ```
//!
//! Joins, leaves, disconnects and publishes are all messages processed in
//! order by one task, so membership is never shared mutable state. A
//! publish that follows a join in program order sees that join.
//!
//! Delivery into a connection's queue uses `try_send`: a full queue drops
//! the event for that connection only and never stalls the hub. Publishes
//! enter the hub's own queue the same way, so a backed-up hub drops events
//! instead of stalling the request that produced them. Membership commands
//! still wait for room.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::foundation::{AuthenticatedSubject, EquipmentId, Timestamp};
use crate::ports::{Gateway, GatewayEvent, RoomKey};

use super::messages::{ConnectedMessage, Outbound, ServerMessage, SubscriptionMessage};

/// Server-assigned identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hub sizing.
#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    /// Capacity of the hub's command queue.
    pub command_buffer: usize,
    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_buffer: 1024,
            outbound_buffer: 64,
        }
    }
}

enum HubCommand {
    Connect {
        id: ConnectionId,
        subject: AuthenticatedSubject,
        outbound: mpsc::Sender<Outbound>,
    },
    Join {
        id: ConnectionId,
        room: RoomKey,
        ack: Option<ServerMessage>,
    },
    Leave {
        id: ConnectionId,
        room: RoomKey,
        ack: Option<ServerMessage>,
    },
    Disconnect {
        id: ConnectionId,
    },
    Publish {
        rooms: Vec<RoomKey>,
        event: Arc<GatewayEvent>,
    },
    Broadcast {
        event: Arc<GatewayEvent>,
    },
    RoomSize {
        room: RoomKey,
        reply: oneshot::Sender<usize>,
    },
    ConnectionCount {
        reply: oneshot::Sender<usize>,
    },
}

struct ConnectionEntry {
    outbound: mpsc::Sender<Outbound>,
    rooms: HashSet<RoomKey>,
}

/// Membership tables. Only the hub task touches these.
#[derive(Default)]
struct RoomTable {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
}

impl RoomTable {
    fn connect(&mut self, id: ConnectionId, subject: &AuthenticatedSubject, outbound: mpsc::Sender<Outbound>) {
        self.connections.insert(
            id,
            ConnectionEntry {
                outbound,
                rooms: HashSet::new(),
            },
        );
        self.join(id, RoomKey::user(&subject.id));
        self.join(id, RoomKey::Role(subject.role));
    }

    /// Returns false if the connection is unknown. Re-joining is a no-op.
    fn join(&mut self, id: ConnectionId, room: RoomKey) -> bool {
        let Some(entry) = self.connections.get_mut(&id) else {
            return false;
        };
        if entry.rooms.insert(room.clone()) {
            self.rooms.entry(room).or_default().insert(id);
        }
        true
    }

    /// Returns false if the connection is unknown. Leaving a room the
    /// connection is not in is a no-op.
    fn leave(&mut self, id: ConnectionId, room: &RoomKey) -> bool {
        let Some(entry) = self.connections.get_mut(&id) else {
            return false;
        };
        if entry.rooms.remove(room) {
            self.remove_member(room, id);
        }
        true
    }

    fn disconnect(&mut self, id: ConnectionId) -> bool {
        let Some(entry) = self.connections.remove(&id) else {
            return false;
        };
        for room in &entry.rooms {
            self.remove_member(room, id);
        }
        true
    }

    fn remove_member(&mut self, room: &RoomKey, id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// Union of members of `rooms`, each connection once.
    fn recipients(&self, rooms: &[RoomKey]) -> HashSet<ConnectionId> {
        rooms
            .iter()
            .filter_map(|room| self.rooms.get(room))
            .flat_map(|members| members.iter().copied())
            .collect()
    }

    fn room_size(&self, room: &RoomKey) -> usize {
        self.rooms.get(room).map_or(0, HashSet::len)
    }

    fn send_to(&self, id: ConnectionId, item: Outbound) -> bool {
        let Some(entry) = self.connections.get(&id) else {
            return false;
        };
        match entry.outbound.try_send(item) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(item)) => {
                tracing::debug!(
                    connection_id = %id,
                    event = item.name(),
                    "Outbound queue full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection_id = %id, "Outbound queue closed");
                false
            }
        }
    }

    /// Returns how many connections accepted the event.
    fn deliver(&self, targets: impl IntoIterator<Item = ConnectionId>, event: &Arc<GatewayEvent>) -> usize {
        targets
            .into_iter()
            .filter(|id| self.send_to(*id, Outbound::Event(Arc::clone(event))))
            .count()
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { id, subject, outbound } => {
                self.connect(id, &subject, outbound);
                tracing::info!(
                    connection_id = %id,
                    user_id = %subject.id,
                    role = %subject.role,
                    connections = self.connections.len(),
                    "Client connected"
                );
            }
            HubCommand::Join { id, room, ack } => {
                if self.join(id, room.clone()) {
                    tracing::debug!(connection_id = %id, room = %room, "Joined room");
                    if let Some(ack) = ack {
                        self.send_to(id, Outbound::Direct(ack));
                    }
                }
            }
            HubCommand::Leave { id, room, ack } => {
                if self.leave(id, &room) {
                    tracing::debug!(connection_id = %id, room = %room, "Left room");
                    if let Some(ack) = ack {
                        self.send_to(id, Outbound::Direct(ack));
                    }
                }
            }
            HubCommand::Disconnect { id } => {
                if self.disconnect(id) {
                    tracing::info!(
                        connection_id = %id,
                        connections = self.connections.len(),
                        "Client disconnected"
                    );
                }
            }
            HubCommand::Publish { rooms, event } => {
                let targets = self.recipients(&rooms);
                if targets.is_empty() {
                    tracing::debug!(event = event.name(), rooms = rooms.len(), "No subscribers for publish");
                    return;
                }
                let delivered = self.deliver(targets, &event);
                tracing::trace!(event = event.name(), delivered, "Published");
            }
            HubCommand::Broadcast { event } => {
                let all: Vec<ConnectionId> = self.connections.keys().copied().collect();
                let delivered = self.deliver(all, &event);
                tracing::trace!(event = event.name(), delivered, "Broadcast");
            }
            HubCommand::RoomSize { room, reply } => {
                let _ = reply.send(self.room_size(&room));
            }
            HubCommand::ConnectionCount { reply } => {
                let _ = reply.send(self.connections.len());
            }
        }
    }
}

/// Cloneable handle to the hub task. Implements the `Gateway` port.
#[derive(Clone)]
pub struct GatewayHandle {
    commands: mpsc::Sender<HubCommand>,
    outbound_buffer: usize,
}

/// Spawns the hub task and returns its handle.
pub fn spawn_hub(config: HubConfig) -> (GatewayHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(config.command_buffer.max(1));
    let task = tokio::spawn(async move {
        let mut table = RoomTable::default();
        while let Some(command) = rx.recv().await {
            table.apply(command);
        }
        tracing::debug!("Room hub stopped");
    });
    (
        GatewayHandle {
            commands: tx,
            outbound_buffer: config.outbound_buffer.max(1),
        },
        task,
    )
}

impl GatewayHandle {
    async fn send(&self, command: HubCommand) {
        if self.commands.send(command).await.is_err() {
            tracing::warn!("Room hub is not running; command dropped");
        }
    }

    /// Queues a publish without waiting.
    fn offer(&self, event_name: &'static str, command: HubCommand) {
        match self.commands.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(event = event_name, "Room hub queue full; event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(event = event_name, "Room hub is not running; event dropped");
            }
        }
    }

    /// Registers an authenticated connection and joins its user and role
    /// rooms. The returned receiver yields `connected` first.
    pub async fn open_connection(
        &self,
        subject: AuthenticatedSubject,
    ) -> (ConnectionId, mpsc::Sender<Outbound>, mpsc::Receiver<Outbound>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(self.outbound_buffer);

        let connected = ServerMessage::Connected(ConnectedMessage {
            connection_id: id.to_string(),
            user_id: subject.id.to_string(),
            role: subject.role,
            timestamp: Timestamp::now().to_rfc3339(),
        });
        // Fresh channel with capacity >= 1 cannot be full here.
        let _ = tx.try_send(Outbound::Direct(connected));

        self.send(HubCommand::Connect {
            id,
            subject,
            outbound: tx.clone(),
        })
        .await;
        (id, tx, rx)
    }

    /// Idempotent; acknowledges with `subscribed` once the join is in effect.
    pub async fn subscribe_equipment(&self, id: ConnectionId, equipment_id: &EquipmentId) {
        let ack = ServerMessage::Subscribed(SubscriptionMessage {
            equipment_id: equipment_id.to_string(),
        });
        self.send(HubCommand::Join {
            id,
            room: RoomKey::equipment(equipment_id),
            ack: Some(ack),
        })
        .await;
    }

    /// Idempotent; acknowledges with `unsubscribed`.
    pub async fn unsubscribe_equipment(&self, id: ConnectionId, equipment_id: &EquipmentId) {
        let ack = ServerMessage::Unsubscribed(SubscriptionMessage {
            equipment_id: equipment_id.to_string(),
        });
        self.send(HubCommand::Leave {
            id,
            room: RoomKey::equipment(equipment_id),
            ack: Some(ack),
        })
        .await;
    }

    /// Drops every membership of the connection at once.
    pub async fn disconnect(&self, id: ConnectionId) {
        self.send(HubCommand::Disconnect { id }).await;
    }

    /// Current member count of a room (0 if the hub is gone).
    pub async fn room_size(&self, room: RoomKey) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::RoomSize { room, reply }).await;
        rx.await.unwrap_or(0)
    }

    pub async fn connection_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::ConnectionCount { reply }).await;
        rx.await.unwrap_or(0)
    }
}

#[async_trait]
impl Gateway for GatewayHandle {
    async fn publish(&self, room: RoomKey, event: GatewayEvent) {
        self.offer(
            event.name(),
            HubCommand::Publish {
                rooms: vec![room],
                event: Arc::new(event),
            },
        );
    }

    async fn publish_to_rooms(&self, rooms: Vec<RoomKey>, event: GatewayEvent) {
        self.offer(
            event.name(),
            HubCommand::Publish {
                rooms,
                event: Arc::new(event),
            },
        );
    }

    async fn publish_broadcast(&self, event: GatewayEvent) {
        self.offer(
            event.name(),
            HubCommand::Broadcast {
                event: Arc::new(event),
            },
        );
    }
}
