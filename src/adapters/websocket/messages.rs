//! WebSocket message types for the live equipment channel.
//!
//! Every frame is a JSON text message shaped `{"event": ..., "data": ...}`:
//! - Server → Client: routed `GatewayEvent`s plus connection-local replies
//!   (connected, pong, subscribed, unsubscribed, error)
//! - Client → Server: subscribe/unsubscribe to equipment rooms, ping

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Role, Timestamp};
use crate::ports::GatewayEvent;

// ============================================
// Server → Client Messages
// ============================================

/// Replies addressed to a single connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Handshake accepted; sent before any routed event.
    Connected(ConnectedMessage),

    /// Heartbeat response.
    Pong(PongMessage),

    Subscribed(SubscriptionMessage),

    Unsubscribed(SubscriptionMessage),

    /// The last client message could not be processed.
    Error(ErrorMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: String,
    pub user_id: String,
    pub role: Role,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl PongMessage {
    pub fn now() -> Self {
        Self {
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMessage {
    pub equipment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorMessage {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    SubscribeEquipment(String),
    UnsubscribeEquipment(String),
    Ping,
}

// ============================================
// Outbound queue item
// ============================================

/// What sits in a connection's outbound queue.
///
/// Routed events are shared between all recipients; only the final JSON
/// rendering happens per connection.
#[derive(Debug, Clone)]
pub enum Outbound {
    Event(Arc<GatewayEvent>),
    Direct(ServerMessage),
}

impl Outbound {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        match self {
            Outbound::Event(event) => serde_json::to_string(event.as_ref()),
            Outbound::Direct(message) => serde_json::to_string(message),
        }
    }

    /// Wire event name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Outbound::Event(event) => event.name(),
            Outbound::Direct(ServerMessage::Connected(_)) => "connected",
            Outbound::Direct(ServerMessage::Pong(_)) => "pong",
            Outbound::Direct(ServerMessage::Subscribed(_)) => "subscribed",
            Outbound::Direct(ServerMessage::Unsubscribed(_)) => "unsubscribed",
            Outbound::Direct(ServerMessage::Error(_)) => "error",
        }
    }
}
