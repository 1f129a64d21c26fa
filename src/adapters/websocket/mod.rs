//! WebSocket adapters for live equipment updates.
//!
//! Implements the `Gateway` port on top of a room hub and exposes the
//! `/ws` upgrade endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Status publisher / alert engine / workflow handlers         │
//! │            Arc<dyn Gateway>::publish(room, event)            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ HubCommand
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Room hub (one task)                      │
//! │  user:u-1   role:LAB_MANAGER   equipment:EQ-1   ...          │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ bounded per-connection queue
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │      Connection tasks (send pump + receive loop) → socket    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - Wire protocol types
//! - [`rooms`] - Room hub and `GatewayHandle`
//! - [`handler`] - Axum upgrade handler and per-connection loop
//! - [`recording`] - Recording gateway for tests

pub mod handler;
pub mod messages;
pub mod recording;
pub mod rooms;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{ClientMessage, Outbound, ServerMessage};
pub use recording::{Delivery, RecordingGateway, Target};
pub use rooms::{spawn_hub, ConnectionId, GatewayHandle, HubConfig};
