//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Identity
//!
//! - `SessionValidator` - bearer token to subject id and role
//!
//! ## Entity Store
//!
//! - `EquipmentRepository` - live status snapshot per equipment
//! - `AlertRepository` - alerts with conditional resolution
//! - `BreakdownRepository` - breakdowns and reorder requests, compare-and-swap
//!
//! ## Delivery
//!
//! - `Gateway` - room-addressed fan-out to live connections
//! - `NotificationDispatcher` / `RecipientDirectory` - per-user notifications

mod alert_repository;
mod breakdown_repository;
mod equipment_repository;
mod gateway;
mod notification;
mod session_validator;

pub use alert_repository::{AlertFilter, AlertRepository};
pub use breakdown_repository::{
    BreakdownRepository, CasOutcome, ConfirmOutcome, InsertOutcome, ReorderFilter,
};
pub use equipment_repository::{EquipmentRepository, StatusChange};
pub use gateway::{Gateway, GatewayEvent, OverviewRefresh, RoomKey, StatusUpdate};
pub use notification::{Notification, NotificationDispatcher, RecipientDirectory};
pub use session_validator::SessionValidator;
