//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT and mock session validators
//! - `http` - REST endpoints, auth middleware, error mapping
//! - `memory` - In-memory entity store and static recipient directory
//! - `notification` - Gateway-backed notification dispatcher
//! - `postgres` - sqlx repositories with conditional writes
//! - `websocket` - Room hub and live connection handler

pub mod auth;
pub mod http;
pub mod memory;
pub mod notification;
pub mod postgres;
pub mod websocket;
