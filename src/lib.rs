//! Lab Monitor - live lab equipment monitoring and breakdown workflow
//!
//! This crate pushes equipment status and alerts to connected clients through
//! room-addressed WebSocket fan-out, and tracks broken equipment from report
//! through reorder review to resolution.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
