//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands change state through the store's compare-and-swap writes and then
//! publish through the gateway; queries only read.

pub mod handlers;

pub use handlers::*;
