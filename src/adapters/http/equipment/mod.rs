//! HTTP adapter for status ingest.

mod dto;
mod handlers;
mod routes;

pub use dto::{PublishStatusResponse, StatusReportRequest};
pub use handlers::EquipmentHandlers;
pub use routes::equipment_routes;
