//! HTTP adapter for alert endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{AlertListParams, RespondRequest, RespondResponse, ResolveAlertRequest};
pub use handlers::AlertHandlers;
pub use routes::alert_routes;
