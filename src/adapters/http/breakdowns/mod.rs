//! HTTP adapter for the breakdown workflow and reorder requests.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    BreakdownListParams, ReorderListParams, ReportBreakdownRequest, ReportBreakdownResponse,
    ReviewRequest, WorkflowResponse,
};
pub use handlers::BreakdownHandlers;
pub use routes::{breakdown_routes, reorder_routes};
