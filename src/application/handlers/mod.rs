//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations. Each
//! handler is built from `Arc<dyn Port>` dependencies and exposes a single
//! `handle` method.

pub mod access;
pub mod alert;
pub mod breakdown;
pub mod equipment;

#[cfg(test)]
pub(crate) mod test_support;

pub use alert::{
    GetAlertHandler, GetAlertQuery, ListAlertsHandler, ListAlertsQuery, RaiseAlertCommand,
    RaiseAlertHandler, ResolveAlertCommand, ResolveAlertHandler, ResolveAlertResult,
};
pub use breakdown::{
    BreakdownDetails, GetBreakdownHandler, GetBreakdownQuery, ListBreakdownsHandler,
    ListBreakdownsQuery, ListReordersHandler, ListReordersQuery, ReportBreakdownCommand,
    ReportBreakdownHandler, ReportBreakdownResult, ResolveBreakdownCommand, ResolveBreakdownHandler,
    RespondToBreakdownAlertCommand, RespondToBreakdownAlertHandler, RespondToBreakdownAlertResult,
    ReviewReorderCommand, ReviewReorderHandler, ReviewReorderResult, SubmitReorderCommand,
    SubmitReorderHandler, SubmitReorderResult,
};
pub use equipment::{
    PublishStatusCommand, PublishStatusHandler, PublishStatusResult, StatusPublishError,
};
