//! Breakdown module - breakdown-to-resolution workflow.
//!
//! ```text
//! REPORTED --submit--> REORDER_PENDING --approve--> REORDER_APPROVED --resolve--> RESOLVED
//!    |                     |                                                    ^
//!    |                     +--reject--> REORDER_REJECTED --submit--> (pending)  |
//!    +-------------------------------resolve------------------------------------+
//! ```

mod errors;
mod machine;
mod record;
mod reorder;
mod status;

pub use errors::WorkflowError;
pub use machine::{transition, Transition, WorkflowEffect, WorkflowEvent};
pub use record::BreakdownRecord;
pub use reorder::{
    ReorderDetails, ReorderRequest, ReorderUrgency, ReviewDecision, MAX_REORDER_QUANTITY,
};
pub use status::{BreakdownStatus, ReorderStatus};
