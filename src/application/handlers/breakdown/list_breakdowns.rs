//! ListBreakdownsHandler - breakdowns, newest first.

use std::sync::Arc;

use crate::domain::breakdown::{BreakdownRecord, WorkflowError};
use crate::ports::BreakdownRepository;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListBreakdownsQuery {
    /// Skip RESOLVED records.
    pub active_only: bool,
}

pub struct ListBreakdownsHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
}

impl ListBreakdownsHandler {
    pub fn new(breakdowns: Arc<dyn BreakdownRepository>) -> Self {
        Self { breakdowns }
    }

    pub async fn handle(&self, query: ListBreakdownsQuery) -> Result<Vec<BreakdownRecord>, WorkflowError> {
        Ok(self.breakdowns.list(query.active_only).await?)
    }
}
