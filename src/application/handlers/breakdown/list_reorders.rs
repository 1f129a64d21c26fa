//! ListReordersHandler - reorder requests by status, newest first.

use std::sync::Arc;

use crate::domain::breakdown::{ReorderRequest, ReorderStatus, WorkflowError};
use crate::ports::{BreakdownRepository, ReorderFilter};

#[derive(Debug, Clone, Copy, Default)]
pub struct ListReordersQuery {
    pub status: Option<ReorderStatus>,
}

pub struct ListReordersHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
}

impl ListReordersHandler {
    pub fn new(breakdowns: Arc<dyn BreakdownRepository>) -> Self {
        Self { breakdowns }
    }

    pub async fn handle(&self, query: ListReordersQuery) -> Result<Vec<ReorderRequest>, WorkflowError> {
        let filter = ReorderFilter { status: query.status };
        Ok(self.breakdowns.list_reorders(filter).await?)
    }
}
