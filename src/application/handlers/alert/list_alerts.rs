//! ListAlertsHandler - alerts filtered by resolution and equipment.

use std::sync::Arc;

use crate::domain::alert::{Alert, AlertError};
use crate::domain::foundation::EquipmentId;
use crate::ports::{AlertFilter, AlertRepository};

/// Query for alerts, newest first.
#[derive(Debug, Clone, Default)]
pub struct ListAlertsQuery {
    pub resolved: Option<bool>,
    pub equipment_id: Option<EquipmentId>,
}

pub struct ListAlertsHandler {
    alerts: Arc<dyn AlertRepository>,
}

impl ListAlertsHandler {
    pub fn new(alerts: Arc<dyn AlertRepository>) -> Self {
        Self { alerts }
    }

    pub async fn handle(&self, query: ListAlertsQuery) -> Result<Vec<Alert>, AlertError> {
        let filter = AlertFilter {
            resolved: query.resolved,
            equipment_id: query.equipment_id,
        };
        Ok(self.alerts.list(&filter).await?)
    }
}
