//! GetAlertHandler - single alert by id.

use std::sync::Arc;

use crate::domain::alert::{Alert, AlertError};
use crate::domain::foundation::AlertId;
use crate::ports::AlertRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetAlertQuery {
    pub alert_id: AlertId,
}

pub struct GetAlertHandler {
    alerts: Arc<dyn AlertRepository>,
}

impl GetAlertHandler {
    pub fn new(alerts: Arc<dyn AlertRepository>) -> Self {
        Self { alerts }
    }

    pub async fn handle(&self, query: GetAlertQuery) -> Result<Alert, AlertError> {
        self.alerts
            .find_by_id(&query.alert_id)
            .await?
            .ok_or(AlertError::NotFound(query.alert_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;

    #[tokio::test]
    async fn missing_alert_is_not_found() {
        let fx = Fixture::new();
        let id = AlertId::new();
        let err = GetAlertHandler::new(fx.store.clone())
            .handle(GetAlertQuery { alert_id: id })
            .await
            .unwrap_err();
        assert_eq!(err, AlertError::NotFound(id));
    }
}
