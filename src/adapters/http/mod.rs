//! HTTP adapters - REST API implementations.
//!
//! Each resource has its own dto/handlers/routes module. [`api_router`]
//! mounts them under `/api` behind the bearer-token middleware.

pub mod alerts;
pub mod breakdowns;
pub mod equipment;
pub mod error;
pub mod middleware;

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};

use crate::application::handlers::{
    GetAlertHandler, GetBreakdownHandler, ListAlertsHandler, ListBreakdownsHandler,
    ListReordersHandler, PublishStatusHandler, RaiseAlertHandler, ReportBreakdownHandler,
    ResolveAlertHandler, ResolveBreakdownHandler, RespondToBreakdownAlertHandler,
    ReviewReorderHandler, SubmitReorderHandler,
};
use crate::domain::alert::ThresholdRules;
use crate::ports::{
    AlertRepository, BreakdownRepository, EquipmentRepository, Gateway, NotificationDispatcher,
    RecipientDirectory, SessionValidator,
};

pub use alerts::{alert_routes, AlertHandlers};
pub use breakdowns::{breakdown_routes, reorder_routes, BreakdownHandlers};
pub use equipment::{equipment_routes, EquipmentHandlers};
pub use error::{ApiError, ErrorResponse};
pub use middleware::{auth_middleware, RequireAuth};

/// Port implementations the HTTP surface is built from.
#[derive(Clone)]
pub struct AppPorts {
    pub equipment: Arc<dyn EquipmentRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pub breakdowns: Arc<dyn BreakdownRepository>,
    pub gateway: Arc<dyn Gateway>,
    pub directory: Arc<dyn RecipientDirectory>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub rules: ThresholdRules,
}

/// Handler state for every resource router.
#[derive(Clone)]
pub struct ApiHandlers {
    pub equipment: EquipmentHandlers,
    pub alerts: AlertHandlers,
    pub breakdowns: BreakdownHandlers,
}

impl ApiHandlers {
    /// Builds every command and query handler from `ports`.
    pub fn from_ports(ports: AppPorts) -> Self {
        let raise_alert = Arc::new(RaiseAlertHandler::new(
            ports.alerts.clone(),
            ports.gateway.clone(),
            ports.directory.clone(),
            ports.dispatcher.clone(),
        ));

        let equipment = EquipmentHandlers::new(Arc::new(PublishStatusHandler::new(
            ports.equipment.clone(),
            ports.gateway.clone(),
            raise_alert.clone(),
            ports.rules.clone(),
        )));

        let alerts = AlertHandlers::new(
            Arc::new(ListAlertsHandler::new(ports.alerts.clone())),
            Arc::new(GetAlertHandler::new(ports.alerts.clone())),
            Arc::new(ResolveAlertHandler::new(
                ports.alerts.clone(),
                ports.gateway.clone(),
                ports.directory.clone(),
            )),
            Arc::new(RespondToBreakdownAlertHandler::new(
                ports.alerts.clone(),
                ports.breakdowns.clone(),
                ports.gateway.clone(),
                ports.directory.clone(),
            )),
        );

        let breakdowns = BreakdownHandlers {
            report: Arc::new(ReportBreakdownHandler::new(
                ports.breakdowns.clone(),
                ports.gateway.clone(),
                raise_alert,
            )),
            submit_reorder: Arc::new(SubmitReorderHandler::new(
                ports.breakdowns.clone(),
                ports.gateway.clone(),
            )),
            review_reorder: Arc::new(ReviewReorderHandler::new(
                ports.breakdowns.clone(),
                ports.gateway.clone(),
            )),
            resolve: Arc::new(ResolveBreakdownHandler::new(
                ports.breakdowns.clone(),
                ports.gateway.clone(),
            )),
            get: Arc::new(GetBreakdownHandler::new(ports.breakdowns.clone())),
            list: Arc::new(ListBreakdownsHandler::new(ports.breakdowns.clone())),
            list_reorders: Arc::new(ListReordersHandler::new(ports.breakdowns)),
        };

        Self {
            equipment,
            alerts,
            breakdowns,
        }
    }
}

/// The `/api` surface plus `/health`.
pub fn api_router(handlers: ApiHandlers, validator: Arc<dyn SessionValidator>) -> Router {
    let api = Router::new()
        .nest("/equipment", equipment_routes(handlers.equipment))
        .nest("/alerts", alert_routes(handlers.alerts))
        .nest("/breakdowns", breakdown_routes(handlers.breakdowns.clone()))
        .nest("/reorder-requests", reorder_routes(handlers.breakdowns))
        .layer(axum::middleware::from_fn_with_state(validator, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}

/// GET /health - Liveness
async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })),
    )
}
