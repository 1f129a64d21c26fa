//! Lab Monitor server binary.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lab_monitor::adapters::auth::JwtSessionValidator;
use lab_monitor::adapters::http::{api_router, ApiHandlers, AppPorts};
use lab_monitor::adapters::memory::{InMemoryStore, StaticRecipientDirectory};
use lab_monitor::adapters::notification::GatewayNotificationDispatcher;
use lab_monitor::adapters::postgres::{
    self, PostgresAlertRepository, PostgresBreakdownRepository, PostgresEquipmentRepository,
};
use lab_monitor::adapters::websocket::{spawn_hub, websocket_router, WebSocketState};
use lab_monitor::config::{AppConfig, LogFormat, ServerConfig};
use lab_monitor::ports::{Gateway, RecipientDirectory, SessionValidator};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting lab-monitor"
    );

    let (hub, hub_task) = spawn_hub(config.gateway.hub());
    let gateway: Arc<dyn Gateway> = Arc::new(hub.clone());
    let validator: Arc<dyn SessionValidator> = Arc::new(JwtSessionValidator::new(config.auth.jwt()));

    let directory: Arc<dyn RecipientDirectory> = match &config.alerts.directory_path {
        Some(path) => Arc::new(StaticRecipientDirectory::from_file(path)?),
        None => {
            tracing::warn!("No recipient directory configured; alert notifications go nowhere");
            Arc::new(StaticRecipientDirectory::empty())
        }
    };
    let dispatcher = Arc::new(GatewayNotificationDispatcher::new(gateway.clone()));

    let ports = match config.database.url() {
        Some(url) => {
            let pool = postgres::connect(&config.database, url).await?;
            tracing::info!("Connected to database, migrations applied");
            AppPorts {
                equipment: Arc::new(PostgresEquipmentRepository::new(pool.clone())),
                alerts: Arc::new(PostgresAlertRepository::new(pool.clone())),
                breakdowns: Arc::new(PostgresBreakdownRepository::new(pool)),
                gateway: gateway.clone(),
                directory,
                dispatcher,
                rules: config.alerts.rules(),
            }
        }
        None => {
            tracing::warn!("No database URL configured; using the in-memory store");
            let store = Arc::new(InMemoryStore::new());
            AppPorts {
                equipment: store.clone(),
                alerts: store.clone(),
                breakdowns: store,
                gateway: gateway.clone(),
                directory,
                dispatcher,
                rules: config.alerts.rules(),
            }
        }
    };

    let app = api_router(ApiHandlers::from_ports(ports), validator.clone())
        .merge(websocket_router().with_state(WebSocketState::new(hub, validator)))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    hub_task.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match server.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
