//! WebSocket upgrade handler for the live equipment channel.
//!
//! Connection lifecycle:
//! 1. Extract the bearer token (query `token` or `Authorization` header)
//! 2. Validate it; refuse with 401 before upgrading on failure
//! 3. Upgrade and register with the hub (joins `user:<id>` and `role:<role>`)
//! 4. Pump the outbound queue to the socket; process client messages in order
//! 5. Disconnect from the hub when either side finishes

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::domain::foundation::{AuthError, AuthenticatedSubject, EquipmentId};
use crate::ports::SessionValidator;

use super::{
    messages::{ClientMessage, ErrorMessage, Outbound, PongMessage, ServerMessage},
    rooms::{ConnectionId, GatewayHandle},
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub gateway: GatewayHandle,
    pub validator: Arc<dyn SessionValidator>,
}

impl WebSocketState {
    pub fn new(gateway: GatewayHandle, validator: Arc<dyn SessionValidator>) -> Self {
        Self { gateway, validator }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Picks the token from the query string, falling back to the header.
fn extract_token(params: &ConnectParams, headers: &HeaderMap) -> Option<String> {
    if let Some(token) = params.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Authenticates the handshake.
pub async fn authenticate(
    validator: &dyn SessionValidator,
    token: Option<String>,
) -> Result<AuthenticatedSubject, AuthError> {
    let token = token.ok_or(AuthError::MissingToken)?;
    validator.validate(&token).await
}

fn refuse(error: &AuthError) -> Response {
    let status = match error {
        AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::UNAUTHORIZED,
    };
    let body = serde_json::json!({
        "code": "UNAUTHORIZED",
        "message": error.to_string(),
    });
    (status, Json(body)).into_response()
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    State(state): State<WebSocketState>,
) -> Response {
    let token = extract_token(&params, &headers);
    let subject = match authenticate(state.validator.as_ref(), token).await {
        Ok(subject) => subject,
        Err(e) => {
            tracing::warn!(error = %e, "Refusing connection");
            return refuse(&e);
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, subject, state.gateway))
}

/// Runs for the lifetime of one connection.
async fn handle_socket(socket: WebSocket, subject: AuthenticatedSubject, gateway: GatewayHandle) {
    let (mut sender, mut receiver) = socket.split();
    let (connection_id, replies, mut outbound) = gateway.open_connection(subject).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(item) = outbound.recv().await {
            let text = match item.to_text() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(event = item.name(), error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    let recv_gateway = gateway.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    if let Some(reply) = handle_client_text(&recv_gateway, connection_id, &text).await {
                        reply_to(&replies, connection_id, reply).await;
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(connection_id = %connection_id, "Received unsupported binary message");
                    let reply = ServerMessage::Error(ErrorMessage::new(
                        "UNSUPPORTED_MESSAGE",
                        "binary frames are not supported",
                    ));
                    reply_to(&replies, connection_id, reply).await;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level keepalive, answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    gateway.disconnect(connection_id).await;
}

async fn reply_to(replies: &mpsc::Sender<Outbound>, connection_id: ConnectionId, reply: ServerMessage) {
    if replies.send(Outbound::Direct(reply)).await.is_err() {
        tracing::debug!(connection_id = %connection_id, "Reply dropped, connection closing");
    }
}

/// Processes one text frame. Returns the reply to send directly, if any.
///
/// Subscription acknowledgements are sent by the hub once the membership
/// change is in effect, so they are not returned here.
pub async fn handle_client_text(
    gateway: &GatewayHandle,
    connection_id: ConnectionId,
    text: &str,
) -> Option<ServerMessage> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(connection_id = %connection_id, error = %e, "Malformed client message");
            return Some(ServerMessage::Error(ErrorMessage::new(
                "BAD_MESSAGE",
                format!("unrecognized message: {}", e),
            )));
        }
    };

    match message {
        ClientMessage::Ping => Some(ServerMessage::Pong(PongMessage::now())),
        ClientMessage::SubscribeEquipment(raw) => match EquipmentId::new(raw) {
            Ok(equipment_id) => {
                gateway.subscribe_equipment(connection_id, &equipment_id).await;
                None
            }
            Err(e) => Some(ServerMessage::Error(ErrorMessage::new("INVALID_EQUIPMENT_ID", e.to_string()))),
        },
        ClientMessage::UnsubscribeEquipment(raw) => match EquipmentId::new(raw) {
            Ok(equipment_id) => {
                gateway.unsubscribe_equipment(connection_id, &equipment_id).await;
                None
            }
            Err(e) => Some(ServerMessage::Error(ErrorMessage::new("INVALID_EQUIPMENT_ID", e.to_string()))),
        },
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
