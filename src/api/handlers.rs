//! API Handlers
//!
//! HTTP request handlers, including the WebSocket upgrade endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::Response,
    Json,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{HubError, Result};
use crate::hub::{run_session, Hub, HubStats, SessionSettings};
use crate::models::{CreateItemRequest, HealthResponse};
use crate::store::Item;

/// Default inbound WebSocket message limit in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared notification hub
    pub hub: Arc<Hub>,
    /// Settings applied to every new WebSocket session
    pub session: SessionSettings,
    /// Inbound WebSocket message limit in bytes
    pub max_message_size: usize,
}

impl AppState {
    /// Creates a new AppState around the given hub with default session settings.
    pub fn new(hub: Hub) -> Self {
        Self {
            hub: Arc::new(hub),
            session: SessionSettings::default(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            hub: Arc::new(Hub::new()),
            session: SessionSettings::from_config(config),
            max_message_size: config.max_message_size,
        }
    }
}

/// Handler for GET /ws
///
/// Upgrades to a WebSocket and hands the connection to the hub. Failed
/// upgrades are logged and no connection is created.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let AppState {
        hub,
        session,
        max_message_size,
    } = state;

    ws.max_message_size(max_message_size)
        .on_failed_upgrade(|err: axum::Error| warn!(error = %err, "websocket upgrade failed"))
        .on_upgrade(move |socket| run_session(socket, hub, session))
}

/// Handler for POST /api/todos
///
/// Tracks a new item and returns it with 201 Created.
pub async fn create_item_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>)> {
    let Json(req) = payload.map_err(|rejection| HubError::InvalidRequest(rejection.body_text()))?;

    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(HubError::InvalidRequest(error_msg));
    }

    let item = state.hub.add_item(req.task, req.deadline).await;
    info!(item_id = %item.id, "item created via API");

    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for GET /api/todos
///
/// Returns every tracked item, ordered by deadline.
pub async fn list_items_handler(State(state): State<AppState>) -> Json<Vec<Item>> {
    Json(state.hub.snapshot().await)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<HubStats> {
    Json(state.hub.stats().await)
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /test
pub async fn test_handler() -> &'static str {
    "Test is successful"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn request(task: &str) -> CreateItemRequest {
        CreateItemRequest {
            task: task.to_string(),
            deadline: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_handler() {
        let state = AppState::new(Hub::new());

        let result = create_item_handler(State(state.clone()), Ok(Json(request("write tests")))).await;
        let (status, Json(item)) = tokio_test::assert_ok!(result);
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item.task, "write tests");
        assert!(!item.done);

        let Json(items) = list_items_handler(State(state)).await;
        assert_eq!(items, vec![item]);
    }

    #[tokio::test]
    async fn test_create_invalid_request() {
        let state = AppState::new(Hub::new());

        let result = create_item_handler(State(state.clone()), Ok(Json(request("")))).await;
        assert!(matches!(result, Err(HubError::InvalidRequest(_))));
        assert_eq!(state.hub.stats().await.total_items, 0);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = AppState::new(Hub::new());
        create_item_handler(State(state.clone()), Ok(Json(request("one"))))
            .await
            .unwrap();

        let Json(stats) = stats_handler(State(state)).await;
        assert_eq!(stats.total_items, 1);
        assert_eq!(stats.pending_items, 1);
        assert_eq!(stats.connections, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_test_handler() {
        assert_eq!(test_handler().await, "Test is successful");
    }

    #[test]
    fn test_state_from_config() {
        let config = Config {
            ping_interval: 10,
            outbound_capacity: 16,
            max_message_size: 2048,
            ..Config::default()
        };
        let state = AppState::from_config(&config);
        assert_eq!(state.session.outbound_capacity, 16);
        assert_eq!(
            state.session.heartbeat.ping_interval,
            std::time::Duration::from_secs(10)
        );
        assert_eq!(state.max_message_size, 2048);
    }
}
