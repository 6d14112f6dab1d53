//! Error types for the notification hub
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Hub Error Enum ==
/// Unified error type for the notification hub.
///
/// Every variant is scoped to one request, one connection or one sweep
/// iteration. None of them is fatal to the process.
#[derive(Error, Debug)]
pub enum HubError {
    /// Invalid create-item request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Inbound control message could not be decoded
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Outbound payload could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WebSocket read or write failure
    #[error("Transport error: {0}")]
    Transport(#[from] axum::Error),

    /// No pong arrived within the read deadline
    #[error("Heartbeat timed out after {0:?}")]
    HeartbeatTimeout(Duration),
}

// == IntoResponse Implementation ==
impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = match &self {
            HubError::InvalidRequest(_) | HubError::MalformedMessage(_) => StatusCode::BAD_REQUEST,
            HubError::Serialization(_)
            | HubError::Transport(_)
            | HubError::HeartbeatTimeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            HubError::InvalidRequest(msg) | HubError::MalformedMessage(msg) => msg,
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the notification hub.
pub type Result<T> = std::result::Result<T, HubError>;
