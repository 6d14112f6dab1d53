//! Request, response and WebSocket message models
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP bodies and WebSocket frames.

pub mod messages;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use messages::{
    format_remaining, ClientAction, ClientMessage, Notification, NotificationKind, ServerMessage,
};
pub use requests::CreateItemRequest;
pub use responses::{ErrorResponse, HealthResponse};
