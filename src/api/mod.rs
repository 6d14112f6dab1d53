//! API Module
//!
//! HTTP handlers and routing for the hub's REST and WebSocket endpoints.
//!
//! # Endpoints
//! - `GET /ws` - WebSocket upgrade for live updates
//! - `POST /api/todos` - Track a new item
//! - `GET /api/todos` - List tracked items
//! - `GET /stats` - Hub statistics
//! - `GET /health` - Health check endpoint
//! - `GET /test` - Smoke test endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
