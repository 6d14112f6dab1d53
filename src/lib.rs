//! Deadline Hub - Real-time deadline notifications over WebSocket
//!
//! Tracks task items with deadlines, broadcasts state changes to every
//! connected client and warns them as deadlines approach and pass.

pub mod api;
pub mod config;
pub mod error;
pub mod hub;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use hub::Hub;
pub use tasks::spawn_deadline_sweep;
