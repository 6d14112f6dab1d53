//! Hub Module
//!
//! Connection registry, shared item state and the per-connection
//! WebSocket session with its heartbeat.
//!
//! # Components
//! - `Hub`: live connections and item store behind one exclusive lock
//! - `Connection`: hub-side handle owning the outbound queue producer
//! - `run_session`: outbound/inbound pump pair for one client
//! - `Heartbeat`: ping cadence and pong-renewed read deadline

pub mod connection;
pub mod heartbeat;
mod registry;
pub mod session;

pub use connection::{Connection, ConnectionId, ConnectionState, OutboundQueue};
pub use heartbeat::Heartbeat;
pub use registry::{Hub, HubStats};
pub use session::{run_session, SessionSettings};
