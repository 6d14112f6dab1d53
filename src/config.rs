//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound on the approaching window, one year in seconds.
pub const MAX_APPROACHING_WINDOW: u64 = 365 * 24 * 60 * 60;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Deadline sweep interval in seconds
    pub sweep_interval: u64,
    /// Remaining time (seconds) under which an item counts as approaching
    pub approaching_window: u64,
    /// Seconds between pings on every connection
    pub ping_interval: u64,
    /// Read deadline (seconds) renewed by every pong
    pub pong_timeout: u64,
    /// Per-connection outbound queue capacity in messages
    pub outbound_capacity: usize,
    /// Maximum accepted inbound WebSocket message size in bytes
    pub max_message_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `SWEEP_INTERVAL` - Deadline sweep frequency in seconds (default: 60)
    /// - `APPROACHING_WINDOW` - Approaching threshold in seconds (default: 1800)
    /// - `PING_INTERVAL` - Heartbeat ping interval in seconds (default: 30)
    /// - `PONG_TIMEOUT` - Heartbeat read deadline in seconds (default: 60)
    /// - `OUTBOUND_CAPACITY` - Outbound queue size per connection (default: 256)
    /// - `MAX_MESSAGE_SIZE` - Inbound message limit in bytes (default: 512)
    ///
    /// Intervals are at least one second and the approaching window is capped
    /// at [`MAX_APPROACHING_WINDOW`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            // a zero sweep interval would spin on sleep(0)
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval).max(1),
            approaching_window: env_or("APPROACHING_WINDOW", defaults.approaching_window)
                .min(MAX_APPROACHING_WINDOW),
            // tokio intervals panic on a zero period
            ping_interval: env_or("PING_INTERVAL", defaults.ping_interval).max(1),
            pong_timeout: env_or("PONG_TIMEOUT", defaults.pong_timeout).max(1),
            // tokio's bounded channel rejects a zero capacity
            outbound_capacity: env_or("OUTBOUND_CAPACITY", defaults.outbound_capacity).max(1),
            max_message_size: env_or("MAX_MESSAGE_SIZE", defaults.max_message_size),
        }
    }

    /// Sweep interval as a Duration.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    /// Approaching window as a chrono Duration, ready to compare against deadlines.
    pub fn approaching_threshold(&self) -> chrono::Duration {
        // the cap keeps the value well inside i64 and chrono's range
        chrono::Duration::seconds(self.approaching_window.min(MAX_APPROACHING_WINDOW) as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            sweep_interval: 60,
            approaching_window: 30 * 60,
            ping_interval: 30,
            pong_timeout: 60,
            outbound_capacity: 256,
            max_message_size: 512,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
