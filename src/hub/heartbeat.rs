//! Heartbeat Module
//!
//! Timers behind the ping/pong liveness protocol: the outbound pump pings
//! on a fixed cadence, the inbound pump gives up when no pong renews its
//! read deadline in time.

use futures::{Stream, StreamExt};
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

use crate::config::Config;
use crate::error::{HubError, Result};

// == Heartbeat Settings ==
/// Ping cadence and pong deadline for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// Time between pings on the outbound side
    pub ping_interval: Duration,
    /// How long the inbound side waits for the next pong
    pub pong_timeout: Duration,
}

impl Heartbeat {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval),
            pong_timeout: Duration::from_secs(config.pong_timeout),
        }
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(60),
        }
    }
}

// == Ping Timer ==
/// Fires once per period, whatever else the outbound side is sending.
#[derive(Debug)]
pub struct PingTimer {
    interval: Interval,
}

impl PingTimer {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Waits for the next ping slot.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

// == Read Deadline ==
/// Rolling read deadline, pushed forward by every pong.
#[derive(Debug, Clone)]
pub struct ReadDeadline {
    last_pong: Instant,
    timeout: Duration,
}

impl ReadDeadline {
    /// Starts the deadline counting from now.
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_pong: Instant::now(),
            timeout,
        }
    }

    /// Records a pong.
    pub fn renew(&mut self) {
        self.last_pong = Instant::now();
    }

    pub fn deadline(&self) -> Instant {
        self.last_pong + self.timeout
    }

    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.elapsed()
    }

    // == Next Frame ==
    /// Reads the next item from `stream`, failing once the deadline passes.
    pub async fn next_frame<S>(&self, stream: &mut S) -> Result<Option<S::Item>>
    where
        S: Stream + Unpin,
    {
        time::timeout_at(self.deadline(), stream.next())
            .await
            .map_err(|_| HubError::HeartbeatTimeout(self.timeout))
    }
}
