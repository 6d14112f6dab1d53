//! Deadline Sweep Task
//!
//! Background task that periodically evaluates item deadlines and pushes
//! notifications to every connected client.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::hub::Hub;
use crate::models::{Notification, ServerMessage};

// == Sweep Report ==
/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Items inside the approaching window
    pub approaching: usize,
    /// Items flipped to done because their deadline passed
    pub elapsed: usize,
    /// Notifications that made it onto the wire
    pub notified: usize,
}

// == Sweep Once ==
/// Runs a single sweep at `now`.
///
/// Deadlines are evaluated under the hub lock; the lock is released before
/// the notifications are broadcast. Approaching items are notified on every
/// sweep until they elapse or get completed. A notification that fails to
/// serialize is logged and skipped. When any item elapsed, the full state is
/// broadcast afterwards so clients see it as done.
pub async fn sweep_once(hub: &Hub, now: DateTime<Utc>, window: chrono::Duration) -> SweepReport {
    let events = hub.evaluate_deadlines(now, window).await;
    let mut report = SweepReport::default();

    for event in &events {
        if event.is_elapsed() {
            report.elapsed += 1;
        } else {
            report.approaching += 1;
        }

        let message: ServerMessage = Notification::from(event).into();
        match message.to_json() {
            Ok(payload) => {
                hub.broadcast(&payload).await;
                report.notified += 1;
            }
            Err(e) => {
                error!(item_id = %event.item().id, error = %e, "failed to serialize notification, skipping");
            }
        }
    }

    if report.elapsed > 0 {
        hub.broadcast_snapshot().await;
    }

    report
}

/// Spawns a background task that sweeps item deadlines every `interval`.
///
/// Returns a JoinHandle for the spawned task, which can be used to abort
/// the task during graceful shutdown.
///
/// # Example
/// ```ignore
/// let hub = Arc::new(Hub::new());
/// let sweep_handle = spawn_deadline_sweep(hub.clone(), Duration::from_secs(60), chrono::Duration::minutes(30));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_deadline_sweep(
    hub: Arc<Hub>,
    interval: Duration,
    window: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting deadline sweep with interval of {:?}, approaching window {} minutes",
            interval,
            window.num_minutes()
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = sweep_once(&hub, Utc::now(), window).await;

            if report.approaching > 0 || report.elapsed > 0 {
                info!(
                    approaching = report.approaching,
                    elapsed = report.elapsed,
                    notified = report.notified,
                    "deadline sweep sent notifications"
                );
            } else {
                debug!("deadline sweep: nothing due");
            }
        }
    })
}
