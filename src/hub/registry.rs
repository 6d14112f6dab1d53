//! Hub Module
//!
//! Process-wide owner of the live connection registry and the item store.
//! Every entry point takes the same exclusive lock for an in-memory critical
//! section; network writes happen later, in each connection's outbound pump.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::hub::connection::{Connection, ConnectionId, EnqueueError};
use crate::models::ServerMessage;
use crate::store::{DeadlineEvent, Item, ItemStore};

// == Hub Stats ==
/// Point-in-time counters for the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    /// Number of live connections
    pub connections: usize,
    /// Number of tracked items
    pub total_items: usize,
    /// Items not yet done
    pub pending_items: usize,
    /// Items completed or elapsed
    pub completed_items: usize,
}

#[derive(Debug, Default)]
struct HubState {
    connections: HashMap<ConnectionId, Connection>,
    items: ItemStore,
}

impl HubState {
    // == Fan Out ==
    /// Enqueues `payload` on every live connection without blocking.
    ///
    /// A connection whose queue is full or closed is removed on the spot;
    /// dropping its handle closes the queue. Returns the number of
    /// connections that accepted the payload.
    fn fan_out(&mut self, payload: &str) -> usize {
        let mut dropped = Vec::new();
        let mut delivered = 0;

        for (id, connection) in &self.connections {
            match connection.try_enqueue(payload.to_owned()) {
                Ok(()) => delivered += 1,
                Err(EnqueueError::Full) => {
                    warn!(connection_id = %id, "outbound queue full, dropping slow connection");
                    dropped.push(*id);
                }
                Err(EnqueueError::Closed) => {
                    debug!(connection_id = %id, "outbound queue closed, dropping connection");
                    dropped.push(*id);
                }
            }
        }

        for id in dropped {
            self.connections.remove(&id);
        }

        delivered
    }

    fn snapshot_payload(&self) -> Option<String> {
        let message = ServerMessage::Todos {
            todos: self.items.snapshot(),
        };
        match message.to_json() {
            Ok(payload) => Some(payload),
            Err(e) => {
                error!(error = %e, "failed to serialize snapshot");
                None
            }
        }
    }

    fn broadcast_snapshot(&mut self) -> usize {
        match self.snapshot_payload() {
            Some(payload) => self.fan_out(&payload),
            None => 0,
        }
    }
}

// == Hub ==
/// Shared hub state behind one exclusive lock.
///
/// Share it as `Arc<Hub>` between request handlers, connection pumps and
/// the deadline sweep.
#[derive(Debug, Default)]
pub struct Hub {
    state: Mutex<HubState>,
}

impl Hub {
    // == Constructor ==
    /// Creates a hub with no connections and no items.
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds a connection to the live set.
    ///
    /// The current snapshot is queued to it inside the same critical section,
    /// so the initial sync matches the item store at registration and every
    /// later broadcast arrives after it.
    pub async fn register(&self, connection: Connection) {
        let mut state = self.state.lock().await;
        let id = connection.id();

        if let Some(payload) = state.snapshot_payload() {
            if let Err(e) = connection.try_enqueue(payload) {
                warn!(connection_id = %id, error = ?e, "failed to queue initial snapshot");
            }
        }

        state.connections.insert(id, connection);
        info!(
            connection_id = %id,
            connections = state.connections.len(),
            "connection registered"
        );
    }

    // == Unregister ==
    /// Removes a connection from the live set; a no-op when already gone.
    ///
    /// Returns true if the connection was still registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        match state.connections.remove(&id) {
            Some(connection) => {
                info!(
                    connection_id = %id,
                    connected_for = ?connection.age(),
                    connections = state.connections.len(),
                    "connection unregistered"
                );
                true
            }
            None => false,
        }
    }

    // == Add Item ==
    /// Tracks a new item and broadcasts the full state.
    pub async fn add_item(&self, task: impl Into<String>, deadline: DateTime<Utc>) -> Item {
        let mut state = self.state.lock().await;
        let item = state.items.insert(task, deadline);
        let delivered = state.broadcast_snapshot();
        info!(item_id = %item.id, deadline = %item.deadline, delivered, "item added");
        item
    }

    // == Complete Item ==
    /// Marks an item done and broadcasts the full state.
    ///
    /// Unknown or already completed identifiers change nothing and trigger
    /// no broadcast. Returns true if the item flipped.
    pub async fn complete_item(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;
        if !state.items.complete(id) {
            debug!(item_id = id, "complete ignored, item unknown or already done");
            return false;
        }
        let delivered = state.broadcast_snapshot();
        info!(item_id = id, delivered, "item completed");
        true
    }

    // == Snapshot ==
    /// Copy of every tracked item, ordered by deadline.
    pub async fn snapshot(&self) -> Vec<Item> {
        self.state.lock().await.items.snapshot()
    }

    // == Broadcast ==
    /// Queues `payload` on every live connection.
    ///
    /// Never waits on a slow client: connections with a full queue are
    /// dropped from the live set instead. Returns the number of connections
    /// that accepted the payload.
    pub async fn broadcast(&self, payload: &str) -> usize {
        self.state.lock().await.fan_out(payload)
    }

    /// Broadcasts the full item state.
    pub async fn broadcast_snapshot(&self) -> usize {
        self.state.lock().await.broadcast_snapshot()
    }

    // == Evaluate Deadlines ==
    /// Classifies open items at `now`, flipping elapsed ones to done.
    ///
    /// Only the in-memory phase runs under the lock; callers broadcast the
    /// resulting notifications afterwards.
    pub async fn evaluate_deadlines(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Vec<DeadlineEvent> {
        self.state.lock().await.items.evaluate_deadlines(now, window)
    }

    // == Stats ==
    pub async fn stats(&self) -> HubStats {
        let state = self.state.lock().await;
        let pending = state.items.pending();
        HubStats {
            connections: state.connections.len(),
            total_items: state.items.len(),
            pending_items: pending,
            completed_items: state.items.len() - pending,
        }
    }

    /// Number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    /// Returns true if the connection is in the live set.
    pub async fn is_registered(&self, id: ConnectionId) -> bool {
        self.state.lock().await.connections.contains_key(&id)
    }
}
