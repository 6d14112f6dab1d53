//! Connection Module
//!
//! One accepted client link as seen by the hub: an identifier plus the
//! producer side of its bounded outbound queue.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{Duration, Instant};

/// Default outbound queue capacity, in messages.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

// == Connection Id ==
/// Process-unique connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Consumer side of a connection's outbound queue, owned by the outbound pump.
pub type OutboundQueue = mpsc::Receiver<String>;

// == Enqueue Error ==
/// Why a non-blocking enqueue failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// The queue is at capacity; the consumer is too slow
    Full,
    /// The outbound pump already went away
    Closed,
}

// == Connection ==
/// Hub-side handle of a live connection.
///
/// Holds the only sender of the outbound queue, so dropping the handle
/// closes the queue and lets the outbound pump wind down.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    sender: mpsc::Sender<String>,
    connected_at: Instant,
}

impl Connection {
    // == Constructor ==
    /// Opens a new connection with an outbound queue of `capacity` messages.
    ///
    /// Returns the hub-side handle and the queue for the outbound pump.
    pub fn open(capacity: usize) -> (Self, OutboundQueue) {
        let (sender, queue) = mpsc::channel(capacity.max(1));
        let connection = Self {
            id: ConnectionId::next(),
            sender,
            connected_at: Instant::now(),
        };
        (connection, queue)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Time since the connection was opened.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    // == Try Enqueue ==
    /// Queues a payload without waiting.
    pub fn try_enqueue(&self, payload: String) -> Result<(), EnqueueError> {
        self.sender.try_send(payload).map_err(|err| match err {
            TrySendError::Full(_) => EnqueueError::Full,
            TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }
}

// == Connection State ==
/// Lifecycle of a connection, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Active => "active",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let (a, _qa) = Connection::open(4);
        let (b, _qb) = Connection::open(4);
        assert_ne!(a.id(), b.id());
        assert!(a.id().to_string().starts_with("conn-"));
    }

    #[tokio::test]
    async fn test_enqueue_delivers_in_order() {
        let (conn, mut queue) = Connection::open(4);
        for i in 0..3 {
            conn.try_enqueue(format!("msg_{i}")).unwrap();
        }
        for i in 0..3 {
            assert_eq!(queue.recv().await.unwrap(), format!("msg_{i}"));
        }
    }

    #[test]
    fn test_enqueue_full() {
        let (conn, _queue) = Connection::open(1);
        assert_eq!(conn.try_enqueue("first".into()), Ok(()));
        assert_eq!(conn.try_enqueue("second".into()), Err(EnqueueError::Full));
    }

    #[test]
    fn test_enqueue_closed() {
        let (conn, queue) = Connection::open(1);
        drop(queue);
        assert_eq!(conn.try_enqueue("lost".into()), Err(EnqueueError::Closed));
    }

    #[tokio::test]
    async fn test_dropping_handle_closes_queue() {
        let (conn, mut queue) = Connection::open(2);
        conn.try_enqueue("last".into()).unwrap();
        drop(conn);

        assert_eq!(queue.recv().await.as_deref(), Some("last"));
        assert!(queue.recv().await.is_none());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (conn, _queue) = Connection::open(0);
        assert!(conn.try_enqueue("fits".into()).is_ok());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Closing.to_string(), "closing");
    }
}
