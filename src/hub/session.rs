//! Session Module
//!
//! Runs one WebSocket client from upgrade to disconnect: registers it with
//! the hub and drives the paired outbound and inbound pumps.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::BoxError;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{HubError, Result};
use crate::hub::connection::{
    Connection, ConnectionId, ConnectionState, OutboundQueue, DEFAULT_OUTBOUND_CAPACITY,
};
use crate::hub::heartbeat::{Heartbeat, PingTimer, ReadDeadline};
use crate::hub::Hub;
use crate::models::{ClientAction, ClientMessage};

// == Session Settings ==
/// Per-connection tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub heartbeat: Heartbeat,
    /// Outbound queue capacity in messages
    pub outbound_capacity: usize,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            heartbeat: Heartbeat::from_config(config),
            outbound_capacity: config.outbound_capacity,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat: Heartbeat::default(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

/// How long the outbound pump may take to send its close frame once the
/// inbound pump has stopped.
pub const OUTBOUND_CLOSE_GRACE: Duration = Duration::from_secs(5);

// == Run Session ==
/// Serves one upgraded WebSocket until either pump stops.
pub async fn run_session(socket: WebSocket, hub: Arc<Hub>, settings: SessionSettings) {
    let (connection, queue) = Connection::open(settings.outbound_capacity);
    let id = connection.id();
    debug!(connection_id = %id, state = %ConnectionState::Connecting, "websocket upgraded");

    let (sink, stream) = socket.split();
    hub.register(connection).await;

    let outbound = tokio::spawn(write_pump(
        sink,
        queue,
        hub.clone(),
        id,
        settings.heartbeat.ping_interval,
    ));
    let inbound = tokio::spawn(read_pump(
        stream,
        hub.clone(),
        id,
        settings.heartbeat.pong_timeout,
    ));
    info!(connection_id = %id, state = %ConnectionState::Active, "connection active");

    supervise_pumps(id, inbound, outbound, OUTBOUND_CLOSE_GRACE).await;

    hub.unregister(id).await;
    info!(connection_id = %id, state = %ConnectionState::Closed, "connection closed");
}

/// Waits for either pump to stop, then stops the other.
///
/// When the inbound pump stops first it has already unregistered the
/// connection, which closes the queue. The outbound pump gets `grace` to send
/// its close frame and is aborted after that, which drops the write half even
/// when a send is stuck on a peer that stopped reading. When the outbound pump
/// stops first the inbound pump is aborted.
async fn supervise_pumps(
    id: ConnectionId,
    mut inbound: JoinHandle<Result<()>>,
    mut outbound: JoinHandle<Result<()>>,
    grace: Duration,
) {
    tokio::select! {
        res = &mut inbound => {
            log_pump_exit(id, "inbound", res);
            debug!(connection_id = %id, state = %ConnectionState::Closing, "waiting for outbound pump");
            match tokio::time::timeout(grace, &mut outbound).await {
                Ok(res) => log_pump_exit(id, "outbound", res),
                Err(_) => {
                    warn!(connection_id = %id, ?grace, "outbound pump stuck, aborting");
                    outbound.abort();
                }
            }
        }
        res = &mut outbound => {
            log_pump_exit(id, "outbound", res);
            debug!(connection_id = %id, state = %ConnectionState::Closing, "stopping inbound pump");
            inbound.abort();
        }
    }
}

fn log_pump_exit(id: ConnectionId, pump: &str, res: std::result::Result<Result<()>, JoinError>) {
    match res {
        Ok(Ok(())) => debug!(connection_id = %id, pump, "pump finished"),
        Ok(Err(e)) => warn!(connection_id = %id, pump, error = %e, "pump stopped on error"),
        Err(e) if e.is_cancelled() => debug!(connection_id = %id, pump, "pump aborted"),
        Err(e) => error!(connection_id = %id, pump, error = %e, "pump panicked"),
    }
}

fn transport<E: Into<BoxError>>(err: E) -> HubError {
    HubError::Transport(axum::Error::new(err))
}

// == Write Pump ==
/// Sole writer of the socket.
///
/// Forwards queued payloads as text frames and sends a ping every
/// `ping_interval`, however busy the queue is. Stops on a write failure or
/// once the hub closes the queue, then closes the sink and unregisters.
pub async fn write_pump<W>(
    mut sink: W,
    mut queue: OutboundQueue,
    hub: Arc<Hub>,
    id: ConnectionId,
    ping_interval: Duration,
) -> Result<()>
where
    W: Sink<Message> + Unpin,
    W::Error: Into<BoxError>,
{
    let mut ping = PingTimer::new(ping_interval);

    let result = loop {
        tokio::select! {
            msg = queue.recv() => match msg {
                Some(payload) => {
                    if let Err(e) = sink.send(Message::Text(payload)).await {
                        break Err(transport(e));
                    }
                }
                None => {
                    debug!(connection_id = %id, "outbound queue closed");
                    let _ = sink.send(Message::Close(None)).await;
                    break Ok(());
                }
            },
            _ = ping.tick() => {
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    break Err(transport(e));
                }
            }
        }
    };

    let _ = sink.close().await;
    hub.unregister(id).await;
    result
}

// == Read Pump ==
/// Reads control messages until the peer leaves or stops answering pings.
///
/// Every pong renews the read deadline. Malformed messages are logged and
/// skipped. On exit the connection is unregistered, which closes its queue
/// and stops the outbound pump.
pub async fn read_pump<R>(
    mut stream: R,
    hub: Arc<Hub>,
    id: ConnectionId,
    pong_timeout: Duration,
) -> Result<()>
where
    R: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
{
    let mut deadline = ReadDeadline::new(pong_timeout);

    let result = loop {
        let frame = match deadline.next_frame(&mut stream).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => break Err(HubError::Transport(e)),
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };

        match frame {
            Message::Text(text) => handle_text(&hub, id, &text).await,
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => handle_text(&hub, id, text).await,
                Err(_) => debug!(connection_id = %id, len = data.len(), "ignoring non-UTF8 binary frame"),
            },
            Message::Pong(_) => deadline.renew(),
            // answered by the websocket layer
            Message::Ping(_) => {}
            Message::Close(_) => {
                debug!(connection_id = %id, "client sent close frame");
                break Ok(());
            }
        }
    };

    hub.unregister(id).await;
    result
}

async fn handle_text(hub: &Hub, id: ConnectionId, text: &str) {
    match ClientMessage::parse(text) {
        Ok(ClientAction::Complete { todo_id }) => {
            hub.complete_item(&todo_id).await;
        }
        Ok(ClientAction::Unknown(action)) => {
            debug!(connection_id = %id, action, "ignoring unknown action");
        }
        Err(e) => warn!(connection_id = %id, error = %e, "ignoring malformed message"),
    }
}
