//! Connection struct definition
//!
//! Represents one live transport connection and its outbound channel.
//! Who the connection is (username, room) lives in the `UserRegistry`.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Lifecycle of a connection as seen by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport established, no room joined yet
    Connected,
    /// Registered in a room
    Joined,
    /// Terminal; every further event is ignored
    Closed,
}

/// Live connection information
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Hub → Connection message channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// When the hub registered this connection
    pub connected_at: Instant,
}

impl Connection {
    /// Create a new connection with the given ID and sender channel
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Queue a message for this connection without waiting
    ///
    /// Returns an error if the channel is closed or its buffer is full.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// How long this connection has been registered
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
