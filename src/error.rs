//! Error types for the chat relay
//!
//! Defines application-level errors and outbound send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::ConnectionId;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// business errors (reported back to the offending connection).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - hub is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// Join attempted on a connection that already has a user
    #[error("Connection {0} has already joined a room")]
    DuplicateConnection(ConnectionId),

    /// Join with an empty username or room name
    #[error("Invalid join request: {0}")]
    InvalidJoin(String),
}

/// Outbound send errors
///
/// Sends to a connection never block the hub; a full queue is reported
/// the same way as a closed one and the message is dropped.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection's outbound queue is full
    #[error("Channel full")]
    ChannelFull,
}
