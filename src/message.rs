//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::formatter::Message;
use crate::registry::User;

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with camelCase naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join a room under a display name
    JoinRoom { username: String, room: String },
    /// Send a chat message
    ChatMessage { text: String },
    /// Leave the current room, keeping the connection open
    LeaveRoom,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with camelCase naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Chat or system message
    Message(Message),
    /// Full membership snapshot of a room
    UsersRoom {
        room: String,
        users: Vec<UserSummary>,
    },
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// One entry of a `usersRoom` member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
        }
    }
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    /// Join on a connection that is already in a room
    AlreadyJoined,
    /// Missing username or room
    InvalidJoin,
    /// Invalid message format
    InvalidMessage,
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::DuplicateConnection(_) => (
                ErrorCode::AlreadyJoined,
                "You have already joined a room".to_string(),
            ),
            AppError::InvalidJoin(reason) => (ErrorCode::InvalidJoin, reason.clone()),
            AppError::Json(e) => (
                ErrorCode::InvalidMessage,
                format!("Invalid message format: {}", e),
            ),
            // Fatal errors are not typically converted (connection closes)
            _ => (ErrorCode::InvalidMessage, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}
