//! Room-based WebSocket Chat Relay Library
//!
//! Clients connect, join a named room, and exchange text messages that are
//! relayed to other members. Join and leave events are announced and every
//! membership change sends the room its updated member list.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ConnectionHub` is the central actor; it owns the `UserRegistry`
//! - `RoomRouter` picks the audience of each outbound event
//! - Each connection has a `handler` task translating WebSocket frames
//!   into `HubCommand`s
//! - No locks needed - every registry mutation happens inside the hub
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{handle_connection, ConnectionHub, HubSettings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:2222").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ConnectionHub::new(HubSettings::default()).run(cmd_rx));
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod hub;
pub mod message;
pub mod registry;
pub mod router;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use connection::{Connection, ConnectionState};
pub use error::{AppError, SendError};
pub use formatter::{format_message, Clock, FixedClock, Message, SystemClock};
pub use handler::handle_connection;
pub use hub::{ConnectionHub, HubCommand, HubSettings, InboundEvent};
pub use message::{ClientMessage, ErrorCode, ServerMessage, UserSummary};
pub use registry::{User, UserRegistry};
pub use router::{BroadcastScope, JoinAudience, RoomRouter};
pub use types::{ConnectionId, RoomName};
