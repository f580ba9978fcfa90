//! ConnectionHub Actor implementation
//!
//! The central actor that owns the live connections and the `UserRegistry`.
//! Every registry mutation happens inside this actor, so join, leave and
//! the audience snapshots taken for each broadcast are linearized.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::{Connection, ConnectionState};
use crate::error::AppError;
use crate::formatter::{format_message, Clock, SystemClock};
use crate::message::{ClientMessage, ServerMessage, UserSummary};
use crate::registry::{User, UserRegistry};
use crate::router::{BroadcastScope, RoomRouter};
use crate::types::{ConnectionId, RoomName};

/// Sender name used when no configuration is given
pub const DEFAULT_BOT_NAME: &str = "ChatApp Bot";

const WELCOME_TEXT: &str = "Welcome from server";

/// Events arriving from a single connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Join a room (first event expected on a connection)
    JoinRoom { username: String, room: String },
    /// Chat text from a joined user
    ChatMessage { text: String },
    /// Leave the room but keep the connection
    LeaveRoom,
    /// Transport closed; always the last event of a connection
    Disconnect,
}

impl From<ClientMessage> for InboundEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::JoinRoom { username, room } => InboundEvent::JoinRoom { username, room },
            ClientMessage::ChatMessage { text } => InboundEvent::ChatMessage { text },
            ClientMessage::LeaveRoom => InboundEvent::LeaveRoom,
        }
    }
}

/// Commands sent from handlers to the ConnectionHub actor
#[derive(Debug)]
pub enum HubCommand {
    /// New transport connection
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Event from an existing connection
    Event {
        connection_id: ConnectionId,
        event: InboundEvent,
    },
}

/// Tunables for the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    /// Sender name of system messages
    pub bot_name: String,
    /// Reach of chat messages and departure notices
    pub scope: BroadcastScope,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            scope: BroadcastScope::default(),
        }
    }
}

/// The main ConnectionHub actor
///
/// Can be driven directly through `handle_command` (as the tests do) or
/// fed from a channel with `run`.
pub struct ConnectionHub<C: Clock = SystemClock> {
    /// All live connections: ConnectionId -> Connection
    connections: HashMap<ConnectionId, Connection>,
    /// Joined users; the only record of room membership
    registry: UserRegistry,
    router: RoomRouter,
    clock: C,
    bot_name: String,
}

impl ConnectionHub<SystemClock> {
    /// Create a hub with an empty registry and the system clock
    pub fn new(settings: HubSettings) -> Self {
        Self::with_parts(settings, UserRegistry::new(), SystemClock)
    }
}

impl<C: Clock> ConnectionHub<C> {
    /// Create a hub around an existing registry and clock
    pub fn with_parts(settings: HubSettings, registry: UserRegistry, clock: C) -> Self {
        Self {
            connections: HashMap::new(),
            registry,
            router: RoomRouter::new(settings.scope),
            clock,
            bot_name: settings.bot_name,
        }
    }

    /// Run the hub event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self, mut receiver: mpsc::Receiver<HubCommand>) {
        info!("ConnectionHub started (scope: {:?})", self.router.scope());

        while let Some(cmd) = receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ConnectionHub shutting down");
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    /// Current lifecycle state of a connection
    ///
    /// Connections the hub no longer (or never) knew about are `Closed`.
    pub fn state(&self, connection_id: ConnectionId) -> ConnectionState {
        if !self.connections.contains_key(&connection_id) {
            ConnectionState::Closed
        } else if self.registry.contains(connection_id) {
            ConnectionState::Joined
        } else {
            ConnectionState::Connected
        }
    }

    /// Process a single command
    pub fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Connect {
                connection_id,
                sender,
            } => self.connect(connection_id, sender),
            HubCommand::Event {
                connection_id,
                event,
            } => self.handle_event(connection_id, event),
        }
    }

    /// Register a new transport connection
    pub fn connect(&mut self, connection_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        if self.connections.contains_key(&connection_id) {
            warn!("Connection {} registered twice, ignoring", connection_id);
            return;
        }

        info!("Connection {} opened", connection_id);
        self.connections
            .insert(connection_id, Connection::new(connection_id, sender));
        self.log_counts();
    }

    /// Process one inbound event; events for closed connections are ignored
    pub fn handle_event(&mut self, connection_id: ConnectionId, event: InboundEvent) {
        if !self.connections.contains_key(&connection_id) {
            debug!("Dropping {:?} for closed connection {}", event, connection_id);
            return;
        }

        match event {
            InboundEvent::JoinRoom { username, room } => {
                self.handle_join(connection_id, &username, &room)
            }
            InboundEvent::ChatMessage { text } => self.handle_chat(connection_id, &text),
            InboundEvent::LeaveRoom => self.handle_leave(connection_id),
            InboundEvent::Disconnect => self.handle_disconnect(connection_id),
        }
    }

    fn handle_join(&mut self, connection_id: ConnectionId, username: &str, room: &str) {
        let username = username.trim();
        let room = room.trim();
        if username.is_empty() || room.is_empty() {
            let err = AppError::InvalidJoin("Username and room are required".to_string());
            self.send_to(connection_id, err.into());
            return;
        }

        let user = match self
            .registry
            .join(connection_id, username, RoomName::new(room))
        {
            Ok(user) => user,
            Err(e) => {
                warn!("Rejected join from {}: {}", connection_id, e);
                self.send_to(connection_id, e.into());
                return;
            }
        };

        info!(
            "Connection {} joined room {} as '{}'",
            connection_id, user.room, user.username
        );

        let audience = self
            .router
            .audience_for_join(&self.registry, connection_id, &user.room);

        let welcome = format_message(&self.bot_name, WELCOME_TEXT, &self.clock);
        self.send_to(audience.welcome_target, ServerMessage::Message(welcome));

        let joined = format_message(
            &self.bot_name,
            &format!("{} has joined the chat", user.username),
            &self.clock,
        );
        self.broadcast(&audience.broadcast_targets, ServerMessage::Message(joined));

        let roster = self.users_room(&user.room);
        self.broadcast(&audience.membership_update_targets, roster);
        self.log_counts();
    }

    fn handle_chat(&mut self, connection_id: ConnectionId, text: &str) {
        let Some(user) = self.registry.get(connection_id) else {
            debug!("Dropping chat from {} (not in a room)", connection_id);
            return;
        };

        let msg = format_message(&user.username, text, &self.clock);
        let targets = self.router.audience_for_chat(&self.registry, connection_id);
        self.broadcast(&targets, ServerMessage::Message(msg));
    }

    fn handle_leave(&mut self, connection_id: ConnectionId) {
        let departed = self.registry.leave(connection_id);
        match &departed {
            Some(user) => info!("Connection {} left room {}", connection_id, user.room),
            None => debug!("Connection {} is not in a room", connection_id),
        }
        self.announce_departure(departed);
    }

    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(conn) = self.connections.remove(&connection_id) {
            info!(
                "Connection {} closed after {:?}",
                connection_id,
                conn.uptime()
            );
        }

        let departed = self.registry.leave(connection_id);
        self.announce_departure(departed);
        self.log_counts();
    }

    /// Tell the audience a user has left, then refresh the room's roster
    fn announce_departure(&self, departed: Option<User>) {
        let targets = self
            .router
            .audience_for_disconnect(&self.registry, departed.as_ref());
        let Some(user) = departed else {
            return;
        };

        let left = format_message(
            &self.bot_name,
            &format!("{} has left the chat", user.username),
            &self.clock,
        );
        self.broadcast(&targets, ServerMessage::Message(left));

        let remaining = RoomRouter::room_members(&self.registry, &user.room);
        if !remaining.is_empty() {
            self.broadcast(&remaining, self.users_room(&user.room));
        }
    }

    /// Membership snapshot of a room as an outbound event
    fn users_room(&self, room: &RoomName) -> ServerMessage {
        ServerMessage::UsersRoom {
            room: room.to_string(),
            users: self
                .registry
                .list_by_room(room)
                .iter()
                .map(UserSummary::from)
                .collect(),
        }
    }

    /// Send to every target; a failed delivery never stops the rest
    fn broadcast(&self, targets: &[ConnectionId], msg: ServerMessage) {
        for target in targets {
            self.send_to(*target, msg.clone());
        }
    }

    fn send_to(&self, target: ConnectionId, msg: ServerMessage) {
        let Some(conn) = self.connections.get(&target) else {
            return;
        };
        if let Err(e) = conn.send(msg) {
            warn!("Failed to deliver to {}: {}", target, e);
        }
    }

    fn log_counts(&self) {
        debug!(
            "Total connections: {}, joined users: {}, rooms: {}",
            self.connections.len(),
            self.registry.len(),
            self.registry.room_count()
        );
    }
}
