//! Audience selection
//!
//! Decides which connections receive each outbound event. Holds no
//! membership of its own; every answer is read from the `UserRegistry`
//! at the moment it is asked.

use clap::ValueEnum;

use crate::registry::{User, UserRegistry};
use crate::types::{ConnectionId, RoomName};

/// Reach of chat messages and departure notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BroadcastScope {
    /// Members of the sender's room only
    #[default]
    Room,
    /// Every joined user, whatever their room
    Global,
}

/// Recipients of the three events emitted on a join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAudience {
    /// Receives the welcome message
    pub welcome_target: ConnectionId,
    /// Room members other than the joiner
    pub broadcast_targets: Vec<ConnectionId>,
    /// Whole room including the joiner
    pub membership_update_targets: Vec<ConnectionId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoomRouter {
    scope: BroadcastScope,
}

impl RoomRouter {
    pub fn new(scope: BroadcastScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> BroadcastScope {
        self.scope
    }

    /// Audience for a user that has just joined `room`
    pub fn audience_for_join(
        &self,
        registry: &UserRegistry,
        joiner: ConnectionId,
        room: &RoomName,
    ) -> JoinAudience {
        let members = Self::room_members(registry, room);
        JoinAudience {
            welcome_target: joiner,
            broadcast_targets: members.iter().copied().filter(|id| *id != joiner).collect(),
            membership_update_targets: members,
        }
    }

    /// Audience for a chat message; empty when the sender is not joined
    pub fn audience_for_chat(
        &self,
        registry: &UserRegistry,
        sender: ConnectionId,
    ) -> Vec<ConnectionId> {
        match registry.get(sender) {
            Some(user) => self.scoped(registry, &user.room),
            None => Vec::new(),
        }
    }

    /// Audience for the notice about a user that was just removed
    ///
    /// `departed` is what `UserRegistry::leave` returned; `None` means
    /// nothing was removed and nobody is told.
    pub fn audience_for_disconnect(
        &self,
        registry: &UserRegistry,
        departed: Option<&User>,
    ) -> Vec<ConnectionId> {
        match departed {
            Some(user) => self.scoped(registry, &user.room),
            None => Vec::new(),
        }
    }

    /// Every current member of `room`, in join order
    pub fn room_members(registry: &UserRegistry, room: &RoomName) -> Vec<ConnectionId> {
        registry.list_by_room(room).iter().map(|u| u.id).collect()
    }

    fn scoped(&self, registry: &UserRegistry, room: &RoomName) -> Vec<ConnectionId> {
        match self.scope {
            BroadcastScope::Room => Self::room_members(registry, room),
            BroadcastScope::Global => registry.all_ids(),
        }
    }
}
