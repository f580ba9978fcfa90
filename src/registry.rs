//! User registry
//!
//! Maps each joined connection to its username and room. Rooms are derived:
//! a room exists exactly while at least one user carries its name, so there
//! is nothing to create or clean up when membership changes.

use std::collections::{HashMap, HashSet};

use crate::error::AppError;
use crate::types::{ConnectionId, RoomName};

/// A joined user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Connection this user belongs to
    pub id: ConnectionId,
    /// Display name (not unique)
    pub username: String,
    /// Room assigned at join; fixed until the user leaves
    pub room: RoomName,
}

/// In-memory registry of joined users
///
/// `order` keeps join order across the whole system; `users` indexes it.
/// Both are only mutated together in `join` and `leave`.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: HashMap<ConnectionId, User>,
    order: Vec<ConnectionId>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user for a connection
    ///
    /// Rejects a second join for the same connection without touching the
    /// existing entry.
    pub fn join(
        &mut self,
        id: ConnectionId,
        username: impl Into<String>,
        room: RoomName,
    ) -> Result<User, AppError> {
        if self.users.contains_key(&id) {
            return Err(AppError::DuplicateConnection(id));
        }

        let user = User {
            id,
            username: username.into(),
            room,
        };
        self.users.insert(id, user.clone());
        self.order.push(id);

        Ok(user)
    }

    /// Remove a user, returning it if it was present
    ///
    /// Unknown or already removed connections yield `None`.
    pub fn leave(&mut self, id: ConnectionId) -> Option<User> {
        let user = self.users.remove(&id)?;
        self.order.retain(|entry| *entry != id);
        Some(user)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.users.contains_key(&id)
    }

    /// Members of a room in join order (empty for an unknown room)
    pub fn list_by_room(&self, room: &RoomName) -> Vec<User> {
        self.iter().filter(|u| &u.room == room).cloned().collect()
    }

    /// Every joined connection in join order
    pub fn all_ids(&self) -> Vec<ConnectionId> {
        self.order.clone()
    }

    /// Number of distinct rooms that currently have members
    pub fn room_count(&self) -> usize {
        self.iter().map(|u| &u.room).collect::<HashSet<_>>().len()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &User> {
        self.order.iter().filter_map(|id| self.users.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usernames(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn test_join_and_get() {
        let mut registry = UserRegistry::new();
        let id = ConnectionId::new();

        let user = registry.join(id, "Alice", RoomName::new("js")).unwrap();

        assert_eq!(user.username, "Alice");
        assert_eq!(user.room, RoomName::new("js"));
        assert_eq!(registry.get(id), Some(&user));
        assert!(registry.contains(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let mut registry = UserRegistry::new();
        let id = ConnectionId::new();
        registry.join(id, "Alice", RoomName::new("js")).unwrap();

        let result = registry.join(id, "Mallory", RoomName::new("python"));

        assert!(matches!(result, Err(AppError::DuplicateConnection(dup)) if dup == id));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().username, "Alice");
        assert!(registry.list_by_room(&RoomName::new("python")).is_empty());
        assert_eq!(usernames(&registry.list_by_room(&RoomName::new("js"))), ["Alice"]);
    }

    #[test]
    fn test_leave_is_idempotent() {
        let mut registry = UserRegistry::new();
        let id = ConnectionId::new();
        registry.join(id, "Alice", RoomName::new("js")).unwrap();

        let removed = registry.leave(id);
        assert_eq!(removed.map(|u| u.username), Some("Alice".to_string()));

        assert!(registry.leave(id).is_none());
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_leave_unknown_connection() {
        let mut registry = UserRegistry::new();
        assert!(registry.leave(ConnectionId::new()).is_none());
    }

    #[test]
    fn test_list_by_room_in_join_order() {
        let mut registry = UserRegistry::new();
        let js = RoomName::new("js");
        let alice = ConnectionId::new();
        let carol = ConnectionId::new();
        let bob = ConnectionId::new();

        registry.join(alice, "Alice", js.clone()).unwrap();
        registry.join(carol, "Carol", RoomName::new("python")).unwrap();
        registry.join(bob, "Bob", js.clone()).unwrap();

        assert_eq!(usernames(&registry.list_by_room(&js)), ["Alice", "Bob"]);
        // stable between mutations
        assert_eq!(registry.list_by_room(&js), registry.list_by_room(&js));

        registry.leave(alice);
        assert_eq!(usernames(&registry.list_by_room(&js)), ["Bob"]);

        // rejoining goes to the back
        registry.join(alice, "Alice", js.clone()).unwrap();
        assert_eq!(usernames(&registry.list_by_room(&js)), ["Bob", "Alice"]);
    }

    #[test]
    fn test_empty_room_lookup() {
        let registry = UserRegistry::new();
        assert!(registry.list_by_room(&RoomName::new("nobody")).is_empty());
    }

    #[test]
    fn test_room_disappears_with_last_member() {
        let mut registry = UserRegistry::new();
        let alice = ConnectionId::new();
        let bob = ConnectionId::new();
        registry.join(alice, "Alice", RoomName::new("js")).unwrap();
        registry.join(bob, "Bob", RoomName::new("go")).unwrap();
        assert_eq!(registry.room_count(), 2);

        registry.leave(bob);
        assert_eq!(registry.room_count(), 1);
        assert!(registry.list_by_room(&RoomName::new("go")).is_empty());
    }

    #[test]
    fn test_usernames_need_not_be_unique() {
        let mut registry = UserRegistry::new();
        let first = ConnectionId::new();
        let second = ConnectionId::new();
        registry.join(first, "Alice", RoomName::new("js")).unwrap();
        registry.join(second, "Alice", RoomName::new("js")).unwrap();

        let members = registry.list_by_room(&RoomName::new("js"));
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, first);
        assert_eq!(members[1].id, second);
        assert_eq!(registry.all_ids(), vec![first, second]);
    }

    #[test]
    fn test_membership_matches_join_leave_sequence() {
        let mut registry = UserRegistry::new();
        let room = RoomName::new("js");
        let ids: Vec<ConnectionId> = (0..6).map(|_| ConnectionId::new()).collect();
        let mut expected: Vec<ConnectionId> = Vec::new();

        for (step, id) in ids.iter().enumerate() {
            registry.join(*id, format!("user{}", step), room.clone()).unwrap();
            expected.push(*id);
            if step % 2 == 1 {
                let gone = expected.remove(0);
                registry.leave(gone);
            }
            let actual: Vec<ConnectionId> =
                registry.list_by_room(&room).iter().map(|u| u.id).collect();
            assert_eq!(actual, expected);
        }
    }
}
