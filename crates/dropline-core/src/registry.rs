//! Connection registry, waiting queue and live sessions.
//!
//! The registry is one unit of mutual exclusion: the
//! [`Coordinator`](crate::coordinator::Coordinator) keeps it behind a
//! single lock and every read-then-act sequence (pairing, the timeout's
//! "still unmatched" check, unregister) runs while holding that lock.
//!
//! Entries are keyed by username but guarded by [`ConnectionId`], so an
//! event addressed to an old connection never touches a newer one that
//! reused the name.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use dropline_types::{ConnectionId, GameId, ServerMessage, Username};
use tracing::{debug, warn};

use crate::error::{CoordinatorError, DeliveryError};
use crate::outbound::Outbound;
use crate::session::{Session, SessionState};

/// Default bound on the waiting queue.
pub const DEFAULT_WAITING_CAPACITY: usize = 100;

/// A registered connection.
#[derive(Debug)]
pub(crate) struct ClientEntry {
    pub(crate) connection: ConnectionId,
    pub(crate) outbound: Outbound,
    pub(crate) game: Option<GameId>,
}

/// A registered, not-yet-paired connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WaitingEntry {
    pub(crate) name: Username,
    pub(crate) connection: ConnectionId,
}

/// Live connections, the waiting queue and active sessions.
#[derive(Debug)]
pub struct Registry {
    clients: HashMap<Username, ClientEntry>,
    waiting: VecDeque<WaitingEntry>,
    waiting_capacity: usize,
    games: HashMap<GameId, Arc<Session>>,
}

impl Registry {
    /// Create an empty registry whose waiting queue holds at most
    /// `waiting_capacity` entries.
    pub fn new(waiting_capacity: usize) -> Self {
        Self {
            clients: HashMap::new(),
            waiting: VecDeque::new(),
            waiting_capacity,
            games: HashMap::new(),
        }
    }

    /// Number of registered connections.
    pub fn connected(&self) -> usize {
        self.clients.len()
    }

    /// Number of waiting queue entries, stale ones included.
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Number of sessions not yet retired.
    pub fn active_games(&self) -> usize {
        self.games.len()
    }

    pub(crate) fn insert_client(
        &mut self,
        name: Username,
        connection: ConnectionId,
        outbound: Outbound,
    ) -> Result<(), CoordinatorError> {
        if self.clients.contains_key(&name) {
            return Err(CoordinatorError::IdentityInUse(name));
        }
        self.clients.insert(
            name,
            ClientEntry {
                connection,
                outbound,
                game: None,
            },
        );
        Ok(())
    }

    /// Remove the entry for `name` if it still belongs to `connection`.
    ///
    /// Dropping the returned entry closes the connection's outbound queue.
    pub(crate) fn remove_client(
        &mut self,
        name: &Username,
        connection: ConnectionId,
    ) -> Option<ClientEntry> {
        if self.client(name, connection).is_none() {
            return None;
        }
        self.clients.remove(name)
    }

    fn client(&self, name: &Username, connection: ConnectionId) -> Option<&ClientEntry> {
        self.clients
            .get(name)
            .filter(|entry| entry.connection == connection)
    }

    /// `connection` is the live connection for `name`.
    pub(crate) fn is_registered(&self, name: &Username, connection: ConnectionId) -> bool {
        self.client(name, connection).is_some()
    }

    /// Still registered under this connection and not bound to a game.
    pub(crate) fn is_unmatched(&self, name: &Username, connection: ConnectionId) -> bool {
        self.client(name, connection)
            .is_some_and(|entry| entry.game.is_none())
    }

    /// The game a live connection is bound to.
    pub(crate) fn game_of(
        &self,
        name: &Username,
        connection: ConnectionId,
    ) -> Result<GameId, CoordinatorError> {
        let entry = self
            .client(name, connection)
            .ok_or_else(|| CoordinatorError::NotRegistered(name.clone()))?;
        entry
            .game
            .ok_or_else(|| CoordinatorError::NotInGame(name.clone()))
    }

    /// Pop the oldest waiting entry that can still be paired.
    ///
    /// Entries whose connection went away or that were already paired
    /// (by the AI timeout) are discarded on the way.
    pub(crate) fn pop_waiting_peer(&mut self) -> Option<WaitingEntry> {
        while let Some(entry) = self.waiting.pop_front() {
            if self.is_unmatched(&entry.name, entry.connection) {
                return Some(entry);
            }
            debug!(player = %entry.name, "discarding stale waiting entry");
        }
        None
    }

    pub(crate) fn enqueue(
        &mut self,
        name: Username,
        connection: ConnectionId,
    ) -> Result<(), CoordinatorError> {
        if self.waiting.len() >= self.waiting_capacity {
            self.prune_waiting();
        }
        if self.waiting.len() >= self.waiting_capacity {
            return Err(CoordinatorError::WaitingQueueFull);
        }
        self.waiting.push_back(WaitingEntry { name, connection });
        Ok(())
    }

    pub(crate) fn remove_waiting(&mut self, name: &Username, connection: ConnectionId) {
        self.waiting
            .retain(|entry| !(entry.name == *name && entry.connection == connection));
    }

    fn prune_waiting(&mut self) {
        let clients = &self.clients;
        self.waiting.retain(|entry| {
            clients
                .get(&entry.name)
                .is_some_and(|c| c.connection == entry.connection && c.game.is_none())
        });
    }

    /// Make a session reachable and bind its registered participants to it.
    pub(crate) fn insert_game(&mut self, session: Arc<Session>, participants: &[&Username]) {
        let id = session.id();
        for name in participants {
            if let Some(entry) = self.clients.get_mut(*name) {
                entry.game = Some(id);
            }
        }
        self.games.insert(id, session);
    }

    /// Look up a live session.
    pub(crate) fn session(&self, id: GameId) -> Option<Arc<Session>> {
        self.games.get(&id).cloned()
    }

    /// Drop a finished session and unbind its participants.
    pub(crate) fn retire(&mut self, state: &SessionState) {
        let id = state.id();
        self.games.remove(&id);
        for (_, name) in state.participants() {
            if let Some(entry) = self.clients.get_mut(name) {
                if entry.game == Some(id) {
                    entry.game = None;
                }
            }
        }
    }

    /// Queue a message for a registered name.
    pub(crate) fn deliver(
        &self,
        name: &Username,
        message: ServerMessage,
    ) -> Result<(), CoordinatorError> {
        let entry = self
            .clients
            .get(name)
            .ok_or_else(|| CoordinatorError::PeerUnreachable(name.clone()))?;
        Ok(entry.outbound.deliver(message)?)
    }

    /// Queue a message for both participants of a session.
    ///
    /// Only connections currently bound to this session receive it, so a
    /// participant that left (or the AI, which is never registered) is
    /// skipped, and a newer connection reusing a departed name never sees
    /// traffic from the old game.
    pub(crate) fn broadcast_to_session(&self, state: &SessionState, message: &ServerMessage) {
        let id = state.id();
        for (_, name) in state.participants() {
            let Some(entry) = self.clients.get(name).filter(|e| e.game == Some(id)) else {
                debug!(game_id = %id, player = %name, kind = message.kind(), "participant not bound, skipping");
                continue;
            };
            match entry.outbound.deliver(message.clone()) {
                Ok(()) => {}
                Err(DeliveryError::QueueFull) => {
                    warn!(game_id = %id, player = %name, kind = message.kind(), "outbound queue full, message dropped");
                }
                Err(DeliveryError::Closed) => {
                    debug!(game_id = %id, player = %name, kind = message.kind(), "outbound queue closed");
                }
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_WAITING_CAPACITY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dropline_board::BoardDims;

    use super::*;
    use crate::outbound::outbound_channel;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn register(registry: &mut Registry, who: &str) -> ConnectionId {
        let connection = ConnectionId::new();
        let (outbound, _rx) = outbound_channel(8);
        registry.insert_client(name(who), connection, outbound).unwrap();
        connection
    }

    #[test]
    fn duplicate_names_are_refused() {
        let mut registry = Registry::default();
        register(&mut registry, "alice");
        let (outbound, _rx) = outbound_channel(1);
        let result = registry.insert_client(name("alice"), ConnectionId::new(), outbound);
        assert_eq!(result, Err(CoordinatorError::IdentityInUse(name("alice"))));
    }

    #[test]
    fn removal_requires_matching_connection() {
        let mut registry = Registry::default();
        let connection = register(&mut registry, "alice");
        assert!(registry.remove_client(&name("alice"), ConnectionId::new()).is_none());
        assert_eq!(registry.connected(), 1);
        assert!(registry.remove_client(&name("alice"), connection).is_some());
        assert_eq!(registry.connected(), 0);
    }

    #[test]
    fn pop_skips_disconnected_and_matched_entries() {
        let mut registry = Registry::default();
        let gone = register(&mut registry, "gone");
        let paired = register(&mut registry, "paired");
        let live = register(&mut registry, "live");
        for (who, connection) in [("gone", gone), ("paired", paired), ("live", live)] {
            registry.enqueue(name(who), connection).unwrap();
        }
        registry.remove_client(&name("gone"), gone);
        let state = SessionState::new(GameId::new(), BoardDims::STANDARD, name("paired"));
        registry.insert_game(Arc::new(Session::new(state)), &[&name("paired")]);

        let peer = registry.pop_waiting_peer().unwrap();
        assert_eq!(peer.name, name("live"));
        assert!(registry.pop_waiting_peer().is_none());
    }

    #[test]
    fn full_queue_is_pruned_before_refusing() {
        let mut registry = Registry::new(1);
        let gone = register(&mut registry, "gone");
        registry.enqueue(name("gone"), gone).unwrap();
        registry.remove_client(&name("gone"), gone);

        let next = register(&mut registry, "next");
        registry.enqueue(name("next"), next).unwrap();
        assert_eq!(registry.waiting(), 1);

        let third = register(&mut registry, "third");
        assert_eq!(
            registry.enqueue(name("third"), third),
            Err(CoordinatorError::WaitingQueueFull)
        );
    }

    #[test]
    fn retire_unbinds_participants() {
        let mut registry = Registry::default();
        let a = register(&mut registry, "alice");
        let b = register(&mut registry, "bob");
        let mut state = SessionState::new(GameId::new(), BoardDims::STANDARD, name("alice"));
        state.join(name("bob"));
        let id = state.id();
        registry.insert_game(Arc::new(Session::new(state.clone())), &[&name("alice"), &name("bob")]);
        assert_eq!(registry.game_of(&name("alice"), a), Ok(id));
        assert_eq!(registry.active_games(), 1);

        registry.retire(&state);
        assert_eq!(registry.active_games(), 0);
        assert_eq!(
            registry.game_of(&name("bob"), b),
            Err(CoordinatorError::NotInGame(name("bob")))
        );
        assert!(registry.is_unmatched(&name("alice"), a));
    }

    #[test]
    fn broadcast_skips_connections_bound_elsewhere() {
        let mut registry = Registry::default();
        let (out_a, mut rx_a) = outbound_channel(4);
        let (out_b, mut rx_b) = outbound_channel(4);
        registry.insert_client(name("alice"), ConnectionId::new(), out_a).unwrap();
        registry.insert_client(name("bob"), ConnectionId::new(), out_b).unwrap();

        let mut state = SessionState::new(GameId::new(), BoardDims::STANDARD, name("alice"));
        state.join(name("bob"));
        registry.insert_game(Arc::new(Session::new(state.clone())), &[&name("alice")]);

        let notice = ServerMessage::Rejected {
            reason: String::from("x"),
        };
        registry.broadcast_to_session(&state, &notice);
        assert_eq!(rx_a.try_recv().ok(), Some(notice));
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn delivery_to_unknown_name_is_unreachable() {
        let registry = Registry::default();
        let result = registry.deliver(
            &name("ghost"),
            ServerMessage::Rejected {
                reason: String::from("x"),
            },
        );
        assert_eq!(result, Err(CoordinatorError::PeerUnreachable(name("ghost"))));
    }
}
