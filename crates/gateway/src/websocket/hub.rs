//! Room-based broadcast hub for live chat connections.
//!
//! Rooms are ephemeral: one exists only while at least one connection is
//! joined. The hub is a pure fan-out mechanism and does not re-validate
//! membership; the session adapter authorizes before calling `join_room`.
//! Persistence happens before any broadcast, so a zero-member broadcast is a
//! harmless no-op.

use crate::websocket::events::ServerEvent;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier for a live connection.
pub type ConnectionId = Uuid;

struct ConnectionHandle {
    user_id: String,
    sender: mpsc::Sender<ServerEvent>,
}

#[derive(Default)]
struct HubInner {
    connections: HashMap<ConnectionId, ConnectionHandle>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
    /// Rooms per connection, for teardown
    joined: HashMap<ConnectionId, HashSet<String>>,
}

/// Realtime hub holding the room membership tables.
///
/// All mutation happens under one `RwLock`; `broadcast` also takes the write
/// lock so broadcasts for the same room reach every member in call order.
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<RwLock<HubInner>>,
    queue_capacity: usize,
}

impl RealtimeHub {
    /// Create a hub whose connections each get a bounded outbound queue of
    /// `queue_capacity` events.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HubInner::default())),
            queue_capacity,
        }
    }

    /// Register a live connection and hand back its outbound event stream.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: String,
    ) -> mpsc::Receiver<ServerEvent> {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);

        let mut inner = self.inner.write().await;
        inner
            .connections
            .insert(connection_id, ConnectionHandle { user_id, sender });
        inner.joined.insert(connection_id, HashSet::new());

        receiver
    }

    /// Remove a connection from the registry and from every room it joined.
    ///
    /// Dropping the stored sender closes the connection's outbound stream;
    /// remaining room members are unaffected.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        remove_connection(&mut inner, connection_id);
    }

    /// Add a connection to a conversation's room. Unknown connections are
    /// logged and ignored.
    pub async fn join_room(&self, connection_id: ConnectionId, conversation_id: &str) {
        let mut inner = self.inner.write().await;

        if !inner.connections.contains_key(&connection_id) {
            warn!(%connection_id, conversation_id, "join for unregistered connection ignored");
            return;
        }

        inner
            .rooms
            .entry(conversation_id.to_string())
            .or_default()
            .insert(connection_id);
        if let Some(joined) = inner.joined.get_mut(&connection_id) {
            joined.insert(conversation_id.to_string());
        }

        debug!(%connection_id, conversation_id, "connection joined room");
    }

    /// Remove a connection from a room; no-op if it was not joined.
    pub async fn leave_room(&self, connection_id: ConnectionId, conversation_id: &str) {
        let mut inner = self.inner.write().await;

        if let Some(members) = inner.rooms.get_mut(conversation_id) {
            members.remove(&connection_id);
            if members.is_empty() {
                inner.rooms.remove(conversation_id);
            }
        }
        if let Some(joined) = inner.joined.get_mut(&connection_id) {
            joined.remove(conversation_id);
        }
    }

    /// Queue an event for a single connection. Overflow disconnects the
    /// receiver, consistent with the broadcast path.
    pub async fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) {
        let mut inner = self.inner.write().await;

        let full = match inner.connections.get(&connection_id) {
            Some(handle) => match handle.sender.try_send(event) {
                Ok(()) => false,
                Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            },
            None => false,
        };

        if full {
            warn!(%connection_id, "outbound queue full, disconnecting slow client");
            remove_connection(&mut inner, connection_id);
        }
    }

    /// Deliver an event to every connection joined to the conversation's
    /// room, except `exclude` (the sender keeps its optimistic local copy and
    /// must not receive an echo).
    ///
    /// Delivery is best-effort: a room with no current members is a no-op,
    /// and a connection whose queue overflows is disconnected rather than
    /// allowed to hold up or bloat the hub. There is no redelivery; clients
    /// recover missed broadcasts by re-fetching history.
    pub async fn broadcast(
        &self,
        conversation_id: &str,
        event: &ServerEvent,
        exclude: Option<ConnectionId>,
    ) {
        let mut inner = self.inner.write().await;

        let Some(members) = inner.rooms.get(conversation_id) else {
            debug!(conversation_id, "broadcast to empty room");
            return;
        };

        let mut overflowed = Vec::new();
        for connection_id in members {
            if Some(*connection_id) == exclude {
                continue;
            }

            let Some(handle) = inner.connections.get(connection_id) else {
                continue;
            };

            match handle.sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        connection_id = %connection_id,
                        user_id = %handle.user_id,
                        conversation_id,
                        "outbound queue full, disconnecting slow client"
                    );
                    overflowed.push(*connection_id);
                }
                // Receiver already gone; teardown will clean the tables up.
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }

        for connection_id in overflowed {
            remove_connection(&mut inner, connection_id);
        }
    }

    /// Number of connections currently joined to a room.
    pub async fn room_size(&self, conversation_id: &str) -> usize {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(conversation_id)
            .map(|members| members.len())
            .unwrap_or(0)
    }
}

fn remove_connection(inner: &mut HubInner, connection_id: ConnectionId) {
    inner.connections.remove(&connection_id);

    if let Some(joined) = inner.joined.remove(&connection_id) {
        for conversation_id in joined {
            if let Some(members) = inner.rooms.get_mut(&conversation_id) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.rooms.remove(&conversation_id);
                }
            }
        }
    }
}
