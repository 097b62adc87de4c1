//! Connection registry: maps authenticated user ids to their currently open
//! notification-hub connections.
//!
//! A user may hold zero, one, or many connections at once (several tabs).
//! Entries are ephemeral: inserted when a WebSocket opens, removed when it
//! closes. Pushes fan out to every current member of the user's group and
//! never cross groups.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::domain::repository::Notifier;
use crate::domain::types::HubEvent;

/// A push reached the registry but could not be delivered to at least one
/// of the user's connections.
#[derive(Debug, thiserror::Error)]
#[error("failed to deliver event to {failed} connection(s)")]
pub struct PushError {
    pub failed: usize,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    groups: RwLock<HashMap<Uuid, HashMap<u64, UnboundedSender<HubEvent>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to its user's group. Returns the connection id
    /// (needed for `leave`) and the event stream to forward to the socket.
    pub fn join(&self, user_id: Uuid) -> (u64, UnboundedReceiver<HubEvent>) {
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.groups
            .write()
            .expect("registry lock poisoned")
            .entry(user_id)
            .or_default()
            .insert(conn_id, tx);
        (conn_id, rx)
    }

    /// Remove a connection from its user's group; empty groups are dropped.
    pub fn leave(&self, user_id: Uuid, conn_id: u64) {
        let mut groups = self.groups.write().expect("registry lock poisoned");
        if let Some(members) = groups.get_mut(&user_id) {
            members.remove(&conn_id);
            if members.is_empty() {
                groups.remove(&user_id);
            }
        }
    }

    /// Number of open connections in a user's group.
    pub fn connection_count(&self, user_id: Uuid) -> usize {
        self.groups
            .read()
            .expect("registry lock poisoned")
            .get(&user_id)
            .map_or(0, HashMap::len)
    }
}

impl Notifier for ConnectionRegistry {
    fn notify(&self, user_id: Uuid, event: HubEvent) -> Result<(), PushError> {
        let mut dead = Vec::new();
        {
            let groups = self.groups.read().expect("registry lock poisoned");
            let Some(members) = groups.get(&user_id) else {
                // Zero connections is a no-op, not an error.
                return Ok(());
            };
            for (&conn_id, tx) in members {
                if tx.send(event.clone()).is_err() {
                    dead.push(conn_id);
                }
            }
        }

        if dead.is_empty() {
            return Ok(());
        }

        // Prune senders whose receiving task already went away.
        for conn_id in &dead {
            self.leave(user_id, *conn_id);
        }
        Err(PushError { failed: dead.len() })
    }
}
