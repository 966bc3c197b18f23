//! Viewer session bookkeeping

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use shared::KitchenEvent;

/// Session identifier, unique per process lifetime
pub type SessionId = u64;

/// One connected viewer
///
/// The role label comes from the authentication collaborator; the bus does
/// not interpret it beyond logging. Joined rooms are tracked here so a
/// disconnect can leave everything the session entered.
#[derive(Debug)]
pub struct SessionInfo {
    pub id: SessionId,
    pub role: String,
    pub connected_at: i64,
    pub(crate) sender: mpsc::UnboundedSender<Arc<KitchenEvent>>,
    pub(crate) rooms: Mutex<HashSet<String>>,
}

impl SessionInfo {
    pub(crate) fn new(
        id: SessionId,
        role: impl Into<String>,
        sender: mpsc::UnboundedSender<Arc<KitchenEvent>>,
    ) -> Self {
        Self {
            id,
            role: role.into(),
            connected_at: crate::utils::now_millis(),
            sender,
            rooms: Mutex::new(HashSet::new()),
        }
    }

    /// Rooms this session currently belongs to
    pub fn joined_rooms(&self) -> Vec<String> {
        self.rooms.lock().iter().cloned().collect()
    }
}
