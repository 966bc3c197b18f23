//! Event bus core
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      EventBus                         │
//! │  rooms:    DashMap<room_key, DashMap<sid, sender>>    │
//! │  sessions: DashMap<sid, Arc<SessionInfo>>             │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ publish(event, rooms)
//!              ┌─────────────┼─────────────┐
//!              ▼             ▼             ▼
//!         chef_room     station:2      table:7
//!        (sessions)     (sessions)    (sessions)
//! ```
//!
//! Rooms are created lazily on first join and removed when the last member
//! leaves. Membership mutates freely while publishes iterate; a publish
//! observes some consistent interleaving, which is all the delivery
//! contract promises. The data-model commit always happens before the
//! publish call, so a delivery fault can never undo a committed mutation.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use shared::{KitchenEvent, Room};

use super::session::{SessionId, SessionInfo};

type MemberMap = DashMap<SessionId, mpsc::UnboundedSender<Arc<KitchenEvent>>>;

/// Delivery summary for one publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOutcome {
    /// Sessions the event was handed to
    pub delivered: usize,
    /// Sessions whose channel was already closed (cleaned up)
    pub dropped: usize,
}

/// Room-scoped publish/subscribe fan-out
///
/// Process-scoped: created once at startup, drained at shutdown. Membership
/// is not durable and is not a source of truth for order state - only a
/// delivery target.
#[derive(Debug)]
pub struct EventBus {
    rooms: DashMap<String, MemberMap>,
    sessions: DashMap<SessionId, Arc<SessionInfo>>,
    next_session_id: AtomicU64,
    shutdown_token: CancellationToken,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            sessions: DashMap::new(),
            next_session_id: AtomicU64::new(1),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Register a connecting viewer; returns its id and event receiver
    pub fn register_session(
        &self,
        role: impl Into<String>,
    ) -> (SessionId, mpsc::UnboundedReceiver<Arc<KitchenEvent>>) {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let info = Arc::new(SessionInfo::new(id, role, tx));
        tracing::debug!(session_id = id, role = %info.role, "Session registered");
        self.sessions.insert(id, info);
        (id, rx)
    }

    /// Add a session to a room (created lazily)
    ///
    /// Unknown sessions are ignored with a warning - the caller may have
    /// disconnected between operations.
    pub fn join(&self, session_id: SessionId, room: &Room) {
        let Some(session) = self.sessions.get(&session_id) else {
            tracing::warn!(session_id, room = %room, "Join from unknown session ignored");
            return;
        };
        let key = room.as_key();
        self.rooms
            .entry(key.clone())
            .or_default()
            .insert(session_id, session.sender.clone());
        session.rooms.lock().insert(key);
        tracing::debug!(session_id, room = %room, "Session joined room");
    }

    /// Remove a session from a room; an empty room is garbage collected
    pub fn leave(&self, session_id: SessionId, room: &Room) {
        let key = room.as_key();
        if let Some(members) = self.rooms.get(&key) {
            members.remove(&session_id);
        }
        self.rooms.remove_if(&key, |_, members| members.is_empty());
        if let Some(session) = self.sessions.get(&session_id) {
            session.rooms.lock().remove(&key);
        }
    }

    /// Remove a session from every room and forget it
    pub fn disconnect(&self, session_id: SessionId) {
        let Some((_, session)) = self.sessions.remove(&session_id) else {
            return;
        };
        let joined: Vec<String> = session.rooms.lock().drain().collect();
        for key in joined {
            if let Some(members) = self.rooms.get(&key) {
                members.remove(&session_id);
            }
            self.rooms.remove_if(&key, |_, members| members.is_empty());
        }
        tracing::debug!(session_id, role = %session.role, "Session disconnected");
    }

    /// Deliver an event to every session subscribed to any of the rooms
    ///
    /// At-most-once per session per call: a session joined to several of
    /// the target rooms receives a single copy. Within one room the
    /// delivery order matches call order. Closed receivers are dropped and
    /// cleaned up; failures never propagate to the caller.
    pub fn publish(&self, event: KitchenEvent, rooms: &[Room]) -> PublishOutcome {
        let event = Arc::new(event);
        let mut outcome = PublishOutcome::default();
        let mut seen: HashSet<SessionId> = HashSet::new();
        let mut stale: Vec<(String, SessionId)> = Vec::new();

        for room in rooms {
            let key = room.as_key();
            let Some(members) = self.rooms.get(&key) else {
                continue;
            };
            for entry in members.iter() {
                let session_id = *entry.key();
                if !seen.insert(session_id) {
                    continue;
                }
                if entry.value().send(Arc::clone(&event)).is_ok() {
                    outcome.delivered += 1;
                } else {
                    outcome.dropped += 1;
                    stale.push((key.clone(), session_id));
                }
            }
        }

        // Membership cleanup happens outside the iteration guards
        for (key, session_id) in stale {
            tracing::debug!(session_id, room = %key, "Dropping closed session from room");
            if let Some(members) = self.rooms.get(&key) {
                members.remove(&session_id);
            }
            self.rooms.remove_if(&key, |_, members| members.is_empty());
        }

        tracing::debug!(
            event = event.name(),
            rooms = rooms.len(),
            delivered = outcome.delivered,
            dropped = outcome.dropped,
            "Event published"
        );
        outcome
    }

    /// Members currently in a room (0 for a room that does not exist)
    pub fn member_count(&self, room: &Room) -> usize {
        self.rooms
            .get(&room.as_key())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Number of live rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of registered sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Token observed by connection handlers to stop on shutdown
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Graceful drain: close every session channel and clear all rooms
    pub fn shutdown(&self) {
        tracing::info!(
            sessions = self.sessions.len(),
            rooms = self.rooms.len(),
            "Shutting down event bus"
        );
        self.shutdown_token.cancel();
        self.rooms.clear();
        // Dropping the senders closes each session's receiver
        self.sessions.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::order::PrepStatus;

    fn status_event(station_id: i64) -> KitchenEvent {
        KitchenEvent::ItemStatusChanged {
            ticket_id: "t-1".into(),
            order_id: "o-1".into(),
            station_id,
            prep_status: PrepStatus::Preparing,
            timestamp: 0,
        }
    }

    #[test]
    fn test_room_isolation() {
        let bus = EventBus::new();
        let (grill_sid, mut grill_rx) = bus.register_session("chef");
        let (fry_sid, mut fry_rx) = bus.register_session("chef");
        bus.join(grill_sid, &Room::Station(1));
        bus.join(fry_sid, &Room::Station(2));

        bus.publish(status_event(2), &[Room::Station(2)]);

        assert!(fry_rx.try_recv().is_ok());
        assert!(grill_rx.try_recv().is_err());
    }

    #[test]
    fn test_at_most_once_across_target_rooms() {
        let bus = EventBus::new();
        let (sid, mut rx) = bus.register_session("manager");
        bus.join(sid, &Room::Chef);
        bus.join(sid, &Room::Manager);

        let outcome = bus.publish(status_event(1), &[Room::Chef, Room::Manager]);

        assert_eq!(outcome.delivered, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_per_room_delivery_order() {
        let bus = EventBus::new();
        let (sid, mut rx) = bus.register_session("chef");
        bus.join(sid, &Room::Chef);

        for n in 0..5 {
            bus.publish(
                KitchenEvent::OrderReady {
                    order_id: format!("o-{n}"),
                    table_number: n,
                },
                &[Room::Chef],
            );
        }

        for n in 0..5 {
            match rx.try_recv().unwrap().as_ref() {
                KitchenEvent::OrderReady { order_id, .. } => {
                    assert_eq!(order_id, &format!("o-{n}"));
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_publish_to_empty_room_is_not_an_error() {
        let bus = EventBus::new();
        let outcome = bus.publish(status_event(1), &[Room::Station(9)]);
        assert_eq!(outcome.delivered, 0);
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_empty_room_garbage_collected() {
        let bus = EventBus::new();
        let (sid, _rx) = bus.register_session("staff");
        bus.join(sid, &Room::Staff);
        assert_eq!(bus.room_count(), 1);

        bus.leave(sid, &Room::Staff);
        assert_eq!(bus.room_count(), 0);
        assert_eq!(bus.member_count(&Room::Staff), 0);
    }

    #[test]
    fn test_disconnect_leaves_all_rooms() {
        let bus = EventBus::new();
        let (sid, _rx) = bus.register_session("manager");
        bus.join(sid, &Room::Manager);
        bus.join(sid, &Room::Table(3));
        assert_eq!(bus.room_count(), 2);

        bus.disconnect(sid);
        assert_eq!(bus.room_count(), 0);
        assert_eq!(bus.session_count(), 0);
    }

    #[test]
    fn test_closed_receiver_cleaned_up() {
        let bus = EventBus::new();
        let (sid, rx) = bus.register_session("chef");
        bus.join(sid, &Room::Chef);
        drop(rx);

        let outcome = bus.publish(status_event(1), &[Room::Chef]);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(bus.member_count(&Room::Chef), 0);
    }

    #[test]
    fn test_concurrent_joins_during_publish() {
        let bus = Arc::new(EventBus::new());
        let publisher = {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    bus.publish(status_event(1), &[Room::Station(1)]);
                }
            })
        };
        let joiner = {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let (sid, _rx) = bus.register_session("chef");
                    bus.join(sid, &Room::Station(1));
                    bus.disconnect(sid);
                }
            })
        };
        publisher.join().unwrap();
        joiner.join().unwrap();
    }

    #[test]
    fn test_shutdown_closes_sessions() {
        let bus = EventBus::new();
        let (sid, mut rx) = bus.register_session("chef");
        bus.join(sid, &Room::Chef);

        bus.shutdown();

        assert!(bus.shutdown_token().is_cancelled());
        assert_eq!(bus.room_count(), 0);
        // Receiver observes the closed channel
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
