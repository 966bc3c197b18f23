//! Station router core
//!
//! Each station owns an ordered list of its active (non-ready) tickets.
//! Sorting happens on read: urgency tier descending, then creation time
//! ascending, so the same ticket's displayed urgency always agrees with
//! "now". Completed/bumped/cancelled orders are removed wholesale.

use dashmap::DashMap;

use shared::escalation::{EscalationThresholds, UrgencyTier, urgency};

/// A routed ticket as known to the queues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTicket {
    pub ticket_id: String,
    pub order_id: String,
    pub created_at: i64,
}

/// Router errors
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Ticket {0} is not routed to any station")]
    NotRouted(String),
}

/// Per-station active ticket queues
#[derive(Debug, Default)]
pub struct StationRouter {
    queues: DashMap<i64, Vec<QueuedTicket>>,
    /// ticket id -> station id
    assignments: DashMap<String, i64>,
}

impl StationRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a newly confirmed ticket into its station's queue
    pub fn route(&self, station_id: i64, ticket: QueuedTicket) {
        self.assignments
            .insert(ticket.ticket_id.clone(), station_id);
        self.queues.entry(station_id).or_default().push(ticket);
    }

    /// Station a ticket is currently assigned to
    pub fn station_of(&self, ticket_id: &str) -> Option<i64> {
        self.assignments.get(ticket_id).map(|s| *s)
    }

    /// Move a ticket between station queues; returns the old station id
    pub fn reassign(&self, ticket_id: &str, new_station: i64) -> Result<i64, RouterError> {
        let old_station = self
            .station_of(ticket_id)
            .ok_or_else(|| RouterError::NotRouted(ticket_id.to_string()))?;
        if old_station == new_station {
            return Ok(old_station);
        }

        let mut moved: Option<QueuedTicket> = None;
        if let Some(mut queue) = self.queues.get_mut(&old_station)
            && let Some(pos) = queue.iter().position(|t| t.ticket_id == ticket_id)
        {
            moved = Some(queue.remove(pos));
        }
        let ticket = moved.ok_or_else(|| RouterError::NotRouted(ticket_id.to_string()))?;

        self.queues.entry(new_station).or_default().push(ticket);
        self.assignments.insert(ticket_id.to_string(), new_station);
        tracing::debug!(ticket_id, old_station, new_station, "Ticket reassigned");
        Ok(old_station)
    }

    /// Drop one ticket from its queue (it went ready)
    pub fn remove_ticket(&self, ticket_id: &str) {
        if let Some((_, station_id)) = self.assignments.remove(ticket_id)
            && let Some(mut queue) = self.queues.get_mut(&station_id)
        {
            queue.retain(|t| t.ticket_id != ticket_id);
        }
    }

    /// Drop every ticket of an order from every queue (bump/cancel)
    pub fn remove_order(&self, order_id: &str) {
        let mut removed: Vec<String> = Vec::new();
        for mut queue in self.queues.iter_mut() {
            queue.retain(|t| {
                if t.order_id == order_id {
                    removed.push(t.ticket_id.clone());
                    false
                } else {
                    true
                }
            });
        }
        for ticket_id in removed {
            self.assignments.remove(&ticket_id);
        }
    }

    /// The station's queue ordered for display: urgency tier descending,
    /// creation time ascending within a tier.
    pub fn view(
        &self,
        station_id: i64,
        now: i64,
        thresholds: &EscalationThresholds,
    ) -> Vec<(QueuedTicket, UrgencyTier)> {
        let Some(queue) = self.queues.get(&station_id) else {
            return Vec::new();
        };
        let mut entries: Vec<(QueuedTicket, UrgencyTier)> = queue
            .iter()
            .map(|t| {
                let tier = urgency(t.created_at, now, thresholds);
                (t.clone(), tier)
            })
            .collect();
        entries.sort_by(|(a, tier_a), (b, tier_b)| {
            tier_b
                .cmp(tier_a)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        entries
    }

    /// Number of active tickets at a station
    pub fn queue_len(&self, station_id: i64) -> usize {
        self.queues.get(&station_id).map(|q| q.len()).unwrap_or(0)
    }
}
