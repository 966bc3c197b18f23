//! Ticket urgency evaluation
//!
//! Urgency is never stored. It is recomputed from the ticket's age on every
//! query or render so the displayed tier is always consistent with "now".
//! There is no background sweep: a viewer that does not refresh will not
//! learn a ticket escalated until its next fetch.

use serde::{Deserialize, Serialize};

/// Time-derived classification of how long a ticket has been outstanding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    Normal,
    Elevated,
    Urgent,
}

/// Age boundaries, in minutes. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EscalationThresholds {
    pub elevated_after_minutes: u32,
    pub urgent_after_minutes: u32,
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            elevated_after_minutes: 15,
            urgent_after_minutes: 20,
        }
    }
}

impl EscalationThresholds {
    pub fn new(elevated_after_minutes: u32, urgent_after_minutes: u32) -> Self {
        Self {
            elevated_after_minutes,
            urgent_after_minutes,
        }
    }
}

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Compute the urgency tier for a ticket created at `created_at`.
///
/// Both timestamps are unix milliseconds. A ticket exactly at a boundary is
/// already in the higher tier.
pub fn urgency(created_at: i64, now: i64, thresholds: &EscalationThresholds) -> UrgencyTier {
    let age = now.saturating_sub(created_at);
    if age >= i64::from(thresholds.urgent_after_minutes) * MILLIS_PER_MINUTE {
        UrgencyTier::Urgent
    } else if age >= i64::from(thresholds.elevated_after_minutes) * MILLIS_PER_MINUTE {
        UrgencyTier::Elevated
    } else {
        UrgencyTier::Normal
    }
}
