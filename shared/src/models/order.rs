//! Order and ticket model
//!
//! Status transitions are forward-only. Both state machines are encoded in
//! `can_transition` so that every mutation site checks the same table.

use serde::{Deserialize, Serialize};

/// Order status - forward walk, cancellation only before preparation starts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether `next` is a legal direct transition from `self`
    pub fn can_transition(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Preparing)
                | (Preparing, Ready)
                | (Ready, Served)
                | (Ready, Completed)
                | (Served, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    /// Terminal states never leave
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Served => "SERVED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// Preparation status of a single ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrepStatus {
    Pending,
    Preparing,
    Ready,
}

impl PrepStatus {
    /// Tickets only move forward: Pending -> Preparing -> Ready
    pub fn can_transition(self, next: PrepStatus) -> bool {
        matches!(
            (self, next),
            (PrepStatus::Pending, PrepStatus::Preparing)
                | (PrepStatus::Preparing, PrepStatus::Ready)
        )
    }
}

impl std::fmt::Display for PrepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PrepStatus::Pending => "PENDING",
            PrepStatus::Preparing => "PREPARING",
            PrepStatus::Ready => "READY",
        };
        write!(f, "{}", s)
    }
}

/// One line item of an order as tracked through the kitchen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketItem {
    /// Ticket ID (assigned by server)
    pub ticket_id: String,
    /// Owning order
    pub order_id: String,
    /// Menu item reference
    pub menu_item_id: i64,
    /// Menu item name (snapshot for display)
    pub menu_item_name: String,
    /// Quantity ordered
    pub quantity: i32,
    /// Special instructions for this line only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    /// Assigned preparation station
    pub station_id: i64,
    /// Preparation status
    pub prep_status: PrepStatus,
    /// Set once on the Pending -> Preparing edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_started_at: Option<i64>,
    /// Set once on the Preparing -> Ready edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_completed_at: Option<i64>,
    /// Operator who started preparation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
    /// Creation timestamp (shared with the owning order)
    pub created_at: i64,
}

/// One table's request, from placement to completion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Table reference
    pub table_id: i64,
    /// Table number (snapshot for display)
    pub table_number: i32,
    /// Order status
    pub status: OrderStatus,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Ordered sequence of tickets
    pub items: Vec<TicketItem>,
    /// Creation timestamp
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Create a new pending order
    pub fn new(table_id: i64, table_number: i32, notes: Option<String>) -> Self {
        Self {
            order_id: crate::util::new_id(),
            table_id,
            table_number,
            status: OrderStatus::Pending,
            notes,
            items: Vec::new(),
            created_at: crate::util::now_millis(),
            confirmed_at: None,
            ready_at: None,
            served_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    /// Check if order reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// All tickets ready for pickup
    pub fn all_tickets_ready(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|t| t.prep_status == PrepStatus::Ready)
    }

    /// Find a ticket by id
    pub fn ticket(&self, ticket_id: &str) -> Option<&TicketItem> {
        self.items.iter().find(|t| t.ticket_id == ticket_id)
    }

    /// Find a ticket by id, mutably
    pub fn ticket_mut(&mut self, ticket_id: &str) -> Option<&mut TicketItem> {
        self.items.iter_mut().find(|t| t.ticket_id == ticket_id)
    }
}
