//! Kitchen events - facts broadcast to connected viewers
//!
//! A closed tagged union: every event type the engine can emit is a variant
//! here, dispatched with exhaustive matches. Delivery is best-effort and
//! at-most-once per connection; a viewer that missed events reconciles by
//! re-fetching current state.

use serde::{Deserialize, Serialize};

use crate::models::order::PrepStatus;
use rust_decimal::Decimal;

/// Summary of one ticket inside a NewOrder payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketSummary {
    pub ticket_id: String,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub station_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// Event payload union
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenEvent {
    /// Order confirmed and routed - kitchen can start working
    NewOrder {
        order_id: String,
        table_number: i32,
        items: Vec<TicketSummary>,
    },

    /// A ticket moved forward (Pending -> Preparing or Preparing -> Ready)
    ItemStatusChanged {
        ticket_id: String,
        order_id: String,
        station_id: i64,
        prep_status: PrepStatus,
        timestamp: i64,
    },

    /// Every ticket of the order is ready for pickup
    OrderReady {
        order_id: String,
        table_number: i32,
    },

    /// Order completed and cleared from active displays
    OrderBumped {
        order_id: String,
        table_number: i32,
        bumped_at: i64,
    },

    /// Order cancelled; `stock_reversed` is set when inventory was restored
    OrderCancelled {
        order_id: String,
        table_number: i32,
        stock_reversed: bool,
    },

    /// Ticket moved between stations
    ItemReassigned {
        ticket_id: String,
        old_station_id: i64,
        new_station_id: i64,
    },

    /// An ingredient dropped to or below its reorder threshold
    InventoryLow {
        item_name: String,
        current_quantity: Decimal,
        min_quantity: Decimal,
    },
}

impl KitchenEvent {
    /// Event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            KitchenEvent::NewOrder { .. } => "NEW_ORDER",
            KitchenEvent::ItemStatusChanged { .. } => "ITEM_STATUS_CHANGED",
            KitchenEvent::OrderReady { .. } => "ORDER_READY",
            KitchenEvent::OrderBumped { .. } => "ORDER_BUMPED",
            KitchenEvent::OrderCancelled { .. } => "ORDER_CANCELLED",
            KitchenEvent::ItemReassigned { .. } => "ITEM_REASSIGNED",
            KitchenEvent::InventoryLow { .. } => "INVENTORY_LOW",
        }
    }
}
