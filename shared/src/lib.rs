//! Shared types for the kitchen display service
//!
//! Domain types used across the server and connected clients: the
//! order/ticket model, the kitchen event union, room naming for the
//! broadcast layer, and the urgency evaluator.

pub mod escalation;
pub mod event;
pub mod models;
pub mod rooms;
pub mod util;

// Re-exports
pub use escalation::{EscalationThresholds, UrgencyTier, urgency};
pub use event::KitchenEvent;
pub use models::inventory::{
    InventoryItem, InventoryTransaction, RecipeEntry, StockShortfall, TransactionKind,
};
pub use models::order::{Order, OrderStatus, PrepStatus, TicketItem};
pub use models::station::{Station, StationCategory};
pub use rooms::Room;
pub use serde::{Deserialize, Serialize};
