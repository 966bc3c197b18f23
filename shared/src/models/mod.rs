//! Domain model types shared between server and clients

pub mod inventory;
pub mod order;
pub mod station;

pub use inventory::{InventoryItem, InventoryTransaction, RecipeEntry, StockShortfall, TransactionKind};
pub use order::{Order, OrderStatus, PrepStatus, TicketItem};
pub use station::{Station, StationCategory};
