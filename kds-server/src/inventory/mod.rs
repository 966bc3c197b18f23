//! Inventory ledger
//!
//! Stock levels are mutated exclusively through transactions, and every
//! check-then-deduct for an order is serialized per ingredient row so two
//! concurrent orders can never both observe sufficient stock and drive the
//! ledger negative.

pub mod ledger;

pub use ledger::{InventoryLedger, LedgerError};
