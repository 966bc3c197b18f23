//! Order lifecycle
//!
//! The lifecycle manager owns the order/ticket state machine. It validates
//! every transition against the caller's expected prior state
//! (compare-and-swap), invokes the inventory ledger at confirmation,
//! places/moves tickets through the station router, and publishes events
//! to the broadcast bus after each committed mutation.

pub mod manager;
pub mod store;

pub use manager::{LifecycleError, LineItemInput, OrderLifecycleManager, StationQueueEntry};
pub use store::{OrderStore, StoreError, TicketTransition};
