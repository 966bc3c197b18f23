//! Room-scoped event broadcast
//!
//! Viewer sessions (kitchen displays, service staff, managers, customer
//! order tracking) register with the bus and join rooms. Mutations publish
//! typed events to rooms; delivery is best-effort, at-most-once per
//! session, and never feeds back into the business operation that
//! triggered it.

pub mod bus;
pub mod session;

pub use bus::{EventBus, PublishOutcome};
pub use session::{SessionId, SessionInfo};
