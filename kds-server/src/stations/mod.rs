//! Station routing
//!
//! Maps confirmed tickets onto physical work stations and keeps the
//! per-station active queues. Display ordering is computed at read time
//! from ticket age; urgency is never stored.

pub mod router;

pub use router::{QueuedTicket, RouterError, StationRouter};
