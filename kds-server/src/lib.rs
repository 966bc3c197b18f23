//! Kitchen Display Server - order lifecycle and ticket synchronization
//!
//! # Architecture
//!
//! ```text
//! kds-server/src/
//! ├── core/          # config, state, server loop
//! ├── catalog/       # static menu-item -> station mapping and recipes
//! ├── orders/        # order/ticket state machine (lifecycle manager)
//! ├── stations/      # per-station active ticket queues
//! ├── inventory/     # stock ledger with per-ingredient serialization
//! ├── broadcast/     # room-scoped event fan-out to viewer sessions
//! ├── api/           # HTTP routes and WebSocket stream
//! └── utils/         # logging, errors, time
//! ```
//!
//! # Control Flow
//!
//! ```text
//! Client request
//!     └─ OrderLifecycleManager
//!           ├─ validate transition (CAS against expected state)
//!           ├─ InventoryLedger (atomic check-and-deduct)
//!           ├─ StationRouter (place/move/remove tickets)
//!           └─ EventBus (publish to interested rooms, fire-and-forget)
//! ```

pub mod api;
pub mod broadcast;
pub mod catalog;
pub mod core;
pub mod inventory;
pub mod orders;
pub mod stations;
pub mod utils;

// Re-export public types
pub use crate::broadcast::{EventBus, SessionId};
pub use crate::catalog::Catalog;
pub use crate::core::{AppState, Config};
pub use crate::inventory::InventoryLedger;
pub use crate::orders::{LifecycleError, OrderLifecycleManager, OrderStore};
pub use crate::stations::StationRouter;
pub use crate::utils::{AppError, AppResponse, AppResult};
