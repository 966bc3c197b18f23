//! Shared application state
//!
//! One `AppState` is built at startup and cloned into every handler. All
//! components are Arc-shared; the lifecycle manager holds the same
//! instances, so handler-side reads and manager-side mutations see one
//! world.

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;

use shared::models::inventory::InventoryItem;

use crate::broadcast::EventBus;
use crate::catalog::Catalog;
use crate::core::Config;
use crate::inventory::InventoryLedger;
use crate::orders::{OrderLifecycleManager, OrderStore};
use crate::stations::StationRouter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub store: Arc<OrderStore>,
    pub router: Arc<StationRouter>,
    pub ledger: Arc<InventoryLedger>,
    pub bus: Arc<EventBus>,
    pub manager: Arc<OrderLifecycleManager>,
}

impl AppState {
    /// Build the full component graph from configuration
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Arc::new(
                Catalog::from_file(path)
                    .with_context(|| format!("loading catalog from {path}"))?,
            ),
            None => {
                tracing::info!("No CATALOG_PATH set, using built-in demo catalog");
                Arc::new(Catalog::demo())
            }
        };

        let bus = Arc::new(EventBus::new());
        let ledger = Arc::new(InventoryLedger::new(Arc::clone(&bus)));
        if config.catalog_path.is_none() {
            seed_demo_stock(&ledger);
        }
        let store = Arc::new(OrderStore::new());
        let router = Arc::new(StationRouter::new());
        let manager = Arc::new(OrderLifecycleManager::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            Arc::clone(&router),
            Arc::clone(&ledger),
            Arc::clone(&bus),
            config.escalation,
        ));

        Ok(Self {
            config: Arc::new(config),
            catalog,
            store,
            router,
            ledger,
            bus,
            manager,
        })
    }
}

/// Opening stock levels matching the demo catalog's recipes
fn seed_demo_stock(ledger: &InventoryLedger) {
    let items = [
        (1, "Beef", "kg", Decimal::from(20), Decimal::from(2)),
        (2, "Butter", "kg", Decimal::from(3), Decimal::new(3, 1)),
        (3, "Potatoes", "kg", Decimal::from(40), Decimal::from(5)),
        (4, "Romaine", "kg", Decimal::from(12), Decimal::from(2)),
        (5, "Lemon Juice", "l", Decimal::from(15), Decimal::from(2)),
    ];
    for (id, name, unit, quantity, min_quantity) in items {
        ledger.register_item(InventoryItem {
            id,
            name: name.to_string(),
            unit: unit.to_string(),
            quantity,
            min_quantity,
        });
    }
}
