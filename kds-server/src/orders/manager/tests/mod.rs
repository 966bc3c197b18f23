//! Lifecycle manager tests
//!
//! Fixture wires a demo catalog, a stocked ledger, router, bus and store
//! the same way `AppState` does at startup.

mod test_concurrency;

use std::sync::Arc;

use rust_decimal::Decimal;

use shared::escalation::EscalationThresholds;
use shared::models::inventory::InventoryItem;

use crate::broadcast::EventBus;
use crate::catalog::Catalog;
use crate::inventory::InventoryLedger;
use crate::orders::manager::{LineItemInput, OrderLifecycleManager};
use crate::orders::store::OrderStore;
use crate::stations::StationRouter;

pub(super) struct Fixture {
    pub manager: OrderLifecycleManager,
    pub bus: Arc<EventBus>,
    pub ledger: Arc<InventoryLedger>,
    pub store: Arc<OrderStore>,
    pub router: Arc<StationRouter>,
}

/// Demo catalog plus a stocked ledger:
/// beef 10kg, butter 5kg, potatoes 20kg, romaine 10kg, lemon juice 8l
pub(super) fn fixture() -> Fixture {
    fixture_with_stock(&[
        (1, "Beef", "kg", Decimal::from(10), Decimal::from(1)),
        (2, "Butter", "kg", Decimal::from(5), Decimal::new(1, 1)),
        (3, "Potatoes", "kg", Decimal::from(20), Decimal::from(2)),
        (4, "Romaine", "kg", Decimal::from(10), Decimal::from(1)),
        (5, "Lemon Juice", "l", Decimal::from(8), Decimal::from(1)),
    ])
}

pub(super) fn fixture_with_stock(
    stock: &[(i64, &str, &str, Decimal, Decimal)],
) -> Fixture {
    let catalog = Arc::new(Catalog::demo());
    let bus = Arc::new(EventBus::new());
    let ledger = Arc::new(InventoryLedger::new(Arc::clone(&bus)));
    for (id, name, unit, quantity, min_quantity) in stock {
        ledger.register_item(InventoryItem {
            id: *id,
            name: (*name).to_string(),
            unit: (*unit).to_string(),
            quantity: *quantity,
            min_quantity: *min_quantity,
        });
    }
    let store = Arc::new(OrderStore::new());
    let router = Arc::new(StationRouter::new());
    let manager = OrderLifecycleManager::new(
        catalog,
        Arc::clone(&store),
        Arc::clone(&router),
        Arc::clone(&ledger),
        Arc::clone(&bus),
        EscalationThresholds::default(),
    );
    Fixture {
        manager,
        bus,
        ledger,
        store,
        router,
    }
}

pub(super) fn line(menu_item_id: i64, quantity: i32) -> LineItemInput {
    LineItemInput {
        menu_item_id,
        quantity,
        special_instructions: None,
    }
}
