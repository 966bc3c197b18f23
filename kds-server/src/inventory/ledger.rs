//! Ledger core
//!
//! # Locking discipline
//!
//! Each ingredient row has its own mutex. A deduction touching several
//! ingredients locks them in ascending id order, verifies every sufficiency
//! while holding all the guards, and only then applies all the deductions
//! and appends the transactions. Sorted acquisition makes concurrent
//! multi-ingredient orders deadlock-free; holding the guards across
//! check-and-write preserves the ledger invariant:
//!
//!   opening quantity + sum(transaction deltas) == current quantity
//!
//! at every point in time, for every item.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use rust_decimal::Decimal;

use shared::models::inventory::{
    InventoryItem, InventoryTransaction, StockShortfall, TransactionKind,
};
use shared::{KitchenEvent, Room};

use crate::broadcast::EventBus;
use crate::utils::now_millis;

/// One ingredient row: current level plus the opening balance it was
/// registered with (the anchor for invariant verification)
#[derive(Debug)]
struct StockCell {
    item: InventoryItem,
    opening_quantity: Decimal,
}

/// Ledger errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Unknown inventory item: {0}")]
    UnknownItem(i64),

    #[error("Insufficient stock for {} ingredient(s)", .0.len())]
    Insufficient(Vec<StockShortfall>),

    #[error("No transactions recorded for order {0}")]
    NothingToReverse(String),
}

/// Inventory ledger with per-ingredient row serialization
pub struct InventoryLedger {
    cells: DashMap<i64, Arc<Mutex<StockCell>>>,
    transactions: RwLock<Vec<InventoryTransaction>>,
    next_txn_id: AtomicI64,
    bus: Arc<EventBus>,
}

impl InventoryLedger {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            cells: DashMap::new(),
            transactions: RwLock::new(Vec::new()),
            next_txn_id: AtomicI64::new(1),
            bus,
        }
    }

    /// Register an ingredient with its opening stock level
    pub fn register_item(&self, item: InventoryItem) {
        let opening = item.quantity;
        self.cells.insert(
            item.id,
            Arc::new(Mutex::new(StockCell {
                item,
                opening_quantity: opening,
            })),
        );
    }

    /// Current state of one item
    pub fn get_item(&self, id: i64) -> Option<InventoryItem> {
        self.cells.get(&id).map(|cell| cell.lock().item.clone())
    }

    /// Snapshot of all items
    pub fn items_snapshot(&self) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = self
            .cells
            .iter()
            .map(|cell| cell.lock().item.clone())
            .collect();
        items.sort_by_key(|i| i.id);
        items
    }

    /// Items at or below their reorder threshold
    pub fn low_stock(&self) -> Vec<InventoryItem> {
        self.items_snapshot()
            .into_iter()
            .filter(|i| i.is_low())
            .collect()
    }

    /// Full transaction stream (analytics consumer)
    pub fn transactions(&self) -> Vec<InventoryTransaction> {
        self.transactions.read().clone()
    }

    /// Transactions recorded against one order
    pub fn transactions_for_order(&self, order_id: &str) -> Vec<InventoryTransaction> {
        self.transactions
            .read()
            .iter()
            .filter(|t| t.order_id.as_deref() == Some(order_id))
            .cloned()
            .collect()
    }

    /// Atomically check and deduct the aggregated requirements of an order.
    ///
    /// `requirements` maps ingredient id to the total quantity the whole
    /// order consumes. Either every deduction applies and one Usage
    /// transaction per ingredient is recorded, or nothing changes and the
    /// full shortfall list is returned.
    pub fn deduct_for_order(
        &self,
        order_id: &str,
        requirements: &BTreeMap<i64, Decimal>,
    ) -> Result<Vec<InventoryTransaction>, LedgerError> {
        if requirements.is_empty() {
            return Ok(Vec::new());
        }

        // BTreeMap iteration gives ascending ingredient ids, which is the
        // lock acquisition order that keeps concurrent orders deadlock-free.
        let mut handles: Vec<(i64, Decimal, Arc<Mutex<StockCell>>)> = Vec::new();
        for (&item_id, &required) in requirements {
            let cell = self
                .cells
                .get(&item_id)
                .ok_or(LedgerError::UnknownItem(item_id))?;
            handles.push((item_id, required, Arc::clone(cell.value())));
        }
        let mut locked: Vec<(i64, Decimal, MutexGuard<'_, StockCell>)> = handles
            .iter()
            .map(|(item_id, required, cell)| (*item_id, *required, cell.lock()))
            .collect();

        // Phase 1: verify all sufficiencies while holding every row lock
        let shortfalls: Vec<StockShortfall> = locked
            .iter()
            .filter(|(_, required, guard)| guard.item.quantity < *required)
            .map(|(_, required, guard)| StockShortfall {
                ingredient_id: guard.item.id,
                ingredient_name: guard.item.name.clone(),
                required: *required,
                available: guard.item.quantity,
            })
            .collect();
        if !shortfalls.is_empty() {
            tracing::info!(
                order_id,
                short = shortfalls.len(),
                "Stock check failed, nothing deducted"
            );
            return Err(LedgerError::Insufficient(shortfalls));
        }

        // Phase 2: apply every deduction and record the transactions
        let now = now_millis();
        let mut recorded = Vec::with_capacity(locked.len());
        {
            let mut log = self.transactions.write();
            for (item_id, required, guard) in &mut locked {
                guard.item.quantity -= *required;
                let txn = InventoryTransaction {
                    id: self.next_txn_id.fetch_add(1, Ordering::Relaxed),
                    item_id: *item_id,
                    delta: -*required,
                    kind: TransactionKind::Usage,
                    order_id: Some(order_id.to_string()),
                    reverses: None,
                    timestamp: now,
                };
                log.push(txn.clone());
                recorded.push(txn);
            }
        }

        // Collect low-stock alerts before releasing the row locks
        let low: Vec<InventoryItem> = locked
            .iter()
            .filter(|(_, _, guard)| guard.item.is_low())
            .map(|(_, _, guard)| guard.item.clone())
            .collect();
        drop(locked);
        drop(handles);

        for item in low {
            self.bus.publish(
                KitchenEvent::InventoryLow {
                    item_name: item.name,
                    current_quantity: item.quantity,
                    min_quantity: item.min_quantity,
                },
                &[Room::Manager, Room::Chef],
            );
        }

        tracing::info!(order_id, ingredients = recorded.len(), "Stock deducted");
        Ok(recorded)
    }

    /// Write compensating transactions for every usage previously recorded
    /// against the order, restoring the deducted quantities.
    pub fn reverse_for_order(
        &self,
        order_id: &str,
    ) -> Result<Vec<InventoryTransaction>, LedgerError> {
        let originals: Vec<InventoryTransaction> = self
            .transactions_for_order(order_id)
            .into_iter()
            .filter(|t| t.kind == TransactionKind::Usage)
            .collect();
        if originals.is_empty() {
            return Err(LedgerError::NothingToReverse(order_id.to_string()));
        }

        let now = now_millis();
        let mut recorded = Vec::with_capacity(originals.len());
        // Originals were appended in ascending item id order; reversing
        // walks the same order, one row lock at a time.
        for original in &originals {
            let cell = self
                .cells
                .get(&original.item_id)
                .ok_or(LedgerError::UnknownItem(original.item_id))?
                .clone();
            let mut guard = cell.lock();
            guard.item.quantity -= original.delta; // delta is negative
            let txn = InventoryTransaction {
                id: self.next_txn_id.fetch_add(1, Ordering::Relaxed),
                item_id: original.item_id,
                delta: -original.delta,
                kind: TransactionKind::Adjustment,
                order_id: Some(order_id.to_string()),
                reverses: Some(original.id),
                timestamp: now,
            };
            self.transactions.write().push(txn.clone());
            recorded.push(txn);
        }

        tracing::info!(order_id, reversed = recorded.len(), "Stock reversal applied");
        Ok(recorded)
    }

    /// Recompute every item's quantity from its opening balance plus the
    /// transaction stream and compare against the stored level.
    pub fn verify_ledger(&self) -> bool {
        // Snapshot the log first; row locks are taken after the log guard is
        // released, matching the rows-then-log order used on the write path
        let log = self.transactions.read().clone();
        for cell in self.cells.iter() {
            let guard = cell.lock();
            let expected: Decimal = guard.opening_quantity
                + log
                    .iter()
                    .filter(|t| t.item_id == guard.item.id)
                    .map(|t| t.delta)
                    .sum::<Decimal>();
            if expected != guard.item.quantity {
                tracing::error!(
                    item_id = guard.item.id,
                    stored = %guard.item.quantity,
                    expected = %expected,
                    "Ledger invariant violated"
                );
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for InventoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryLedger")
            .field("items", &self.cells.len())
            .field("transactions", &self.transactions.read().len())
            .finish()
    }
}
