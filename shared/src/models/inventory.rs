//! Inventory model
//!
//! Quantities are `Decimal` throughout; stock math never goes through
//! floating point. Items are mutated exclusively through transactions, and
//! the sum of an item's transaction deltas plus its opening balance must
//! always equal its current quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tracked ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    /// Unit of measure (kg, l, pcs, ...)
    pub unit: String,
    /// Current stock level
    pub quantity: Decimal,
    /// Reorder threshold - at or below means low stock
    pub min_quantity: Decimal,
}

impl InventoryItem {
    /// At or below the reorder threshold
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// Transaction type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Stock consumed by a confirmed order (negative delta)
    Usage,
    /// Compensating entry restoring a prior usage (positive delta)
    Adjustment,
}

/// Immutable ledger record of one stock movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryTransaction {
    pub id: i64,
    pub item_id: i64,
    /// Signed quantity change
    pub delta: Decimal,
    pub kind: TransactionKind,
    /// Order that triggered this movement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// For adjustments: the usage transaction being reversed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverses: Option<i64>,
    pub timestamp: i64,
}

/// Static recipe line: one ingredient requirement per unit ordered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeEntry {
    pub ingredient_id: i64,
    pub quantity_per_unit: Decimal,
}

/// One insufficient ingredient, reported from a failed confirmation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockShortfall {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub required: Decimal,
    pub available: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_boundary_is_inclusive() {
        let item = InventoryItem {
            id: 1,
            name: "Tomato".into(),
            unit: "kg".into(),
            quantity: Decimal::from(5),
            min_quantity: Decimal::from(5),
        };
        assert!(item.is_low());
    }

    #[test]
    fn test_transaction_kind_serde() {
        let json = serde_json::to_string(&TransactionKind::Adjustment).unwrap();
        assert_eq!(json, "\"ADJUSTMENT\"");
    }
}
