//! Inventory API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use shared::models::inventory::{InventoryItem, InventoryTransaction};

use crate::core::AppState;
use crate::utils::AppResult;

/// GET /api/inventory/items - current stock snapshot
pub async fn items(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.ledger.items_snapshot()))
}

/// GET /api/inventory/items/low - items at or below their reorder threshold
pub async fn low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.ledger.low_stock()))
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub order_id: Option<String>,
}

/// GET /api/inventory/transactions - the ledger stream, optionally
/// filtered to one order (analytics/forecasting consumer)
pub async fn transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> AppResult<Json<Vec<InventoryTransaction>>> {
    let txns = match query.order_id {
        Some(order_id) => state.ledger.transactions_for_order(&order_id),
        None => state.ledger.transactions(),
    };
    Ok(Json(txns))
}
