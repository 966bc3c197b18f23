//! Order API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::models::order::Order;

use crate::core::AppState;
use crate::orders::LineItemInput;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub table_id: i64,
    #[validate(
        length(min = 1, message = "order must contain at least one line item"),
        nested
    )]
    pub items: Vec<LineItemRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct LineItemRequest {
    pub menu_item_id: i64,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

/// POST /api/orders - place a new order
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let items: Vec<LineItemInput> = payload
        .items
        .into_iter()
        .map(|i| LineItemInput {
            menu_item_id: i.menu_item_id,
            quantity: i.quantity,
            special_instructions: i.special_instructions,
        })
        .collect();

    let order = state
        .manager
        .create_order(payload.table_id, items, payload.notes)?;
    Ok(Json(order))
}

/// GET /api/orders/:id - current status and timestamps of one order
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.manager.get_order(&id)?))
}

/// GET /api/orders/active - all non-terminal orders, oldest first
pub async fn active(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.manager.active_orders()))
}

/// POST /api/orders/:id/confirm - deduct stock and hand the order to the kitchen
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.manager.confirm_order(&id)?))
}

/// POST /api/orders/:id/serve - mark a ready order as served
pub async fn serve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.manager.serve_order(&id)?))
}

/// POST /api/orders/:id/bump - complete and clear from active displays
pub async fn bump(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.manager.bump_order(&id)?))
}

/// POST /api/orders/:id/cancel - cancel, reversing stock if already deducted
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.manager.cancel_order(&id)?))
}
