//! Inventory API module

mod handler;

use axum::{Router, routing::get};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(handler::items))
        .route("/items/low", get(handler::low_stock))
        .route("/transactions", get(handler::transactions))
}
