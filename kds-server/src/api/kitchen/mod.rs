//! Kitchen display API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/kitchen", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/stations", get(handler::stations))
        .route("/stations/{id}/queue", get(handler::station_queue))
        .route("/tickets/{id}/status", put(handler::update_ticket_status))
        .route("/tickets/{id}/reassign", post(handler::reassign_ticket))
}
