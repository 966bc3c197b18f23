//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`orders`] - order lifecycle operations and queries
//! - [`kitchen`] - station queues, ticket transitions, reassignment
//! - [`inventory`] - stock snapshot and the transaction stream
//! - [`stream`] - WebSocket endpoint placing viewer sessions into rooms

pub mod convert;

pub mod health;
pub mod inventory;
pub mod kitchen;
pub mod orders;
pub mod stream;

use axum::Router;

use crate::core::AppState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResponse, AppResult};

/// Assemble the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(kitchen::router())
        .merge(inventory::router())
        .merge(stream::router())
        .with_state(state)
}
