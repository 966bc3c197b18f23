//! Domain error -> HTTP error mapping
//!
//! The one place that decides which lifecycle failure becomes which HTTP
//! status, and what structured `data` rides along.

use crate::orders::LifecycleError;
use crate::utils::AppError;

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidInput(msg) => AppError::validation(msg),
            LifecycleError::OrderNotFound(id) => {
                AppError::not_found(format!("Order {id} not found"))
            }
            LifecycleError::TicketNotFound(id) => {
                AppError::not_found(format!("Ticket {id} not found"))
            }
            LifecycleError::OrderConflict { actual } => AppError::conflict(
                format!("Order is {actual}"),
                Some(serde_json::json!({ "actual_status": actual })),
            ),
            LifecycleError::TicketConflict { actual } => AppError::conflict(
                format!("Ticket is {actual}"),
                Some(serde_json::json!({ "actual_status": actual })),
            ),
            LifecycleError::InvalidOperation(msg) => AppError::validation(msg),
            LifecycleError::InsufficientStock(shortfalls) => AppError::business_rule(
                "Insufficient stock to confirm order",
                Some(serde_json::json!({ "shortfalls": shortfalls })),
            ),
            LifecycleError::Internal(msg) => AppError::internal(msg),
        }
    }
}
