use shared::models::inventory::StockShortfall;
use shared::models::order::{OrderStatus, PrepStatus};
use thiserror::Error;

use crate::inventory::LedgerError;
use crate::orders::store::StoreError;
use crate::stations::RouterError;

/// Lifecycle errors
///
/// Conflicts carry the record's actual current state so the caller can
/// re-fetch and retry instead of guessing; insufficient stock carries the
/// itemized shortfalls so a UI can explain exactly what is missing.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Order is {actual}, transition rejected")]
    OrderConflict { actual: OrderStatus },

    #[error("Ticket is {actual}, transition rejected")]
    TicketConflict { actual: PrepStatus },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Insufficient stock for {} ingredient(s)", .0.len())]
    InsufficientStock(Vec<StockShortfall>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderNotFound(id) => LifecycleError::OrderNotFound(id),
            StoreError::TicketNotFound(id) => LifecycleError::TicketNotFound(id),
            StoreError::OrderConflict { actual } => LifecycleError::OrderConflict { actual },
            StoreError::TicketConflict { actual } => LifecycleError::TicketConflict { actual },
            StoreError::IllegalTransition { from, to } => {
                LifecycleError::InvalidOperation(format!("illegal transition {from} -> {to}"))
            }
        }
    }
}

impl From<LedgerError> for LifecycleError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Insufficient(shortfalls) => {
                LifecycleError::InsufficientStock(shortfalls)
            }
            // A confirmed order referencing an unregistered ingredient is a
            // catalog/ledger wiring fault, not caller input
            LedgerError::UnknownItem(id) => {
                LifecycleError::Internal(format!("ingredient {id} not registered in ledger"))
            }
            LedgerError::NothingToReverse(id) => {
                LifecycleError::Internal(format!("no transactions to reverse for order {id}"))
            }
        }
    }
}

impl From<RouterError> for LifecycleError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::NotRouted(id) => {
                LifecycleError::Internal(format!("ticket {id} missing from station queues"))
            }
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
