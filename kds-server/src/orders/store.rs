//! In-memory order store
//!
//! Owns every order record behind a per-order `RwLock`; all status
//! mutations run under that lock with compare-and-swap semantics, so a
//! loser of a concurrent race is told the record's actual current state
//! instead of silently overwriting. Orders are never removed - terminal
//! orders stay for audit and analytics.
//!
//! The public surface (insert / get / CAS transitions) is the CRUD contract
//! a persistence collaborator would implement; schema details stay on its
//! side of the seam.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use shared::models::order::{Order, OrderStatus, PrepStatus, TicketItem};

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Order is {actual}, transition rejected")]
    OrderConflict { actual: OrderStatus },

    #[error("Ticket is {actual}, transition rejected")]
    TicketConflict { actual: PrepStatus },

    #[error("Illegal transition {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}

/// Result of a ticket transition, snapshotted under the order lock
#[derive(Debug, Clone)]
pub struct TicketTransition {
    pub order: Order,
    pub ticket: TicketItem,
    /// This call advanced the order Confirmed -> Preparing
    pub order_started: bool,
    /// This call was the one that advanced the order Preparing -> Ready
    pub order_ready: bool,
}

/// Keyed order records plus a ticket -> order index
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: DashMap<String, Arc<RwLock<Order>>>,
    ticket_index: DashMap<String, String>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created order and index its tickets
    pub fn insert(&self, order: Order) {
        for ticket in &order.items {
            self.ticket_index
                .insert(ticket.ticket_id.clone(), order.order_id.clone());
        }
        self.orders
            .insert(order.order_id.clone(), Arc::new(RwLock::new(order)));
    }

    /// Current snapshot of one order
    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.get(order_id).map(|o| o.read().clone())
    }

    /// The order owning a ticket
    pub fn order_of_ticket(&self, ticket_id: &str) -> Option<String> {
        self.ticket_index.get(ticket_id).map(|o| o.clone())
    }

    /// Snapshots of all non-terminal orders, oldest first
    pub fn active_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .map(|o| o.read().clone())
            .filter(|o| !o.is_terminal())
            .collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }

    /// Total number of stored orders (terminal included)
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Run a closure under the order's write lock.
    ///
    /// The closure decides the mutation; anything that must be atomic with
    /// the status check (inventory deduction at confirm, reversal at
    /// cancel) happens inside it.
    pub fn with_order<R, E>(
        &self,
        order_id: &str,
        f: impl FnOnce(&mut Order) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let entry = {
            let guard = self
                .orders
                .get(order_id)
                .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
            Arc::clone(guard.value())
        };
        let mut order = entry.write();
        f(&mut order)
    }

    /// CAS transition of the order status, stamping the matching timestamp
    pub fn transition_order(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> Result<Order, StoreError> {
        self.with_order(order_id, |order| {
            if order.status != expected {
                return Err(StoreError::OrderConflict {
                    actual: order.status,
                });
            }
            if !expected.can_transition(next) {
                return Err(StoreError::IllegalTransition {
                    from: expected.to_string(),
                    to: next.to_string(),
                });
            }
            apply_order_status(order, next, now);
            Ok(order.clone())
        })
    }

    /// CAS transition of a ticket's prep status.
    ///
    /// Accepted edges: Pending -> Preparing (stamps `prep_started_at`,
    /// records the operator, advances a Confirmed order to Preparing) and
    /// Preparing -> Ready (stamps `prep_completed_at`; when this was the
    /// last non-ready ticket, the order itself goes Ready - decided under
    /// the same lock, so exactly one caller observes `order_ready`).
    pub fn transition_ticket(
        &self,
        ticket_id: &str,
        expected: PrepStatus,
        next: PrepStatus,
        operator_id: Option<&str>,
        now: i64,
    ) -> Result<TicketTransition, StoreError> {
        let order_id = self
            .order_of_ticket(ticket_id)
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;

        self.with_order(&order_id, |order| {
            // Tickets are only workable while the order is in the kitchen
            if !matches!(order.status, OrderStatus::Confirmed | OrderStatus::Preparing) {
                return Err(StoreError::OrderConflict {
                    actual: order.status,
                });
            }
            if !expected.can_transition(next) {
                return Err(StoreError::IllegalTransition {
                    from: expected.to_string(),
                    to: next.to_string(),
                });
            }

            let ticket = order
                .ticket_mut(ticket_id)
                .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;
            if ticket.prep_status != expected {
                return Err(StoreError::TicketConflict {
                    actual: ticket.prep_status,
                });
            }

            ticket.prep_status = next;
            let mut order_started = false;
            let mut order_ready = false;
            match next {
                PrepStatus::Preparing => {
                    ticket.prep_started_at = Some(now);
                    ticket.operator_id = operator_id.map(str::to_string);
                }
                PrepStatus::Ready => {
                    ticket.prep_completed_at = Some(now);
                }
                PrepStatus::Pending => unreachable!("forward-only state machine"),
            }
            let ticket_snapshot = ticket.clone();

            if next == PrepStatus::Preparing && order.status == OrderStatus::Confirmed {
                apply_order_status(order, OrderStatus::Preparing, now);
                order_started = true;
            }
            if next == PrepStatus::Ready
                && order.all_tickets_ready()
                && order.status == OrderStatus::Preparing
            {
                apply_order_status(order, OrderStatus::Ready, now);
                order_ready = true;
            }

            Ok(TicketTransition {
                order: order.clone(),
                ticket: ticket_snapshot,
                order_started,
                order_ready,
            })
        })
    }
}

/// Set the status and stamp the matching timestamp
fn apply_order_status(order: &mut Order, next: OrderStatus, now: i64) {
    order.status = next;
    match next {
        OrderStatus::Confirmed => order.confirmed_at = Some(now),
        OrderStatus::Ready => order.ready_at = Some(now),
        OrderStatus::Served => order.served_at = Some(now),
        OrderStatus::Completed => order.completed_at = Some(now),
        OrderStatus::Cancelled => order.cancelled_at = Some(now),
        OrderStatus::Pending | OrderStatus::Preparing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::util::{new_id, now_millis};

    fn order_with_tickets(n: usize) -> Order {
        let mut order = Order::new(1, 1, None);
        for i in 0..n {
            order.items.push(TicketItem {
                ticket_id: new_id(),
                order_id: order.order_id.clone(),
                menu_item_id: 100 + i as i64,
                menu_item_name: format!("Item {i}"),
                quantity: 1,
                special_instructions: None,
                station_id: 1,
                prep_status: PrepStatus::Pending,
                prep_started_at: None,
                prep_completed_at: None,
                operator_id: None,
                created_at: order.created_at,
            });
        }
        order
    }

    #[test]
    fn test_transition_order_cas() {
        let store = OrderStore::new();
        let order = order_with_tickets(1);
        let id = order.order_id.clone();
        store.insert(order);

        let confirmed = store
            .transition_order(&id, OrderStatus::Pending, OrderStatus::Confirmed, 1_000)
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.confirmed_at, Some(1_000));

        // Second confirm loses and is told the actual state
        let err = store
            .transition_order(&id, OrderStatus::Pending, OrderStatus::Confirmed, 2_000)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::OrderConflict {
                actual: OrderStatus::Confirmed
            }
        ));
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let store = OrderStore::new();
        let order = order_with_tickets(1);
        let id = order.order_id.clone();
        store.insert(order);

        let err = store
            .transition_order(&id, OrderStatus::Pending, OrderStatus::Ready, 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::IllegalTransition { .. }));
    }

    #[test]
    fn test_ticket_transition_stamps_and_operator() {
        let store = OrderStore::new();
        let order = order_with_tickets(2);
        let order_id = order.order_id.clone();
        let ticket_id = order.items[0].ticket_id.clone();
        store.insert(order);
        store
            .transition_order(&order_id, OrderStatus::Pending, OrderStatus::Confirmed, 0)
            .unwrap();

        let result = store
            .transition_ticket(
                &ticket_id,
                PrepStatus::Pending,
                PrepStatus::Preparing,
                Some("chef-7"),
                5_000,
            )
            .unwrap();

        assert_eq!(result.ticket.prep_status, PrepStatus::Preparing);
        assert_eq!(result.ticket.prep_started_at, Some(5_000));
        assert_eq!(result.ticket.operator_id.as_deref(), Some("chef-7"));
        // First started ticket advances the order
        assert!(result.order_started);
        assert_eq!(result.order.status, OrderStatus::Preparing);
        assert!(!result.order_ready);
    }

    #[test]
    fn test_ticket_cas_conflict_names_actual() {
        let store = OrderStore::new();
        let order = order_with_tickets(1);
        let order_id = order.order_id.clone();
        let ticket_id = order.items[0].ticket_id.clone();
        store.insert(order);
        store
            .transition_order(&order_id, OrderStatus::Pending, OrderStatus::Confirmed, 0)
            .unwrap();
        store
            .transition_ticket(&ticket_id, PrepStatus::Pending, PrepStatus::Preparing, None, 0)
            .unwrap();

        let err = store
            .transition_ticket(&ticket_id, PrepStatus::Pending, PrepStatus::Preparing, None, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::TicketConflict {
                actual: PrepStatus::Preparing
            }
        ));
    }

    #[test]
    fn test_last_ready_ticket_flips_order_exactly_here() {
        let store = OrderStore::new();
        let order = order_with_tickets(2);
        let order_id = order.order_id.clone();
        let t1 = order.items[0].ticket_id.clone();
        let t2 = order.items[1].ticket_id.clone();
        store.insert(order);
        store
            .transition_order(&order_id, OrderStatus::Pending, OrderStatus::Confirmed, 0)
            .unwrap();
        for t in [&t1, &t2] {
            store
                .transition_ticket(t, PrepStatus::Pending, PrepStatus::Preparing, None, 0)
                .unwrap();
        }

        let first = store
            .transition_ticket(&t1, PrepStatus::Preparing, PrepStatus::Ready, None, 10)
            .unwrap();
        assert!(!first.order_ready);
        assert_eq!(first.order.status, OrderStatus::Preparing);

        let last = store
            .transition_ticket(&t2, PrepStatus::Preparing, PrepStatus::Ready, None, 20)
            .unwrap();
        assert!(last.order_ready);
        assert_eq!(last.order.status, OrderStatus::Ready);
        assert_eq!(last.order.ready_at, Some(20));
    }

    #[test]
    fn test_tickets_frozen_before_confirm_and_after_terminal() {
        let store = OrderStore::new();
        let order = order_with_tickets(1);
        let order_id = order.order_id.clone();
        let ticket_id = order.items[0].ticket_id.clone();
        store.insert(order);

        // Pending order: kitchen cannot touch tickets yet
        let err = store
            .transition_ticket(&ticket_id, PrepStatus::Pending, PrepStatus::Preparing, None, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::OrderConflict {
                actual: OrderStatus::Pending
            }
        ));

        // Cancelled order: tickets immutable
        store
            .transition_order(&order_id, OrderStatus::Pending, OrderStatus::Cancelled, 0)
            .unwrap();
        let err = store
            .transition_ticket(&ticket_id, PrepStatus::Pending, PrepStatus::Preparing, None, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::OrderConflict {
                actual: OrderStatus::Cancelled
            }
        ));
    }

    #[test]
    fn test_terminal_orders_are_retained() {
        let store = OrderStore::new();
        let order = order_with_tickets(1);
        let id = order.order_id.clone();
        store.insert(order);
        store
            .transition_order(&id, OrderStatus::Pending, OrderStatus::Cancelled, now_millis())
            .unwrap();

        assert!(store.get(&id).is_some());
        assert!(store.active_orders().is_empty());
        assert_eq!(store.len(), 1);
    }
}
