//! OrderLifecycleManager - the state machine orchestrator
//!
//! Every public operation is a short synchronous check-and-mutate:
//!
//! ```text
//! operation(...)
//!     ├─ 1. validate input against the catalog
//!     ├─ 2. CAS the order/ticket status under the order lock
//!     │      (confirm/cancel run the inventory step inside the lock,
//!     │       so deduction and status commit as one local transaction)
//!     ├─ 3. place/move/remove tickets in station queues
//!     └─ 4. publish event(s) to the interested rooms
//! ```
//!
//! The broadcast in step 4 is deliberately outside the transaction
//! boundary: it is fire-and-forget, and a delivery fault never rolls back
//! the committed mutation.

mod error;
pub use error::*;

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::escalation::{EscalationThresholds, UrgencyTier};
use shared::event::TicketSummary;
use shared::models::order::{Order, OrderStatus, PrepStatus, TicketItem};
use shared::util::{new_id, now_millis};
use shared::{KitchenEvent, Room};

use crate::broadcast::EventBus;
use crate::catalog::Catalog;
use crate::inventory::{InventoryLedger, LedgerError};
use crate::orders::store::OrderStore;
use crate::stations::{QueuedTicket, StationRouter};

/// One requested line item at order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// One entry of a station's display queue, enriched for rendering.
///
/// Carries only this ticket's own instructions - a station never sees
/// another station's line items for the same order.
#[derive(Debug, Clone, Serialize)]
pub struct StationQueueEntry {
    pub ticket_id: String,
    pub order_id: String,
    pub table_number: i32,
    pub menu_item_name: String,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub prep_status: PrepStatus,
    pub urgency: UrgencyTier,
    pub age_millis: i64,
}

/// Orchestrates the order/ticket state machine over the store, ledger,
/// router and bus
pub struct OrderLifecycleManager {
    catalog: Arc<Catalog>,
    store: Arc<OrderStore>,
    router: Arc<StationRouter>,
    ledger: Arc<InventoryLedger>,
    bus: Arc<EventBus>,
    thresholds: EscalationThresholds,
}

impl OrderLifecycleManager {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<OrderStore>,
        router: Arc<StationRouter>,
        ledger: Arc<InventoryLedger>,
        bus: Arc<EventBus>,
        thresholds: EscalationThresholds,
    ) -> Self {
        Self {
            catalog,
            store,
            router,
            ledger,
            bus,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &EscalationThresholds {
        &self.thresholds
    }

    // ========== Lifecycle Operations ==========

    /// Create a new pending order for a table.
    ///
    /// Each line item becomes a ticket with its station assigned from the
    /// catalog's menu-item -> station mapping. Nothing is broadcast and no
    /// stock moves until confirmation.
    pub fn create_order(
        &self,
        table_id: i64,
        line_items: Vec<LineItemInput>,
        notes: Option<String>,
    ) -> LifecycleResult<Order> {
        let table = self
            .catalog
            .table(table_id)
            .ok_or_else(|| LifecycleError::InvalidInput(format!("unknown table {table_id}")))?;
        if line_items.is_empty() {
            return Err(LifecycleError::InvalidInput(
                "order must contain at least one line item".into(),
            ));
        }

        let mut order = Order::new(table.id, table.table_number, notes);
        for input in &line_items {
            if input.quantity < 1 {
                return Err(LifecycleError::InvalidInput(format!(
                    "quantity must be positive for menu item {}",
                    input.menu_item_id
                )));
            }
            let menu_item = self.catalog.menu_item(input.menu_item_id).ok_or_else(|| {
                LifecycleError::InvalidInput(format!("unknown menu item {}", input.menu_item_id))
            })?;
            order.items.push(TicketItem {
                ticket_id: new_id(),
                order_id: order.order_id.clone(),
                menu_item_id: menu_item.id,
                menu_item_name: menu_item.name.clone(),
                quantity: input.quantity,
                special_instructions: input.special_instructions.clone(),
                station_id: menu_item.station_id,
                prep_status: PrepStatus::Pending,
                prep_started_at: None,
                prep_completed_at: None,
                operator_id: None,
                created_at: order.created_at,
            });
        }

        tracing::info!(
            order_id = %order.order_id,
            table = order.table_number,
            items = order.items.len(),
            "Order created"
        );
        self.store.insert(order.clone());
        Ok(order)
    }

    /// Confirm a pending order.
    ///
    /// Deducts every recipe ingredient across every line item as one
    /// all-or-nothing ledger operation; any shortfall rejects the
    /// transition with the itemized list and the order stays Pending. On
    /// success the order is Confirmed, its tickets enter the station
    /// queues, and `NewOrder` goes to the chef room and each involved
    /// station room.
    pub fn confirm_order(&self, order_id: &str) -> LifecycleResult<Order> {
        let now = now_millis();
        let confirmed: Order = self.store.with_order(order_id, |order| {
            if order.status != OrderStatus::Pending {
                return Err(LifecycleError::OrderConflict {
                    actual: order.status,
                });
            }

            let requirements = self.requirements_of(order)?;
            // Deduction happens under the order lock: the stock commit and
            // the status flip are one local transaction.
            self.ledger.deduct_for_order(&order.order_id, &requirements)?;

            order.status = OrderStatus::Confirmed;
            order.confirmed_at = Some(now);
            Ok(order.clone())
        })?;

        let mut station_rooms: Vec<Room> = Vec::new();
        for ticket in &confirmed.items {
            self.router.route(
                ticket.station_id,
                QueuedTicket {
                    ticket_id: ticket.ticket_id.clone(),
                    order_id: confirmed.order_id.clone(),
                    created_at: confirmed.created_at,
                },
            );
            let room = Room::Station(ticket.station_id);
            if !station_rooms.contains(&room) {
                station_rooms.push(room);
            }
        }

        let mut rooms = vec![Room::Chef];
        rooms.extend(station_rooms);
        self.bus.publish(
            KitchenEvent::NewOrder {
                order_id: confirmed.order_id.clone(),
                table_number: confirmed.table_number,
                items: confirmed
                    .items
                    .iter()
                    .map(|t| TicketSummary {
                        ticket_id: t.ticket_id.clone(),
                        menu_item_id: t.menu_item_id,
                        menu_item_name: t.menu_item_name.clone(),
                        quantity: t.quantity,
                        station_id: t.station_id,
                        special_instructions: t.special_instructions.clone(),
                    })
                    .collect(),
            },
            &rooms,
        );

        tracing::info!(order_id, table = confirmed.table_number, "Order confirmed");
        Ok(confirmed)
    }

    /// Advance one ticket's preparation status.
    ///
    /// Only Pending -> Preparing and Preparing -> Ready are accepted, and
    /// only when the stored status equals `expected`; a loser of a
    /// concurrent race receives the actual current status. The operator is
    /// recorded on the start edge. When the last non-ready ticket goes
    /// Ready the order itself goes Ready exactly once and `OrderReady` is
    /// published to staff and manager rooms.
    pub fn update_item_status(
        &self,
        ticket_id: &str,
        expected: PrepStatus,
        next: PrepStatus,
        operator_id: Option<&str>,
    ) -> LifecycleResult<Order> {
        let now = now_millis();
        let result = self
            .store
            .transition_ticket(ticket_id, expected, next, operator_id, now)?;

        if next == PrepStatus::Ready {
            self.router.remove_ticket(ticket_id);
        }

        self.bus.publish(
            KitchenEvent::ItemStatusChanged {
                ticket_id: result.ticket.ticket_id.clone(),
                order_id: result.order.order_id.clone(),
                station_id: result.ticket.station_id,
                prep_status: next,
                timestamp: now,
            },
            &[
                Room::Station(result.ticket.station_id),
                Room::Table(result.order.table_id),
            ],
        );

        if result.order_ready {
            self.bus.publish(
                KitchenEvent::OrderReady {
                    order_id: result.order.order_id.clone(),
                    table_number: result.order.table_number,
                },
                &[Room::Staff, Room::Manager],
            );
            tracing::info!(
                order_id = %result.order.order_id,
                "All tickets ready, order ready for pickup"
            );
        }

        tracing::debug!(
            ticket_id,
            status = %next,
            operator = ?operator_id,
            "Ticket status updated"
        );
        Ok(result.order)
    }

    /// Mark a ready order as served to the table
    pub fn serve_order(&self, order_id: &str) -> LifecycleResult<Order> {
        let order = self.store.transition_order(
            order_id,
            OrderStatus::Ready,
            OrderStatus::Served,
            now_millis(),
        )?;
        tracing::info!(order_id, "Order served");
        Ok(order)
    }

    /// Bump a finished order off the active displays.
    ///
    /// Accepts Ready or Served, completes the order, clears its tickets
    /// from every station queue and publishes `OrderBumped` to chef and
    /// staff rooms. Nothing is deleted.
    pub fn bump_order(&self, order_id: &str) -> LifecycleResult<Order> {
        let now = now_millis();
        let completed: Order = self.store.with_order(order_id, |order| {
            if !matches!(order.status, OrderStatus::Ready | OrderStatus::Served) {
                return Err(LifecycleError::OrderConflict {
                    actual: order.status,
                });
            }
            order.status = OrderStatus::Completed;
            order.completed_at = Some(now);
            Ok(order.clone())
        })?;

        self.router.remove_order(order_id);
        self.bus.publish(
            KitchenEvent::OrderBumped {
                order_id: completed.order_id.clone(),
                table_number: completed.table_number,
                bumped_at: now,
            },
            &[Room::Chef, Room::Staff],
        );

        tracing::info!(order_id, "Order bumped");
        Ok(completed)
    }

    /// Cancel an order before preparation started.
    ///
    /// Allowed from Pending or Confirmed. A confirmed order already paid
    /// its stock, so cancellation writes compensating transactions
    /// restoring every deducted quantity, referencing the originals.
    pub fn cancel_order(&self, order_id: &str) -> LifecycleResult<Order> {
        let now = now_millis();
        let (cancelled, stock_reversed): (Order, bool) =
            self.store.with_order(order_id, |order| {
                let reversed = match order.status {
                    OrderStatus::Pending => false,
                    OrderStatus::Confirmed => {
                        match self.ledger.reverse_for_order(&order.order_id) {
                            Ok(_) => true,
                            // An order whose items carry no recipe deducted
                            // nothing; there is nothing to restore
                            Err(LedgerError::NothingToReverse(_)) => false,
                            Err(e) => return Err(LifecycleError::from(e)),
                        }
                    }
                    actual => return Err(LifecycleError::OrderConflict { actual }),
                };
                order.status = OrderStatus::Cancelled;
                order.cancelled_at = Some(now);
                Ok((order.clone(), reversed))
            })?;

        self.router.remove_order(order_id);
        self.bus.publish(
            KitchenEvent::OrderCancelled {
                order_id: cancelled.order_id.clone(),
                table_number: cancelled.table_number,
                stock_reversed,
            },
            &[Room::Staff, Room::Manager],
        );

        tracing::info!(order_id, stock_reversed, "Order cancelled");
        Ok(cancelled)
    }

    /// Move a ticket to a different station.
    ///
    /// Allowed in any non-ready prep status; publishes `ItemReassigned` to
    /// both the old and the new station rooms.
    pub fn reassign_item(&self, ticket_id: &str, new_station: i64) -> LifecycleResult<()> {
        if self.catalog.station(new_station).is_none() {
            return Err(LifecycleError::InvalidInput(format!(
                "unknown station {new_station}"
            )));
        }
        let order_id = self
            .store
            .order_of_ticket(ticket_id)
            .ok_or_else(|| LifecycleError::TicketNotFound(ticket_id.to_string()))?;

        let old_station: i64 = self.store.with_order(&order_id, |order| {
            if !matches!(order.status, OrderStatus::Confirmed | OrderStatus::Preparing) {
                return Err(LifecycleError::OrderConflict {
                    actual: order.status,
                });
            }
            let ticket = order
                .ticket_mut(ticket_id)
                .ok_or_else(|| LifecycleError::TicketNotFound(ticket_id.to_string()))?;
            if ticket.prep_status == PrepStatus::Ready {
                return Err(LifecycleError::TicketConflict {
                    actual: PrepStatus::Ready,
                });
            }
            let old = ticket.station_id;
            ticket.station_id = new_station;
            Ok(old)
        })?;

        if old_station == new_station {
            return Ok(());
        }
        self.router.reassign(ticket_id, new_station)?;

        self.bus.publish(
            KitchenEvent::ItemReassigned {
                ticket_id: ticket_id.to_string(),
                old_station_id: old_station,
                new_station_id: new_station,
            },
            &[Room::Station(old_station), Room::Station(new_station)],
        );

        tracing::info!(ticket_id, old_station, new_station, "Ticket reassigned");
        Ok(())
    }

    // ========== Queries ==========

    /// Current state of one order (customer tracking, analytics)
    pub fn get_order(&self, order_id: &str) -> LifecycleResult<Order> {
        self.store
            .get(order_id)
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))
    }

    /// All non-terminal orders, oldest first
    pub fn active_orders(&self) -> Vec<Order> {
        self.store.active_orders()
    }

    /// A station's display queue: urgency descending, oldest first within
    /// a tier, each entry enriched with table number and this ticket's own
    /// instructions. Urgency is computed against "now" on every call.
    pub fn station_view(&self, station_id: i64) -> LifecycleResult<Vec<StationQueueEntry>> {
        if self.catalog.station(station_id).is_none() {
            return Err(LifecycleError::InvalidInput(format!(
                "unknown station {station_id}"
            )));
        }
        let now = now_millis();
        let entries = self.router.view(station_id, now, &self.thresholds);

        let mut view = Vec::with_capacity(entries.len());
        for (queued, urgency) in entries {
            // A ticket can complete between the queue read and here; the
            // store is authoritative, the queue only orders the display
            let Some(order) = self.store.get(&queued.order_id) else {
                continue;
            };
            let Some(ticket) = order.ticket(&queued.ticket_id) else {
                continue;
            };
            if ticket.prep_status == PrepStatus::Ready {
                continue;
            }
            view.push(StationQueueEntry {
                ticket_id: ticket.ticket_id.clone(),
                order_id: order.order_id.clone(),
                table_number: order.table_number,
                menu_item_name: ticket.menu_item_name.clone(),
                quantity: ticket.quantity,
                special_instructions: ticket.special_instructions.clone(),
                prep_status: ticket.prep_status,
                urgency,
                age_millis: now.saturating_sub(queued.created_at),
            });
        }
        Ok(view)
    }

    // ========== Internal ==========

    /// Aggregate (ingredient -> total quantity) across every line item's
    /// recipe. BTreeMap keeps ingredient ids ascending for the ledger's
    /// lock ordering.
    fn requirements_of(&self, order: &Order) -> LifecycleResult<BTreeMap<i64, Decimal>> {
        let mut requirements: BTreeMap<i64, Decimal> = BTreeMap::new();
        for ticket in &order.items {
            let recipe = self.catalog.recipe_for(ticket.menu_item_id).ok_or_else(|| {
                LifecycleError::Internal(format!(
                    "menu item {} vanished from catalog",
                    ticket.menu_item_id
                ))
            })?;
            for entry in recipe {
                *requirements.entry(entry.ingredient_id).or_insert(Decimal::ZERO) +=
                    entry.quantity_per_unit * Decimal::from(ticket.quantity);
            }
        }
        Ok(requirements)
    }
}

impl std::fmt::Debug for OrderLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLifecycleManager")
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

#[cfg(test)]
mod tests;
