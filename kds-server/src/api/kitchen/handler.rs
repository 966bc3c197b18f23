//! Kitchen display API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::models::order::{Order, PrepStatus};
use shared::models::station::Station;

use crate::core::AppState;
use crate::orders::StationQueueEntry;
use crate::utils::{AppResponse, AppResult};

/// GET /api/kitchen/stations - all work stations
pub async fn stations(State(state): State<AppState>) -> AppResult<Json<Vec<Station>>> {
    let mut stations: Vec<Station> = state.catalog.stations().cloned().collect();
    stations.sort_by_key(|s| s.id);
    Ok(Json(stations))
}

/// GET /api/kitchen/stations/:id/queue - the station's display queue,
/// urgency recomputed against "now" on every call
pub async fn station_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<StationQueueEntry>>> {
    Ok(Json(state.manager.station_view(id)?))
}

#[derive(Debug, Deserialize)]
pub struct TicketStatusRequest {
    /// The status the caller believes the ticket is in
    pub expected: PrepStatus,
    /// The status to move to
    pub next: PrepStatus,
    pub operator_id: Option<String>,
}

/// PUT /api/kitchen/tickets/:id/status - CAS ticket transition.
///
/// Responds 409 with the ticket's actual status when `expected` is stale;
/// the caller must re-fetch and retry, not blindly resubmit.
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TicketStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state.manager.update_item_status(
        &id,
        payload.expected,
        payload.next,
        payload.operator_id.as_deref(),
    )?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub new_station_id: i64,
}

/// POST /api/kitchen/tickets/:id/reassign - move a ticket between stations
pub async fn reassign_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ReassignRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    state.manager.reassign_item(&id, payload.new_station_id)?;
    Ok(Json(AppResponse::ok()))
}
