//! WebSocket viewer sessions
//!
//! A connecting viewer declares its role and optional station/table/order
//! context (supplied by the authentication collaborator); the session is
//! placed into the matching rooms and receives that scope's events as JSON
//! until it disconnects. There is no replay: a reconnecting viewer
//! re-fetches current state through the REST endpoints.

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use serde::Deserialize;

use shared::Room;

use crate::core::AppState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// chef | staff | manager | admin | customer
    pub role: String,
    /// Join this station's room (kitchen displays)
    pub station: Option<i64>,
    /// Join this table's room (seated party / service staff)
    pub table: Option<i64>,
    /// Join this order's tracking room (customer session)
    pub order: Option<String>,
}

/// Rooms a session enters, derived from its declared context
fn rooms_for(query: &StreamQuery) -> Result<Vec<Room>, AppError> {
    let role_room = match query.role.as_str() {
        "chef" => Room::Chef,
        "staff" => Room::Staff,
        // Admins share the manager view
        "manager" | "admin" => Room::Manager,
        "customer" => Room::Customer,
        other => {
            return Err(AppError::validation(format!("invalid role: {other}")));
        }
    };
    let mut rooms = vec![role_room];
    if let Some(station) = query.station {
        rooms.push(Room::Station(station));
    }
    if let Some(table) = query.table {
        rooms.push(Room::Table(table));
    }
    if let Some(order) = &query.order {
        rooms.push(Room::Order(order.clone()));
    }
    Ok(rooms)
}

/// GET /api/ws - upgrade and subscribe
pub async fn upgrade(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let rooms = rooms_for(&query)?;
    let role = query.role.clone();
    Ok(ws.on_upgrade(move |socket| serve_session(state, socket, role, rooms)))
}

async fn serve_session(state: AppState, mut socket: WebSocket, role: String, rooms: Vec<Room>) {
    let (session_id, mut events) = state.bus.register_session(&role);
    for room in &rooms {
        state.bus.join(session_id, room);
    }
    tracing::info!(session_id, role = %role, rooms = rooms.len(), "Viewer connected");

    let shutdown = state.bus.shutdown_token().clone();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    // Bus drained - server is shutting down
                    break;
                };
                let text = match serde_json::to_string(event.as_ref()) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(session_id, error = %e, "Event serialization failed");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    // Slow or gone - drop the session, never the mutation
                    tracing::debug!(session_id, "Viewer send failed, closing");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // viewers only listen; ignore chatter
                    Some(Err(e)) => {
                        tracing::debug!(session_id, error = %e, "Viewer socket error");
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }

    state.bus.disconnect(session_id);
    tracing::info!(session_id, "Viewer disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(role: &str) -> StreamQuery {
        StreamQuery {
            role: role.into(),
            station: None,
            table: None,
            order: None,
        }
    }

    #[test]
    fn test_role_rooms() {
        assert_eq!(rooms_for(&query("chef")).unwrap(), vec![Room::Chef]);
        // Admins land in the manager room
        assert_eq!(rooms_for(&query("admin")).unwrap(), vec![Room::Manager]);
        assert!(rooms_for(&query("intruder")).is_err());
    }

    #[test]
    fn test_context_rooms_appended() {
        let q = StreamQuery {
            role: "chef".into(),
            station: Some(2),
            table: None,
            order: None,
        };
        assert_eq!(
            rooms_for(&q).unwrap(),
            vec![Room::Chef, Room::Station(2)]
        );

        let q = StreamQuery {
            role: "customer".into(),
            station: None,
            table: Some(7),
            order: Some("o-1".into()),
        };
        assert_eq!(
            rooms_for(&q).unwrap(),
            vec![Room::Customer, Room::Table(7), Room::Order("o-1".into())]
        );
    }
}
