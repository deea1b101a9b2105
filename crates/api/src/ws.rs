// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live event stream with filters; each message is an [`Event`]. Idle
//! connections close after `websocket_idle_timeout_seconds`.

use crate::state::ApiState;
use amelia_bus::EventFilter;
use amelia_core::{Event, EventLevel, WorkflowId};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    workflow_id: WorkflowId,
    event_type: Option<String>,
    min_level: Option<EventLevel>,
    from_sequence: Option<u64>,
}

pub async fn events_handler(ws: WebSocketUpgrade, State(state): State<ApiState>, Query(query): Query<EventsQuery>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn handle_socket(mut socket: WebSocket, state: ApiState, query: EventsQuery) {
    let _connection_guard = state.track_websocket_connection();

    if let Some(from_sequence) = query.from_sequence {
        let replay = match state.store.list_events(query.workflow_id, Some(from_sequence)).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load replay events for websocket subscriber");
                let _ = socket.close().await;
                return;
            }
        };
        for event in replay {
            if send_event(&mut socket, &event).await.is_err() {
                return;
            }
        }
    }

    let filter = EventFilter { workflow_id: query.workflow_id, event_type: query.event_type, min_level: query.min_level };
    let mut stream = state.bus.subscribe(filter);
    let idle_timeout = state.config.websocket_idle_timeout;

    loop {
        tokio::select! {
            event = stream.next() => {
                match event {
                    Some(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            message = tokio::time::timeout(idle_timeout, socket.recv()) => {
                match message {
                    Ok(Some(Ok(Message::Close(_)))) | Ok(None) => break,
                    Ok(Some(Ok(_))) => continue,
                    Ok(Some(Err(_))) => break,
                    Err(_elapsed) => {
                        tracing::debug!("closing idle websocket subscriber");
                        let _ = socket.close().await;
                        break;
                    }
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &Event) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    socket.send(Message::Text(payload)).await
}
