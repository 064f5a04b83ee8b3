use crate::relay::{OutboundFrame, RelayService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use vibb_core::{ClientEvent, PeerId};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(peer_id): Path<String>,
    State(relay): State<RelayService>,
) -> impl IntoResponse {
    let Ok(peer_id) = PeerId::from_str(&peer_id) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, relay))
        .into_response()
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, relay: RelayService) {
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    relay.add_connection(peer_id.clone(), tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let msg = match frame {
                OutboundFrame::Event(event) => match serde_json::to_string(&event) {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => {
                        error!("Failed to serialize server event: {}", e);
                        continue;
                    }
                },
                OutboundFrame::Chunk(chunk) => Message::Binary(chunk),
            };

            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = relay.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => relay.dispatch(&peer_id, event),
                        Err(e) => warn!("Invalid envelope from {}: {:?}", peer_id, e),
                    },
                    Message::Binary(chunk) => relay.handle_chunk(&peer_id, chunk),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    relay.disconnect(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}
