//! Queue WebSocket endpoint - live "queue changed" push
//!
//! GET /ws
//!
//! Protocol:
//! - Client → Server: `{"type":"joinShopQueue","shopId":S}` / `{"type":"leaveShopQueue","shopId":S}`
//! - Server → Client: `queueUpdated` after every committed mutation of a joined
//!   shop, plus `joined` / `left` / `error` replies to commands
//!
//! Each joined shop gets a forwarder task that moves hub events into the
//! session's outbound channel, so one socket can follow many shops.

use crate::live::LiveQueueHub;
use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};
use walkin_core::port::QueueChanged;

const PING_INTERVAL: Duration = Duration::from_secs(30);
const OUTBOUND_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    JoinShopQueue { shop_id: String },
    LeaveShopQueue { shop_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// `version` is null for a resync after lag
    QueueUpdated {
        shop_id: String,
        message: String,
        version: Option<i64>,
    },
    Joined { shop_id: String },
    Left { shop_id: String },
    Error { message: String },
}

impl ServerMessage {
    fn resync(shop_id: &str) -> Self {
        ServerMessage::QueueUpdated {
            shop_id: shop_id.to_string(),
            message: format!("Queue updated for shop {}", shop_id),
            version: None,
        }
    }
}

impl From<QueueChanged> for ServerMessage {
    fn from(event: QueueChanged) -> Self {
        ServerMessage::QueueUpdated {
            shop_id: event.shop_id,
            message: event.message,
            version: Some(event.version),
        }
    }
}

/// GET /ws
pub async fn handle_queue_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| queue_ws_session(socket, state.hub))
}

async fn queue_ws_session(socket: WebSocket, hub: LiveQueueHub) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CAPACITY);
    let mut rooms: HashMap<String, JoinHandle<()>> = HashMap::new();

    info!("Queue WS connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            Some(msg) = out_rx.recv() => {
                if send_message(&mut sink, &msg).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_command(text.as_str(), &hub, &out_tx, &mut rooms).await;
                        if send_message(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    let joined = rooms.len();
    for (shop_id, forwarder) in rooms {
        leave_room(&hub, &shop_id, forwarder).await;
    }

    info!(rooms = joined, "Queue WS disconnected");
}

async fn handle_command(
    text: &str,
    hub: &LiveQueueHub,
    out_tx: &mpsc::Sender<ServerMessage>,
    rooms: &mut HashMap<String, JoinHandle<()>>,
) -> ServerMessage {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            return ServerMessage::Error {
                message: format!("Invalid command: {}", e),
            }
        }
    };

    match command {
        ClientCommand::JoinShopQueue { shop_id } => {
            if shop_id.trim().is_empty() {
                return ServerMessage::Error {
                    message: "shopId is required".to_string(),
                };
            }
            if !rooms.contains_key(&shop_id) {
                let forwarder = spawn_forwarder(hub.clone(), shop_id.clone(), out_tx.clone());
                rooms.insert(shop_id.clone(), forwarder);
                debug!(shop_id = %shop_id, "Joined shop queue room");
            }
            ServerMessage::Joined { shop_id }
        }
        ClientCommand::LeaveShopQueue { shop_id } => {
            if let Some(forwarder) = rooms.remove(&shop_id) {
                leave_room(hub, &shop_id, forwarder).await;
                debug!(shop_id = %shop_id, "Left shop queue room");
            }
            ServerMessage::Left { shop_id }
        }
    }
}

/// Stop the room's forwarder, then drop the room if nobody else listens.
///
/// The aborted task only releases its receiver once it has finished, so
/// the release must wait for it.
async fn leave_room(hub: &LiveQueueHub, shop_id: &str, forwarder: JoinHandle<()>) {
    forwarder.abort();
    let _ = forwarder.await;
    hub.release(shop_id);
}

fn spawn_forwarder(
    hub: LiveQueueHub,
    shop_id: String,
    out: mpsc::Sender<ServerMessage>,
) -> JoinHandle<()> {
    let mut rx = hub.subscribe(&shop_id);
    tokio::spawn(async move {
        loop {
            let msg = match rx.recv().await {
                Ok(event) => ServerMessage::from(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(shop_id = %shop_id, lagged = n, "Queue subscriber lagged, forcing re-fetch");
                    rx = hub.subscribe(&shop_id);
                    ServerMessage::resync(&shop_id)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if out.send(msg).await.is_err() {
                break;
            }
        }
    })
}

async fn send_message<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
