//! WebSocket relay for signaling messages.
//!
//! One topic per session id: a frame published on `/ws/{topic}` is
//! forwarded verbatim to every *other* client connected to the same
//! topic. The relay never inspects session state; it only scopes and
//! fans out.

use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use periscope_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<Message>,
}

#[derive(Default)]
pub struct RelayState {
    topics: DashMap<String, Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl RelayState {
    fn register(&self, topic: &str, tx: mpsc::UnboundedSender<Message>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber { id, tx });
        id
    }

    fn deregister(&self, topic: &str, id: u64) {
        if let Some(mut subscribers) = self.topics.get_mut(topic) {
            subscribers.retain(|s| s.id != id);
        }
        self.topics.remove_if(topic, |_, subscribers| subscribers.is_empty());
    }

    /// Forward a frame to everyone on the topic except its sender.
    fn fanout(&self, topic: &str, from: u64, frame: &Message) -> usize {
        let Some(subscribers) = self.topics.get(topic) else {
            return 0;
        };
        let mut delivered = 0;
        for subscriber in subscribers.iter().filter(|s| s.id != from) {
            if subscriber.tx.send(frame.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

pub fn relay_router() -> Router {
    Router::new()
        .route("/ws/{topic}", get(ws_handler))
        .with_state(Arc::new(RelayState::default()))
}

pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr(), "signaling relay listening");
    axum::serve(listener, relay_router()).await
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(topic): Path<String>,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, topic, state))
}

async fn handle_socket(socket: WebSocket, topic: String, state: Arc<RelayState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let id = state.register(&topic, tx);
    info!(%topic, id, "relay client connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let topic = topic.clone();

        async move {
            while let Some(Ok(frame)) = receiver.next().await {
                match frame {
                    Message::Text(ref text) => {
                        // Frames are forwarded as-is; the parse is only
                        // an early warning for misbehaving clients.
                        if serde_json::from_str::<SignalMessage>(text).is_err() {
                            warn!(%topic, id, "forwarding frame that is not a signal message");
                        }
                        let delivered = state.fanout(&topic, id, &frame);
                        debug!(%topic, id, delivered, "frame relayed");
                    }
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

    state.deregister(&topic, id);
    info!(%topic, id, "relay client disconnected");
}
