use crate::error::ChannelError;
use crate::signaling::SignalingChannel;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use periscope_core::SignalMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

struct TopicConnection {
    out_tx: mpsc::UnboundedSender<Message>,
}

/// Signaling channel backed by a WebSocket relay.
///
/// One connection per topic: `subscribe` dials `{base}/ws/{topic}` and
/// spawns sender/receiver tasks; `publish` pushes frames through the
/// sender task. The relay fans frames out to the other subscribers of
/// the topic, so unlike [`crate::signaling::LocalChannel`] a publisher
/// does not see its own messages.
pub struct WsChannel {
    base_url: String,
    connections: DashMap<String, TopicConnection>,
}

impl WsChannel {
    /// `base_url` is the relay root, e.g. `ws://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connections: DashMap::new(),
        }
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/ws/{}", self.base_url.trim_end_matches('/'), topic)
    }
}

#[async_trait]
impl SignalingChannel for WsChannel {
    async fn publish(&self, topic: &str, message: SignalMessage) -> Result<(), ChannelError> {
        let json = serde_json::to_string(&message)?;
        let connection = self
            .connections
            .get(topic)
            .ok_or_else(|| ChannelError::NotSubscribed(topic.to_string()))?;
        connection
            .out_tx
            .send(Message::Text(json.into()))
            .map_err(|_| ChannelError::Closed)
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<mpsc::UnboundedReceiver<SignalMessage>, ChannelError> {
        let url = self.topic_url(topic);
        info!(%url, "connecting to signaling relay");

        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let closing = matches!(frame, Message::Close(_));
                if write.send(frame).await.is_err() || closing {
                    break;
                }
            }
            // Finish the close handshake so the relay sees the
            // disconnect and the read half ends too.
            let _ = write.close().await;
            debug!("relay sender task finished");
        });

        let task_topic = topic.to_string();
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(message) => {
                                if in_tx.send(message).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(topic = %task_topic, error = %e, "invalid signaling frame")
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(topic = %task_topic, error = %e, "relay read error");
                        break;
                    }
                }
            }
            debug!(topic = %task_topic, "relay receiver task finished");
        });

        self.connections
            .insert(topic.to_string(), TopicConnection { out_tx });

        Ok(in_rx)
    }

    async fn unsubscribe(&self, topic: &str) {
        // A close frame, not just a dropped sender: the socket has a
        // live read half that must be shut down as well.
        if let Some((_, connection)) = self.connections.remove(topic) {
            let _ = connection.out_tx.send(Message::Close(None));
        }
    }
}
