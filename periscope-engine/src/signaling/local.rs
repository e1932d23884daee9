use crate::error::ChannelError;
use crate::signaling::SignalingChannel;
use async_trait::async_trait;
use dashmap::DashMap;
use periscope_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

struct Subscriber {
    owner: u64,
    tx: mpsc::UnboundedSender<SignalMessage>,
}

/// Shared in-process message hub. Hand each participant its own
/// [`LocalChannel`] via [`LocalHub::channel`]; all of them fan out
/// through the same topic map.
#[derive(Default)]
pub struct LocalHub {
    topics: DashMap<String, Vec<Subscriber>>,
    next_owner: AtomicU64,
}

impl LocalHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn channel(self: &Arc<Self>) -> LocalChannel {
        LocalChannel {
            hub: Arc::clone(self),
            owner: self.next_owner.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// In-process signaling channel over a [`LocalHub`].
///
/// Publishes are delivered to every subscriber of the topic, including
/// the publisher itself. This is the same echo a shared broadcast
/// medium produces, which the session's role filtering has to absorb.
pub struct LocalChannel {
    hub: Arc<LocalHub>,
    owner: u64,
}

#[async_trait]
impl SignalingChannel for LocalChannel {
    async fn publish(&self, topic: &str, message: SignalMessage) -> Result<(), ChannelError> {
        let Some(mut subscribers) = self.hub.topics.get_mut(topic) else {
            // Nobody listening yet; at-least-once starts at subscribe.
            return Ok(());
        };
        subscribers.retain(|s| !s.tx.is_closed());
        for subscriber in subscribers.iter() {
            let _ = subscriber.tx.send(message.clone());
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<mpsc::UnboundedReceiver<SignalMessage>, ChannelError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.hub.topics.entry(topic.to_string()).or_default().push(Subscriber {
            owner: self.owner,
            tx,
        });
        debug!(topic, owner = self.owner, "local channel subscribed");
        Ok(rx)
    }

    async fn unsubscribe(&self, topic: &str) {
        if let Some(mut subscribers) = self.hub.topics.get_mut(topic) {
            subscribers.retain(|s| s.owner != self.owner);
        }
    }
}
