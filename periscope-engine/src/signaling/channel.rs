use crate::error::ChannelError;
use async_trait::async_trait;
use periscope_core::SignalMessage;
use tokio::sync::mpsc;

/// Publish/subscribe transport for signaling messages.
///
/// Delivery is at-least-once within a best-effort ordered stream per
/// topic. Sessions must tolerate apparent duplicates and cross-kind
/// reordering; they do so with role- and phase-based filtering, not by
/// relying on transport guarantees. Implementations may deliver a
/// publisher's own messages back to it.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn publish(&self, topic: &str, message: SignalMessage) -> Result<(), ChannelError>;

    /// Subscribe to a topic; inbound messages arrive on the returned
    /// receiver until `unsubscribe` or channel teardown.
    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<mpsc::UnboundedReceiver<SignalMessage>, ChannelError>;

    async fn unsubscribe(&self, topic: &str);
}
