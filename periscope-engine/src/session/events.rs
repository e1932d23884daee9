use crate::error::SessionError;
use async_trait::async_trait;
use periscope_core::ConnectionPhase;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Callbacks a role driver (or its UI) receives from a session.
///
/// Invoked from the session's own task; implementations should hand
/// heavy work off rather than block the negotiation loop.
#[async_trait]
pub trait SessionEvents: Send + Sync {
    async fn on_phase(&self, _phase: ConnectionPhase) {}

    /// The remote side attached a media track. Only viewers see this.
    async fn on_remote_track(&self, _track: Arc<TrackRemote>) {}

    /// A fatal session error. Start failures are returned from `start`
    /// instead; this only fires for errors on a running session.
    async fn on_error(&self, _error: SessionError) {}
}

/// Sink for callers that don't care about callbacks.
pub struct NoEvents;

#[async_trait]
impl SessionEvents for NoEvents {}
