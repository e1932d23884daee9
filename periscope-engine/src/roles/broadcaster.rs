use crate::access::AccessGate;
use crate::error::SessionError;
use crate::media::MediaSource;
use crate::roles::check_access;
use crate::session::{NegotiationSession, SessionConfig, SessionEvents, SessionHandle};
use crate::signaling::SignalingChannel;
use crate::transport::TransportConfig;
use periscope_core::{Role, SessionId};
use std::sync::Arc;
use tracing::info;

pub struct BroadcasterConfig {
    pub session_id: SessionId,
    pub transport: TransportConfig,
    pub video: bool,
    pub audio: bool,
}

impl BroadcasterConfig {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            transport: TransportConfig::default(),
            video: true,
            audio: true,
        }
    }
}

/// The sending side of a call: acquires local media, attaches it and
/// initiates the offer.
pub struct Broadcaster {
    session: SessionHandle,
}

impl Broadcaster {
    pub async fn start(
        config: BroadcasterConfig,
        channel: Arc<dyn SignalingChannel>,
        media: Arc<dyn MediaSource>,
        gate: Arc<dyn AccessGate>,
        events: Arc<dyn SessionEvents>,
    ) -> Result<Self, SessionError> {
        check_access(gate.as_ref()).await?;

        // Media acquisition failures abort the start; there is no retry
        // here, the caller owns user-visible reporting.
        let tracks = media.acquire(config.video, config.audio).await?;
        info!(session = %config.session_id, tracks = tracks.len(), "local media acquired");

        let session = NegotiationSession::start(
            SessionConfig {
                session_id: config.session_id,
                role: Role::Broadcaster,
                transport: config.transport,
                tracks,
            },
            channel,
            events,
        )
        .await?;

        Ok(Self { session })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Tear down: stops the session, which closes the transport and with
    /// it the attached tracks and their feeders.
    pub async fn stop(&self) {
        self.session.stop().await;
    }
}
