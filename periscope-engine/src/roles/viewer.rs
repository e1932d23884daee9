use crate::access::AccessGate;
use crate::error::SessionError;
use crate::roles::check_access;
use crate::session::{NegotiationSession, SessionConfig, SessionEvents, SessionHandle};
use crate::signaling::SignalingChannel;
use crate::transport::TransportConfig;
use periscope_core::{Role, SessionId};
use std::sync::Arc;

pub struct ViewerConfig {
    pub session_id: SessionId,
    pub transport: TransportConfig,
}

impl ViewerConfig {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            transport: TransportConfig::default(),
        }
    }
}

/// The receiving side of a call: waits for the offer and answers it.
/// The events sink is registered before the topic subscription happens,
/// so the remote-track callback cannot miss the stream.
pub struct Viewer {
    session: SessionHandle,
}

impl Viewer {
    pub async fn start(
        config: ViewerConfig,
        channel: Arc<dyn SignalingChannel>,
        gate: Arc<dyn AccessGate>,
        events: Arc<dyn SessionEvents>,
    ) -> Result<Self, SessionError> {
        check_access(gate.as_ref()).await?;

        let session = NegotiationSession::start(
            SessionConfig {
                session_id: config.session_id,
                role: Role::Viewer,
                transport: config.transport,
                tracks: Vec::new(),
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

    pub async fn stop(&self) {
        self.session.stop().await;
    }
}
