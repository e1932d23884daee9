use crate::integration::init_tracing;
use crate::utils::RecordingEvents;
use async_trait::async_trait;
use periscope_core::{ApprovalState, SessionId, User, UserId};
use periscope_engine::access::AccessGate;
use periscope_engine::error::{AccessDenial, SessionError};
use periscope_engine::media::SyntheticSource;
use periscope_engine::roles::{Broadcaster, BroadcasterConfig, Viewer, ViewerConfig};
use periscope_engine::signaling::LocalHub;
use periscope_engine::transport::TransportConfig;
use std::sync::Arc;

/// Gate with a fixed answer, standing in for the external account store.
struct StaticGate {
    user: Option<User>,
    state: ApprovalState,
}

impl StaticGate {
    fn signed_in(state: ApprovalState) -> Arc<Self> {
        Arc::new(Self {
            user: Some(User {
                id: UserId::new(),
                email: "someone@example.com".into(),
            }),
            state,
        })
    }

    fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            user: None,
            state: ApprovalState::Approved,
        })
    }
}

#[async_trait]
impl AccessGate for StaticGate {
    async fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    async fn approval_state(&self, _user: &User) -> ApprovalState {
        self.state
    }
}

fn assert_denied(result: Result<Viewer, SessionError>, expected: AccessDenial) {
    match result {
        Err(SessionError::AccessDenied { reason }) => assert_eq!(reason, expected),
        Err(other) => panic!("expected access denial, got: {other}"),
        Ok(_) => panic!("session started despite {expected}"),
    }
}

async fn try_viewer(gate: Arc<dyn AccessGate>) -> Result<Viewer, SessionError> {
    let hub = LocalHub::new();
    let config = ViewerConfig {
        session_id: SessionId::new(),
        transport: TransportConfig::local_only(),
    };
    Viewer::start(
        config,
        Arc::new(hub.channel()),
        gate,
        Arc::new(RecordingEvents::new()),
    )
    .await
}

#[tokio::test]
async fn signed_out_user_cannot_start() {
    init_tracing();
    assert_denied(
        try_viewer(StaticGate::signed_out()).await,
        AccessDenial::NotSignedIn,
    );
}

#[tokio::test]
async fn pending_user_cannot_start() {
    init_tracing();
    assert_denied(
        try_viewer(StaticGate::signed_in(ApprovalState::Pending)).await,
        AccessDenial::Pending,
    );
}

#[tokio::test]
async fn rejected_user_cannot_start() {
    init_tracing();
    assert_denied(
        try_viewer(StaticGate::signed_in(ApprovalState::Rejected)).await,
        AccessDenial::Rejected,
    );
}

#[tokio::test]
async fn broadcaster_is_gated_before_media_is_touched() {
    init_tracing();

    let hub = LocalHub::new();
    let result = Broadcaster::start(
        BroadcasterConfig {
            session_id: SessionId::new(),
            transport: TransportConfig::local_only(),
            video: true,
            audio: true,
        },
        Arc::new(hub.channel()),
        Arc::new(SyntheticSource::new()),
        StaticGate::signed_in(ApprovalState::Pending),
        Arc::new(RecordingEvents::new()),
    )
    .await;

    match result {
        Err(SessionError::AccessDenied { reason }) => assert_eq!(reason, AccessDenial::Pending),
        Err(other) => panic!("expected access denial, got: {other}"),
        Ok(_) => panic!("broadcaster started despite pending approval"),
    }
}
