use crate::integration::init_tracing;
use crate::utils::RecordingEvents;
use async_trait::async_trait;
use periscope_core::SessionId;
use periscope_engine::access::OpenGate;
use periscope_engine::error::{MediaError, SessionError};
use periscope_engine::media::{MediaSource, SyntheticSource};
use periscope_engine::roles::{Broadcaster, BroadcasterConfig};
use periscope_engine::signaling::LocalHub;
use periscope_engine::transport::TransportConfig;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// A capture backend with no working devices.
struct FailingSource;

#[async_trait]
impl MediaSource for FailingSource {
    async fn acquire(
        &self,
        _video: bool,
        _audio: bool,
    ) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, MediaError> {
        Err(MediaError::Acquisition("no capture device".into()))
    }
}

fn broadcaster_config() -> BroadcasterConfig {
    BroadcasterConfig {
        session_id: SessionId::new(),
        transport: TransportConfig::local_only(),
        video: true,
        audio: true,
    }
}

#[tokio::test]
async fn capture_failure_aborts_the_start() {
    init_tracing();

    let hub = LocalHub::new();
    let result = Broadcaster::start(
        broadcaster_config(),
        Arc::new(hub.channel()),
        Arc::new(FailingSource),
        Arc::new(OpenGate),
        Arc::new(RecordingEvents::new()),
    )
    .await;

    match result {
        Err(SessionError::MediaAcquisition(e)) => {
            assert!(e.to_string().contains("no capture device"));
        }
        Err(other) => panic!("expected a media error, got: {other}"),
        Ok(_) => panic!("broadcaster started without media"),
    }
}

#[tokio::test]
async fn requesting_no_tracks_is_a_media_error() {
    init_tracing();

    let hub = LocalHub::new();
    let result = Broadcaster::start(
        BroadcasterConfig {
            video: false,
            audio: false,
            ..broadcaster_config()
        },
        Arc::new(hub.channel()),
        Arc::new(SyntheticSource::new()),
        Arc::new(OpenGate),
        Arc::new(RecordingEvents::new()),
    )
    .await;

    assert!(matches!(result, Err(SessionError::MediaAcquisition(_))));
}
