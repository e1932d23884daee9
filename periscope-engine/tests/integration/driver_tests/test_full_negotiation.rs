use crate::integration::{assert_monotonic, init_tracing};
use crate::utils::RecordingEvents;
use periscope_core::{ConnectionPhase, SessionId};
use periscope_engine::access::OpenGate;
use periscope_engine::media::SyntheticSource;
use periscope_engine::roles::{Broadcaster, BroadcasterConfig, Viewer, ViewerConfig};
use periscope_engine::signaling::LocalHub;
use periscope_engine::transport::TransportConfig;
use std::sync::Arc;

/// Full in-process run: a broadcaster and a viewer on the same topic
/// negotiate through the shared hub until media flows.
#[tokio::test]
async fn broadcaster_and_viewer_connect_end_to_end() {
    init_tracing();

    let hub = LocalHub::new();
    let session_id = SessionId::new();

    let viewer_events = RecordingEvents::new();
    // Viewer first, so the broadcaster's opening offer has a listener.
    let viewer = Viewer::start(
        ViewerConfig {
            session_id: session_id.clone(),
            transport: TransportConfig::local_only(),
        },
        Arc::new(hub.channel()),
        Arc::new(OpenGate),
        Arc::new(viewer_events.clone()),
    )
    .await
    .expect("viewer failed to start");

    let broadcaster_events = RecordingEvents::new();
    let broadcaster = Broadcaster::start(
        BroadcasterConfig {
            session_id,
            transport: TransportConfig::local_only(),
            video: true,
            audio: true,
        },
        Arc::new(hub.channel()),
        Arc::new(SyntheticSource::new()),
        Arc::new(OpenGate),
        Arc::new(broadcaster_events.clone()),
    )
    .await
    .expect("broadcaster failed to start");

    assert!(
        broadcaster_events
            .wait_for_phase(ConnectionPhase::Connected, 15_000)
            .await,
        "broadcaster never connected: {:?}",
        broadcaster_events.phases().await
    );
    assert!(
        viewer_events
            .wait_for_phase(ConnectionPhase::Connected, 15_000)
            .await,
        "viewer never connected: {:?}",
        viewer_events.phases().await
    );

    assert!(
        viewer_events.wait_for_track(10_000).await,
        "viewer never received a remote track"
    );
    let kinds = viewer_events.track_kinds().await;
    assert!(
        kinds.iter().any(|k| k == "video"),
        "no video track among {kinds:?}"
    );

    // The signaling flowed one way: the viewer answered, never offered.
    let viewer_phases = viewer_events.phases().await;
    assert!(viewer_phases.contains(&ConnectionPhase::OfferReceived));
    assert!(viewer_phases.contains(&ConnectionPhase::AnswerSent));
    let broadcaster_phases = broadcaster_events.phases().await;
    assert!(broadcaster_phases.contains(&ConnectionPhase::OfferSent));
    assert!(broadcaster_phases.contains(&ConnectionPhase::AnswerReceived));

    assert_monotonic(&viewer_phases);
    assert_monotonic(&broadcaster_phases);

    assert!(
        broadcaster_events.errors().await.is_empty(),
        "broadcaster errors: {:?}",
        broadcaster_events.errors().await
    );
    assert!(
        viewer_events.errors().await.is_empty(),
        "viewer errors: {:?}",
        viewer_events.errors().await
    );

    broadcaster.stop().await;
    viewer.stop().await;
}
