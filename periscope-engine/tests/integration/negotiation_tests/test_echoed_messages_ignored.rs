use crate::integration::init_tracing;
use crate::utils::{RecordingChannel, RecordingEvents};
use periscope_core::{ConnectionPhase, Role, SessionDescription, SessionId, SignalMessage};
use periscope_engine::media::{MediaSource, SyntheticSource};
use periscope_engine::session::{NegotiationSession, SessionConfig};
use periscope_engine::signaling::{LocalHub, SignalingChannel};
use periscope_engine::transport::TransportConfig;
use std::sync::Arc;
use std::time::Duration;

/// The in-process hub delivers a publisher's own messages back to it, so
/// a broadcaster always sees its own offer echoed. It must treat that as
/// noise and hold its phase.
#[tokio::test]
async fn broadcaster_ignores_its_own_echoed_offer() {
    init_tracing();

    let hub = LocalHub::new();
    let channel = RecordingChannel::new(hub.channel());
    let tracks = SyntheticSource::new()
        .acquire(true, false)
        .await
        .expect("failed to acquire synthetic media");

    let handle = NegotiationSession::start(
        SessionConfig {
            session_id: SessionId::new(),
            role: Role::Broadcaster,
            transport: TransportConfig::local_only(),
            tracks,
        },
        channel.clone(),
        Arc::new(RecordingEvents::new()),
    )
    .await
    .expect("broadcaster session failed to start");

    channel.wait_for_offer(5000).await.expect("no offer published");

    // Give the echo time to come back around and be processed.
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(handle.phase(), ConnectionPhase::OfferSent);
    assert_eq!(
        channel.offers().await.len(),
        1,
        "echoed offer must not trigger a re-offer"
    );
    assert!(
        channel.answers().await.is_empty(),
        "echoed offer must not be answered"
    );

    handle.stop().await;
}

/// An answer arriving at a viewer that never received an offer is either
/// an echo or stale traffic; it must not move the session.
#[tokio::test]
async fn viewer_ignores_a_stray_answer() {
    init_tracing();

    let hub = LocalHub::new();
    let session_id = SessionId::new();
    let topic = session_id.topic();

    let events = RecordingEvents::new();
    let handle = NegotiationSession::start(
        SessionConfig {
            session_id,
            role: Role::Viewer,
            transport: TransportConfig::local_only(),
            tracks: Vec::new(),
        },
        RecordingChannel::new(hub.channel()),
        Arc::new(events.clone()),
    )
    .await
    .expect("viewer session failed to start");

    let driver = hub.channel();
    driver
        .publish(
            &topic,
            SignalMessage::Answer {
                answer: SessionDescription::answer("v=0"),
            },
        )
        .await
        .expect("publish failed");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.phase(), ConnectionPhase::Idle);
    assert!(
        events.errors().await.is_empty(),
        "a stray answer must not produce errors"
    );

    handle.stop().await;
}
