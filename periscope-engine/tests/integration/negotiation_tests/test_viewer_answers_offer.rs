use crate::integration::{assert_monotonic, init_tracing};
use crate::utils::{RecordingChannel, RecordingEvents, RemotePeer};
use periscope_core::{
    ConnectionPhase, Role, SessionDescription, SessionId, SignalMessage,
};
use periscope_engine::session::{NegotiationSession, SessionConfig};
use periscope_engine::signaling::{LocalHub, SignalingChannel};
use periscope_engine::transport::TransportConfig;
use std::sync::Arc;

#[tokio::test]
async fn viewer_answers_a_remote_offer() {
    init_tracing();

    let hub = LocalHub::new();
    let session_id = SessionId::new();
    let topic = session_id.topic();

    let channel = RecordingChannel::new(hub.channel());
    let events = RecordingEvents::new();

    let handle = NegotiationSession::start(
        SessionConfig {
            session_id,
            role: Role::Viewer,
            transport: TransportConfig::local_only(),
            tracks: Vec::new(),
        },
        channel.clone(),
        Arc::new(events.clone()),
    )
    .await
    .expect("viewer session failed to start");
    assert_eq!(handle.phase(), ConnectionPhase::Idle);

    // The far end offers through the shared topic.
    let remote = RemotePeer::new().await.expect("remote peer failed");
    let offer_sdp = remote
        .create_offer_with_track()
        .await
        .expect("remote offer failed");
    let driver = hub.channel();
    driver
        .publish(
            &topic,
            SignalMessage::Offer {
                offer: SessionDescription::offer(offer_sdp),
            },
        )
        .await
        .expect("publish failed");

    let answer = channel
        .wait_for_answer(5000)
        .await
        .expect("viewer did not answer");

    // The answer must be derived from the offer: the remote accepts it.
    remote
        .set_remote_answer(answer.sdp)
        .await
        .expect("answer not derived from offer");

    assert!(
        channel.offers().await.is_empty(),
        "a viewer must never publish an offer"
    );
    assert!(events.wait_for_phase(ConnectionPhase::AnswerSent, 2000).await);

    let phases = events.phases().await;
    assert!(phases.contains(&ConnectionPhase::OfferReceived));
    assert_monotonic(&phases);

    handle.stop().await;
    remote.close().await.expect("remote close failed");
}
