use crate::error::SessionError;
use crate::transport::{TransportConfig, TransportEvent};
use periscope_core::{CandidateInit, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// Thin wrapper around one `RTCPeerConnection`.
///
/// All spontaneous activity (discovered candidates, state changes,
/// incoming tracks) is funneled into an event channel so the owning
/// session can process it on its single event loop.
#[derive(Clone)]
pub struct PeerTransport {
    peer_connection: Arc<RTCPeerConnection>,
}

impl PeerTransport {
    pub async fn new(
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, SessionError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|source| SessionError::TransportInit { source })?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|source| SessionError::TransportInit { source })?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|source| SessionError::TransportInit { source })?,
        );

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    let _ = tx.send(TransportEvent::StateChanged(state)).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                // None marks the end of gathering.
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else { return };
                let init = CandidateInit {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_mline_index: init.sdp_mline_index,
                };
                let _ = tx.send(TransportEvent::CandidateDiscovered(init)).await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                debug!(kind = %track.kind(), "remote track attached");
                let _ = tx.send(TransportEvent::TrackReceived(track)).await;
            })
        }));

        Ok(Self { peer_connection })
    }

    /// Attach a local track before negotiation starts. The returned RTP
    /// sender is drained in the background so interceptor reports keep
    /// flowing.
    pub async fn add_track(
        &self,
        track: Arc<dyn TrackLocal + Send + Sync>,
    ) -> Result<(), SessionError> {
        let rtp_sender = self
            .peer_connection
            .add_track(track)
            .await
            .map_err(|source| SessionError::TransportInit { source })?;

        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while let Ok((_, _)) = rtp_sender.read(&mut rtcp_buf).await {}
        });

        Ok(())
    }

    /// Create an offer and install it as the local description.
    pub async fn create_offer(&self) -> Result<SessionDescription, SessionError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|source| SessionError::DescriptionApply { source })?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(|source| SessionError::DescriptionApply { source })?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    /// Create an answer and install it as the local description.
    pub async fn create_answer(&self) -> Result<SessionDescription, SessionError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|source| SessionError::DescriptionApply { source })?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(|source| SessionError::DescriptionApply { source })?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    pub async fn set_remote_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), SessionError> {
        let parsed = match description.kind {
            SdpType::Offer => RTCSessionDescription::offer(description.sdp.clone()),
            SdpType::Answer => RTCSessionDescription::answer(description.sdp.clone()),
        }
        .map_err(|source| SessionError::DescriptionApply { source })?;

        self.peer_connection
            .set_remote_description(parsed)
            .await
            .map_err(|source| SessionError::DescriptionApply { source })
    }

    pub async fn add_ice_candidate(&self, candidate: CandidateInit) -> Result<(), SessionError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|source| SessionError::CandidateApply { source })
    }

    /// Close the underlying connection. Never fails upward: close is on
    /// every teardown path and must stay infallible.
    pub async fn close(&self) {
        if let Err(e) = self.peer_connection.close().await {
            debug!(error = %e, "peer connection close reported an error");
        }
    }
}
