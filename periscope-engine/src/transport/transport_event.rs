use periscope_core::CandidateInit;
use std::sync::Arc;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_remote::TrackRemote;

/// What the media transport reports back into the session's event loop.
pub enum TransportEvent {
    /// A local network-path candidate was discovered (trickle ICE).
    CandidateDiscovered(CandidateInit),

    /// The underlying peer connection changed state.
    StateChanged(RTCPeerConnectionState),

    /// The remote side attached a media track.
    TrackReceived(Arc<TrackRemote>),
}
