//! Peer-to-peer negotiation engine: an offer/answer state machine over an
//! abstract signaling channel, with role drivers for the broadcasting and
//! viewing sides of a call.

pub mod access;
pub mod error;
pub mod media;
pub mod roles;
pub mod session;
pub mod signaling;
pub mod transport;

pub use error::{AccessDenial, ChannelError, MediaError, SessionError};
pub use roles::{Broadcaster, BroadcasterConfig, Viewer, ViewerConfig};
pub use session::{NegotiationSession, SessionConfig, SessionEvents, SessionHandle};
pub use signaling::SignalingChannel;
pub use transport::TransportConfig;
