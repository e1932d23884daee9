mod session;
mod signaling;
mod user;

pub use session::{ConnectionPhase, Role, SessionId};
pub use signaling::{CandidateInit, IceServerConfig, SdpType, SessionDescription, SignalMessage};
pub use user::{ApprovalState, User, UserId};
