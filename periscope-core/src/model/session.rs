use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one negotiation instance. Both peers of a call share it:
/// the signaling topic is derived from this id, so messages never leak
/// between sessions.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The signaling topic this session publishes and subscribes on.
    pub fn topic(&self) -> String {
        self.0.to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the call this peer plays.
///
/// The broadcaster initiates the offer and sends media; the viewer
/// responds with an answer and receives media.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Broadcaster,
    Viewer,
}

/// Where a single connection attempt currently stands.
///
/// Transitions are monotonic: a session never returns to `Idle`, and
/// `Failed`/`Closed` are reachable from any non-terminal phase.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    Idle,
    OfferSent,
    OfferReceived,
    AnswerSent,
    AnswerReceived,
    Connected,
    Failed,
    Closed,
}

impl ConnectionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionPhase::Failed | ConnectionPhase::Closed)
    }

    /// Rank used to enforce monotonic forward movement. Terminal phases
    /// outrank everything so no transition can leave them.
    fn rank(&self) -> u8 {
        match self {
            ConnectionPhase::Idle => 0,
            ConnectionPhase::OfferSent | ConnectionPhase::OfferReceived => 1,
            ConnectionPhase::AnswerSent | ConnectionPhase::AnswerReceived => 2,
            ConnectionPhase::Connected => 3,
            ConnectionPhase::Failed | ConnectionPhase::Closed => 4,
        }
    }

    /// Whether moving to `next` keeps the phase history monotonic.
    pub fn can_advance_to(&self, next: ConnectionPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.is_terminal() || next.rank() > self.rank()
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionPhase::Idle => "idle",
            ConnectionPhase::OfferSent => "offer_sent",
            ConnectionPhase::OfferReceived => "offer_received",
            ConnectionPhase::AnswerSent => "answer_sent",
            ConnectionPhase::AnswerReceived => "answer_received",
            ConnectionPhase::Connected => "connected",
            ConnectionPhase::Failed => "failed",
            ConnectionPhase::Closed => "closed",
        };
        write!(f, "{name}")
    }
}
