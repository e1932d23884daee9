use std::fmt;
use thiserror::Error;

/// Why an access gate refused to let a session start.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AccessDenial {
    NotSignedIn,
    Pending,
    Rejected,
}

impl fmt::Display for AccessDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            AccessDenial::NotSignedIn => "no signed-in user",
            AccessDenial::Pending => "account awaiting approval",
            AccessDenial::Rejected => "account rejected",
        };
        write!(f, "{reason}")
    }
}

/// Failures of the signaling channel itself, as opposed to the session
/// logic running on top of it.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("signaling channel closed")]
    Closed,

    #[error("not subscribed to topic '{0}'")]
    NotSubscribed(String),

    #[error("failed to reach signaling relay: {0}")]
    Connect(String),

    #[error("failed to encode signaling message: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to acquire local media: {0}")]
    Acquisition(String),
}

/// The session-level error taxonomy.
///
/// Only `TransportInit`, `MediaAcquisition` and `AccessDenied` abort a
/// start; `DescriptionApply` moves a running session to `Failed`;
/// `CandidateApply` is logged and the session continues.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to initialize media transport: {source}")]
    TransportInit {
        #[source]
        source: webrtc::Error,
    },

    #[error(transparent)]
    MediaAcquisition(#[from] MediaError),

    #[error("failed to apply session description: {source}")]
    DescriptionApply {
        #[source]
        source: webrtc::Error,
    },

    #[error("failed to apply remote candidate: {source}")]
    CandidateApply {
        #[source]
        source: webrtc::Error,
    },

    #[error("session start denied: {reason}")]
    AccessDenied { reason: AccessDenial },

    #[error(transparent)]
    Channel(#[from] ChannelError),
}
