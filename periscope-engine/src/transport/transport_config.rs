use periscope_core::IceServerConfig;
use std::time::Duration;

pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Static configuration for one peer transport.
#[derive(Clone)]
pub struct TransportConfig {
    /// STUN/TURN endpoints used for network-path discovery.
    pub ice_servers: Vec<IceServerConfig>,

    /// How long a session may sit short of `Connected` before it is
    /// moved to `Failed`.
    pub negotiation_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Host-candidates-only config for in-process wiring and tests.
    pub fn local_only() -> Self {
        Self {
            ice_servers: vec![],
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
        }
    }
}
