
pub use recording_channel::*;
pub use recording_events::*;
pub use remote_peer::*;
