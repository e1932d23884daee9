mod candidate_queue;
mod command;
mod events;
mod handle;
mod negotiation;

pub use candidate_queue::*;
pub use command::*;
pub use events::*;
pub use handle::*;
pub use negotiation::*;
