mod channel;
mod local;
mod ws;

pub use channel::*;
pub use local::*;
pub use ws::*;
