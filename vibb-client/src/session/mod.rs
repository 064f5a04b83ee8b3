mod peer_session;
mod session_events;
mod signal_sink;

pub use peer_session::*;
pub use session_events::*;
pub use signal_sink::*;
