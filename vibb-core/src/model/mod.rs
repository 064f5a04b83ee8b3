mod chat;
mod peer;
mod room;
mod signaling;

pub use chat::ChatMessage;
pub use peer::{EmailId, PeerId};
pub use room::RoomId;
pub use signaling::{ClientEvent, ServerEvent};
