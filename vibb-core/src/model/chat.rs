use crate::model::peer::EmailId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// A relayed chat line. Transient: delivered to the other room members in
/// send order and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: RoomId,
    pub sender: EmailId,
    pub text: String,
}
