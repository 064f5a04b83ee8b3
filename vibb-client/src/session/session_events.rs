use crate::media::TrackKind;
use crate::session::NegotiationState;
use vibb_core::{ChatMessage, EmailId};

/// Callbacks exposed to the UI layer. All methods default to no-ops so a
/// consumer only implements what it renders.
pub trait SessionEvents: Send + Sync {
    fn on_state_change(&self, _state: NegotiationState) {}

    fn on_chat(&self, _message: ChatMessage) {}

    fn on_room_full(&self, _message: &str) {}

    fn on_peer_joined(&self, _email: &EmailId) {}

    fn on_peer_left(&self, _email: &EmailId) {}

    fn on_remote_track(&self, _kind: TrackKind) {}
}
