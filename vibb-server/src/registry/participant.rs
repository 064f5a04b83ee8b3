use vibb_core::{EmailId, PeerId};

/// One admitted member of a room: the connection identity plus the display
/// label announced to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub peer: PeerId,
    pub email: EmailId,
}

impl Participant {
    pub fn new(peer: PeerId, email: EmailId) -> Self {
        Self { peer, email }
    }
}
