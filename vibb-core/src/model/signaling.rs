use crate::model::peer::EmailId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelopes sent by a client to the relay.
///
/// Offer/answer/candidate payloads are opaque: the relay routes them to the
/// room peer without inspecting or mutating their contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    JoinRoom {
        room_id: RoomId,
        email_id: EmailId,
    },
    Msg {
        room_id: RoomId,
        email_id: EmailId,
        message: String,
    },
    WebrtcOffer {
        room_id: RoomId,
        offer: Value,
    },
    WebrtcAnswer {
        room_id: RoomId,
        answer: Value,
    },
    WebrtcIceCandidate {
        room_id: RoomId,
        candidate: Value,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    WatchBroadcast {
        room_id: RoomId,
    },
}

/// Envelopes delivered by the relay to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    JoinedRoom(String),
    UserJoined {
        email_id: EmailId,
    },
    Msg {
        email_id: EmailId,
        message: String,
    },
    RoomFull(String),
    UserLeft {
        email_id: EmailId,
    },
    WebrtcOffer {
        room_id: RoomId,
        offer: Value,
    },
    WebrtcAnswer {
        room_id: RoomId,
        answer: Value,
    },
    WebrtcIceCandidate {
        room_id: RoomId,
        candidate: Value,
    },
}
