use crate::registry::{JoinOutcome, Participant, RoomRegistry};
use crate::relay::OutboundFrame;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vibb_core::{ClientEvent, EmailId, PeerId, RoomId, ServerEvent};

struct RelayInner {
    connections: DashMap<PeerId, mpsc::UnboundedSender<OutboundFrame>>,
    registry: RoomRegistry,
    watchers: DashMap<RoomId, Vec<PeerId>>,
    watching: DashMap<PeerId, RoomId>,
}

/// Owns one outbound channel per connected client and routes every inbound
/// envelope to the right room peers. All observable effects are delivered
/// envelopes; the relay never inspects offer/answer/candidate payloads.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                connections: DashMap::new(),
                registry: RoomRegistry::new(),
                watchers: DashMap::new(),
                watching: DashMap::new(),
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn add_connection(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<OutboundFrame>) {
        self.inner.connections.insert(peer_id, tx);
    }

    /// Single entry point for inbound envelopes from one client.
    pub fn dispatch(&self, peer_id: &PeerId, event: ClientEvent) {
        match event {
            ClientEvent::JoinRoom { room_id, email_id } => {
                self.handle_join(peer_id, room_id, email_id)
            }
            ClientEvent::Msg {
                room_id,
                email_id,
                message,
            } => self.handle_chat(peer_id, &room_id, email_id, message),
            ClientEvent::WebrtcOffer { room_id, offer } => {
                let event = ServerEvent::WebrtcOffer {
                    room_id: room_id.clone(),
                    offer,
                };
                self.forward_signal(peer_id, &room_id, event);
            }
            ClientEvent::WebrtcAnswer { room_id, answer } => {
                let event = ServerEvent::WebrtcAnswer {
                    room_id: room_id.clone(),
                    answer,
                };
                self.forward_signal(peer_id, &room_id, event);
            }
            ClientEvent::WebrtcIceCandidate { room_id, candidate } => {
                let event = ServerEvent::WebrtcIceCandidate {
                    room_id: room_id.clone(),
                    candidate,
                };
                self.forward_signal(peer_id, &room_id, event);
            }
            ClientEvent::LeaveRoom { room_id } => self.handle_leave(peer_id, &room_id),
            ClientEvent::WatchBroadcast { room_id } => self.handle_watch(peer_id, room_id),
        }
    }

    /// An opaque broadcast chunk from a room member, fanned out to the
    /// room's watchers.
    pub fn handle_chunk(&self, peer_id: &PeerId, chunk: Bytes) {
        let Some(room_id) = self.inner.registry.room_of(peer_id) else {
            debug!("Broadcast chunk from roomless peer {} dropped", peer_id);
            return;
        };
        let Some(watchers) = self.inner.watchers.get(&room_id) else {
            return;
        };
        for watcher in watchers.iter().filter(|w| *w != peer_id) {
            self.send_frame(watcher, OutboundFrame::Chunk(chunk.clone()));
        }
    }

    /// Channel close, whatever the cause: vacate the room, notify the
    /// remaining member, release watcher state and the send queue.
    pub fn disconnect(&self, peer_id: &PeerId) {
        if let Some(room_id) = self.inner.registry.room_of(peer_id) {
            self.handle_leave(peer_id, &room_id);
        }
        self.stop_watching(peer_id);
        self.inner.connections.remove(peer_id);
    }

    fn handle_join(&self, peer_id: &PeerId, room_id: RoomId, email_id: EmailId) {
        if let Some(previous) = self.inner.registry.room_of(peer_id)
            && previous != room_id
        {
            self.handle_leave(peer_id, &previous);
        }

        let participant = Participant::new(peer_id.clone(), email_id.clone());
        match self.inner.registry.join(&room_id, participant) {
            JoinOutcome::Admitted { peers_before } => {
                info!("{} joined room '{}'", email_id, room_id);
                self.send_event(
                    peer_id,
                    ServerEvent::JoinedRoom(format!("Joined room {room_id}")),
                );

                let announce = ServerEvent::UserJoined { email_id };
                for member in peers_before {
                    self.send_event(&member.peer, announce.clone());
                }
            }
            JoinOutcome::RoomFull => {
                info!("Room '{}' is full, rejecting {}", room_id, email_id);
                self.send_event(
                    peer_id,
                    ServerEvent::RoomFull(format!("Room {room_id} is full")),
                );
            }
        }
    }

    fn handle_chat(&self, peer_id: &PeerId, room_id: &RoomId, email_id: EmailId, message: String) {
        if !self.inner.registry.is_member(room_id, peer_id) {
            debug!("Chat from non-member {} for room '{}' dropped", peer_id, room_id);
            return;
        }

        let event = ServerEvent::Msg { email_id, message };
        for member in self.inner.registry.members_of(room_id, peer_id) {
            self.send_event(&member.peer, event.clone());
        }
    }

    /// Forwards an offer/answer/candidate envelope verbatim to the other
    /// room member. Senders outside the room (a rejected third joiner
    /// included) and envelopes with no recipient are dropped silently.
    fn forward_signal(&self, peer_id: &PeerId, room_id: &RoomId, event: ServerEvent) {
        if !self.inner.registry.is_member(room_id, peer_id) {
            debug!("Signal from non-member {} for room '{}' dropped", peer_id, room_id);
            return;
        }

        let peers = self.inner.registry.members_of(room_id, peer_id);
        if peers.is_empty() {
            debug!("No peer in room '{}' for signal from {}", room_id, peer_id);
            return;
        }
        for member in peers {
            self.send_event(&member.peer, event.clone());
        }
    }

    fn handle_leave(&self, peer_id: &PeerId, room_id: &RoomId) {
        let outcome = self.inner.registry.leave(room_id, peer_id);
        let Some(removed) = outcome.removed else {
            return;
        };

        info!("{} left room '{}'", removed.email, room_id);
        let notice = ServerEvent::UserLeft {
            email_id: removed.email,
        };
        for member in outcome.remaining {
            self.send_event(&member.peer, notice.clone());
        }
    }

    fn handle_watch(&self, peer_id: &PeerId, room_id: RoomId) {
        self.stop_watching(peer_id);

        self.inner
            .watching
            .insert(peer_id.clone(), room_id.clone());
        let mut watchers = self.inner.watchers.entry(room_id.clone()).or_default();
        if !watchers.contains(peer_id) {
            watchers.push(peer_id.clone());
        }
        info!("Peer {} watches broadcasts of room '{}'", peer_id, room_id);
    }

    fn stop_watching(&self, peer_id: &PeerId) {
        let Some((_, room_id)) = self.inner.watching.remove(peer_id) else {
            return;
        };
        if let Some(mut watchers) = self.inner.watchers.get_mut(&room_id) {
            watchers.retain(|p| p != peer_id);
        }
        self.inner
            .watchers
            .remove_if(&room_id, |_, watchers| watchers.is_empty());
    }

    fn send_event(&self, peer_id: &PeerId, event: ServerEvent) {
        self.send_frame(peer_id, OutboundFrame::Event(event));
    }

    fn send_frame(&self, peer_id: &PeerId, frame: OutboundFrame) {
        if let Some(conn) = self.inner.connections.get(peer_id) {
            if conn.send(frame).is_err() {
                warn!("Send queue for {} is closed", peer_id);
            }
        } else {
            debug!("Attempted to send to disconnected peer {}", peer_id);
        }
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}
