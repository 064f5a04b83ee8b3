use crate::media::{
    MediaCapture, MediaError, PeerTransport, RemoteTrackSink, TrackKind, TransportError,
};
use crate::session::{SessionEvents, SignalSink};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use vibb_core::{ChatMessage, ClientEvent, EmailId, RoomId, ServerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    OfferSent,
    OfferReceived,
    Connected,
    Closed,
}

/// What to do with ICE candidates that arrive before the remote description
/// is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidatePolicy {
    /// Queue and apply once the remote description lands.
    #[default]
    Buffer,
    /// Discard with a debug trace.
    Drop,
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub candidate_policy: CandidatePolicy,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Client-side negotiation engine for one peer pairing in one room.
///
/// Every relay-delivered envelope enters through [`handle_event`] — one
/// dispatch point, no reassignable callbacks. Protocol violations are logged
/// and ignored; media or transport failures abort the negotiation back to
/// `Idle` and are returned to the caller. `Closed` is terminal: a fresh
/// session is created for any subsequent peer.
///
/// [`handle_event`]: PeerSession::handle_event
pub struct PeerSession<T: PeerTransport> {
    room_id: RoomId,
    email_id: EmailId,
    state: NegotiationState,
    transport: T,
    media: Arc<dyn MediaCapture>,
    sink: Arc<dyn SignalSink>,
    events: Arc<dyn SessionEvents>,
    config: SessionConfig,
    media_attached: bool,
    remote_description_set: bool,
    pending_candidates: Vec<Value>,
    rejected: bool,
}

struct ForwardRemoteTracks {
    events: Arc<dyn SessionEvents>,
}

impl RemoteTrackSink for ForwardRemoteTracks {
    fn on_remote_track(&self, kind: TrackKind) {
        self.events.on_remote_track(kind);
    }
}

impl<T: PeerTransport> PeerSession<T> {
    pub fn new(
        room_id: RoomId,
        email_id: EmailId,
        mut transport: T,
        media: Arc<dyn MediaCapture>,
        sink: Arc<dyn SignalSink>,
        events: Arc<dyn SessionEvents>,
        config: SessionConfig,
    ) -> Self {
        transport.subscribe_remote_tracks(Arc::new(ForwardRemoteTracks {
            events: events.clone(),
        }));

        Self {
            room_id,
            email_id,
            state: NegotiationState::Idle,
            transport,
            media,
            sink,
            events,
            config,
            media_attached: false,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            rejected: false,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn email_id(&self) -> &EmailId {
        &self.email_id
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    /// Announces this participant to the relay.
    pub async fn join(&self) {
        self.sink
            .send(ClientEvent::JoinRoom {
                room_id: self.room_id.clone(),
                email_id: self.email_id.clone(),
            })
            .await;
    }

    /// Relays a chat line to the other room member. Suppressed after a
    /// room-full rejection, matching the relay's own policy.
    pub async fn send_chat(&self, text: impl Into<String>) {
        if self.rejected {
            debug!("Room '{}' is full, chat suppressed", self.room_id);
            return;
        }

        self.sink
            .send(ClientEvent::Msg {
                room_id: self.room_id.clone(),
                email_id: self.email_id.clone(),
                message: text.into(),
            })
            .await;
    }

    /// Leaves the room and releases the negotiated session.
    pub async fn leave(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }

        self.sink
            .send(ClientEvent::LeaveRoom {
                room_id: self.room_id.clone(),
            })
            .await;
        self.close_transport().await;
        self.set_state(NegotiationState::Closed);
    }

    /// Single entry point for relay-delivered envelopes.
    pub async fn handle_event(&mut self, event: ServerEvent) -> Result<(), SessionError> {
        match event {
            ServerEvent::JoinedRoom(message) => {
                info!("{}", message);
                Ok(())
            }
            ServerEvent::UserJoined { email_id } => self.initiate(email_id).await,
            ServerEvent::Msg { email_id, message } => {
                self.events.on_chat(ChatMessage {
                    room: self.room_id.clone(),
                    sender: email_id,
                    text: message,
                });
                Ok(())
            }
            ServerEvent::RoomFull(message) => {
                self.rejected = true;
                self.events.on_room_full(&message);
                Ok(())
            }
            ServerEvent::UserLeft { email_id } => self.handle_peer_left(email_id).await,
            ServerEvent::WebrtcOffer { offer, .. } => self.handle_offer(offer).await,
            ServerEvent::WebrtcAnswer { answer, .. } => self.handle_answer(answer).await,
            ServerEvent::WebrtcIceCandidate { candidate, .. } => {
                self.handle_candidate(candidate).await
            }
        }
    }

    /// A second participant arrived: this side initiates the handshake.
    async fn initiate(&mut self, email_id: EmailId) -> Result<(), SessionError> {
        self.events.on_peer_joined(&email_id);

        if self.state != NegotiationState::Idle {
            warn!("user-joined while {:?}, ignoring", self.state);
            return Ok(());
        }

        match self.send_offer().await {
            Ok(()) => {
                self.set_state(NegotiationState::OfferSent);
                Ok(())
            }
            Err(e) => {
                warn!("Negotiation aborted: {}", e);
                Err(e)
            }
        }
    }

    async fn send_offer(&mut self) -> Result<(), SessionError> {
        self.ensure_media().await?;
        let offer = self.transport.create_offer().await?;
        self.sink
            .send(ClientEvent::WebrtcOffer {
                room_id: self.room_id.clone(),
                offer,
            })
            .await;
        Ok(())
    }

    async fn handle_offer(&mut self, offer: Value) -> Result<(), SessionError> {
        if self.state != NegotiationState::Idle {
            warn!("Offer received while {:?}, ignoring", self.state);
            return Ok(());
        }

        self.set_state(NegotiationState::OfferReceived);
        match self.send_answer(offer).await {
            Ok(()) => {
                self.set_state(NegotiationState::Connected);
                Ok(())
            }
            Err(e) => {
                warn!("Negotiation aborted: {}", e);
                self.set_state(NegotiationState::Idle);
                Err(e)
            }
        }
    }

    async fn send_answer(&mut self, offer: Value) -> Result<(), SessionError> {
        self.ensure_media().await?;
        let answer = self.transport.accept_offer(offer).await?;
        self.remote_description_set = true;
        self.flush_candidates().await;
        self.sink
            .send(ClientEvent::WebrtcAnswer {
                room_id: self.room_id.clone(),
                answer,
            })
            .await;
        Ok(())
    }

    async fn handle_answer(&mut self, answer: Value) -> Result<(), SessionError> {
        if self.state != NegotiationState::OfferSent {
            warn!("Answer received while {:?}, ignoring", self.state);
            return Ok(());
        }

        match self.transport.accept_answer(answer).await {
            Ok(()) => {
                self.remote_description_set = true;
                self.flush_candidates().await;
                self.set_state(NegotiationState::Connected);
                Ok(())
            }
            Err(e) => {
                warn!("Negotiation aborted: {}", e);
                self.set_state(NegotiationState::Idle);
                Err(e.into())
            }
        }
    }

    async fn handle_candidate(&mut self, candidate: Value) -> Result<(), SessionError> {
        if self.state == NegotiationState::Closed {
            debug!("ICE candidate after close dropped");
            return Ok(());
        }

        if !self.remote_description_set {
            match self.config.candidate_policy {
                CandidatePolicy::Buffer => {
                    debug!("Buffering early ICE candidate");
                    self.pending_candidates.push(candidate);
                }
                CandidatePolicy::Drop => debug!("Dropping early ICE candidate"),
            }
            return Ok(());
        }

        // Candidates apply incrementally; one bad candidate is tolerated.
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!("Failed to apply ICE candidate: {}", e);
        }
        Ok(())
    }

    async fn handle_peer_left(&mut self, email_id: EmailId) -> Result<(), SessionError> {
        if self.state == NegotiationState::Closed {
            return Ok(());
        }

        info!("{} left room '{}'", email_id, self.room_id);
        self.events.on_peer_left(&email_id);
        self.close_transport().await;
        self.set_state(NegotiationState::Closed);
        Ok(())
    }

    async fn ensure_media(&mut self) -> Result<(), SessionError> {
        if self.media_attached {
            return Ok(());
        }

        let tracks = self.media.capture().await?;
        self.transport.attach_tracks(tracks).await?;
        self.media_attached = true;
        Ok(())
    }

    async fn flush_candidates(&mut self) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Failed to apply buffered ICE candidate: {}", e);
            }
        }
    }

    async fn close_transport(&mut self) {
        if let Err(e) = self.transport.close().await {
            warn!("Transport close failed: {}", e);
        }
        self.pending_candidates.clear();
        self.remote_description_set = false;
        self.media_attached = false;
    }

    fn set_state(&mut self, state: NegotiationState) {
        if self.state == state {
            return;
        }
        debug!("Negotiation state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.events.on_state_change(state);
    }
}
