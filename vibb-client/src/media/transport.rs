use crate::media::{MediaTracks, TrackKind};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to apply session description: {0}")]
    Description(String),
    #[error("failed to apply ICE candidate: {0}")]
    Candidate(String),
    #[error("transport closed")]
    Closed,
}

/// Invoked by the transport once per arriving remote track.
pub trait RemoteTrackSink: Send + Sync {
    fn on_remote_track(&self, kind: TrackKind);
}

/// Peer-to-peer transport capability: the platform's offer/answer/candidate
/// primitives behind one seam. Session descriptions and candidates stay
/// opaque JSON values end to end.
#[async_trait]
pub trait PeerTransport: Send {
    /// Adds the captured local tracks to the pending connection.
    async fn attach_tracks(&mut self, tracks: MediaTracks) -> Result<(), TransportError>;

    /// Creates the local offer and sets it as the local description.
    async fn create_offer(&mut self) -> Result<Value, TransportError>;

    /// Applies a remote offer and returns the local answer.
    async fn accept_offer(&mut self, offer: Value) -> Result<Value, TransportError>;

    /// Applies the remote answer to a previously created offer.
    async fn accept_answer(&mut self, answer: Value) -> Result<(), TransportError>;

    async fn add_ice_candidate(&mut self, candidate: Value) -> Result<(), TransportError>;

    /// Registers the sink notified when remote media starts arriving.
    /// Registered once per session, at construction.
    fn subscribe_remote_tracks(&mut self, sink: Arc<dyn RemoteTrackSink>);

    /// Releases the negotiated connection and any attached media.
    async fn close(&mut self) -> Result<(), TransportError>;
}
