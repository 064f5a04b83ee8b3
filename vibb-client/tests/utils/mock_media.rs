use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use vibb_client::media::{
    MediaCapture, MediaError, MediaTrack, MediaTracks, PeerTransport, RemoteTrackSink, TrackKind,
    TransportError,
};

struct StubTrack(TrackKind);

impl MediaTrack for StubTrack {
    fn kind(&self) -> TrackKind {
        self.0
    }
}

/// Capture capability returning stub tracks, or failing on demand.
pub struct MockCapture {
    fail: bool,
}

impl MockCapture {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl MediaCapture for MockCapture {
    async fn capture(&self) -> Result<MediaTracks, MediaError> {
        if self.fail {
            return Err(MediaError::DeviceUnavailable);
        }
        Ok(MediaTracks {
            audio: Box::new(StubTrack(TrackKind::Audio)),
            video: Box::new(StubTrack(TrackKind::Video)),
        })
    }
}

/// Shared observation handles for a [`MockTransport`] that has moved into a
/// session.
#[derive(Clone, Default)]
pub struct TransportHandles {
    pub attached: Arc<AtomicBool>,
    pub closed: Arc<AtomicBool>,
    pub applied_candidates: Arc<Mutex<Vec<Value>>>,
    pub remote_sink: Arc<Mutex<Option<Arc<dyn RemoteTrackSink>>>>,
}

impl TransportHandles {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn candidates(&self) -> Vec<Value> {
        self.applied_candidates.lock().unwrap().clone()
    }

    pub fn fire_remote_track(&self, kind: TrackKind) {
        let sink = self.remote_sink.lock().unwrap().clone();
        sink.expect("no remote track sink registered")
            .on_remote_track(kind);
    }
}

/// Scripted peer transport: deterministic offers/answers, recorded
/// candidates.
pub struct MockTransport {
    handles: TransportHandles,
    fail_offer: bool,
}

impl MockTransport {
    pub fn new() -> (Self, TransportHandles) {
        let handles = TransportHandles::default();
        (
            Self {
                handles: handles.clone(),
                fail_offer: false,
            },
            handles,
        )
    }

    pub fn failing_offer() -> (Self, TransportHandles) {
        let (mut transport, handles) = Self::new();
        transport.fail_offer = true;
        (transport, handles)
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn attach_tracks(&mut self, _tracks: MediaTracks) -> Result<(), TransportError> {
        self.handles.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<Value, TransportError> {
        if self.fail_offer {
            return Err(TransportError::Description("offer refused".to_string()));
        }
        Ok(json!({"type": "offer", "sdp": "v=0 mock-offer"}))
    }

    async fn accept_offer(&mut self, offer: Value) -> Result<Value, TransportError> {
        Ok(json!({"type": "answer", "sdp": format!("v=0 answer-to {}", offer["sdp"])}))
    }

    async fn accept_answer(&mut self, _answer: Value) -> Result<(), TransportError> {
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: Value) -> Result<(), TransportError> {
        self.handles
            .applied_candidates
            .lock()
            .unwrap()
            .push(candidate);
        Ok(())
    }

    fn subscribe_remote_tracks(&mut self, sink: Arc<dyn RemoteTrackSink>) {
        *self.handles.remote_sink.lock().unwrap() = Some(sink);
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.handles.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
