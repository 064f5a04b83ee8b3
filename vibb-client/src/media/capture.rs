use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("capture device unavailable")]
    DeviceUnavailable,
    #[error("media capture failed: {0}")]
    CaptureFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live local track owned by the platform media layer.
pub trait MediaTrack: Send {
    fn kind(&self) -> TrackKind;
}

/// The two synchronized tracks produced by one capture request.
pub struct MediaTracks {
    pub audio: Box<dyn MediaTrack>,
    pub video: Box<dyn MediaTrack>,
}

/// Platform capability that opens the capture device and hands back live
/// tracks. Implemented outside this crate.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn capture(&self) -> Result<MediaTracks, MediaError>;
}
