use crate::compositor::FrameBuffer;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoder failure: {0}")]
    Backend(String),
}

/// Chunked-encoder capability. Consumes composite frames and yields an
/// opaque binary unit once per completed fixed-duration segment (100 ms in
/// the reference configuration); `None` while a segment is still
/// accumulating. Implemented by the platform codec layer.
#[async_trait]
pub trait ChunkEncoder: Send {
    async fn encode(&mut self, frame: &FrameBuffer) -> Result<Option<Bytes>, EncodeError>;
}

/// Outbound path for completed broadcast chunks, normally the relay
/// connection's binary lane.
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    async fn send_chunk(&self, chunk: Bytes);
}
