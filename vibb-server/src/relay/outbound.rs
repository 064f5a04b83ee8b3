use bytes::Bytes;
use vibb_core::ServerEvent;

/// One frame queued on a connection's send task. Events become JSON text
/// frames on the wire; broadcast chunks stay opaque binary.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Event(ServerEvent),
    Chunk(Bytes),
}
