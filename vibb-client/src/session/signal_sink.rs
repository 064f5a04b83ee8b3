use async_trait::async_trait;
use vibb_core::ClientEvent;

/// Outbound half of the signaling channel, owned by the platform layer.
/// Delivery is fire-and-forget; transport failures surface on channel close.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, event: ClientEvent);
}
