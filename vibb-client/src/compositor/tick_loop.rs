use crate::compositor::{BroadcastSink, ChunkEncoder, CompositeFrame, FrameBuffer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// A view of the latest rendered frame of one video element. Polled each
/// tick; `None` while nothing has been rendered yet.
pub trait FrameSource: Send + Sync {
    fn latest_frame(&self) -> Option<FrameBuffer>;
}

#[derive(Debug, Clone)]
pub struct CompositorConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_rate: 25,
        }
    }
}

enum CompositorCommand {
    Stop,
}

/// Fixed-rate tick loop merging two independently-clocked sources into one
/// outgoing composite stream. Runs independently of negotiation state;
/// starting before either source renders degrades to drawing the available
/// side only.
pub struct Compositor<E: ChunkEncoder> {
    local: Arc<dyn FrameSource>,
    remote: Arc<dyn FrameSource>,
    encoder: E,
    sink: Arc<dyn BroadcastSink>,
    command_rx: mpsc::Receiver<CompositorCommand>,
    frame: CompositeFrame,
    tick: Duration,
}

impl<E: ChunkEncoder + 'static> Compositor<E> {
    pub fn spawn(
        config: CompositorConfig,
        local: Arc<dyn FrameSource>,
        remote: Arc<dyn FrameSource>,
        encoder: E,
        sink: Arc<dyn BroadcastSink>,
    ) -> CompositorHandle {
        let (command_tx, command_rx) = mpsc::channel(1);

        let compositor = Self {
            local,
            remote,
            encoder,
            sink,
            command_rx,
            frame: CompositeFrame::new(config.width, config.height),
            tick: Duration::from_secs(1) / config.frame_rate.max(1),
        };
        let task = tokio::spawn(compositor.run());

        CompositorHandle { command_tx, task }
    }

    async fn run(mut self) {
        info!("Compositor tick loop started");

        let mut interval = time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick_once().await,
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CompositorCommand::Stop) => info!("Compositor stop requested"),
                        None => debug!("Compositor handle dropped"),
                    }
                    break;
                }
            }
        }

        // Encoder and sources drop here; a partially accumulated segment is
        // discarded, never emitted.
        info!("Compositor tick loop finished");
    }

    async fn tick_once(&mut self) {
        if let Some(frame) = self.local.latest_frame() {
            self.frame.blit_left(&frame);
        }
        if let Some(frame) = self.remote.latest_frame() {
            self.frame.blit_right(&frame);
        }

        match self.encoder.encode(self.frame.buffer()).await {
            Ok(Some(chunk)) => self.sink.send_chunk(chunk).await,
            Ok(None) => {}
            Err(e) => warn!("Encoder error: {}", e),
        }
    }
}

/// Owner's handle to a running compositor.
pub struct CompositorHandle {
    command_tx: mpsc::Sender<CompositorCommand>,
    task: JoinHandle<()>,
}

impl CompositorHandle {
    /// Stops the tick loop and waits for its resources to be released.
    /// Stopping with no chunk in flight is not an error.
    pub async fn stop(self) {
        let _ = self.command_tx.send(CompositorCommand::Stop).await;
        if let Err(e) = self.task.await {
            warn!("Compositor task join failed: {}", e);
        }
    }
}
