use std::sync::Arc;
use std::time::Duration;
use vibb_client::compositor::{BYTES_PER_PIXEL, Compositor, CompositorConfig};

use crate::integration::init_tracing;
use crate::utils::{ChunkCollector, SegmentingEncoder, SharedSource};

fn small_config() -> CompositorConfig {
    CompositorConfig {
        width: 8,
        height: 4,
        frame_rate: 25,
    }
}

#[tokio::test(start_paused = true)]
async fn test_sides_are_merged_and_chunks_emitted() {
    init_tracing();

    let local = SharedSource::solid(4, 4, 0x11);
    let remote = SharedSource::solid(4, 4, 0x22);
    let (encoder, frames) = SegmentingEncoder::new(2);
    let sink = ChunkCollector::new();

    let handle = Compositor::spawn(
        small_config(),
        local,
        remote,
        encoder,
        Arc::new(sink.clone()),
    );

    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.stop().await;

    assert!(sink.count() >= 1, "expected at least one completed chunk");

    let frames = frames.lock().unwrap();
    let last = frames.last().expect("at least one tick happened");
    assert_eq!(last.data()[0], 0x11);
    assert_eq!(last.data()[4 * BYTES_PER_PIXEL], 0x22);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_side_retains_its_last_content() {
    init_tracing();

    let local = SharedSource::solid(4, 4, 0x11);
    let remote = SharedSource::empty();
    let (encoder, frames) = SegmentingEncoder::new(1);
    let sink = ChunkCollector::new();

    let handle = Compositor::spawn(
        small_config(),
        local.clone(),
        remote.clone(),
        encoder,
        Arc::new(sink.clone()),
    );

    // Starting with one side missing is not an error: right half stays black.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(frames.lock().unwrap().last().unwrap().data()[4 * BYTES_PER_PIXEL], 0x00);

    // The remote side renders once, then stalls.
    remote.set_solid(4, 4, 0x22);
    tokio::time::sleep(Duration::from_millis(200)).await;
    remote.clear();
    tokio::time::sleep(Duration::from_millis(200)).await;

    handle.stop().await;

    // No blanking: the last drawn remote content survives the stall.
    let frames = frames.lock().unwrap();
    assert_eq!(frames.last().unwrap().data()[4 * BYTES_PER_PIXEL], 0x22);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_input_yields_bit_identical_composites() {
    init_tracing();

    let local = SharedSource::solid(4, 4, 0x33);
    let remote = SharedSource::solid(4, 4, 0x44);
    let (encoder, frames) = SegmentingEncoder::new(1);
    let sink = ChunkCollector::new();

    let handle = Compositor::spawn(
        small_config(),
        local,
        remote,
        encoder,
        Arc::new(sink.clone()),
    );

    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.stop().await;

    let frames = frames.lock().unwrap();
    assert!(frames.len() >= 2);
    assert!(frames.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test(start_paused = true)]
async fn test_stop_emits_no_further_chunks() {
    init_tracing();

    let (encoder, _) = SegmentingEncoder::new(2);
    let sink = ChunkCollector::new();

    let handle = Compositor::spawn(
        small_config(),
        SharedSource::solid(4, 4, 0x55),
        SharedSource::solid(4, 4, 0x66),
        encoder,
        Arc::new(sink.clone()),
    );

    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.stop().await;
    let after_stop = sink.count();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(sink.count(), after_stop);
}

#[tokio::test(start_paused = true)]
async fn test_stop_with_no_chunk_in_flight_is_clean() {
    init_tracing();

    // Sources never render and the encoder never completes a segment.
    let (encoder, _) = SegmentingEncoder::new(u32::MAX);
    let sink = ChunkCollector::new();

    let handle = Compositor::spawn(
        small_config(),
        SharedSource::empty(),
        SharedSource::empty(),
        encoder,
        Arc::new(sink.clone()),
    );

    handle.stop().await;
    assert_eq!(sink.count(), 0);
}
