use crate::integration::{create_relay, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_chunks_fan_out_to_watchers_only() {
    init_tracing();

    let relay = create_relay();

    let mut a = TestPeer::connect(&relay, "a@x.io");
    let mut b = TestPeer::connect(&relay, "b@x.io");
    a.join("R1");
    b.join("R1");
    a.recv_event().await.unwrap();
    a.recv_event().await.unwrap();
    b.recv_event().await.unwrap();

    let mut w = TestPeer::connect(&relay, "w@x.io");
    w.watch("R1");

    a.send_chunk(&[0xde, 0xad, 0xbe, 0xef]);

    assert_eq!(
        w.recv_chunk().await.unwrap().to_vec(),
        vec![0xde, 0xad, 0xbe, 0xef]
    );
    assert!(a.is_silent());
    assert!(b.is_silent());
}

#[tokio::test]
async fn test_chunk_from_a_roomless_peer_is_dropped() {
    init_tracing();

    let relay = create_relay();

    let mut a = TestPeer::connect(&relay, "a@x.io");
    a.join("R1");
    a.recv_event().await.unwrap();

    let mut w = TestPeer::connect(&relay, "w@x.io");
    w.watch("R1");

    // The watcher is not a room member; its chunks have no broadcast.
    w.send_chunk(&[1, 2, 3]);

    assert!(a.is_silent());
    assert!(w.is_silent());
}

#[tokio::test]
async fn test_watchers_are_dropped_on_disconnect() {
    init_tracing();

    let relay = create_relay();

    let mut a = TestPeer::connect(&relay, "a@x.io");
    a.join("R1");
    a.recv_event().await.unwrap();

    let w = TestPeer::connect(&relay, "w@x.io");
    w.watch("R1");
    w.disconnect();

    // Delivery to the departed watcher must not disturb the sender.
    a.send_chunk(&[9, 9, 9]);
    assert!(a.is_silent());
}

#[tokio::test]
async fn test_rewatching_another_room_moves_the_subscription() {
    init_tracing();

    let relay = create_relay();

    let mut a = TestPeer::connect(&relay, "a@x.io");
    a.join("R1");
    a.recv_event().await.unwrap();

    let mut e = TestPeer::connect(&relay, "e@x.io");
    e.join("R2");
    e.recv_event().await.unwrap();

    let mut w = TestPeer::connect(&relay, "w@x.io");
    w.watch("R1");
    w.watch("R2");

    a.send_chunk(&[1]);
    e.send_chunk(&[2]);

    assert_eq!(w.recv_chunk().await.unwrap().to_vec(), vec![2]);
    assert!(w.is_silent());
}
