use bytes::Bytes;
use peercall_service::{AccessPolicy, ServiceRegistry};
use peercall_tokio_peer::{
    PeerTransportHandle, PeerTransportState, RpcPeer, TransportEvent, memory_transport_pair,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

#[tokio::test]
async fn state_change_handler_observes_connect_and_disconnect() {
    let (transport_a, transport_b) = memory_transport_pair();

    let peer_a = RpcPeer::new(
        transport_a,
        ServiceRegistry::new(),
        AccessPolicy::default(),
    );
    let peer_b = RpcPeer::new(
        transport_b,
        ServiceRegistry::new(),
        AccessPolicy::default(),
    );
    sleep(Duration::from_millis(20)).await;

    let states: Arc<Mutex<Vec<PeerTransportState>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let states = states.clone();
        peer_b.set_state_change_handler(move |state| {
            states.lock().unwrap().push(state);
        });
    }

    // Dropping the far peer drops its outbound sender, which surfaces as a
    // close on this side.
    drop(peer_a);
    sleep(Duration::from_millis(50)).await;

    assert_eq!(
        *states.lock().unwrap(),
        vec![
            PeerTransportState::Connected,
            PeerTransportState::Disconnected
        ]
    );
    assert!(!peer_b.is_ready());
}

#[tokio::test]
async fn reconnect_is_a_fresh_readiness_transition() {
    let (out_tx, _out_rx) = mpsc::unbounded_channel::<Bytes>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<TransportEvent>();

    let peer = RpcPeer::new(
        PeerTransportHandle {
            outbound: out_tx,
            events: evt_rx,
        },
        ServiceRegistry::new(),
        AccessPolicy::default(),
    );

    let states: Arc<Mutex<Vec<PeerTransportState>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let states = states.clone();
        peer.set_state_change_handler(move |state| {
            states.lock().unwrap().push(state);
        });
    }

    let _ = evt_tx.send(TransportEvent::Connected);
    sleep(Duration::from_millis(20)).await;
    assert!(peer.is_ready());

    // A close must reset readiness...
    let _ = evt_tx.send(TransportEvent::Closed);
    sleep(Duration::from_millis(20)).await;
    assert!(!peer.is_ready());

    // ...so a later connect registers as a fresh transition.
    let _ = evt_tx.send(TransportEvent::Connected);
    sleep(Duration::from_millis(20)).await;
    assert!(peer.is_ready());

    assert_eq!(
        *states.lock().unwrap(),
        vec![
            PeerTransportState::Connected,
            PeerTransportState::Disconnected,
            PeerTransportState::Connected
        ]
    );
}

#[tokio::test]
async fn close_is_idempotent_and_sweeps_state() {
    let (transport_a, transport_b) = memory_transport_pair();

    let peer_a = RpcPeer::new(
        transport_a,
        ServiceRegistry::new(),
        AccessPolicy::default(),
    );
    let _peer_b = RpcPeer::new(
        transport_b,
        ServiceRegistry::new(),
        AccessPolicy::default(),
    );
    sleep(Duration::from_millis(20)).await;
    assert!(peer_a.is_ready());

    peer_a.close();
    assert!(!peer_a.is_ready());
    assert_eq!(peer_a.pending_calls(), 0);

    // A second close is a no-op.
    peer_a.close();
    assert!(!peer_a.is_ready());
}
