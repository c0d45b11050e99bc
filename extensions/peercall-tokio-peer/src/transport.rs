use bytes::Bytes;
use tokio::sync::mpsc;

/// Lifecycle and data events delivered by a transport.
///
/// Readiness is gated by `Connected` and reset by `Closed`; a transport that
/// reconnects delivers a fresh `Connected` afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    /// One complete inbound message. Message boundaries are the transport's;
    /// one message carries exactly one envelope.
    Data(Bytes),
    Error { code: String, message: String },
    Closed,
}

/// The channel pair a transport hands to its peer.
///
/// `outbound` carries whole envelope buffers toward the remote side;
/// `events` delivers connection lifecycle and inbound data. The peer assumes
/// nothing about how bytes physically travel.
pub struct PeerTransportHandle {
    pub outbound: mpsc::UnboundedSender<Bytes>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Cross-wires two in-process transport handles.
///
/// Each side's outbound messages arrive as `Data` events on the other side.
/// Both sides observe `Connected` immediately, and dropping one side's
/// outbound sender (its peer going away) delivers `Closed` to the other.
/// Must be called within a Tokio runtime.
pub fn memory_transport_pair() -> (PeerTransportHandle, PeerTransportHandle) {
    let (a_out_tx, a_out_rx) = mpsc::unbounded_channel::<Bytes>();
    let (b_out_tx, b_out_rx) = mpsc::unbounded_channel::<Bytes>();
    let (a_evt_tx, a_evt_rx) = mpsc::unbounded_channel::<TransportEvent>();
    let (b_evt_tx, b_evt_rx) = mpsc::unbounded_channel::<TransportEvent>();

    let _ = a_evt_tx.send(TransportEvent::Connected);
    let _ = b_evt_tx.send(TransportEvent::Connected);

    tokio::spawn(pump(a_out_rx, b_evt_tx));
    tokio::spawn(pump(b_out_rx, a_evt_tx));

    (
        PeerTransportHandle {
            outbound: a_out_tx,
            events: a_evt_rx,
        },
        PeerTransportHandle {
            outbound: b_out_tx,
            events: b_evt_rx,
        },
    )
}

async fn pump(
    mut outbound: mpsc::UnboundedReceiver<Bytes>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    while let Some(bytes) = outbound.recv().await {
        if events.send(TransportEvent::Data(bytes)).is_err() {
            return;
        }
    }
    let _ = events.send(TransportEvent::Closed);
}
