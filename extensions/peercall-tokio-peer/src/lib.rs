//! Tokio binding for the peercall dispatcher.
//!
//! [`RpcPeer`] multiplexes concurrent outbound invocations and concurrent
//! inbound call processing over one message transport. The transport itself
//! is an external collaborator: anything that can carry byte messages in
//! order (a WebRTC data channel, a WebSocket, a pipe) plugs in by producing
//! a [`PeerTransportHandle`]. An in-memory duplex implementation is included
//! for tests and demos.

mod rpc_peer;
mod transport;

pub use peercall_service::PeerCallerInterface;
pub use rpc_peer::{PeerTransportState, RpcPeer};
pub use transport::{PeerTransportHandle, TransportEvent, memory_transport_pair};
