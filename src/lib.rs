//! # peercall
//!
//! Sans-io core of the peercall RPC stack.
//!
//! Two endpoints joined by any binary, message-oriented, order-preserving
//! transport call named procedures on each other without pre-generated
//! stubs. This crate owns the wire value codec, the call/reply envelopes,
//! and the [`rpc::RpcDispatcher`] state machine that correlates replies to
//! in-flight calls. It performs no I/O and runs on any executor (or none):
//! outbound bytes leave through caller-supplied `on_emit` closures and
//! inbound bytes are fed to `receive_bytes`.
//!
//! Service registration, access control, argument binding, and async
//! transports live in the `peercall-service` and `peercall-tokio-peer`
//! extension crates.

pub mod constants;
pub mod rpc;
pub mod utils;
pub mod wire;
