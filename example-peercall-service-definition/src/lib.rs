//! Shared method descriptors for the example peers.
//!
//! Both sides of a connection construct the same [`MethodSpec`] values: the
//! registering side pairs them with handlers, the calling side uses them to
//! build method references and strip locally-resolved slots. Keeping them in
//! one crate is what keeps the binding classification identical on both
//! sides.

pub mod counter;
pub mod reporting;
