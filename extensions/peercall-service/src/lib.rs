//! Shared service layer used by both sides of a peercall connection.
//!
//! A peer exposes methods by registering explicit binding descriptors
//! ([`MethodSpec`]) and handlers in a [`ServiceRegistry`] at startup; the
//! same descriptors drive caller-side argument stripping, so there is no
//! runtime reflection and nothing to code-generate.

mod access_policy;
mod arg_binder;
mod caller_interface;
mod error;
mod method_registry;
mod method_spec;

pub mod constants;

pub use access_policy::AccessPolicy;
pub use arg_binder::{BindError, BoundArg, LocalResolver, bind_receive, bind_send};
pub use caller_interface::{PeerCallerInterface, dispatch_call_with_reply, unwrap_reply_outcome};
pub use error::RpcCallError;
pub use method_registry::{
    RegisteredMethod, RegistryError, RpcHandlerFuture, RpcMethodHandler, ServiceDescriptor,
    ServiceRegistry, method_ref_hash, method_signature_hash,
};
pub use method_spec::{CallableMarker, MethodKind, MethodSpec, ParamBinding, ParamSpec};
