mod rpc_dispatcher;
mod rpc_envelope;
mod rpc_method_ref;

pub use rpc_dispatcher::{RpcDispatcher, RpcRecv, RpcReplyHandler, RpcReplyOutcome};
pub use rpc_envelope::{
    EnvelopeDecodeError, EnvelopeKind, RpcCall, RpcEnvelope, RpcInboundCall, RpcInboundReply,
    RpcReply, decode_envelope, encode_call, encode_reply,
};
pub use rpc_method_ref::RpcMethodRef;
