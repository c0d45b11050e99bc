use crate::arg_binder::BindError;
use peercall::wire::WireEncodeError;

/// Call-path error taxonomy.
///
/// On the receiving side these are stringified into reply envelopes rather
/// than raised; the caller therefore observes every remote failure uniformly
/// as [`RpcCallError::RemoteInvocationFailed`] carrying the remote's message.
/// The local variants surface directly from `invoke`.
#[derive(Debug)]
pub enum RpcCallError {
    /// Send attempted while the transport is not writable.
    NotConnected,

    /// The outbound envelope could not be encoded.
    EnvelopeEncode(WireEncodeError),

    /// Inbound bytes could not be decoded into an envelope.
    EnvelopeDecode(String),

    /// No registered method matches the reference's exact signature.
    MethodNotFound(String),

    /// The target is an instance method but no instance is registered for
    /// its declaring service.
    ServiceNotFound(String),

    /// The access-control policy rejected the call.
    AccessDenied(String),

    /// Argument binding failed on either side.
    Bind(BindError),

    /// The remote invocation failed; the message is the remote's stringified
    /// error. Stack traces are not transmitted.
    RemoteInvocationFailed(String),

    /// The pending call was abandoned because the transport closed.
    ConnectionClosed,

    /// The pending call was swept by a caller-configured deadline.
    DeadlineExceeded,
}

impl std::fmt::Display for RpcCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpcCallError::NotConnected => write!(f, "transport is not connected"),
            RpcCallError::EnvelopeEncode(e) => write!(f, "envelope encode failed: {e:?}"),
            RpcCallError::EnvelopeDecode(msg) => write!(f, "envelope decode failed: {msg}"),
            RpcCallError::MethodNotFound(signature) => {
                write!(f, "method not found: {signature}")
            }
            RpcCallError::ServiceNotFound(type_id) => {
                write!(f, "no service instance for {type_id}")
            }
            RpcCallError::AccessDenied(reason) => write!(f, "access denied: {reason}"),
            RpcCallError::Bind(e) => write!(f, "argument binding failed: {e}"),
            RpcCallError::RemoteInvocationFailed(msg) => {
                write!(f, "remote invocation failed: {msg}")
            }
            RpcCallError::ConnectionClosed => write!(f, "connection closed"),
            RpcCallError::DeadlineExceeded => write!(f, "call deadline exceeded"),
        }
    }
}

impl std::error::Error for RpcCallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcCallError::Bind(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BindError> for RpcCallError {
    fn from(e: BindError) -> Self {
        RpcCallError::Bind(e)
    }
}

impl From<WireEncodeError> for RpcCallError {
    fn from(e: WireEncodeError) -> Self {
        RpcCallError::EnvelopeEncode(e)
    }
}
