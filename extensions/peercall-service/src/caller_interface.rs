use crate::arg_binder::bind_send;
use crate::error::RpcCallError;
use crate::method_spec::MethodSpec;
use futures::channel::oneshot;
use peercall::rpc::{RpcCall, RpcDispatcher, RpcReplyOutcome};
use peercall::wire::WireValue;

/// Defines the generic capability for invoking remote methods.
///
/// Implemented by whatever owns a dispatcher and a transport (a peer, or a
/// test double); call sites stay agnostic of the runtime and transport.
#[async_trait::async_trait]
pub trait PeerCallerInterface: Send + Sync {
    /// Invokes a remote method and awaits its correlated reply.
    ///
    /// `args` is positional over the full declared parameter list; values at
    /// locally-resolved slots are stripped before transmission. When the
    /// method's own marker says no-reply, the marker wins and this behaves
    /// like [`PeerCallerInterface::invoke_remote_no_reply`], resolving to
    /// `Null` immediately after send.
    async fn invoke_remote(
        &self,
        spec: &MethodSpec,
        args: Vec<WireValue>,
    ) -> Result<WireValue, RpcCallError>;

    /// Fire-and-forget invocation: returns as soon as the call is on the
    /// wire. No failure visibility, in exchange for lower latency.
    async fn invoke_remote_no_reply(
        &self,
        spec: &MethodSpec,
        args: Vec<WireValue>,
    ) -> Result<(), RpcCallError>;
}

/// Runtime-agnostic bridge from the sans-io dispatcher to an awaitable
/// reply.
///
/// Runs the binder in send mode, issues the call with a oneshot completion
/// handler, and hands back the receiver plus the correlation id (for
/// deadline sweeps). The dispatcher lock is held only for the synchronous
/// send; awaiting happens on the returned receiver.
pub fn dispatch_call_with_reply<E>(
    dispatcher: &mut RpcDispatcher,
    spec: &MethodSpec,
    args: &[WireValue],
    on_emit: E,
) -> Result<(u64, oneshot::Receiver<RpcReplyOutcome>), RpcCallError>
where
    E: FnMut(&[u8]),
{
    let wire_args = bind_send(spec, args)?;
    let (tx, rx) = oneshot::channel::<RpcReplyOutcome>();

    let correlation_id = dispatcher.call(
        RpcCall {
            method_ref: spec.method_ref(),
            wire_args,
            expects_reply: true,
        },
        on_emit,
        Some(Box::new(move |outcome| {
            let _ = tx.send(outcome);
        })),
    )?;

    Ok((correlation_id, rx))
}

/// Unwraps a completed reply outcome into the caller-facing result.
pub fn unwrap_reply_outcome(outcome: RpcReplyOutcome) -> Result<WireValue, RpcCallError> {
    match outcome {
        RpcReplyOutcome::Reply {
            error: Some(message),
            ..
        } if !message.is_empty() => Err(RpcCallError::RemoteInvocationFailed(message)),
        RpcReplyOutcome::Reply { result, .. } => Ok(result),
        RpcReplyOutcome::Abandoned { .. } => Err(RpcCallError::ConnectionClosed),
    }
}
