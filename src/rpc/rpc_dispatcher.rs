use crate::rpc::{
    EnvelopeDecodeError, RpcCall, RpcEnvelope, RpcInboundCall, RpcReply, decode_envelope,
    encode_call, encode_reply,
};
use crate::utils::{generate_correlation_id, now};
use crate::wire::{WireEncodeError, WireValue};
use std::collections::HashMap;

/// Outcome delivered to a pending call's completion handler, exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcReplyOutcome {
    /// The correlated reply envelope arrived.
    Reply {
        error: Option<String>,
        result: WireValue,
    },

    /// No reply will ever arrive (transport closed, reply malformed, or the
    /// entry was swept by a deadline).
    Abandoned { reason: String },
}

/// One-shot completion handler for an in-flight call.
pub type RpcReplyHandler = Box<dyn FnOnce(RpcReplyOutcome) + Send>;

struct RpcPendingCall {
    handler: RpcReplyHandler,
    issued_at_micros: u64,
}

/// Result of feeding one inbound transport message to the dispatcher.
#[derive(Debug)]
pub enum RpcRecv {
    /// A fully parsed inbound call, to be authorized, bound, and invoked by
    /// the owning layer.
    Call(RpcInboundCall),

    /// The outer call envelope parsed but the method reference or argument
    /// payload did not. If `expects_reply`, an error reply is owed.
    MalformedCall {
        correlation_id: u64,
        expects_reply: bool,
        reason: String,
    },

    /// A reply was matched to a pending call and its handler has run.
    ReplyDelivered { correlation_id: u64 },

    /// A reply arrived for an unknown (or already fulfilled) correlation id
    /// and was dropped. Duplicate replies land here, never in a handler.
    ReplyUnmatched { correlation_id: u64 },

    /// A reply matched a pending call but its body failed to decode; the
    /// pending call has been failed with the decode reason.
    MalformedReply { correlation_id: u64 },
}

/// The peer RPC dispatcher hub.
///
/// Owns the pending-call table and the outbound/inbound envelope paths.
/// Sans-io: bytes leave through the `on_emit` callback handed to each send
/// operation, and arrive through `receive_bytes`. The owning layer decides
/// how inbound calls are invoked and when replies are sent back.
pub struct RpcDispatcher {
    pending_calls: HashMap<u64, RpcPendingCall>,
}

impl Default for RpcDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcDispatcher {
    pub fn new() -> Self {
        Self {
            pending_calls: HashMap::new(),
        }
    }

    /// Sends an outbound call and, for reply-expecting calls, registers its
    /// completion handler under a fresh correlation id.
    ///
    /// The pending entry is inserted before any bytes are emitted so that a
    /// transport which loops the reply back synchronously still correlates.
    pub fn call<E>(
        &mut self,
        call: RpcCall,
        mut on_emit: E,
        on_reply: Option<RpcReplyHandler>,
    ) -> Result<u64, WireEncodeError>
    where
        E: FnMut(&[u8]),
    {
        let correlation_id = generate_correlation_id();
        let bytes = encode_call(correlation_id, &call)?;

        if call.expects_reply {
            if let Some(handler) = on_reply {
                self.pending_calls.insert(
                    correlation_id,
                    RpcPendingCall {
                        handler,
                        issued_at_micros: now(),
                    },
                );
            }
        }

        tracing::debug!(
            correlation_id,
            method = %call.method_ref.signature(),
            expects_reply = call.expects_reply,
            "sending call"
        );

        on_emit(&bytes);
        Ok(correlation_id)
    }

    /// Sends a reply envelope for a previously received call.
    pub fn respond<E>(&mut self, reply: RpcReply, mut on_emit: E) -> Result<(), WireEncodeError>
    where
        E: FnMut(&[u8]),
    {
        let bytes = encode_reply(&reply)?;
        tracing::debug!(
            correlation_id = reply.correlation_id,
            is_error = reply.error.is_some(),
            "sending reply"
        );
        on_emit(&bytes);
        Ok(())
    }

    /// Routes one inbound transport message.
    ///
    /// Replies are correlated and their handlers run inline; calls are
    /// returned for the owning layer to process. The raw buffer is not
    /// retained in any path.
    pub fn receive_bytes(&mut self, bytes: &[u8]) -> Result<RpcRecv, EnvelopeDecodeError> {
        match decode_envelope(bytes) {
            Ok(RpcEnvelope::Call(call)) => Ok(RpcRecv::Call(call)),
            Ok(RpcEnvelope::Reply(reply)) => {
                match self.pending_calls.remove(&reply.correlation_id) {
                    Some(pending) => {
                        (pending.handler)(RpcReplyOutcome::Reply {
                            error: reply.error,
                            result: reply.result,
                        });
                        Ok(RpcRecv::ReplyDelivered {
                            correlation_id: reply.correlation_id,
                        })
                    }
                    None => {
                        tracing::warn!(
                            correlation_id = reply.correlation_id,
                            "reply without a pending call, dropping"
                        );
                        Ok(RpcRecv::ReplyUnmatched {
                            correlation_id: reply.correlation_id,
                        })
                    }
                }
            }
            Err(EnvelopeDecodeError::CallBody {
                correlation_id,
                expects_reply,
                cause,
            }) => Ok(RpcRecv::MalformedCall {
                correlation_id,
                expects_reply,
                reason: format!("failed to reconstruct call: {cause}"),
            }),
            Err(EnvelopeDecodeError::ReplyBody {
                correlation_id,
                cause,
            }) => {
                if let Some(pending) = self.pending_calls.remove(&correlation_id) {
                    (pending.handler)(RpcReplyOutcome::Abandoned {
                        reason: format!("reply failed to decode: {cause}"),
                    });
                }
                Ok(RpcRecv::MalformedReply { correlation_id })
            }
            Err(err) => Err(err),
        }
    }

    /// Number of calls still awaiting a reply.
    pub fn pending_len(&self) -> usize {
        self.pending_calls.len()
    }

    /// Fails one pending call, if still present. Used by deadline sweeps.
    pub fn fail_pending(&mut self, correlation_id: u64, reason: &str) -> bool {
        match self.pending_calls.remove(&correlation_id) {
            Some(pending) => {
                (pending.handler)(RpcReplyOutcome::Abandoned {
                    reason: reason.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Fails every outstanding pending call. Invoked on transport close so
    /// no caller is left suspended forever; returns how many were failed.
    pub fn fail_all_pending(&mut self, reason: &str) -> usize {
        let drained: Vec<(u64, RpcPendingCall)> = self.pending_calls.drain().collect();
        let count = drained.len();

        for (correlation_id, pending) in drained {
            tracing::debug!(
                correlation_id,
                age_micros = now().saturating_sub(pending.issued_at_micros),
                "abandoning pending call"
            );
            (pending.handler)(RpcReplyOutcome::Abandoned {
                reason: reason.to_string(),
            });
        }

        count
    }
}
