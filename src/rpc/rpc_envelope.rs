use crate::constants::{ENVELOPE_TAG_CALL, ENVELOPE_TAG_CALL_NO_REPLY, ENVELOPE_TAG_REPLY};
use crate::rpc::RpcMethodRef;
use crate::wire::{WireDecodeError, WireEncodeError, WireReader, WireValue, encode_values};

/// Envelope kind, carried as the first encoded value of every message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnvelopeKind {
    CallWithReply,
    CallNoReply,
    Reply,
}

impl EnvelopeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EnvelopeKind::CallWithReply => ENVELOPE_TAG_CALL,
            EnvelopeKind::CallNoReply => ENVELOPE_TAG_CALL_NO_REPLY,
            EnvelopeKind::Reply => ENVELOPE_TAG_REPLY,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            ENVELOPE_TAG_CALL => Some(EnvelopeKind::CallWithReply),
            ENVELOPE_TAG_CALL_NO_REPLY => Some(EnvelopeKind::CallNoReply),
            ENVELOPE_TAG_REPLY => Some(EnvelopeKind::Reply),
            _ => None,
        }
    }
}

/// An outbound call, before a correlation id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub method_ref: RpcMethodRef,
    /// Wire-supplied argument values only; locally-resolved parameters have
    /// already been stripped by the argument binder.
    pub wire_args: Vec<WireValue>,
    pub expects_reply: bool,
}

/// An outbound reply to a previously received call.
///
/// Exactly one of `error`/`result` is meaningful: a non-empty error means the
/// remote invocation failed, otherwise `result` holds the (possibly `Null`)
/// return value.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    pub correlation_id: u64,
    pub error: Option<String>,
    pub result: WireValue,
}

/// A fully parsed inbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcInboundCall {
    pub correlation_id: u64,
    pub method_ref: RpcMethodRef,
    pub args: Vec<WireValue>,
    pub expects_reply: bool,
}

/// A fully parsed inbound reply.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcInboundReply {
    pub correlation_id: u64,
    pub error: Option<String>,
    pub result: WireValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcEnvelope {
    Call(RpcInboundCall),
    Reply(RpcInboundReply),
}

/// Decode failures, split by how much of the envelope was recovered.
///
/// Once the outer fields (tag, correlation id) have parsed, a body failure
/// still identifies the call it belongs to, so the receiver can owe an error
/// reply for it.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeDecodeError {
    /// The tag or correlation id could not be read.
    Outer(WireDecodeError),

    /// The tag string is not one of `"?"`, `"."`, `"="`.
    UnknownTag(String),

    /// The method reference or argument payload could not be reconstructed.
    CallBody {
        correlation_id: u64,
        expects_reply: bool,
        cause: WireDecodeError,
    },

    /// The error/result fields of a reply could not be reconstructed.
    ReplyBody {
        correlation_id: u64,
        cause: WireDecodeError,
    },
}

/// Encodes a call envelope: `[tag, correlationId, methodRef, argsSeq]`.
pub fn encode_call(correlation_id: u64, call: &RpcCall) -> Result<Vec<u8>, WireEncodeError> {
    let kind = if call.expects_reply {
        EnvelopeKind::CallWithReply
    } else {
        EnvelopeKind::CallNoReply
    };

    encode_values(&[
        WireValue::Str(kind.tag().to_string()),
        WireValue::I64(correlation_id as i64),
        call.method_ref.to_value(),
        WireValue::Seq(call.wire_args.clone()),
    ])
}

/// Encodes a reply envelope: `[tag, correlationId, errorOrNull, result]`.
pub fn encode_reply(reply: &RpcReply) -> Result<Vec<u8>, WireEncodeError> {
    let error = match &reply.error {
        Some(message) => WireValue::Str(message.clone()),
        None => WireValue::Null,
    };

    encode_values(&[
        WireValue::Str(EnvelopeKind::Reply.tag().to_string()),
        WireValue::I64(reply.correlation_id as i64),
        error,
        reply.result.clone(),
    ])
}

/// Decodes one complete envelope from one transport message.
pub fn decode_envelope(bytes: &[u8]) -> Result<RpcEnvelope, EnvelopeDecodeError> {
    let mut reader = WireReader::new(bytes);

    let tag = reader.shift_str().map_err(EnvelopeDecodeError::Outer)?;
    let kind = EnvelopeKind::from_tag(&tag).ok_or(EnvelopeDecodeError::UnknownTag(tag))?;
    let correlation_id = reader.shift_i64().map_err(EnvelopeDecodeError::Outer)? as u64;

    match kind {
        EnvelopeKind::CallWithReply | EnvelopeKind::CallNoReply => {
            let expects_reply = kind == EnvelopeKind::CallWithReply;
            let body = || -> Result<(RpcMethodRef, Vec<WireValue>), WireDecodeError> {
                let mut reader = reader;
                let method_ref = RpcMethodRef::from_value(reader.shift()?)?;
                let args = reader.shift_seq()?;
                Ok((method_ref, args))
            };
            match body() {
                Ok((method_ref, args)) => Ok(RpcEnvelope::Call(RpcInboundCall {
                    correlation_id,
                    method_ref,
                    args,
                    expects_reply,
                })),
                Err(cause) => Err(EnvelopeDecodeError::CallBody {
                    correlation_id,
                    expects_reply,
                    cause,
                }),
            }
        }
        EnvelopeKind::Reply => {
            let body = || -> Result<(Option<String>, WireValue), WireDecodeError> {
                let mut reader = reader;
                let error = reader.shift_opt_str()?;
                let result = reader.shift()?;
                Ok((error, result))
            };
            match body() {
                Ok((error, result)) => Ok(RpcEnvelope::Reply(RpcInboundReply {
                    correlation_id,
                    error,
                    result,
                })),
                Err(cause) => Err(EnvelopeDecodeError::ReplyBody {
                    correlation_id,
                    cause,
                }),
            }
        }
    }
}
