use crate::constants::{
    TYPE_ID_BOOL, TYPE_ID_BYTES, TYPE_ID_F64, TYPE_ID_I64, TYPE_ID_SEQ, TYPE_ID_STR,
};
use crate::method_spec::{MethodSpec, ParamBinding};
use peercall::wire::{ValueKind, WireValue};
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// A payload value did not match the parameter's declared type.
    TypeMismatch {
        index: usize,
        expected: String,
        actual: ValueKind,
    },

    /// A wire parameter had neither a payload value nor a declared default.
    MissingArgument { index: usize, type_id: String },

    /// More values were supplied than the method declares.
    TooManyArguments { declared: usize, supplied: usize },

    /// A call-side parameter had no local resolution.
    UnresolvedCallSide { type_id: String },

    /// A service parameter's key is not registered locally.
    UnresolvedService { key: String },
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::TypeMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "argument {index}: expected {expected}, found {actual:?} value"
            ),
            BindError::MissingArgument { index, type_id } => {
                write!(f, "argument {index} ({type_id}) is missing")
            }
            BindError::TooManyArguments { declared, supplied } => {
                write!(f, "{supplied} arguments supplied, {declared} declared")
            }
            BindError::UnresolvedCallSide { type_id } => {
                write!(f, "no local resolution for call-side parameter {type_id}")
            }
            BindError::UnresolvedService { key } => {
                write!(f, "no registered service for parameter key {key}")
            }
        }
    }
}

impl std::error::Error for BindError {}

/// One argument in the final ordered invocation list.
pub enum BoundArg {
    /// A wire-supplied or defaulted value.
    Value(WireValue),

    /// A locally-resolved object (the peer handle, or a registry service).
    Local(Arc<dyn Any + Send + Sync>),
}

impl BoundArg {
    pub fn value(&self) -> Option<&WireValue> {
        match self {
            BoundArg::Value(v) => Some(v),
            BoundArg::Local(_) => None,
        }
    }

    pub fn local<T: 'static>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync,
    {
        match self {
            BoundArg::Local(any) => Arc::clone(any).downcast::<T>().ok(),
            BoundArg::Value(_) => None,
        }
    }
}

impl std::fmt::Debug for BoundArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundArg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            BoundArg::Local(_) => f.write_str("Local(..)"),
        }
    }
}

/// Supplies locally-resolved argument values on the receiving side.
///
/// This is the trusted-context half of hybrid binding: a remote caller can
/// invoke methods that need server-only dependencies without ever knowing
/// about or transmitting them.
pub trait LocalResolver {
    /// Resolves a call-side parameter from local context.
    fn resolve_call_side(&self, type_id: &str) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Resolves a service parameter from the local registry by key.
    fn resolve_service(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Send-mode binding: produces the wire payload for an outbound call.
///
/// `supplied` is positional over the full declared parameter list. Values at
/// locally-resolved slots are discarded (they must never cross the wire)
/// and trailing wire slots may be omitted (the receiver falls back to
/// declared defaults). The payload contains wire-parameter values only, so
/// it may be shorter than the parameter list.
pub fn bind_send(spec: &MethodSpec, supplied: &[WireValue]) -> Result<Vec<WireValue>, BindError> {
    if supplied.len() > spec.params.len() {
        return Err(BindError::TooManyArguments {
            declared: spec.params.len(),
            supplied: supplied.len(),
        });
    }

    let mut payload = Vec::new();

    for (index, param) in spec.params.iter().enumerate() {
        match &param.binding {
            ParamBinding::Wire => {
                if let Some(value) = supplied.get(index) {
                    payload.push(coerce(value, &param.type_id, index)?);
                }
            }
            // Locally-resolved slots are simply absent from the payload,
            // even when the caller tried to populate them.
            ParamBinding::CallSide | ParamBinding::FromServices { .. } => {}
        }
    }

    Ok(payload)
}

/// Receive-mode binding: reconstructs the full ordered argument list.
///
/// Per declared parameter, in order: call-side and service parameters come
/// from the local resolver; wire parameters take the next payload value,
/// coerced to the declared type; a missing payload value falls back to the
/// declared default; anything still unresolved is a caller error.
pub fn bind_receive(
    spec: &MethodSpec,
    payload: &[WireValue],
    resolver: &dyn LocalResolver,
) -> Result<Vec<BoundArg>, BindError> {
    let mut args = Vec::with_capacity(spec.params.len());
    let mut wire_idx = 0usize;

    for (index, param) in spec.params.iter().enumerate() {
        match &param.binding {
            ParamBinding::CallSide => {
                let local = resolver.resolve_call_side(&param.type_id).ok_or_else(|| {
                    BindError::UnresolvedCallSide {
                        type_id: param.type_id.clone(),
                    }
                })?;
                args.push(BoundArg::Local(local));
            }
            ParamBinding::FromServices { key } => {
                let local = resolver
                    .resolve_service(key)
                    .ok_or_else(|| BindError::UnresolvedService { key: key.clone() })?;
                args.push(BoundArg::Local(local));
            }
            ParamBinding::Wire => {
                if let Some(value) = payload.get(wire_idx) {
                    wire_idx += 1;
                    args.push(BoundArg::Value(coerce(value, &param.type_id, index)?));
                } else if let Some(default) = &param.default {
                    args.push(BoundArg::Value(default.clone()));
                } else {
                    return Err(BindError::MissingArgument {
                        index,
                        type_id: param.type_id.clone(),
                    });
                }
            }
        }
    }

    if wire_idx < payload.len() {
        return Err(BindError::TooManyArguments {
            declared: wire_idx,
            supplied: payload.len(),
        });
    }

    Ok(args)
}

/// Conversion rules per declared parameter type.
///
/// `Null` passes for any type (absent reference semantics), `I64` widens to
/// a declared `f64`, and unknown type identities pass through untouched for
/// the handler to interpret.
fn coerce(value: &WireValue, type_id: &str, index: usize) -> Result<WireValue, BindError> {
    if value.is_null() {
        return Ok(WireValue::Null);
    }

    let expected_kind = match type_id {
        TYPE_ID_BOOL => ValueKind::Bool,
        TYPE_ID_I64 => ValueKind::I64,
        TYPE_ID_F64 => {
            return match value {
                WireValue::F64(_) => Ok(value.clone()),
                WireValue::I64(n) => Ok(WireValue::F64(*n as f64)),
                other => Err(BindError::TypeMismatch {
                    index,
                    expected: type_id.to_string(),
                    actual: other.kind(),
                }),
            };
        }
        TYPE_ID_STR => ValueKind::Str,
        TYPE_ID_BYTES => ValueKind::Bytes,
        TYPE_ID_SEQ => ValueKind::Seq,
        _ => return Ok(value.clone()),
    };

    if value.kind() == expected_kind {
        Ok(value.clone())
    } else {
        Err(BindError::TypeMismatch {
            index,
            expected: type_id.to_string(),
            actual: value.kind(),
        })
    }
}
