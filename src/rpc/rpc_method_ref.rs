use crate::wire::{ValueKind, WireDecodeError, WireValue};

/// Serializable description of an invocable target.
///
/// Carries exactly enough to re-locate the target on the remote side: the
/// declaring service's type identity, the method name, and the ordered
/// parameter type identities (full declared list, so overloads resolve
/// unambiguously). Built once per outbound call and reconstructed once per
/// inbound call; never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RpcMethodRef {
    pub service: String,
    pub method: String,
    pub param_type_ids: Vec<String>,
    pub is_static: bool,
}

impl RpcMethodRef {
    /// Wire form: `[service, method, [paramTypeId...], isStatic]`.
    pub fn to_value(&self) -> WireValue {
        WireValue::Seq(vec![
            WireValue::Str(self.service.clone()),
            WireValue::Str(self.method.clone()),
            WireValue::Seq(
                self.param_type_ids
                    .iter()
                    .map(|id| WireValue::Str(id.clone()))
                    .collect(),
            ),
            WireValue::Bool(self.is_static),
        ])
    }

    pub fn from_value(value: WireValue) -> Result<Self, WireDecodeError> {
        let items = match value {
            WireValue::Seq(items) => items,
            other => {
                return Err(WireDecodeError::TypeMismatch {
                    expected: ValueKind::Seq,
                    actual: other.kind(),
                });
            }
        };

        let mut items = items.into_iter();
        let service = expect_str(items.next())?;
        let method = expect_str(items.next())?;
        let param_type_ids = match items.next() {
            Some(WireValue::Seq(ids)) => ids
                .into_iter()
                .map(|id| expect_str(Some(id)))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(WireDecodeError::TypeMismatch {
                    expected: ValueKind::Seq,
                    actual: other.kind(),
                });
            }
            None => return Err(WireDecodeError::UnexpectedEof),
        };
        let is_static = match items.next() {
            Some(WireValue::Bool(b)) => b,
            Some(other) => {
                return Err(WireDecodeError::TypeMismatch {
                    expected: ValueKind::Bool,
                    actual: other.kind(),
                });
            }
            None => return Err(WireDecodeError::UnexpectedEof),
        };

        Ok(Self {
            service,
            method,
            param_type_ids,
            is_static,
        })
    }

    /// Human-readable signature used in logs and error replies.
    pub fn signature(&self) -> String {
        format!(
            "{}::{}({})",
            self.service,
            self.method,
            self.param_type_ids.join(", ")
        )
    }
}

fn expect_str(value: Option<WireValue>) -> Result<String, WireDecodeError> {
    match value {
        Some(WireValue::Str(s)) => Ok(s),
        Some(other) => Err(WireDecodeError::TypeMismatch {
            expected: ValueKind::Str,
            actual: other.kind(),
        }),
        None => Err(WireDecodeError::UnexpectedEof),
    }
}
