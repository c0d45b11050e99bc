use crate::wire::ValueKind;

#[derive(Debug, PartialEq)]
pub enum WireEncodeError {
    /// A `Seq` value was nested deeper than `MAX_SEQ_NESTING_DEPTH`.
    DepthLimitExceeded,

    /// A string, byte blob, or sequence was too large for its u32 length field.
    OversizedValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireDecodeError {
    /// The buffer ended before the current value was complete.
    UnexpectedEof,

    /// The kind byte did not map to any known value kind.
    UnknownValueKind(u8),

    /// A string payload was not valid UTF-8.
    InvalidUtf8,

    /// A `Seq` value was nested deeper than `MAX_SEQ_NESTING_DEPTH`.
    DepthLimitExceeded,

    /// The next value was not of the kind the caller shifted for.
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
}

impl std::fmt::Display for WireDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireDecodeError::UnexpectedEof => write!(f, "buffer ended mid-value"),
            WireDecodeError::UnknownValueKind(b) => write!(f, "unknown value kind byte {b}"),
            WireDecodeError::InvalidUtf8 => write!(f, "string value is not valid UTF-8"),
            WireDecodeError::DepthLimitExceeded => write!(f, "sequence nesting limit exceeded"),
            WireDecodeError::TypeMismatch { expected, actual } => {
                write!(f, "expected {expected:?} value, found {actual:?}")
            }
        }
    }
}

impl std::error::Error for WireDecodeError {}
