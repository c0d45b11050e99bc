use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Kind byte written ahead of every encoded value.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum ValueKind {
    Null = 0,
    Bool = 1,
    I64 = 2,
    F64 = 3,
    Str = 4,
    Bytes = 5,
    Seq = 6,
}

/// A single wire-transmittable value.
///
/// The payload model is a closed tagged union rather than an open dynamic
/// type: scalars, strings, byte blobs, and nested ordered sequences. Anything
/// richer travels as `Bytes` with the application owning the inner encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<WireValue>),
}

impl WireValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            WireValue::Null => ValueKind::Null,
            WireValue::Bool(_) => ValueKind::Bool,
            WireValue::I64(_) => ValueKind::I64,
            WireValue::F64(_) => ValueKind::F64,
            WireValue::Str(_) => ValueKind::Str,
            WireValue::Bytes(_) => ValueKind::Bytes,
            WireValue::Seq(_) => ValueKind::Seq,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireValue::I64(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric accessor with the single permitted widening (`I64` -> `F64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::F64(n) => Some(*n),
            WireValue::I64(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            WireValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for WireValue {
    fn from(v: bool) -> Self {
        WireValue::Bool(v)
    }
}

impl From<i64> for WireValue {
    fn from(v: i64) -> Self {
        WireValue::I64(v)
    }
}

impl From<f64> for WireValue {
    fn from(v: f64) -> Self {
        WireValue::F64(v)
    }
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self {
        WireValue::Str(v.to_string())
    }
}

impl From<String> for WireValue {
    fn from(v: String) -> Self {
        WireValue::Str(v)
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(v: Vec<u8>) -> Self {
        WireValue::Bytes(v)
    }
}

impl From<Vec<WireValue>> for WireValue {
    fn from(v: Vec<WireValue>) -> Self {
        WireValue::Seq(v)
    }
}
