use crate::constants::{
    MAX_SEQ_NESTING_DEPTH, VALUE_KIND_SIZE, VALUE_LENGTH_FIELD_SIZE, VALUE_SCALAR_SIZE,
};
use crate::wire::{ValueKind, WireDecodeError, WireEncodeError, WireValue};

/// Encodes an ordered sequence of values into a single byte buffer.
///
/// The buffer is the concatenation of the individual value encodings: a kind
/// byte followed by a kind-specific body. Strings, blobs, and sequences carry
/// a u32 little-endian length/count prefix. There is no outer framing; one
/// buffer is one transport message.
pub fn encode_values(values: &[WireValue]) -> Result<Vec<u8>, WireEncodeError> {
    let mut buf = Vec::new();
    for value in values {
        encode_value(&mut buf, value, 0)?;
    }
    Ok(buf)
}

fn encode_value(
    buf: &mut Vec<u8>,
    value: &WireValue,
    depth: usize,
) -> Result<(), WireEncodeError> {
    if depth > MAX_SEQ_NESTING_DEPTH {
        return Err(WireEncodeError::DepthLimitExceeded);
    }

    buf.push(value.kind().into());

    match value {
        WireValue::Null => {}
        WireValue::Bool(b) => buf.push(*b as u8),
        WireValue::I64(n) => buf.extend(&n.to_le_bytes()),
        WireValue::F64(n) => buf.extend(&n.to_le_bytes()),
        WireValue::Str(s) => {
            let len = u32::try_from(s.len()).map_err(|_| WireEncodeError::OversizedValue)?;
            buf.extend(&len.to_le_bytes());
            buf.extend(s.as_bytes());
        }
        WireValue::Bytes(bytes) => {
            let len = u32::try_from(bytes.len()).map_err(|_| WireEncodeError::OversizedValue)?;
            buf.extend(&len.to_le_bytes());
            buf.extend(bytes.as_slice());
        }
        WireValue::Seq(items) => {
            let count = u32::try_from(items.len()).map_err(|_| WireEncodeError::OversizedValue)?;
            buf.extend(&count.to_le_bytes());
            for item in items {
                encode_value(buf, item, depth + 1)?;
            }
        }
    }

    Ok(())
}

/// Shift-consuming decoder over one encoded buffer.
///
/// Envelope fields are read positionally, so the reader hands values out one
/// at a time from the front; whatever remains is the tail the caller treats
/// as a nested payload sequence.
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Consumes and returns the next value.
    pub fn shift(&mut self) -> Result<WireValue, WireDecodeError> {
        self.read_value(0)
    }

    /// Consumes the next value, requiring it to be a string.
    pub fn shift_str(&mut self) -> Result<String, WireDecodeError> {
        match self.shift()? {
            WireValue::Str(s) => Ok(s),
            other => Err(mismatch(ValueKind::Str, &other)),
        }
    }

    /// Consumes the next value, requiring it to be an integer.
    pub fn shift_i64(&mut self) -> Result<i64, WireDecodeError> {
        match self.shift()? {
            WireValue::I64(n) => Ok(n),
            other => Err(mismatch(ValueKind::I64, &other)),
        }
    }

    /// Consumes the next value, requiring it to be a sequence.
    pub fn shift_seq(&mut self) -> Result<Vec<WireValue>, WireDecodeError> {
        match self.shift()? {
            WireValue::Seq(items) => Ok(items),
            other => Err(mismatch(ValueKind::Seq, &other)),
        }
    }

    /// Consumes the next value, requiring a string or `Null`.
    pub fn shift_opt_str(&mut self) -> Result<Option<String>, WireDecodeError> {
        match self.shift()? {
            WireValue::Null => Ok(None),
            WireValue::Str(s) => Ok(Some(s)),
            other => Err(mismatch(ValueKind::Str, &other)),
        }
    }

    /// Consumes every remaining value.
    pub fn shift_all(&mut self) -> Result<Vec<WireValue>, WireDecodeError> {
        let mut values = Vec::new();
        while !self.is_empty() {
            values.push(self.shift()?);
        }
        Ok(values)
    }

    fn read_value(&mut self, depth: usize) -> Result<WireValue, WireDecodeError> {
        if depth > MAX_SEQ_NESTING_DEPTH {
            return Err(WireDecodeError::DepthLimitExceeded);
        }

        let kind_byte = *self.buf.get(self.pos).ok_or(WireDecodeError::UnexpectedEof)?;
        self.pos += VALUE_KIND_SIZE;

        let kind = ValueKind::try_from(kind_byte)
            .map_err(|_| WireDecodeError::UnknownValueKind(kind_byte))?;

        match kind {
            ValueKind::Null => Ok(WireValue::Null),
            ValueKind::Bool => {
                let b = self.take(1)?;
                Ok(WireValue::Bool(b[0] != 0))
            }
            ValueKind::I64 => {
                let raw = self.take(VALUE_SCALAR_SIZE)?;
                Ok(WireValue::I64(i64::from_le_bytes(raw.try_into().unwrap())))
            }
            ValueKind::F64 => {
                let raw = self.take(VALUE_SCALAR_SIZE)?;
                Ok(WireValue::F64(f64::from_le_bytes(raw.try_into().unwrap())))
            }
            ValueKind::Str => {
                let len = self.take_len()?;
                let raw = self.take(len)?;
                let s = std::str::from_utf8(raw).map_err(|_| WireDecodeError::InvalidUtf8)?;
                Ok(WireValue::Str(s.to_string()))
            }
            ValueKind::Bytes => {
                let len = self.take_len()?;
                Ok(WireValue::Bytes(self.take(len)?.to_vec()))
            }
            ValueKind::Seq => {
                let count = self.take_len()?;
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(WireValue::Seq(items))
            }
        }
    }

    fn take_len(&mut self) -> Result<usize, WireDecodeError> {
        let raw = self.take(VALUE_LENGTH_FIELD_SIZE)?;
        Ok(u32::from_le_bytes(raw.try_into().unwrap()) as usize)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireDecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(WireDecodeError::UnexpectedEof)?;
        if end > self.buf.len() {
            return Err(WireDecodeError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

fn mismatch(expected: ValueKind, actual: &WireValue) -> WireDecodeError {
    WireDecodeError::TypeMismatch {
        expected,
        actual: actual.kind(),
    }
}
