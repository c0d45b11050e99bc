mod wire_codec;
mod wire_error;
mod wire_value;

pub use wire_codec::{WireReader, encode_values};
pub use wire_error::{WireDecodeError, WireEncodeError};
pub use wire_value::{ValueKind, WireValue};
