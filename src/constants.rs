// Wire value related constants
pub const VALUE_KIND_SIZE: usize = 1;
pub const VALUE_LENGTH_FIELD_SIZE: usize = 4;
pub const VALUE_SCALAR_SIZE: usize = 8;

/// Maximum nesting depth accepted for `Seq` values, in both directions.
/// The inbound byte stream is remote-controlled, so decoding is bounded
/// rather than recursing on whatever arrives.
pub const MAX_SEQ_NESTING_DEPTH: usize = 32;

/// Envelope tag for a call that expects a correlated reply.
pub const ENVELOPE_TAG_CALL: &str = "?";

/// Envelope tag for a fire-and-forget call. No reply is ever produced for
/// these, not even on failure.
pub const ENVELOPE_TAG_CALL_NO_REPLY: &str = ".";

/// Envelope tag for a reply to a prior call.
pub const ENVELOPE_TAG_REPLY: &str = "=";
