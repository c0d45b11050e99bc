/// Type identity of a call-side parameter that resolves to the receiving
/// peer handle itself.
pub const CALL_SIDE_PEER_TYPE_ID: &str = "peer";

// Type identities with built-in conversion rules. Anything else passes
// through the binder untouched and is interpreted by the handler.
pub const TYPE_ID_BOOL: &str = "bool";
pub const TYPE_ID_I64: &str = "i64";
pub const TYPE_ID_F64: &str = "f64";
pub const TYPE_ID_STR: &str = "str";
pub const TYPE_ID_BYTES: &str = "bytes";
pub const TYPE_ID_SEQ: &str = "seq";
