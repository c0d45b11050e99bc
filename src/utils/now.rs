/// Returns the current timestamp in microseconds since the UNIX epoch
/// (January 1, 1970), falling back to `0` if system time is unavailable.
pub fn now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
