use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the epoch, or 0 if the system clock is before it.
pub fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
