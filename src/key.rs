//! Session key generation and TTL conversion
//!
//! Keys have the layout `"{app_name}:Sessions:{id}"`, where `id` is 16 lowercase
//! hex characters drawn from 8 random bytes. The full key doubles as the session
//! identifier handed back to the framework.

use chrono::{DateTime, Utc};
use rand::RngCore;

/// Fixed segment between the application namespace and the random id
pub const SESSIONS_SEGMENT: &str = "Sessions";

const ID_BYTES: usize = 8;

/// Generate a fresh random session id (16 hex chars)
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compose the namespaced store key for a session id
pub fn format_key(app_name: &str, id: &str) -> String {
    format!("{}:{}:{}", app_name, SESSIONS_SEGMENT, id)
}

/// Convert an absolute expiry into a relative TTL in whole seconds.
///
/// Rounds half up on the millisecond delta and clamps to zero for expiries
/// that have already passed.
pub fn expires_to_seconds(expires: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let delta_ms = (expires - now).num_milliseconds();
    if delta_ms <= 0 {
        return 0;
    }
    ((delta_ms + 500) / 1000) as u64
}
