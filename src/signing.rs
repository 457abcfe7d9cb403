//! Derivation of the per-request STK Push password and timestamp

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};

/// Offset of East Africa Time from UTC. Fixed; Kenya observes no daylight saving.
const EAT_UTC_OFFSET_HOURS: i64 = 3;

/// Current time as the 14-digit `YYYYMMDDHHMMSS` string the gateway expects.
///
/// Formatted in East Africa Time (UTC+3). The derived password is only valid
/// while the timestamp agrees with the gateway's clock, so the zone is pinned
/// rather than inherited from the process.
pub fn timestamp() -> String {
    timestamp_at(Utc::now())
}

fn timestamp_at(now: DateTime<Utc>) -> String {
    (now + Duration::hours(EAT_UTC_OFFSET_HOURS))
        .format("%Y%m%d%H%M%S")
        .to_string()
}

/// Derive the per-request password: base64 of `shortcode || passkey || timestamp`,
/// concatenated byte-wise with no delimiter.
///
/// Pure and deterministic. Recomputed for every request since it embeds the
/// timestamp.
pub fn password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    general_purpose::STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}
