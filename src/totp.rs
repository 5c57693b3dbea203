//! RFC-6238 code generation and drift-window validation.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

/// Number of digits for the code.
pub const DIGITS: u32 = 6;
/// Time-step quantization of Unix time, in seconds.
pub const PERIOD: u64 = 30;
/// Accepted skew on either side of the current step.
const DRIFT_STEPS: i64 = 1;

/// Generates the TOTP code for one time step.
///
/// Pure and deterministic: HMAC-SHA1 over the big-endian step counter,
/// dynamic truncation, reduced modulo 10^6 and zero-padded.
pub fn generate_code(secret: &[u8], time_step: u64) -> String {
    let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(secret) else {
        // HMAC accepts keys of any length; an empty string never matches a
        // 6-digit submission, so a failure here degrades to "reject".
        return String::new();
    };
    mac.update(&time_step.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    let offset = (hash[19] & 0x0f) as usize;
    // Top bit masked to avoid sign ambiguity in the 31-bit read.
    let binary = (u32::from(hash[offset] & 0x7f) << 24)
        | (u32::from(hash[offset + 1]) << 16)
        | (u32::from(hash[offset + 2]) << 8)
        | u32::from(hash[offset + 3]);

    format!("{:06}", binary % 10u32.pow(DIGITS))
}

/// Checks a submitted code against the secret at `now`, tolerating one
/// step of clock drift on either side (90 s effective window).
///
/// Malformed submissions are rejected before any hashing; malformed or
/// empty secrets simply never match.
pub fn validate(secret: &[u8], submitted: &str, now: DateTime<Utc>) -> bool {
    if submitted.len() != DIGITS as usize
        || !submitted.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }

    let time_step = (now.timestamp().max(0) as u64) / PERIOD;
    for drift in -DRIFT_STEPS..=DRIFT_STEPS {
        let Some(step) = time_step.checked_add_signed(drift) else {
            continue;
        };
        if generate_code(secret, step) == submitted {
            return true;
        }
    }

    false
}
