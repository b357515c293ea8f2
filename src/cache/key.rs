//! Cache Key Module
//!
//! Generates the opaque tokens callers hold and replay to address a cached
//! snapshot. Keys are minted exclusively by the store; callers never build
//! their own.

use uuid::Uuid;

/// Human-recognizable prefix carried by every cache key.
pub const KEY_PREFIX: &str = "pb_";

/// Number of hexadecimal characters in the random suffix.
pub const KEY_SUFFIX_LEN: usize = 8;

// == Key Generation ==
/// Generates a fresh cache key, e.g. `pb_a7f3b2c1`.
///
/// The suffix is the first eight lowercase hex characters of a UUIDv4, a
/// 32-bit random space in which accidental collisions are negligible while
/// the token stays short enough for a caller to quote back verbatim.
pub fn generate() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", KEY_PREFIX, &hex[..KEY_SUFFIX_LEN])
}
