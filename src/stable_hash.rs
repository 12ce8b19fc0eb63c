//! Stable name hashing for per-model RNG streams.
//!
//! Not cryptographic. Used to derive a model's RNG seed from its configured seed and
//! its name, so models that share a config seed still draw independent streams.

/// Deterministic hash of `name` mixed with `seed`.
///
/// - FNV-1a over the name bytes (stable across platforms and releases)
/// - SplitMix64 finalizer over `seed ^ fnv`
#[must_use]
pub fn stable_hash64(seed: u64, name: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in name.as_bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    splitmix64(seed ^ h)
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
