//! 128-bit whole-board identity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A canonical 128-bit key, split into two 64-bit halves.
///
/// Ordered by `(high, low)`. Hashing folds both halves into one word, so
/// distinct keys can share a hash; consumers must tolerate that.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct CompactKey {
    pub low: u64,
    pub high: u64,
}

impl CompactKey {
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }
}

impl From<u128> for CompactKey {
    #[inline]
    fn from(v: u128) -> Self {
        Self {
            low: v as u64,
            high: (v >> 64) as u64,
        }
    }
}

impl From<CompactKey> for u128 {
    #[inline]
    fn from(k: CompactKey) -> Self {
        (u128::from(k.high) << 64) | u128::from(k.low)
    }
}

impl Ord for CompactKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.high
            .cmp(&other.high)
            .then_with(|| self.low.cmp(&other.low))
    }
}

impl PartialOrd for CompactKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Folds the halves with XOR before hashing instead of XOR-ing two per-half
/// hashes. Both collide exactly when `low ^ high` matches, and this writes one
/// word.
impl Hash for CompactKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.low ^ self.high);
    }
}

impl fmt::LowerHex for CompactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.high, self.low)
    }
}

impl fmt::Display for CompactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}
