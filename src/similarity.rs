//! Similar-error tracking
//!
//! Errors are considered similar when their rendered messages are identical.
//! Messages are reduced to a 128-bit FNV-1a digest and counted in a sharded
//! concurrent map. The read-then-increment of one digest happens under that
//! digest's shard guard, so concurrent recorders never lose updates and
//! recorders of different digests rarely contend.

use crate::chain::Link;
use dashmap::DashMap;

/// A 128-bit digest of a rendered error message
pub type Digest = u128;

const FNV_OFFSET_BASIS: u128 = 0x6c62272e07bb014262b821756295c58d;
const FNV_PRIME: u128 = 0x0000000001000000000000000000013b;

/// 128-bit FNV-1a over `bytes`
pub fn fnv1a_128(bytes: &[u8]) -> Digest {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u128::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Digest of an error's rendered message
pub fn digest(link: Link<'_>) -> Digest {
    fnv1a_128(link.rendered().as_bytes())
}

/// Counts occurrences of rendered error messages
#[derive(Debug, Default)]
pub struct SimilarityTracker {
    counts: DashMap<Digest, u64>,
}

impl SimilarityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return how many times `link` was seen before, then count this sighting
    ///
    /// The first sighting of a message returns 0. An absent error returns 0
    /// without touching the map.
    pub fn record_and_count(&self, link: Option<Link<'_>>) -> u64 {
        match link {
            Some(link) => self.record_digest(digest(link)),
            None => 0,
        }
    }

    /// Same as [`record_and_count`](Self::record_and_count) for a known digest
    pub fn record_digest(&self, digest: Digest) -> u64 {
        let mut count = self.counts.entry(digest).or_insert(0);
        let seen = *count;
        *count += 1;
        seen
    }

    /// Number of sightings recorded for `link`, without recording another
    pub fn count(&self, link: Link<'_>) -> u64 {
        self.counts
            .get(&digest(link))
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Forget every recorded sighting
    pub fn reset(&self) {
        self.counts.clear();
    }
}
