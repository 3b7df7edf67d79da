//! Perfect-hash-indexed store of packed n-gram counts.

use bincode::{Decode, Encode};
use boomphf::Mphf;

use crate::codec;
use crate::common;
use crate::vocabulary::WordId;

const GAMMA: f64 = 1.7;

/// A single fixed-layout cell of the store.
///
/// The fingerprint rejects queries for foreign keys that land in this
/// bucket; a query returns a spurious count only when its 16-bit fingerprint
/// collides with the occupant's, i.e. with probability 2^-16.
#[derive(Default, Clone, Copy, Eq, PartialEq, Debug, Decode, Encode)]
pub(crate) struct Bucket {
    fingerprint: u16,
    packed: u16,
}

/// Read-only mapping from serialized gram keys to lossily packed counts.
///
/// Construction builds a minimal perfect hash over the key set and fills one
/// bucket per key; afterwards the store answers lookups in constant time and
/// two bytes per entry beyond the hash tables themselves.
#[derive(Decode, Encode)]
pub(crate) struct NgramStore {
    ph: bincode::serde::Compat<Mphf<Vec<u8>>>,
    buckets: Vec<Bucket>,
}

impl NgramStore {
    /// Builds the perfect hash over `keys` and allocates zeroed buckets.
    ///
    /// The keys must be distinct as byte strings.
    pub(crate) fn new(keys: &[Vec<u8>]) -> Self {
        let ph = Mphf::new(GAMMA, keys);
        let buckets = vec![Bucket::default(); keys.len()];
        Self {
            ph: bincode::serde::Compat(ph),
            buckets,
        }
    }

    /// Writes the bucket of a key that was passed to [`NgramStore::new`].
    pub(crate) fn set(&mut self, key: Vec<u8>, count: u32) {
        let slot = self
            .ph
            .0
            .try_hash(&key)
            .expect("key missing from the perfect hash");
        let bucket = &mut self.buckets[slot as usize];
        bucket.fingerprint = fingerprint(&key);
        bucket.packed = codec::pack_count(count);
    }

    /// Returns the stored count of `key`, up to codec loss.
    ///
    /// Foreign keys return 0 unless their fingerprint collides with the
    /// bucket occupant's.
    pub(crate) fn count(&self, key: Vec<u8>) -> u32 {
        let slot = match self.ph.0.try_hash(&key) {
            Some(slot) => slot,
            None => return 0,
        };
        let bucket = match self.buckets.get(slot as usize) {
            Some(bucket) => bucket,
            None => return 0,
        };
        if bucket.fingerprint != fingerprint(&key) {
            return 0;
        }
        codec::unpack_count(bucket.packed)
    }

    /// Number of buckets, at least the number of keys.
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[cfg(test)]
    pub(crate) fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }
}

fn fingerprint(key: &[u8]) -> u16 {
    cityhasher::hash::<u64>(key) as u16
}

/// Canonical byte form of a unigram key.
pub(crate) fn gram1_key(a: WordId) -> Vec<u8> {
    bincode::encode_to_vec(a, common::bincode_config()).unwrap()
}

/// Canonical byte form of a bigram key.
pub(crate) fn gram2_key(a: WordId, b: WordId) -> Vec<u8> {
    bincode::encode_to_vec((a, b), common::bincode_config()).unwrap()
}

/// Canonical byte form of a trigram key.
pub(crate) fn gram3_key(a: WordId, b: WordId, c: WordId) -> Vec<u8> {
    bincode::encode_to_vec((a, b, c), common::bincode_config()).unwrap()
}
