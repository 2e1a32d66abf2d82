//! Fixed-N sharded store routed by FNV-1a (spec §3 "Sharded store", §4.D).

use meshcache_common::ByteView;

use crate::policy::EvictionPolicy;
use crate::shard::{ConcurrentShard, EvictionCallback};

/// Eviction algorithm installed per shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionAlgorithm {
    Lru,
    Lfu,
}

impl std::str::FromStr for EvictionAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lru" => Ok(EvictionAlgorithm::Lru),
            "lfu" => Ok(EvictionAlgorithm::Lfu),
            other => Err(format!("unsupported cache algorithm: {other}")),
        }
    }
}

fn new_policy(algorithm: EvictionAlgorithm, max_bytes: usize) -> Box<dyn EvictionPolicy> {
    match algorithm {
        EvictionAlgorithm::Lru => Box::new(crate::lru::LruPolicy::new(max_bytes)),
        EvictionAlgorithm::Lfu => Box::new(crate::lfu::LfuPolicy::new(max_bytes)),
    }
}

/// FNV-1a 32-bit hash over the UTF-8 bytes of `key`, used purely for shard
/// routing (not for the consistent hash ring, which uses CRC32).
pub fn fnv1a_32(key: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET_BASIS;
    for byte in key.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// `(shards: [Shard; N], num_shards: N)`. Each shard owns its own byte
/// budget independently: total effective budget is `N * max_bytes_per_shard`.
/// There is no global lock; keys in different shards proceed in parallel.
pub struct ShardedStore {
    shards: Vec<ConcurrentShard>,
}

impl ShardedStore {
    /// Builds a store with `num_shards` shards, each enforcing
    /// `max_bytes_per_shard` (`0` disables eviction) under `algorithm`.
    pub fn new(num_shards: usize, max_bytes_per_shard: usize, algorithm: EvictionAlgorithm) -> Self {
        assert!(num_shards > 0, "num_shards must be positive");
        let shards = (0..num_shards)
            .map(|_| ConcurrentShard::new(new_policy(algorithm, max_bytes_per_shard)))
            .collect();
        ShardedStore { shards }
    }

    /// Builds a store whose shards additionally invoke `callback` on
    /// every eviction, after the evicting shard's lock is released.
    pub fn with_eviction_callback(
        num_shards: usize,
        max_bytes_per_shard: usize,
        algorithm: EvictionAlgorithm,
        callback: impl Fn(&str, &ByteView) + Send + Sync + 'static,
    ) -> Self {
        assert!(num_shards > 0, "num_shards must be positive");
        let callback: std::sync::Arc<EvictionCallback> = std::sync::Arc::new(callback);
        let shards = (0..num_shards)
            .map(|_| {
                let cb = callback.clone();
                ConcurrentShard::with_eviction_callback(
                    new_policy(algorithm, max_bytes_per_shard),
                    Box::new(move |k, v| cb(k, v)),
                )
            })
            .collect();
        ShardedStore { shards }
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &str) -> usize {
        (fnv1a_32(key) as usize) % self.shards.len()
    }

    /// Returns the shard responsible for `key`.
    pub fn shard_for(&self, key: &str) -> &ConcurrentShard {
        &self.shards[self.shard_index(key)]
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.shard_for(key).get(key)
    }

    pub fn add(&self, key: String, value: ByteView) {
        let shard = self.shard_index(&key);
        self.shards[shard].add(key, value);
    }

    /// Total live entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
