//! Consistent hash ring with virtual replicas (spec §3, §4.E).
//!
//! Grounded in `geecache/distributed/consistenthash.go`'s `Map`: virtual
//! points per peer, sorted once on `add`, binary-searched on `get`. The
//! default hash swaps Go's `crc32.ChecksumIEEE` for the `crc32fast` crate
//! (same IEEE polynomial, SIMD-accelerated).

use std::collections::HashMap;

/// Hash function used to place virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u32;

fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Default replica factor per peer (spec §6 "Configuration").
pub const DEFAULT_REPLICAS: u32 = 50;

/// Maps cache keys to peer identities via consistent hashing.
///
/// `sorted_hashes` is kept strictly monotone (sorted, though virtual
/// points may collide across unrelated peers in pathological inputs);
/// `hash_to_peer` covers every element of `sorted_hashes`.
pub struct HashRing {
    replicas: u32,
    hash_fn: HashFn,
    sorted_hashes: Vec<u32>,
    hash_to_peer: HashMap<u32, String>,
}

impl HashRing {
    /// Builds a ring with the given replica factor and hash function.
    pub fn new(replicas: u32, hash_fn: HashFn) -> Self {
        HashRing {
            replicas,
            hash_fn,
            sorted_hashes: Vec::new(),
            hash_to_peer: HashMap::new(),
        }
    }

    /// Builds a ring with the default replica factor (50) and CRC32-IEEE.
    pub fn with_defaults() -> Self {
        HashRing::new(DEFAULT_REPLICAS, crc32_ieee)
    }

    /// Adds zero or more real peers, each placed at `replicas` virtual
    /// points keyed by `"{i}{peer}"` for `i in 0..replicas`. Adding the
    /// same peer set in any order yields an identical `sorted_hashes`
    /// (spec property 6), since the set is fully re-sorted afterward.
    pub fn add(&mut self, peers: &[impl AsRef<str>]) {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let virtual_key = format!("{i}{peer}");
                let hash = (self.hash_fn)(virtual_key.as_bytes());
                self.sorted_hashes.push(hash);
                self.hash_to_peer.insert(hash, peer.to_string());
            }
        }
        self.sorted_hashes.sort_unstable();
    }

    /// Removes a peer's virtual points. Only keys that previously mapped
    /// to it (or an adjacent virtual node that happened to collide) are
    /// reassigned; every other key's peer is unaffected.
    pub fn remove(&mut self, peer: &str) {
        let removed: Vec<u32> = self
            .hash_to_peer
            .iter()
            .filter(|(_, p)| p.as_str() == peer)
            .map(|(h, _)| *h)
            .collect();
        for hash in removed {
            self.hash_to_peer.remove(&hash);
        }
        self.sorted_hashes.retain(|h| self.hash_to_peer.contains_key(h));
    }

    /// Returns the peer owning `key`, or `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.sorted_hashes.is_empty() {
            return None;
        }
        let hash = (self.hash_fn)(key.as_bytes());
        let idx = self.sorted_hashes.partition_point(|&h| h < hash);
        let idx = if idx == self.sorted_hashes.len() { 0 } else { idx };
        self.hash_to_peer.get(&self.sorted_hashes[idx]).cloned()
    }

    /// Walks the ring clockwise from `key`'s position, collecting
    /// distinct peers until `count` are found or the ring is exhausted.
    /// A `count` greater than the peer count returns all peers in walk
    /// order.
    pub fn get_multiple(&self, key: &str, count: usize) -> Vec<String> {
        if self.sorted_hashes.is_empty() || count == 0 {
            return Vec::new();
        }
        let hash = (self.hash_fn)(key.as_bytes());
        let start = {
            let idx = self.sorted_hashes.partition_point(|&h| h < hash);
            if idx == self.sorted_hashes.len() { 0 } else { idx }
        };

        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for step in 0..self.sorted_hashes.len() {
            let idx = (start + step) % self.sorted_hashes.len();
            let peer = self.hash_to_peer.get(&self.sorted_hashes[idx]).unwrap();
            if seen.insert(peer.clone()) {
                result.push(peer.clone());
                if result.len() == count {
                    break;
                }
            }
        }
        result
    }

    /// True when no peer has been added yet.
    pub fn is_empty(&self) -> bool {
        self.sorted_hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_returns_none() {
        let ring = HashRing::with_defaults();
        assert_eq!(ring.get("anything"), None);
        assert!(ring.get_multiple("anything", 3).is_empty());
    }

    #[test]
    fn get_is_stable_for_same_key() {
        let mut ring = HashRing::with_defaults();
        ring.add(&["peer-a", "peer-b", "peer-c"]);
        let first = ring.get("some-key");
        let second = ring.get("some-key");
        assert_eq!(first, second);
    }

    #[test]
    fn property6_add_order_independent() {
        let mut a = HashRing::new(10, crc32_ieee);
        a.add(&["p1", "p2", "p3"]);
        let mut b = HashRing::new(10, crc32_ieee);
        b.add(&["p3", "p1", "p2"]);
        assert_eq!(a.sorted_hashes, b.sorted_hashes);
    }

    #[test]
    fn get_multiple_returns_distinct_peers() {
        let mut ring = HashRing::new(20, crc32_ieee);
        ring.add(&["p1", "p2", "p3", "p4"]);
        let peers = ring.get_multiple("key", 2);
        assert_eq!(peers.len(), 2);
        assert_ne!(peers[0], peers[1]);
    }

    #[test]
    fn get_multiple_count_exceeding_peers_returns_all() {
        let mut ring = HashRing::new(20, crc32_ieee);
        ring.add(&["p1", "p2"]);
        let peers = ring.get_multiple("key", 10);
        assert_eq!(peers.len(), 2);
    }

    #[test]
    fn remove_only_reassigns_its_own_keys() {
        let mut ring = HashRing::new(50, crc32_ieee);
        ring.add(&["p1", "p2", "p3"]);

        let before: Vec<Option<String>> = (0..200)
            .map(|i| ring.get(&format!("key-{i}")))
            .collect();

        ring.remove("p2");
        assert!(!ring.is_empty());

        for (i, prior) in before.iter().enumerate() {
            let after = ring.get(&format!("key-{i}"));
            if prior.as_deref() != Some("p2") {
                assert_eq!(prior, &after, "key-{i} moved despite its peer surviving");
            } else {
                assert_ne!(after.as_deref(), Some("p2"));
            }
        }
    }
}
