//! Least-recently-used eviction policy (spec §4.B "LRU specifics").
//!
//! Grounded in `hkv-engine::MemoryEngine`'s index-based intrusive list:
//! nodes live in a dense `Vec` slot arena with `prev`/`next` indices
//! instead of heap pointers, and a free-list recycles vacated slots.

use std::collections::HashMap;

use meshcache_common::ByteView;

use crate::policy::{Entry, EvictionPolicy};

struct Node {
    key: String,
    value: ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Byte-bounded LRU store. Not thread-safe on its own: wrap in a
/// [`crate::shard::ConcurrentShard`] for concurrent access.
pub struct LruPolicy {
    max_bytes: usize,
    used_bytes: usize,
    index: HashMap<String, usize>,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    /// Most-recently-used end of the list.
    head: Option<usize>,
    /// Least-recently-used end of the list; the next eviction candidate.
    tail: Option<usize>,
}

impl LruPolicy {
    /// `max_bytes == 0` disables eviction (unbounded).
    pub fn new(max_bytes: usize) -> Self {
        LruPolicy {
            max_bytes,
            used_bytes: 0,
            index: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().expect("node exists");
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.nodes[idx].as_mut().unwrap();
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            self.nodes[h].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Moves `idx` to the most-recently-used end.
    fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_front(idx);
    }

    fn alloc_slot(&mut self) -> usize {
        self.free.pop().unwrap_or_else(|| {
            self.nodes.push(None);
            self.nodes.len() - 1
        })
    }

    fn evict_entry(&mut self, idx: usize) -> Entry {
        self.detach(idx);
        let node = self.nodes[idx].take().expect("node exists");
        self.free.push(idx);
        self.index.remove(&node.key);
        let entry = Entry {
            key: node.key,
            value: node.value,
            freq: 0,
        };
        self.used_bytes -= entry.charged_bytes();
        entry
    }
}

impl EvictionPolicy for LruPolicy {
    fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        Some(self.nodes[idx].as_ref().unwrap().value.clone())
    }

    fn add(&mut self, key: String, value: ByteView) -> Vec<Entry> {
        if let Some(&idx) = self.index.get(&key) {
            let old_len = self.nodes[idx].as_ref().unwrap().value.len();
            let new_len = value.len();
            self.nodes[idx].as_mut().unwrap().value = value;
            self.touch(idx);
            if new_len >= old_len {
                self.used_bytes += new_len - old_len;
            } else {
                self.used_bytes -= old_len - new_len;
            }
        } else {
            let charged = key.len() + value.len();
            let idx = self.alloc_slot();
            self.nodes[idx] = Some(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
            self.index.insert(key, idx);
            self.used_bytes += charged;
        }

        let mut evicted = Vec::new();
        while self.max_bytes > 0 && self.used_bytes > self.max_bytes {
            match self.remove_oldest() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    fn remove_oldest(&mut self) -> Option<Entry> {
        let idx = self.tail?;
        Some(self.evict_entry(idx))
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn used_bytes(&self) -> usize {
        self.used_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bv(s: &str) -> ByteView {
        ByteView::new(s.as_bytes())
    }

    #[test]
    fn round_trip() {
        let mut lru = LruPolicy::new(0);
        lru.add("k1".into(), bv("v1"));
        assert_eq!(lru.get("k1"), Some(bv("v1")));
    }

    #[test]
    fn eviction_order_s2() {
        // capacity = len("key1value1key2value2")
        let cap = "key1value1key2value2".len();
        let mut lru = LruPolicy::new(cap);
        assert!(lru.add("key1".into(), bv("value1")).is_empty());
        assert!(lru.add("key2".into(), bv("value2")).is_empty());
        let evicted = lru.add("k3".into(), bv("v3"));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].key, "key1");
        assert_eq!(lru.len(), 2);
        assert!(lru.get("key1").is_none());
    }

    #[test]
    fn get_promotes_entry_property2() {
        let mut lru = LruPolicy::new(100);
        lru.add("k1".into(), bv("v1"));
        lru.add("k2".into(), bv("v2"));
        lru.get("k1");
        let evicted = lru.add("k3".into(), bv("v3"));
        // budget not exceeded at 100 bytes; nothing evicted yet, but
        // simulate a tight budget to exercise ordering.
        assert!(evicted.is_empty());

        let mut tight = LruPolicy::new("k1v1k2v2".len());
        tight.add("k1".into(), bv("v1"));
        tight.add("k2".into(), bv("v2"));
        tight.get("k1");
        let evicted = tight.add("k3".into(), bv("v3"));
        assert_eq!(evicted[0].key, "k2");
    }

    #[test]
    fn update_existing_key_adjusts_bytes() {
        let mut lru = LruPolicy::new(0);
        lru.add("k".into(), bv("a"));
        lru.add("k".into(), bv("longer"));
        assert_eq!(lru.used_bytes(), "k".len() + "longer".len());
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn remove_oldest_on_empty_is_noop() {
        let mut lru = LruPolicy::new(10);
        assert!(lru.remove_oldest().is_none());
    }

    #[test]
    fn unbounded_when_max_bytes_zero() {
        let mut lru = LruPolicy::new(0);
        for i in 0..1000 {
            lru.add(format!("k{i}"), bv("v"));
        }
        assert_eq!(lru.len(), 1000);
    }
}
