//! Mutex-guarded wrapper around one eviction-policy instance (spec §4.C).

use parking_lot::Mutex;

use meshcache_common::ByteView;

use crate::policy::{Entry, EvictionPolicy};

/// Optional callback fired for every entry evicted from a shard.
///
/// Fired *after* the shard's mutex is released (see `DESIGN.md`: the
/// source invokes this under the lock, which is a latent reentrancy
/// hazard; this workspace buffers evictees during the locked section and
/// calls back afterwards instead). Implementations must still not touch
/// the owning store synchronously from within the callback if that would
/// recurse into the same shard's lock.
pub type EvictionCallback = dyn Fn(&str, &ByteView) + Send + Sync;

/// One independently-locked sub-store.
///
/// No operation may suspend while holding the inner mutex: policy calls
/// are pure in-memory bookkeeping, and evicted entries are returned to the
/// caller to run callbacks outside the lock.
pub struct ConcurrentShard {
    inner: Mutex<Box<dyn EvictionPolicy>>,
    on_evicted: Option<Box<EvictionCallback>>,
}

impl ConcurrentShard {
    pub fn new(policy: Box<dyn EvictionPolicy>) -> Self {
        ConcurrentShard {
            inner: Mutex::new(policy),
            on_evicted: None,
        }
    }

    pub fn with_eviction_callback(
        policy: Box<dyn EvictionPolicy>,
        callback: Box<EvictionCallback>,
    ) -> Self {
        ConcurrentShard {
            inner: Mutex::new(policy),
            on_evicted: Some(callback),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut policy = self.inner.lock();
        policy.get(key)
    }

    pub fn add(&self, key: String, value: ByteView) {
        let evicted = {
            let mut policy = self.inner.lock();
            policy.add(key, value)
        };
        self.fire_evicted(evicted);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.inner.lock().used_bytes()
    }

    fn fire_evicted(&self, evicted: Vec<Entry>) {
        if evicted.is_empty() {
            return;
        }
        if let Some(callback) = &self.on_evicted {
            for entry in &evicted {
                callback(&entry.key, &entry.value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lru::LruPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn s3_eviction_callback_sequence() {
        let evicted_keys: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted_keys.clone();
        let shard = ConcurrentShard::with_eviction_callback(
            Box::new(LruPolicy::new(10)),
            Box::new(move |key, _value| sink.lock().push(key.to_string())),
        );

        shard.add("key1".into(), ByteView::new(b"123456"));
        shard.add("k2".into(), ByteView::new(b"k2"));
        shard.add("k3".into(), ByteView::new(b"k3"));
        shard.add("k4".into(), ByteView::new(b"k4"));

        assert_eq!(*evicted_keys.lock(), vec!["key1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn callback_not_called_when_nothing_evicted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let shard = ConcurrentShard::with_eviction_callback(
            Box::new(LruPolicy::new(0)),
            Box::new(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        shard.add("a".into(), ByteView::new(b"1"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
