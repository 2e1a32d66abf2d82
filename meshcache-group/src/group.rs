//! Group orchestrator: lookup→load→populate pipeline, hot-key detection,
//! and replicated propagation (spec §4.H).
//!
//! Grounded in `geecache/core/group.go`'s `Group`, with the eviction
//! algorithm now a parsed [`EvictionAlgorithm`] rather than a Go `switch`
//! over a raw string, and the getter type-checked away the "nil getter"
//! failure mode the source panics on.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use meshcache_common::{ByteView, CacheError, CacheResult, Getter, PeerPicker};
use meshcache_core::{Coalescer, EvictionAlgorithm, ShardedStore};

/// Number of shards allocated per group by `Group::new` (spec §4.H).
pub const DEFAULT_SHARDS_PER_GROUP: usize = 256;

/// A key is hot once its access count exceeds this threshold (spec §6).
pub const HOT_KEY_THRESHOLD: u64 = 100;

/// Number of peers targeted by hot-key replication (spec §6).
pub const HOT_KEY_REPLICAS: usize = 3;

/// A named cache namespace: its own store, origin getter, and peer
/// picker.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    store: ShardedStore,
    loader: Coalescer,
    peer_picker: RwLock<Option<Arc<dyn PeerPicker>>>,
    hot_counts: RwLock<std::collections::HashMap<String, u64>>,
}

impl Group {
    /// Creates a group with `DEFAULT_SHARDS_PER_GROUP` shards, each
    /// budgeted at `cache_bytes_per_shard` (`0` disables eviction),
    /// using `algorithm` (`"lru"` or `"lfu"`; anything else is an
    /// `InvalidArgument`).
    pub fn new(
        name: impl Into<String>,
        cache_bytes_per_shard: usize,
        getter: Arc<dyn Getter>,
        algorithm: &str,
    ) -> CacheResult<Arc<Group>> {
        let algorithm: EvictionAlgorithm = algorithm
            .parse()
            .map_err(CacheError::invalid_argument)?;

        Ok(Arc::new(Group {
            name: name.into(),
            getter,
            store: ShardedStore::new(DEFAULT_SHARDS_PER_GROUP, cache_bytes_per_shard, algorithm),
            loader: Coalescer::new(),
            peer_picker: RwLock::new(None),
            hot_counts: RwLock::new(std::collections::HashMap::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers the peer picker for this group. One-shot: a second call
    /// fails with `RegistrationMisuse` rather than silently replacing it.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> CacheResult<()> {
        let mut slot = self.peer_picker.write();
        if slot.is_some() {
            return Err(CacheError::registration_misuse(
                "register_peers called more than once",
            ));
        }
        *slot = Some(picker);
        Ok(())
    }

    /// Looks up `key`: local store, then peer or origin on miss.
    pub fn get(&self, key: &str) -> CacheResult<ByteView> {
        if key.is_empty() {
            return Err(CacheError::invalid_argument("key is required"));
        }
        self.increment_key_usage(key);

        if let Some(view) = self.store.get(key) {
            trace!(group = %self.name, key, "cache hit");
            return Ok(view);
        }

        debug!(group = %self.name, key, "cache miss, loading");
        self.loader.do_call(key, || self.load(key))
    }

    fn load(&self, key: &str) -> CacheResult<ByteView> {
        if let Some(picker) = self.peer_picker.read().as_ref() {
            if let Some(peer) = picker.pick(key) {
                match peer.fetch(&self.name, key) {
                    Ok(bytes) => {
                        let view = ByteView::from(bytes);
                        self.store.add(key.to_string(), view.clone());
                        return Ok(view);
                    }
                    Err(err) => {
                        warn!(group = %self.name, key, %err, "peer fetch failed, falling back");
                    }
                }
            }
        }
        self.get_locally(key)
    }

    fn get_locally(&self, key: &str) -> CacheResult<ByteView> {
        let bytes = self.getter.get(key)?;
        let view = ByteView::from(bytes);
        self.store.add(key.to_string(), view.clone());
        Ok(view)
    }

    /// Bumps `key`'s access counter under a write lock.
    pub fn increment_key_usage(&self, key: &str) {
        *self.hot_counts.write().entry(key.to_string()).or_insert(0) += 1;
    }

    /// True iff `key`'s access count exceeds `HOT_KEY_THRESHOLD`.
    pub fn is_hot_key(&self, key: &str) -> bool {
        self.hot_counts
            .read()
            .get(key)
            .is_some_and(|&count| count > HOT_KEY_THRESHOLD)
    }

    /// Fire-and-forget propagation: if `key` is hot, pushes `value` to up
    /// to `HOT_KEY_REPLICAS` peers in parallel for warming. A no-op when
    /// the key isn't hot or the installed picker doesn't support
    /// replication. Success requires every individual fetch to succeed;
    /// the first observed error is reported.
    pub fn sync_hot_key_to_peers(&self, key: &str, _value: &ByteView) -> CacheResult<()> {
        if !self.is_hot_key(key) {
            return Ok(());
        }

        let picker = self.peer_picker.read().clone();
        let Some(picker) = picker else {
            return Err(CacheError::peer_failure("no peer picker registered"));
        };
        let Some(peers) = picker.pick_multiple(key, HOT_KEY_REPLICAS) else {
            return Err(CacheError::peer_failure(
                "installed picker does not support replication",
            ));
        };
        if peers.is_empty() {
            return Err(CacheError::peer_failure(format!(
                "no peers available for key: {key}"
            )));
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = peers
                .iter()
                .map(|peer| scope.spawn(|| self.warm_peer(peer.as_ref(), key)))
                .collect();

            let mut first_error = None;
            for handle in handles {
                if let Err(err) = handle.join().expect("warm_peer thread panicked") {
                    warn!(group = %self.name, key, %err, "failed to sync hot key to peer");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    /// Issues a read against `peer` purely to warm its local cache for
    /// `group`/`key` (spec §9 "Hot-key propagation": this is a read, not
    /// a write RPC: it only warms if the remote's own `Group::get`
    /// populates its store on miss, which it does).
    fn warm_peer(
        &self,
        peer: &dyn meshcache_common::PeerGetter,
        key: &str,
    ) -> CacheResult<()> {
        peer.fetch(&self.name, key).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcache_common::GetterFn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_getter(calls: Arc<AtomicUsize>) -> Arc<dyn Getter> {
        Arc::new(GetterFn::new(move |key: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(key.as_bytes().to_vec())
        }))
    }

    #[test]
    fn s1_read_through_then_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Group::new("scores", 1 << 16, counting_getter(calls.clone()), "lru").unwrap();

        let first = group.get("Tom").unwrap();
        assert_eq!(first.as_bytes(), b"Tom".to_vec());
        let second = group.get("Tom").unwrap();
        assert_eq!(second.as_bytes(), b"Tom".to_vec());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "getter should fire once");
    }

    #[test]
    fn empty_key_is_invalid_argument() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Group::new("g", 1024, counting_getter(calls), "lru").unwrap();
        assert!(matches!(group.get(""), Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn unknown_algorithm_rejected_at_construction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = Group::new("g", 1024, counting_getter(calls), "mru");
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn origin_error_propagates() {
        let getter: Arc<dyn Getter> = Arc::new(GetterFn::new(|_: &str| {
            Err(CacheError::origin_failure("no such key"))
        }));
        let group = Group::new("g", 1024, getter, "lru").unwrap();
        assert!(matches!(group.get("missing"), Err(CacheError::OriginFailure(_))));
    }

    #[test]
    fn s5_hot_key_detection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Group::new("g", 1024, counting_getter(calls), "lru").unwrap();
        for _ in 0..101 {
            group.increment_key_usage("hotkey");
        }
        assert!(group.is_hot_key("hotkey"));
        assert!(!group.is_hot_key("coldkey"));
    }

    #[test]
    fn register_peers_twice_fails() {
        struct NoopPicker;
        impl PeerPicker for NoopPicker {
            fn pick(&self, _key: &str) -> Option<Box<dyn meshcache_common::PeerGetter>> {
                None
            }
        }
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Group::new("g", 1024, counting_getter(calls), "lru").unwrap();
        group.register_peers(Arc::new(NoopPicker)).unwrap();
        let second = group.register_peers(Arc::new(NoopPicker));
        assert!(matches!(second, Err(CacheError::RegistrationMisuse(_))));
    }

    #[test]
    fn sync_hot_key_noop_when_not_hot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Group::new("g", 1024, counting_getter(calls), "lru").unwrap();
        assert!(group
            .sync_hot_key_to_peers("coldkey", &ByteView::new(b"v"))
            .is_ok());
    }
}
