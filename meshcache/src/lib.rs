//! # meshcache
//!
//! Facade crate for the distributed in-memory key→bytes cache. Re-exports
//! the pieces built up across `meshcache-common`, `meshcache-core`, and
//! `meshcache-group` so a caller can depend on one crate, mirroring how
//! `hkv-client` fronted this workspace's engine/protocol split with a
//! single public surface.
//!
//! ```
//! use std::sync::Arc;
//! use meshcache::{new_group, Getter, GetterFn};
//!
//! let getter: Arc<dyn Getter> = Arc::new(GetterFn::new(|key: &str| {
//!     Ok(format!("value-for-{key}").into_bytes())
//! }));
//! let group = new_group("demo", 1 << 20, getter, "lru").unwrap();
//! let view = group.get("alpha").unwrap();
//! assert_eq!(view.as_string(), "value-for-alpha");
//! ```

use std::sync::{Arc, OnceLock};

pub use meshcache_common::{ByteView, CacheError, CacheResult, Getter, GetterFn, PeerGetter, PeerPicker};
pub use meshcache_core::{
    fnv1a_32, Coalescer, ConcurrentShard, Entry, EvictionAlgorithm, EvictionPolicy, HashRing,
    ShardedStore, DEFAULT_REPLICAS,
};
pub use meshcache_group::{Group, Registry, DEFAULT_SHARDS_PER_GROUP, HOT_KEY_REPLICAS, HOT_KEY_THRESHOLD};

fn global_registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::new)
}

/// Creates a new group and registers it under `name` in the process-wide
/// registry (spec §4.H/§4.I). Prefer holding your own [`Registry`] if you
/// don't want process-global state.
pub fn new_group(
    name: impl Into<String>,
    cache_bytes_per_shard: usize,
    getter: Arc<dyn Getter>,
    algorithm: &str,
) -> CacheResult<Arc<Group>> {
    let name = name.into();
    let group = Group::new(name, cache_bytes_per_shard, getter, algorithm)?;
    global_registry().insert(group.clone());
    Ok(group)
}

/// Looks up a group previously created with [`new_group`].
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    global_registry().get(name)
}
