//! Process-wide name→group registry (spec §4.I).
//!
//! Grounded in `geecache/core/group.go`'s package-level `groups` map
//! guarded by a `sync.RWMutex`. Rust has no implicit package-level
//! mutable state, so this is an explicit struct; `meshcache`'s facade
//! crate exposes one shared instance via `OnceLock` for callers who want
//! the "locate a group by name" convenience the source's global gave RPC
//! handlers, while dependency injection (holding your own `Registry`)
//! remains available for anyone who'd rather not reach for global state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::group::Group;

/// Name→group map. Groups are created once and never removed.
#[derive(Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `group` under its own name. Write-locked.
    pub fn insert(&self, group: Arc<Group>) {
        self.groups.write().insert(group.name().to_string(), group);
    }

    /// Looks up a previously-created group by name. Read-locked.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcache_common::{CacheResult, Getter, GetterFn};

    fn getter() -> Arc<dyn Getter> {
        Arc::new(GetterFn::new(|key: &str| -> CacheResult<Vec<u8>> {
            Ok(key.as_bytes().to_vec())
        }))
    }

    #[test]
    fn lookup_after_insert() {
        let registry = Registry::new();
        let group = Group::new("scores", 1024, getter(), "lru").unwrap();
        registry.insert(group);
        assert!(registry.get("scores").is_some());
        assert!(registry.get("missing").is_none());
    }
}
