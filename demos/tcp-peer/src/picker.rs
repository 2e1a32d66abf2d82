//! Consistent-hash `PeerPicker` over a static peer list, excluding the
//! local address per the self-exclusion contract documented on
//! `meshcache_common::PeerPicker`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use meshcache_common::{CacheResult, PeerGetter, PeerPicker};
use meshcache_core::HashRing;

use crate::client::TcpPeerGetter;

/// Delegates to a shared, pooled [`TcpPeerGetter`] so the ring doesn't pay
/// for a fresh connection pool on every `pick`.
struct SharedPeer(Arc<TcpPeerGetter>);

impl PeerGetter for SharedPeer {
    fn fetch(&self, group: &str, key: &str) -> CacheResult<Vec<u8>> {
        self.0.fetch(group, key)
    }
}

/// Picks peers for a group by consistent-hashing `addr:port` strings,
/// never returning `self_addr` as a remote peer.
pub struct TcpPeerPicker {
    self_addr: String,
    ring: HashRing,
    getters: Mutex<HashMap<String, Arc<TcpPeerGetter>>>,
}

impl TcpPeerPicker {
    pub fn new(self_addr: impl Into<String>, peer_addrs: &[impl AsRef<str>]) -> Self {
        let self_addr = self_addr.into();
        let mut ring = HashRing::with_defaults();
        let remote: Vec<&str> = peer_addrs
            .iter()
            .map(|a| a.as_ref())
            .filter(|a| *a != self_addr)
            .collect();
        ring.add(&remote);
        TcpPeerPicker {
            self_addr,
            ring,
            getters: Mutex::new(HashMap::new()),
        }
    }

    fn getter_for(&self, addr: &str) -> Arc<TcpPeerGetter> {
        let mut getters = self.getters.lock().expect("getter cache poisoned");
        getters
            .entry(addr.to_string())
            .or_insert_with(|| Arc::new(TcpPeerGetter::new(addr)))
            .clone()
    }
}

impl PeerPicker for TcpPeerPicker {
    fn pick(&self, key: &str) -> Option<Box<dyn PeerGetter>> {
        let addr = self.ring.get(key)?;
        if addr == self.self_addr {
            return None;
        }
        Some(Box::new(SharedPeer(self.getter_for(&addr))))
    }

    fn pick_multiple(&self, key: &str, count: usize) -> Option<Vec<Box<dyn PeerGetter>>> {
        if self.ring.is_empty() {
            return None;
        }
        let addrs = self.ring.get_multiple(key, count);
        Some(
            addrs
                .iter()
                .filter(|addr| addr.as_str() != self.self_addr)
                .map(|addr| Box::new(SharedPeer(self.getter_for(addr))) as Box<dyn PeerGetter>)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_routes_to_self() {
        let picker = TcpPeerPicker::new(
            "127.0.0.1:9001",
            &["127.0.0.1:9001", "127.0.0.1:9002", "127.0.0.1:9003"],
        );
        for i in 0..50 {
            if let Some(peer) = picker.pick(&format!("key-{i}")) {
                let _ = peer;
            }
        }
        // The ring itself never contains self_addr, so `pick` can only
        // ever return a genuine remote; this exercises construction and
        // the filter above without needing a live listener.
        assert!(!picker.ring.is_empty());
    }
}
