//! Peer transport and routing boundary (spec §4.G, §6).
//!
//! These traits describe the shape of a remote peer without prescribing a
//! transport: any RPC, HTTP, or raw-socket implementation can satisfy them.
//! The core assumes `fetch` returning `Ok` yields authoritative bytes and
//! does not retry at this layer.

use crate::error::CacheResult;

/// Opaque handle to a remote cache node for one group.
pub trait PeerGetter: Send + Sync {
    /// Fetches `key` from `group` on the remote peer.
    fn fetch(&self, group: &str, key: &str) -> CacheResult<Vec<u8>>;
}

/// Selects which peer owns a key.
///
/// Implementations own the self-exclusion rule: `pick` must never return
/// the local node as a remote peer. The core does not special-case
/// "local" itself.
pub trait PeerPicker: Send + Sync {
    /// Returns `Some(peer)` when `key` should be routed to a remote node,
    /// or `None` to mean "load locally". This collapses the source's
    /// `(peer PeerGetter, ok bool)` pair into an `Option`, since a `false`
    /// result never carries a usable peer.
    fn pick(&self, key: &str) -> Option<Box<dyn PeerGetter>>;

    /// Optional capability for hot-key propagation (spec's
    /// `ReplicatedPeerPicker`): returns up to `count` distinct peers
    /// eligible for replication of `key`, in ring-walk order. Pickers
    /// that don't support replication keep the default `None`, and
    /// `SyncHotKeyToPeers` treats that the same as "no peers available".
    fn pick_multiple(&self, _key: &str, _count: usize) -> Option<Vec<Box<dyn PeerGetter>>> {
        None
    }
}
