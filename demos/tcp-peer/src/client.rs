//! `PeerGetter` implementation over the pooled TCP connection, grounded
//! in `hkv-client::KVClient`'s facade-over-pool shape.

use meshcache_common::{CacheError, CacheResult, PeerGetter};

use crate::pool::{ConnectionPool, PoolConfig};
use crate::protocol::WireValue;

/// Talks FETCH/reply over TCP to one remote peer.
pub struct TcpPeerGetter {
    addr: String,
    pool: ConnectionPool,
}

impl TcpPeerGetter {
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let pool = ConnectionPool::new(PoolConfig {
            addr: addr.clone(),
            ..PoolConfig::default()
        });
        TcpPeerGetter { addr, pool }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl PeerGetter for TcpPeerGetter {
    fn fetch(&self, group: &str, key: &str) -> CacheResult<Vec<u8>> {
        let mut conn = self
            .pool
            .acquire()
            .map_err(|err| CacheError::peer_failure(format!("{}: {err}", self.addr)))?;
        let reply = conn
            .exec(&[b"FETCH", group.as_bytes(), key.as_bytes()])
            .map_err(|err| CacheError::peer_failure(format!("{}: {err}", self.addr)))?;
        match reply {
            WireValue::Bulk(Some(data)) => Ok(data),
            WireValue::Bulk(None) => Err(CacheError::peer_failure(format!(
                "{}: key not found on peer",
                self.addr
            ))),
            WireValue::Error(message) => Err(CacheError::peer_failure(format!(
                "{}: {}",
                self.addr,
                String::from_utf8_lossy(&message)
            ))),
            _ => Err(CacheError::peer_failure(format!(
                "{}: unexpected reply",
                self.addr
            ))),
        }
    }
}
