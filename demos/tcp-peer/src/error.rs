//! Errors local to the TCP transport, kept distinct from `CacheError` since
//! they describe the wire, not the cache. Mirrors `hkv-client`'s
//! `ClientError` split from the engine's own error type.

use std::fmt;

pub type TransportResult<T> = Result<T, PeerTransportError>;

#[derive(Debug)]
pub enum PeerTransportError {
    Io(std::io::Error),
    Protocol,
    ConnectionClosed,
    PoolExhausted,
    InvalidAddress,
}

impl fmt::Display for PeerTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerTransportError::Io(err) => write!(f, "io error: {err}"),
            PeerTransportError::Protocol => write!(f, "protocol error"),
            PeerTransportError::ConnectionClosed => write!(f, "connection closed"),
            PeerTransportError::PoolExhausted => write!(f, "connection pool exhausted"),
            PeerTransportError::InvalidAddress => write!(f, "invalid peer address"),
        }
    }
}

impl std::error::Error for PeerTransportError {}

impl From<std::io::Error> for PeerTransportError {
    fn from(err: std::io::Error) -> Self {
        PeerTransportError::Io(err)
    }
}
