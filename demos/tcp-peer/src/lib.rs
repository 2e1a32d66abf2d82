//! # tcp-peer-demo
//!
//! A minimal, dependency-light reference transport wiring
//! `meshcache_common::{PeerGetter, PeerPicker}` to real TCP sockets, so the
//! library crates can be exercised across processes instead of only
//! in-process. Not meant as a production RPC layer: no TLS, retries, or
//! backpressure beyond the connection pool's bounded size.

mod client;
mod error;
mod picker;
mod pool;
mod protocol;
mod server;

pub use client::TcpPeerGetter;
pub use error::{PeerTransportError, TransportResult};
pub use picker::TcpPeerPicker;
pub use server::PeerServer;
