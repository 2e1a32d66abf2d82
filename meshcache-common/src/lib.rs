//! # meshcache-common
//!
//! Shared types and trait boundaries for the distributed cache core: the
//! immutable [`ByteView`] payload type, the error taxonomy, and the
//! external collaborator interfaces (`Getter`, `PeerPicker`, `PeerGetter`)
//! that the core calls but does not implement. Multi-peer replication is
//! an optional capability of `PeerPicker` itself (`pick_multiple`),
//! matching the spec's `ReplicatedPeerPicker`.

mod byteview;
mod error;
mod getter;
mod peer;

pub use byteview::ByteView;
pub use error::{CacheError, CacheResult};
pub use getter::{Getter, GetterFn};
pub use peer::{PeerGetter, PeerPicker};
