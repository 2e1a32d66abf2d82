//! # meshcache-core
//!
//! The byte-bounded sharded store, its pluggable eviction policies, the
//! consistent hash ring, and the single-flight request coalescer. This
//! crate has no notion of "group" or "origin getter"; those live in
//! `meshcache-group`, which wires this crate's pieces into the
//! lookup→load→populate pipeline.

pub mod hashring;
pub mod lfu;
pub mod lru;
pub mod policy;
pub mod shard;
pub mod sharded;
pub mod singleflight;

pub use hashring::{HashRing, DEFAULT_REPLICAS};
pub use policy::{Entry, EvictionPolicy};
pub use shard::ConcurrentShard;
pub use sharded::{fnv1a_32, EvictionAlgorithm, ShardedStore};
pub use singleflight::Coalescer;
