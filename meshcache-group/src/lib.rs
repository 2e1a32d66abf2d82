//! # meshcache-group
//!
//! The group orchestrator: wires `meshcache-core`'s sharded store and
//! single-flight coalescer together with a caller-supplied origin getter
//! and an optional peer picker into the lookup→load→populate pipeline,
//! plus hot-key detection and the process-wide group registry.

mod group;
mod registry;

pub use group::{Group, DEFAULT_SHARDS_PER_GROUP, HOT_KEY_REPLICAS, HOT_KEY_THRESHOLD};
pub use registry::Registry;
