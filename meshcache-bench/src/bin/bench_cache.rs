//! # Sharded Store Benchmark Harness
//!
//! Purpose: Provide a dependency-free, repeatable benchmark driver for
//! `ShardedStore` under both eviction algorithms, so baseline throughput
//! can be compared across changes without pulling in a benchmarking
//! framework.
//!
//! ## Design Principles
//! 1. **Deterministic Workload**: Fixed PRNG seeds for stable comparisons.
//! 2. **Allocation Control**: Keys/values are pre-built to keep setup off
//!    the hot path.
//! 3. **Algorithm Parity**: The same workload runs against LRU and LFU so
//!    their relative overhead is visible in one report.

use std::env;
use std::hint::black_box;
use std::time::{Duration, Instant};

use meshcache_common::ByteView;
use meshcache_core::{EvictionAlgorithm, ShardedStore};

const DEFAULT_KEY_COUNT: usize = 1 << 14;
const DEFAULT_OP_COUNT: usize = 500_000;
const DEFAULT_SHARDS: usize = 16;
const DEFAULT_VALUE_SIZE: usize = 128;
const DEFAULT_BYTES_PER_SHARD: usize = 1 << 20;

struct BenchConfig {
    requested_keys: usize,
    key_count: usize,
    key_mask: usize,
    op_count: usize,
    shards: usize,
    value_size: usize,
    bytes_per_shard: usize,
}

impl BenchConfig {
    fn from_args() -> Self {
        let mut args = env::args().skip(1);
        let requested_keys = parse_usize(args.next(), DEFAULT_KEY_COUNT);
        let op_count = parse_usize(args.next(), DEFAULT_OP_COUNT);
        let shards = parse_usize(args.next(), DEFAULT_SHARDS);
        let value_size = parse_usize(args.next(), DEFAULT_VALUE_SIZE);
        let bytes_per_shard = parse_usize(args.next(), DEFAULT_BYTES_PER_SHARD);

        let key_count = normalize_power_of_two(requested_keys);
        let key_mask = key_count - 1;

        BenchConfig {
            requested_keys,
            key_count,
            key_mask,
            op_count,
            shards,
            value_size,
            bytes_per_shard,
        }
    }
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value.and_then(|raw| raw.parse().ok()).unwrap_or(fallback)
}

fn normalize_power_of_two(value: usize) -> usize {
    let value = value.max(1);
    if value.is_power_of_two() {
        value
    } else {
        value.next_power_of_two()
    }
}

/// Tiny deterministic PRNG, avoiding an external dependency for workload
/// generation.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        XorShift64 { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[inline]
    fn next_index(&mut self, mask: usize) -> usize {
        (self.next_u64() as usize) & mask
    }
}

fn write_u64_le(value: u64, buffer: &mut [u8]) {
    let bytes = value.to_le_bytes();
    let copy_len = buffer.len().min(bytes.len());
    buffer[..copy_len].copy_from_slice(&bytes[..copy_len]);
}

fn build_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("bench-key-{i:08x}")).collect()
}

fn build_values(count: usize, size: usize, seed: u64) -> Vec<ByteView> {
    (0..count)
        .map(|i| {
            let mut buffer = vec![0u8; size];
            write_u64_le(seed ^ (i as u64), &mut buffer);
            ByteView::new(buffer)
        })
        .collect()
}

fn report(label: &str, ops: usize, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let ops_per_sec = (ops as f64) / secs;
    let nanos_per_op = (secs * 1e9) / (ops as f64);
    println!("{label}: {ops} ops in {secs:.3}s ({ops_per_sec:.0} ops/s, {nanos_per_op:.1} ns/op)");
}

fn run_workload(label: &str, config: &BenchConfig, algorithm: EvictionAlgorithm) {
    let store = ShardedStore::new(config.shards, config.bytes_per_shard, algorithm);
    let keys = build_keys(config.key_count);
    let values = build_values(config.key_count, config.value_size, 0x5A5A_5A5A_5A5A_5A5A);

    for idx in 0..config.key_count {
        store.add(keys[idx].clone(), values[idx].clone());
    }

    let mut rng = XorShift64::new(0x1234_5678_9ABC_DEF0);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.key_mask);
        let hit = store.get(&keys[idx]);
        black_box(hit);
    }
    report(&format!("{label} GET"), config.op_count, start.elapsed());

    let mut rng = XorShift64::new(0x0FED_CBA9_8765_4321);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.key_mask);
        store.add(keys[idx].clone(), values[idx].clone());
    }
    report(&format!("{label} ADD"), config.op_count, start.elapsed());

    println!("{label}: live entries after run = {}", store.len());
}

fn main() {
    let config = BenchConfig::from_args();
    println!(
        "keys: requested={}, actual={}, ops={}, shards={}, value_size={}, bytes_per_shard={}",
        config.requested_keys,
        config.key_count,
        config.op_count,
        config.shards,
        config.value_size,
        config.bytes_per_shard
    );

    run_workload("LRU", &config, EvictionAlgorithm::Lru);
    run_workload("LFU", &config, EvictionAlgorithm::Lfu);
}
