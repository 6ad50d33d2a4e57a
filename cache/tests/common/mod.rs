#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use kestrel_cache::{Cache, CacheBuilder, ManualClock, PolicyKind};

pub const ALL_POLICIES: [PolicyKind; 6] = [
  PolicyKind::Simple,
  PolicyKind::Lru,
  PolicyKind::Mru,
  PolicyKind::Fifo,
  PolicyKind::Clock,
  PolicyKind::Lfu,
];

pub const BOUNDED_POLICIES: [PolicyKind; 5] = [
  PolicyKind::Lru,
  PolicyKind::Mru,
  PolicyKind::Fifo,
  PolicyKind::Clock,
  PolicyKind::Lfu,
];

pub fn ms(n: u64) -> Duration {
  Duration::from_millis(n)
}

// A clock frozen at an arbitrary non-zero instant, so tests can also move it
// backwards.
pub fn manual_clock() -> Arc<ManualClock> {
  Arc::new(ManualClock::new(Duration::from_secs(1_000)))
}

// Helper to build a cache with a bounded policy and no janitor.
pub fn build_test_cache(policy: PolicyKind, capacity: usize) -> Cache<i32, String> {
  CacheBuilder::new()
    .policy(policy)
    .capacity(capacity)
    .without_janitor()
    .build()
    .unwrap()
}

// Helper to build a cache driven by a manual clock and no janitor.
pub fn build_timed_cache(policy: PolicyKind, clock: &Arc<ManualClock>) -> Cache<&'static str, i32> {
  CacheBuilder::new()
    .policy(policy)
    .clock(clock.clone())
    .without_janitor()
    .build()
    .unwrap()
}
