mod common;

use common::{manual_clock, ms};
use kestrel_cache::{CacheBuilder, CancellationToken, ItemOptions, PolicyKind};
use std::thread;
use std::time::Duration;

const JANITOR_TICK: Duration = Duration::from_millis(10);
const SLEEP_MARGIN: Duration = Duration::from_millis(150);

#[test]
fn test_janitor_purges_expired_items() {
  let cache = CacheBuilder::<&str, i32>::new()
    .janitor_interval(JANITOR_TICK)
    .build()
    .unwrap();

  cache.set_with("a", 1, ItemOptions::new().with_expiration(ms(10)));
  cache.set_with("b", 2, ItemOptions::new().with_expiration(ms(20)));
  cache.set_with("c", 3, ItemOptions::new().with_expiration(ms(30)));
  cache.set("d", 4);
  cache.set_with("e", 5, ItemOptions::new().with_expiration(Duration::ZERO));

  thread::sleep(ms(30) + JANITOR_TICK + SLEEP_MARGIN);

  let mut keys = cache.keys();
  keys.sort();
  assert_eq!(keys, vec!["d", "e"], "only never-expiring items remain");
}

#[test]
fn test_janitor_uses_injected_clock() {
  let clock = manual_clock();
  let cache = CacheBuilder::<&str, i32>::new()
    .policy(PolicyKind::Lru)
    .clock(clock.clone())
    .janitor_interval(JANITOR_TICK)
    .build()
    .unwrap();

  cache.set_with("a", 1, ItemOptions::new().with_expiration(ms(10)));
  thread::sleep(JANITOR_TICK * 5);
  assert_eq!(cache.len(), 1, "the frozen clock keeps the item alive");

  clock.advance(ms(11));
  thread::sleep(JANITOR_TICK + SLEEP_MARGIN);
  assert_eq!(cache.len(), 0);
}

#[test]
fn test_stop_runs_final_sweep() {
  let clock = manual_clock();
  let cache = CacheBuilder::<&str, i32>::new()
    .clock(clock.clone())
    .janitor_interval(Duration::from_secs(3600))
    .build()
    .unwrap();

  cache.set_with("a", 1, ItemOptions::new().with_expiration(ms(10)));
  clock.advance(ms(11));
  assert_eq!(cache.len(), 1);

  cache.stop_janitor();
  assert_eq!(cache.len(), 0, "stop performs one last sweep");
  assert!(!cache.is_janitor_running());

  // Idempotent.
  cache.stop_janitor();
  cache.stop_janitor();
}

#[test]
fn test_stopped_janitor_no_longer_sweeps() {
  let clock = manual_clock();
  let cache = CacheBuilder::<&str, i32>::new()
    .clock(clock.clone())
    .janitor_interval(JANITOR_TICK)
    .build()
    .unwrap();
  cache.stop_janitor();

  cache.set_with("a", 1, ItemOptions::new().with_expiration(ms(10)));
  clock.advance(ms(11));
  thread::sleep(JANITOR_TICK * 5);
  assert_eq!(cache.len(), 1);
  assert_eq!(cache.delete_expired(), 1);
}

#[test]
fn test_external_token_stops_every_janitor() {
  let clock = manual_clock();
  let token = CancellationToken::new();
  let caches: Vec<_> = (0..3)
    .map(|_| {
      CacheBuilder::<u8, u8>::new()
        .clock(clock.clone())
        .janitor_interval(Duration::from_secs(3600))
        .cancellation_token(token.clone())
        .build()
        .unwrap()
    })
    .collect();

  for cache in &caches {
    cache.set_with(1, 1, ItemOptions::new().with_expiration(ms(1)));
    assert!(cache.is_janitor_running());
  }
  clock.advance(ms(2));

  token.cancel();
  for cache in &caches {
    assert!(!cache.is_janitor_running());
    // Joining waits for the final sweep the cancellation triggered.
    cache.stop_janitor();
    assert!(cache.is_empty());
  }
}

#[test]
fn test_stopping_one_cache_leaves_shared_token_alone() {
  let token = CancellationToken::new();
  let first = CacheBuilder::<u8, u8>::new()
    .cancellation_token(token.clone())
    .build()
    .unwrap();
  let second = CacheBuilder::<u8, u8>::new()
    .cancellation_token(token.clone())
    .build()
    .unwrap();

  first.stop_janitor();
  assert!(!token.is_cancelled());
  assert!(second.is_janitor_running());
}

#[test]
fn test_dropping_cache_stops_janitor() {
  let token = CancellationToken::new();
  let cache = CacheBuilder::<u8, u8>::new()
    .janitor_interval(JANITOR_TICK)
    .cancellation_token(token.clone())
    .build()
    .unwrap();
  let clone = cache.clone();
  drop(cache);
  assert!(clone.is_janitor_running(), "a live handle keeps the janitor");
  drop(clone);
  // Nothing to assert beyond not hanging: the drop joined the thread.
  assert!(!token.is_cancelled());
}
