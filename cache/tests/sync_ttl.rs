mod common;

use common::{build_timed_cache, manual_clock, ms, ALL_POLICIES};
use kestrel_cache::{CacheError, ItemOptions, PolicyKind};
use pretty_assertions::assert_eq;

fn ttl(d: u64) -> ItemOptions {
  ItemOptions::new().with_expiration(ms(d))
}

#[test]
fn test_item_expires_after_ttl() {
  for policy in ALL_POLICIES {
    let clock = manual_clock();
    let cache = build_timed_cache(policy, &clock);

    cache.set_with("key", 1, ttl(10));
    assert_eq!(cache.get(&"key"), Some(1), "{policy:?}");

    clock.advance(ms(10));
    assert_eq!(cache.get(&"key"), Some(1), "{policy:?}: valid at the exact deadline");

    clock.advance(ms(1));
    assert_eq!(cache.get(&"key"), None, "{policy:?}: item should have expired");
    assert_eq!(cache.len(), 0, "{policy:?}: expired hit is purged");
  }
}

#[test]
fn test_ttl_is_not_reset_on_access() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Lru, &clock);

  cache.set_with("key", 1, ttl(100));
  clock.advance(ms(60));
  assert!(cache.get(&"key").is_some());
  clock.advance(ms(60));
  assert!(
    cache.get(&"key").is_none(),
    "Item should have expired despite access"
  );
}

#[test]
fn test_zero_ttl_never_expires() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Simple, &clock);

  cache.set_with("key", 1, ItemOptions::new().with_expiration(ms(0)));
  clock.advance(ms(u32::MAX as u64));
  assert_eq!(cache.get(&"key"), Some(1));
  assert_eq!(cache.get_item(&"key").unwrap().expiration, None);
}

#[test]
fn test_set_resets_ttl() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Fifo, &clock);

  cache.set_with("key", 1, ttl(10));
  clock.advance(ms(8));
  cache.set("key", 2);
  clock.advance(ms(100));
  assert_eq!(cache.get(&"key"), Some(2), "plain set installs no TTL");
}

#[test]
fn test_keep_ttl_preserves_live_expiration() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Lru, &clock);

  cache.set_with("key", 1, ttl(10));
  clock.advance(ms(5));
  cache.set_with("key", 2, ItemOptions::new().with_keep_ttl(true));
  assert_eq!(cache.get(&"key"), Some(2));

  clock.advance(ms(5));
  assert_eq!(cache.get(&"key"), Some(2));
  clock.advance(ms(1));
  assert_eq!(cache.get(&"key"), None, "original deadline still applies");
}

#[test]
fn test_keep_ttl_applies_new_expiration_when_nothing_to_keep() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Simple, &clock);

  // Absent key: the call's own TTL applies.
  cache.set_with("a", 1, ttl(10).with_keep_ttl(true));
  assert_eq!(cache.get_item(&"a").unwrap().expiration, Some(ms(10)));

  // Existing key without a TTL: nothing to keep.
  cache.set("b", 1);
  cache.set_with("b", 2, ttl(10).with_keep_ttl(true));
  assert_eq!(cache.get_item(&"b").unwrap().expiration, Some(ms(10)));

  // Existing key whose TTL already elapsed: nothing to keep either.
  cache.set_with("c", 1, ttl(5));
  clock.advance(ms(6));
  cache.set_with("c", 2, ItemOptions::new().with_keep_ttl(true));
  clock.advance(ms(1_000));
  assert_eq!(cache.get(&"c"), Some(2));
}

#[test]
fn test_get_item_distinguishes_expired_from_missing() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Clock, &clock);

  cache.set_with("key", 1, ttl(1));
  clock.advance(ms(2));
  assert_eq!(cache.get_item(&"key"), Err(CacheError::Expired));
  assert_eq!(cache.get_item(&"key"), Err(CacheError::NotFound));
}

#[test]
fn test_clock_moving_backwards_does_not_expire() {
  for policy in ALL_POLICIES {
    let clock = manual_clock();
    let cache = build_timed_cache(policy, &clock);

    cache.set_with("key", 1, ttl(10));
    clock.rewind(ms(500));
    assert_eq!(cache.get(&"key"), Some(1), "{policy:?}");
    assert_eq!(cache.delete_expired(), 0, "{policy:?}");
    assert!(cache.contains(&"key"), "{policy:?}");
  }
}

#[test]
fn test_delete_expired_removes_only_expired() {
  for policy in ALL_POLICIES {
    let clock = manual_clock();
    let cache = build_timed_cache(policy, &clock);

    cache.set_with("short", 1, ttl(5));
    cache.set_with("medium", 2, ttl(20));
    cache.set("forever", 3);
    clock.advance(ms(10));

    assert_eq!(cache.len(), 3, "{policy:?}: expired items are still physically present");
    assert_eq!(cache.delete_expired(), 1, "{policy:?}");

    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec!["forever", "medium"], "{policy:?}");

    clock.advance(ms(100));
    assert_eq!(cache.delete_expired(), 1, "{policy:?}");
    assert_eq!(cache.keys(), vec!["forever"], "{policy:?}");
    assert_eq!(cache.delete_expired(), 0, "{policy:?}");
  }
}

#[test]
fn test_delete_expired_respects_later_set() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Simple, &clock);

  cache.set_with("key", 1, ttl(5));
  clock.advance(ms(3));
  // Re-set with a longer TTL before the first one runs out.
  cache.set_with("key", 2, ttl(100));
  clock.advance(ms(10));

  assert_eq!(cache.delete_expired(), 0);
  assert_eq!(cache.get(&"key"), Some(2));
}

#[test]
fn test_deleted_key_is_not_resurrected_by_sweep() {
  let clock = manual_clock();
  let cache = build_timed_cache(PolicyKind::Lru, &clock);

  cache.set_with("a", 1, ttl(5));
  cache.set_with("b", 2, ttl(5));
  cache.delete(&"a");
  clock.advance(ms(6));

  assert_eq!(cache.delete_expired(), 1);
  assert!(cache.is_empty());
  assert_eq!(cache.get(&"a"), None);
}

#[test]
fn test_evicted_key_does_not_count_as_expired() {
  let clock = manual_clock();
  let cache = kestrel_cache::CacheBuilder::<&str, i32>::new()
    .policy(PolicyKind::Lru)
    .capacity(1)
    .clock(clock.clone())
    .without_janitor()
    .build()
    .unwrap();

  cache.set_with("a", 1, ttl(5));
  cache.set("b", 2);
  clock.advance(ms(10));
  assert_eq!(cache.delete_expired(), 0);
  assert_eq!(cache.keys(), vec!["b"]);
}
