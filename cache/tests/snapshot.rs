#![cfg(feature = "serde")]

mod common;

use common::{manual_clock, ms};
use kestrel_cache::{CacheBuilder, CacheSnapshot, ItemOptions, PolicyKind};
use pretty_assertions::assert_eq;

#[test]
fn test_snapshot_survives_bincode_round_trip() {
  let clock = manual_clock();
  let cache = CacheBuilder::<String, Vec<u8>>::new()
    .policy(PolicyKind::Lru)
    .capacity(3)
    .clock(clock.clone())
    .without_janitor()
    .build()
    .unwrap();

  cache.set("a".into(), vec![1]);
  cache.set_with("b".into(), vec![2, 2], ItemOptions::new().with_expiration(ms(50)));
  cache.set("c".into(), vec![3, 3, 3]);
  clock.advance(ms(20));

  let snapshot = cache.to_snapshot();
  let bytes = bincode::serialize(&snapshot).unwrap();
  let decoded: CacheSnapshot<String, Vec<u8>> = bincode::deserialize(&bytes).unwrap();
  assert_eq!(decoded, snapshot);
  assert_eq!(decoded.policy(), Some(PolicyKind::Lru));

  // A fresh clock: remaining TTLs are relative, not absolute.
  let restored_clock = manual_clock();
  restored_clock.advance(ms(5_000));
  let restored = CacheBuilder::<String, Vec<u8>>::new()
    .clock(restored_clock.clone())
    .without_janitor()
    .build_from_snapshot(decoded)
    .unwrap();

  assert_eq!(restored.capacity(), Some(3));
  assert_eq!(restored.keys(), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
  assert_eq!(restored.get_item(&"b".to_string()).unwrap().expiration, Some(ms(30)));

  restored_clock.advance(ms(30));
  assert_eq!(restored.get(&"b".to_string()), Some(vec![2, 2]));
  restored_clock.advance(ms(1));
  assert_eq!(restored.get(&"b".to_string()), None);
  assert_eq!(restored.get(&"a".to_string()), Some(vec![1]));
}

#[test]
fn test_restored_cache_keeps_policy_behaviour() {
  let cache = CacheBuilder::<u32, u32>::new()
    .policy(PolicyKind::Fifo)
    .capacity(2)
    .without_janitor()
    .build()
    .unwrap();
  cache.set(1, 10);
  cache.set(2, 20);

  // The builder's own policy is overridden by the snapshot's.
  let restored = CacheBuilder::<u32, u32>::new()
    .policy(PolicyKind::Lfu)
    .capacity(100)
    .without_janitor()
    .build_from_snapshot(cache.to_snapshot())
    .unwrap();

  restored.get(&1);
  restored.set(3, 30);
  assert_eq!(restored.keys(), vec![2, 3]);
}

#[test]
fn test_snapshot_of_empty_cache() {
  let cache = CacheBuilder::<u32, u32>::new()
    .policy(PolicyKind::Clock)
    .without_janitor()
    .build()
    .unwrap();
  let snapshot = cache.to_snapshot();
  assert!(snapshot.is_empty());

  let restored = CacheBuilder::<u32, u32>::new()
    .without_janitor()
    .build_from_snapshot(snapshot)
    .unwrap();
  assert!(restored.is_empty());
  assert_eq!(restored.capacity(), Some(128));
}

#[test]
fn test_restore_preserves_eviction_order() {
  for policy in [PolicyKind::Lru, PolicyKind::Mru, PolicyKind::Fifo, PolicyKind::Clock] {
    let cache = CacheBuilder::<u32, u32>::new()
      .policy(policy)
      .capacity(3)
      .without_janitor()
      .build()
      .unwrap();
    cache.set(1, 1);
    cache.set(2, 2);
    cache.set(3, 3);
    cache.get(&1);

    let restored = CacheBuilder::<u32, u32>::new()
      .without_janitor()
      .build_from_snapshot(cache.to_snapshot())
      .unwrap();
    assert_eq!(restored.keys(), cache.keys(), "{policy:?}");

    cache.set(4, 4);
    restored.set(4, 4);
    assert_eq!(restored.keys(), cache.keys(), "{policy:?}: same victim after restore");
  }
}

#[test]
fn test_mru_snapshot_is_oldest_first() {
  let cache = CacheBuilder::<u32, u32>::new()
    .policy(PolicyKind::Mru)
    .capacity(3)
    .without_janitor()
    .build()
    .unwrap();
  for i in 1..=3 {
    cache.set(i, i);
  }
  assert_eq!(cache.keys(), vec![3, 2, 1]);

  let snapshot = cache.to_snapshot();
  let keys: Vec<u32> = snapshot.entries.iter().map(|entry| entry.key).collect();
  assert_eq!(keys, vec![1, 2, 3]);

  let restored = CacheBuilder::<u32, u32>::new()
    .without_janitor()
    .build_from_snapshot(snapshot)
    .unwrap();
  assert_eq!(restored.keys(), vec![3, 2, 1]);
}
