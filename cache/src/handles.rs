use crate::error::CacheError;
use crate::item::{Item, ItemOptions};
use crate::shared::CacheShared;

use std::hash::Hash;
use std::sync::Arc;

/// A thread-safe, synchronous cache.
///
/// Cloning a `Cache` is cheap and yields another handle to the same storage.
/// The janitor, if any, is stopped when the last handle is dropped.
#[derive(Debug)]
pub struct Cache<K: Eq + Hash + Clone, V> {
  pub(crate) shared: Arc<CacheShared<K, V>>,
}

impl<K: Eq + Hash + Clone, V> Clone for Cache<K, V> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<K, V> Cache<K, V>
where
  K: Eq + Hash + Clone,
{
  /// Retrieves a clone of the value for `key`.
  ///
  /// Counts as an access for the eviction policy. Returns `None` if the key is
  /// absent or its TTL has elapsed; an expired item is removed on the spot.
  pub fn get(&self, key: &K) -> Option<V>
  where
    V: Clone,
  {
    self.shared.with_item(key, |item| item.value.clone()).ok()
  }

  /// Looks up `key` and, if it is live, applies `f` to the value.
  ///
  /// Behaves like [`get`](Self::get) but avoids cloning the value. The
  /// closure runs while the cache lock is held, so it should be fast.
  pub fn get_with<F, R>(&self, key: &K, f: F) -> Option<R>
  where
    F: FnOnce(&V) -> R,
  {
    self.shared.with_item(key, |item| f(&item.value)).ok()
  }

  /// Retrieves a clone of the whole item for `key`, including its expiration
  /// metadata, and tells a missing key apart from an expired one.
  pub fn get_item(&self, key: &K) -> Result<Item<V>, CacheError>
  where
    V: Clone,
  {
    self.shared.with_item(key, Item::clone)
  }

  /// Retrieves a clone of the value for `key` without counting it as an
  /// access. Expired items are reported as absent but left in place.
  pub fn peek(&self, key: &K) -> Option<V>
  where
    V: Clone,
  {
    self.shared.peek_item(key, |item| item.value.clone()).ok()
  }

  /// Inserts a value that never expires, replacing any existing value.
  pub fn set(&self, key: K, value: V) {
    self.shared.set(key, value, ItemOptions::default());
  }

  /// Inserts a value with per-item options such as a time-to-live.
  ///
  /// ```
  /// use kestrel_cache::{CacheBuilder, ItemOptions};
  /// use std::time::Duration;
  ///
  /// let cache = CacheBuilder::<&str, u32>::new().without_janitor().build().unwrap();
  /// cache.set_with("session", 7, ItemOptions::new().with_expiration(Duration::from_secs(30)));
  /// assert_eq!(cache.get(&"session"), Some(7));
  /// ```
  pub fn set_with(&self, key: K, value: V, options: ItemOptions) {
    self.shared.set(key, value, options);
  }

  /// Removes `key`. Returns whether it was present.
  pub fn delete(&self, key: &K) -> bool {
    self.shared.delete(key)
  }

  /// Whether `key` is present and not expired. Does not count as an access.
  pub fn contains(&self, key: &K) -> bool {
    self.shared.peek_item(key, |_| ()).is_ok()
  }

  /// The keys currently stored, in the order defined by the policy.
  ///
  /// Items whose TTL has elapsed but which have not been purged yet are
  /// included.
  pub fn keys(&self) -> Vec<K> {
    self.shared.keys()
  }

  /// The number of stored items, including expired ones not yet purged.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The maximum number of items, or `None` for an unbounded cache.
  pub fn capacity(&self) -> Option<usize> {
    self.shared.capacity()
  }

  /// Removes every item whose TTL has elapsed and returns how many were
  /// removed. This is what the janitor runs on each tick.
  pub fn delete_expired(&self) -> usize {
    self.shared.delete_expired()
  }

  /// Removes every item.
  pub fn clear(&self) {
    self.shared.clear();
  }

  /// Stops the background janitor after one final sweep. Calling it again,
  /// or on a cache built without a janitor, does nothing.
  pub fn stop_janitor(&self) {
    self.shared.stop_janitor();
  }

  /// Whether a janitor is attached and has not been stopped or cancelled.
  pub fn is_janitor_running(&self) -> bool {
    self.shared.is_janitor_running()
  }
}
