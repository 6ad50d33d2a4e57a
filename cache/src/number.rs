use crate::error::CacheError;
use crate::handles::Cache;
use crate::item::ItemOptions;

use std::hash::Hash;
use std::ops::{Add, Deref, Sub};
use std::sync::Arc;

use parking_lot::Mutex;

/// Values a [`NumberCache`] can count with.
///
/// Implemented for every `Copy + Default` type with `+` and `-`, which covers
/// the primitive integers and floats. Arithmetic follows the type's own
/// operators, so integer overflow behaves as it does elsewhere in the program.
pub trait Number: Copy + Default + Add<Output = Self> + Sub<Output = Self> {}

impl<T> Number for T where T: Copy + Default + Add<Output = T> + Sub<Output = T> {}

/// A cache of numbers with atomic increment and decrement.
///
/// Dereferences to [`Cache`], so every regular operation is available. The
/// read-modify-write of the counter operations is serialized by a lock of its
/// own, separate from the cache lock; plain `set` calls made concurrently on
/// the same key are not ordered with respect to it.
///
/// Writes made by the counter operations keep the key's TTL while it is live.
#[derive(Debug)]
pub struct NumberCache<K: Eq + Hash + Clone, V> {
  cache: Cache<K, V>,
  counter_lock: Arc<Mutex<()>>,
}

impl<K: Eq + Hash + Clone, V> Clone for NumberCache<K, V> {
  fn clone(&self) -> Self {
    Self {
      cache: self.cache.clone(),
      counter_lock: Arc::clone(&self.counter_lock),
    }
  }
}

impl<K: Eq + Hash + Clone, V> Deref for NumberCache<K, V> {
  type Target = Cache<K, V>;

  fn deref(&self) -> &Self::Target {
    &self.cache
  }
}

impl<K, V> NumberCache<K, V>
where
  K: Eq + Hash + Clone,
  V: Number,
{
  pub(crate) fn new(cache: Cache<K, V>) -> Self {
    Self {
      cache,
      counter_lock: Arc::new(Mutex::new(())),
    }
  }

  /// Adds `n` to the value of `key` and returns the result.
  ///
  /// A missing or expired key counts from `V::default()`, so the first
  /// increment of an absent key stores `n`.
  pub fn increment(&self, key: K, n: V) -> V {
    self.apply(key, |current| current.unwrap_or_default() + n)
  }

  /// Subtracts `n` from the value of `key` and returns the result.
  ///
  /// A missing or expired key counts from `V::default()`.
  pub fn decrement(&self, key: K, n: V) -> V {
    self.apply(key, |current| current.unwrap_or_default() - n)
  }

  /// Adds `n` to the value of an existing key and returns the result.
  ///
  /// Fails with `CacheError::NotFound` or `CacheError::Expired` without
  /// modifying the cache.
  pub fn try_increment(&self, key: K, n: V) -> Result<V, CacheError> {
    self.try_apply(key, |value| value + n)
  }

  /// Subtracts `n` from the value of an existing key and returns the result.
  ///
  /// Fails with `CacheError::NotFound` or `CacheError::Expired` without
  /// modifying the cache.
  pub fn try_decrement(&self, key: K, n: V) -> Result<V, CacheError> {
    self.try_apply(key, |value| value - n)
  }

  fn apply(&self, key: K, op: impl FnOnce(Option<V>) -> V) -> V {
    let _guard = self.counter_lock.lock();
    let current = self.cache.get_with(&key, |value| *value);
    let next = op(current);
    self.write(key, next);
    next
  }

  fn try_apply(&self, key: K, op: impl FnOnce(V) -> V) -> Result<V, CacheError> {
    let _guard = self.counter_lock.lock();
    let current = self.cache.shared.with_item(&key, |item| item.value)?;
    let next = op(current);
    self.write(key, next);
    Ok(next)
  }

  fn write(&self, key: K, value: V) {
    self
      .cache
      .set_with(key, value, ItemOptions::new().with_keep_ttl(true));
  }
}
