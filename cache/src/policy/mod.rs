pub mod clock;
pub mod fifo;
pub mod lfu;
pub(crate) mod list;
pub mod lru;
pub mod mru;
pub mod simple;

use crate::item::Item;

/// The capacity used by bounded policies when none is configured.
pub const DEFAULT_CAPACITY: usize = 128;

/// A cache replacement policy.
///
/// Engines are plain, single-threaded data structures; the cache wraps them
/// in its own lock. Every engine owns its values and decides on its own which
/// entry to drop when an insert overflows its capacity.
pub trait Policy<K, V> {
  /// Looks up `key`, recording the access the way the policy needs to
  /// (moving it in a recency list, bumping a reference count, ...).
  fn get(&mut self, key: &K) -> Option<&V>;

  /// Looks up `key` without recording an access.
  fn peek(&self, key: &K) -> Option<&V>;

  /// Inserts or replaces `key`.
  ///
  /// Returns the entry that had to be evicted to make room, if any.
  fn set(&mut self, key: K, value: V) -> Option<(K, V)>;

  /// Removes `key`. Returns whether it was present.
  fn delete(&mut self, key: &K) -> bool;

  /// The keys currently held, in the policy's own order.
  fn keys(&self) -> Vec<K>;

  /// The number of entries currently held.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Drops every entry.
  fn clear(&mut self);

  /// The maximum number of entries, or `None` when unbounded.
  fn capacity(&self) -> Option<usize>;

  /// Whether `get` changes the engine's state. Engines that answer `false`
  /// can be read under a shared lock.
  fn mutates_on_get(&self) -> bool {
    true
  }
}

/// Selects one of the built-in policies when building a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
  /// An unordered map that never evicts.
  #[default]
  Simple,
  /// Least recently used.
  Lru,
  /// Most recently used.
  Mru,
  /// First in, first out (an update re-queues the key).
  Fifo,
  /// The clock (second chance) approximation of LRU.
  Clock,
  /// Least frequently used, ties broken by least recently used.
  Lfu,
}

/// An optional capability of cached values: the reference count an entry
/// starts with when it is inserted into a frequency-aware policy (Clock and
/// LFU). Values that do not implement it start at 1.
///
/// Opt in with [`CacheBuilder::reference_counted`](crate::CacheBuilder::reference_counted).
pub trait ReferenceCount {
  fn reference_count(&self) -> u64;
}

impl<V: ReferenceCount> ReferenceCount for Item<V> {
  fn reference_count(&self) -> u64 {
    self.value.reference_count()
  }
}

/// Computes the initial reference count of a value on insert.
pub type ReferenceCounter<V> = fn(&V) -> u64;

/// The counter used when the value type does not provide one.
pub(crate) fn default_reference_count<V>(_: &V) -> u64 {
  1
}

/// The counter used when the value type implements [`ReferenceCount`].
pub(crate) fn probe_reference_count<V: ReferenceCount>(value: &V) -> u64 {
  value.reference_count()
}
