// This entire module is only compiled when the 'serde' feature is enabled.
use crate::error::BuildError;
use crate::item::Item;
use crate::policy::PolicyKind;
use crate::{Cache, CacheBuilder};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::time::Duration;

/// A serializable representation of a single cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry<K, V> {
  pub key: K,
  pub value: V,
  /// Time left before the entry expires. `None` never expires.
  pub ttl_remaining: Option<Duration>,
}

/// A serializable, point-in-time snapshot of the cache's data.
///
/// This struct can be created with [`Cache::to_snapshot()`] and used to
/// restore a cache with [`CacheBuilder::build_from_snapshot()`].
///
/// It implements `Serialize` and `Deserialize` (if `K` and `V` do), allowing
/// you to use any `serde`-compatible format for persistence. Remaining TTLs
/// are stored relative to the moment the snapshot was taken, so they survive
/// a change of clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot<K, V> {
  /// Live entries, oldest first: inserting them in this order rebuilds the
  /// source cache's recency order.
  pub entries: Vec<SnapshotEntry<K, V>>,
  pub(crate) policy: Option<PolicyKind>,
  pub(crate) capacity: Option<usize>,
}

impl<K, V> CacheSnapshot<K, V> {
  /// The policy of the cache the snapshot was taken from, or `None` if it
  /// used a custom policy.
  pub fn policy(&self) -> Option<PolicyKind> {
    self.policy
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

// --- Snapshot-based Build Method ---
impl<K, V> CacheBuilder<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + DeserializeOwned + 'static,
  V: Send + Sync + DeserializeOwned + 'static,
{
  /// Builds a new cache and pre-populates it with entries from a snapshot.
  ///
  /// The builder's policy and capacity are overridden by the values stored in
  /// the snapshot, unless the snapshot came from a cache with a custom policy
  /// (configure the same custom policy on the builder in that case).
  ///
  /// Entries are re-inserted in snapshot order, which restores the recency
  /// order of LRU, MRU, FIFO and Clock caches. Reference counts start afresh.
  pub fn build_from_snapshot(mut self, snapshot: CacheSnapshot<K, V>) -> Result<Cache<K, V>, BuildError> {
    // Override settings from snapshot for consistency.
    if let Some(policy) = snapshot.policy {
      self.policy = policy;
      self.capacity = snapshot.capacity;
    }

    self.validate()?;
    let shared = self.build_shared_core()?;

    let now = shared.now();
    let restored = snapshot.entries.len();
    for entry in snapshot.entries {
      shared.insert_item(entry.key, Item::new(entry.value, now, entry.ttl_remaining));
    }
    tracing::debug!(restored, "cache restored from snapshot");

    Ok(Cache { shared })
  }
}

impl<K, V> Cache<K, V>
where
  K: Eq + Hash + Clone + Serialize,
  V: Clone + Serialize,
{
  /// Creates a serializable snapshot of the cache's current state.
  ///
  /// This holds the cache's read lock while copying. Expired items, and items
  /// at the very end of their TTL, are not included.
  pub fn to_snapshot(&self) -> CacheSnapshot<K, V> {
    let mut entries = Vec::with_capacity(self.len());
    self.shared.for_each_live(|key, item, now| {
      let ttl_remaining = item.ttl_remaining(now);
      if ttl_remaining == Some(Duration::ZERO) {
        return;
      }
      entries.push(SnapshotEntry {
        key: key.clone(),
        value: item.value.clone(),
        ttl_remaining,
      });
    });

    let policy = self.shared.policy_kind();
    // MRU lists its keys newest first.
    if policy == Some(PolicyKind::Mru) {
      entries.reverse();
    }

    CacheSnapshot {
      entries,
      policy,
      capacity: self.shared.capacity(),
    }
  }
}
