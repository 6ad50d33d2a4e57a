use crate::error::BuildError;
use crate::handles::Cache;
use crate::item::Item;
use crate::number::{Number, NumberCache};
use crate::policy::clock::ClockPolicy;
use crate::policy::fifo::FifoPolicy;
use crate::policy::lfu::LfuPolicy;
use crate::policy::lru::LruPolicy;
use crate::policy::mru::MruPolicy;
use crate::policy::simple::SimplePolicy;
use crate::policy::{
  default_reference_count, probe_reference_count, Policy, PolicyKind, ReferenceCount,
  ReferenceCounter, DEFAULT_CAPACITY,
};
use crate::shared::{BoxedPolicy, CacheShared};
use crate::task::cancel::CancellationToken;
use crate::time::{Clock, SystemClock};

use core::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// How often the janitor sweeps expired items unless configured otherwise.
pub const DEFAULT_JANITOR_INTERVAL: Duration = Duration::from_secs(60);

/// A builder for creating `Cache` and `NumberCache` instances.
pub struct CacheBuilder<K, V> {
  pub(crate) policy: PolicyKind,
  pub(crate) capacity: Option<usize>,
  pub(crate) janitor_interval: Option<Duration>,
  clock: Arc<dyn Clock>,
  cancellation_token: Option<CancellationToken>,
  custom_policy: Option<BoxedPolicy<K, V>>,
  reference_counter: Option<ReferenceCounter<Item<V>>>,
}

// Manual Debug implementation for CacheBuilder.
impl<K, V> fmt::Debug for CacheBuilder<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("policy", &self.policy)
      .field("capacity", &self.capacity)
      .field("janitor_interval", &self.janitor_interval)
      .field("clock", &self.clock)
      .field("has_custom_policy", &self.custom_policy.is_some())
      .field("reference_counted", &self.reference_counter.is_some())
      .finish_non_exhaustive()
  }
}

impl<K, V> CacheBuilder<K, V> {
  /// Creates a new `CacheBuilder` with default settings: the unordered
  /// policy, the system clock and a janitor sweeping once a minute.
  pub fn new() -> Self {
    Self {
      policy: PolicyKind::default(),
      capacity: None,
      janitor_interval: Some(DEFAULT_JANITOR_INTERVAL),
      clock: Arc::new(SystemClock),
      cancellation_token: None,
      custom_policy: None,
      reference_counter: None,
    }
  }

  /// Selects one of the built-in eviction policies.
  pub fn policy(mut self, policy: PolicyKind) -> Self {
    self.policy = policy;
    self
  }

  /// Sets the maximum number of entries for bounded policies.
  ///
  /// Defaults to 128. Ignored by the unordered policy, which never evicts.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = Some(capacity);
    self
  }

  /// Sets how often the background janitor purges expired items.
  pub fn janitor_interval(mut self, interval: Duration) -> Self {
    self.janitor_interval = Some(interval);
    self
  }

  /// Disables the background janitor. Expired items are then only removed
  /// lazily on access or by an explicit `delete_expired`.
  pub fn without_janitor(mut self) -> Self {
    self.janitor_interval = None;
    self
  }

  /// Sets the source of "now" used for every expiration decision.
  pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Links the janitor to an external shutdown signal. Cancelling `token`
  /// stops the janitor (after a final sweep) without affecting other users of
  /// the token.
  pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
    self.cancellation_token = Some(token);
    self
  }

  /// Uses a user-supplied policy engine instead of a built-in one. Overrides
  /// [`policy`](Self::policy) and [`capacity`](Self::capacity).
  pub fn custom_policy<P>(mut self, policy: P) -> Self
  where
    P: Policy<K, Item<V>> + Send + Sync + 'static,
  {
    self.custom_policy = Some(Box::new(policy));
    self
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    // The unordered policy never evicts, so its capacity is not used.
    if self.capacity == Some(0) && self.policy != PolicyKind::Simple {
      return Err(BuildError::ZeroCapacity);
    }
    if self.janitor_interval == Some(Duration::ZERO) {
      return Err(BuildError::ZeroJanitorInterval);
    }
    Ok(())
  }
}

impl<K, V: ReferenceCount> CacheBuilder<K, V> {
  /// Lets Clock and LFU policies seed a new entry's reference count from
  /// [`ReferenceCount::reference_count`] instead of starting it at 1.
  pub fn reference_counted(mut self) -> Self {
    self.reference_counter = Some(probe_reference_count::<Item<V>> as ReferenceCounter<Item<V>>);
    self
  }
}

impl<K, V> Default for CacheBuilder<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
impl<K, V> CacheBuilder<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Builds a `Cache`.
  pub fn build(mut self) -> Result<Cache<K, V>, BuildError> {
    self.validate()?;
    let shared = self.build_shared_core()?;
    Ok(Cache { shared })
  }

  /// Builds a `NumberCache` for counters.
  pub fn build_number(self) -> Result<NumberCache<K, V>, BuildError>
  where
    V: Number,
  {
    self.build().map(NumberCache::new)
  }

  fn make_policy(&mut self) -> (BoxedPolicy<K, V>, Option<PolicyKind>) {
    if let Some(policy) = self.custom_policy.take() {
      return (policy, None);
    }

    let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
    let counter = self
      .reference_counter
      .unwrap_or(default_reference_count::<Item<V>>);
    let policy: BoxedPolicy<K, V> = match self.policy {
      PolicyKind::Simple => Box::new(SimplePolicy::new()),
      PolicyKind::Lru => Box::new(LruPolicy::new(capacity)),
      PolicyKind::Mru => Box::new(MruPolicy::new(capacity)),
      PolicyKind::Fifo => Box::new(FifoPolicy::new(capacity)),
      PolicyKind::Clock => Box::new(ClockPolicy::with_reference_counter(capacity, counter)),
      PolicyKind::Lfu => Box::new(LfuPolicy::with_reference_counter(capacity, counter)),
    };
    (policy, Some(self.policy))
  }

  /// Central logic to construct the shared core of the cache.
  pub(crate) fn build_shared_core(&mut self) -> Result<Arc<CacheShared<K, V>>, BuildError> {
    let (policy, kind) = self.make_policy();
    let shared = Arc::new(CacheShared::new(policy, kind, Arc::clone(&self.clock)));

    if let Some(interval) = self.janitor_interval {
      let token = match &self.cancellation_token {
        Some(parent) => parent.child_token(),
        None => CancellationToken::new(),
      };
      shared
        .attach_janitor(interval, token)
        .map_err(|err| BuildError::JanitorSpawn(err.to_string()))?;
    }

    tracing::debug!(
      policy = ?kind,
      capacity = ?shared.capacity(),
      janitor_interval = ?self.janitor_interval,
      "cache built"
    );
    Ok(shared)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_zero_capacity() {
    let result = CacheBuilder::<u32, u32>::new()
      .policy(PolicyKind::Lru)
      .capacity(0)
      .without_janitor()
      .build();
    assert_eq!(result.err(), Some(BuildError::ZeroCapacity));
  }

  #[test]
  fn zero_capacity_is_ignored_by_simple_policy() {
    let cache = CacheBuilder::<u32, u32>::new()
      .policy(PolicyKind::Simple)
      .capacity(0)
      .without_janitor()
      .build()
      .unwrap();
    cache.set(1, 1);
    assert_eq!(cache.capacity(), None);
    assert_eq!(cache.get(&1), Some(1));
  }

  #[test]
  fn rejects_zero_janitor_interval() {
    let result = CacheBuilder::<u32, u32>::new()
      .janitor_interval(Duration::ZERO)
      .build();
    assert_eq!(result.err(), Some(BuildError::ZeroJanitorInterval));
  }

  #[test]
  fn bounded_policies_default_to_128() {
    for kind in [
      PolicyKind::Lru,
      PolicyKind::Mru,
      PolicyKind::Fifo,
      PolicyKind::Clock,
      PolicyKind::Lfu,
    ] {
      let cache = CacheBuilder::<u32, u32>::new()
        .policy(kind)
        .without_janitor()
        .build()
        .unwrap();
      assert_eq!(cache.capacity(), Some(DEFAULT_CAPACITY), "{kind:?}");
    }

    let cache = CacheBuilder::<u32, u32>::default()
      .without_janitor()
      .build()
      .unwrap();
    assert_eq!(cache.capacity(), None);
  }

  #[test]
  fn janitor_is_on_by_default() {
    let cache = CacheBuilder::<u32, u32>::new().build().unwrap();
    assert!(cache.is_janitor_running());
    cache.stop_janitor();
    assert!(!cache.is_janitor_running());

    let cache = CacheBuilder::<u32, u32>::new().without_janitor().build().unwrap();
    assert!(!cache.is_janitor_running());
  }
}
