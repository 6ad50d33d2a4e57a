use crate::error::CacheError;
use crate::expiration::ExpirationQueue;
use crate::item::{Item, ItemOptions};
use crate::policy::{Policy, PolicyKind};
use crate::task::cancel::CancellationToken;
use crate::task::janitor::{Janitor, Sweep};
use crate::time::Clock;

use std::fmt;
use std::hash::Hash;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, RwLock};

/// A policy engine as stored inside a cache.
pub(crate) type BoxedPolicy<K, V> = Box<dyn Policy<K, Item<V>> + Send + Sync>;

/// Everything guarded by the cache lock: the engine and the deadlines of the
/// items it holds. The two are only ever changed together.
pub(crate) struct State<K: Eq + Hash + Clone, V> {
  policy: BoxedPolicy<K, V>,
  expirations: ExpirationQueue<K>,
}

impl<K: Eq + Hash + Clone, V> State<K, V> {
  fn insert(&mut self, key: K, item: Item<V>) {
    match item.deadline() {
      Some(at) => self.expirations.schedule(key.clone(), at),
      None => {
        self.expirations.cancel(&key);
      }
    }

    if let Some((evicted, _)) = self.policy.set(key, item) {
      self.expirations.cancel(&evicted);
      tracing::trace!(len = self.policy.len(), "entry evicted to make room");
    }
  }

  fn remove(&mut self, key: &K) -> bool {
    self.expirations.cancel(key);
    self.policy.delete(key)
  }

  // Whether `key` is present and past its TTL.
  fn is_expired(&self, key: &K, now: Duration) -> bool {
    self
      .policy
      .peek(key)
      .map_or(false, |item| item.has_expired(now))
  }
}

/// The internal, thread-safe core of the cache.
pub(crate) struct CacheShared<K: Eq + Hash + Clone, V> {
  state: CachePadded<RwLock<State<K, V>>>,
  clock: Arc<dyn Clock>,
  // `None` for a user-supplied engine.
  kind: Option<PolicyKind>,
  // Engines that do not reorder on `get` can be read under the shared lock.
  read_only_get: bool,
  janitor: Mutex<Option<Janitor>>,
}

impl<K: Eq + Hash + Clone, V> fmt::Debug for CacheShared<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.read();
    f.debug_struct("CacheShared")
      .field("len", &state.policy.len())
      .field("policy", &self.kind)
      .field("capacity", &state.policy.capacity())
      .field("scheduled_expirations", &state.expirations.len())
      .field("clock", &self.clock)
      .field("janitor", &self.janitor.lock().is_some())
      .finish_non_exhaustive()
  }
}

impl<K: Eq + Hash + Clone, V> Drop for CacheShared<K, V> {
  fn drop(&mut self) {
    if let Some(janitor) = self.janitor.get_mut().take() {
      janitor.stop();
    }
  }
}

impl<K: Eq + Hash + Clone, V> CacheShared<K, V> {
  pub(crate) fn new(policy: BoxedPolicy<K, V>, kind: Option<PolicyKind>, clock: Arc<dyn Clock>) -> Self {
    let read_only_get = !policy.mutates_on_get();
    Self {
      state: CachePadded::new(RwLock::new(State {
        policy,
        expirations: ExpirationQueue::new(),
      })),
      clock,
      kind,
      read_only_get,
      janitor: Mutex::new(None),
    }
  }

  #[inline]
  pub(crate) fn now(&self) -> Duration {
    self.clock.now()
  }

  /// Looks up `key`, recording the access with the policy, and applies `f` to
  /// the live item while the lock is held.
  ///
  /// An expired hit is purged and reported as `CacheError::Expired`.
  pub(crate) fn with_item<R>(&self, key: &K, f: impl FnOnce(&Item<V>) -> R) -> Result<R, CacheError> {
    let now = self.now();

    if self.read_only_get {
      {
        let state = self.state.read();
        match state.policy.peek(key) {
          None => return Err(CacheError::NotFound),
          Some(item) if !item.has_expired(now) => return Ok(f(item)),
          Some(_) => {}
        }
      }
      // Re-checked under the write lock: the key may have been refreshed.
      self.purge_if_expired(key, now);
      return Err(CacheError::Expired);
    }

    let mut state = self.state.write();
    let expired = match state.policy.peek(key) {
      None => return Err(CacheError::NotFound),
      Some(item) => item.has_expired(now),
    };
    if expired {
      state.remove(key);
      return Err(CacheError::Expired);
    }
    state
      .policy
      .get(key)
      .map(f)
      .ok_or(CacheError::NotFound)
  }

  /// Like [`with_item`](Self::with_item) but leaves the policy's bookkeeping
  /// untouched and never purges.
  pub(crate) fn peek_item<R>(&self, key: &K, f: impl FnOnce(&Item<V>) -> R) -> Result<R, CacheError> {
    let now = self.now();
    let state = self.state.read();
    match state.policy.peek(key) {
      None => Err(CacheError::NotFound),
      Some(item) if item.has_expired(now) => Err(CacheError::Expired),
      Some(item) => Ok(f(item)),
    }
  }

  fn purge_if_expired(&self, key: &K, now: Duration) -> bool {
    let mut state = self.state.write();
    if state.is_expired(key, now) {
      state.remove(key)
    } else {
      false
    }
  }

  /// Inserts or replaces `key`.
  pub(crate) fn set(&self, key: K, value: V, options: ItemOptions) {
    let now = self.now();
    let mut state = self.state.write();

    let (created_at, expiration) = match state.policy.peek(&key) {
      Some(existing)
        if options.keep_ttl && existing.expiration.is_some() && !existing.has_expired(now) =>
      {
        (existing.created_at, existing.expiration)
      }
      _ => (now, options.expiration),
    };

    state.insert(key, Item::new(value, created_at, expiration));
  }

  /// Inserts a fully formed item, bypassing the keep-TTL logic.
  #[cfg(feature = "serde")]
  pub(crate) fn insert_item(&self, key: K, item: Item<V>) {
    self.state.write().insert(key, item);
  }

  pub(crate) fn delete(&self, key: &K) -> bool {
    self.state.write().remove(key)
  }

  pub(crate) fn keys(&self) -> Vec<K> {
    self.state.read().policy.keys()
  }

  /// Calls `f` on every live item, in the policy's key order.
  #[cfg(feature = "serde")]
  pub(crate) fn for_each_live(&self, mut f: impl FnMut(&K, &Item<V>, Duration)) {
    let now = self.now();
    let state = self.state.read();
    for key in state.policy.keys() {
      if let Some(item) = state.policy.peek(&key) {
        if !item.has_expired(now) {
          f(&key, item, now);
        }
      }
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.state.read().policy.len()
  }

  #[cfg(feature = "serde")]
  pub(crate) fn policy_kind(&self) -> Option<PolicyKind> {
    self.kind
  }

  pub(crate) fn capacity(&self) -> Option<usize> {
    self.state.read().policy.capacity()
  }

  pub(crate) fn clear(&self) {
    let mut state = self.state.write();
    state.policy.clear();
    state.expirations.clear();
  }

  /// Removes every item whose TTL has elapsed. Returns how many were removed.
  pub(crate) fn delete_expired(&self) -> usize {
    let now = self.now();
    let mut state = self.state.write();

    let mut removed = 0;
    for key in state.expirations.pop_expired(now) {
      let live_deadline = match state.policy.peek(&key) {
        Some(item) if item.has_expired(now) => None,
        Some(item) => Some(item.deadline()),
        None => continue,
      };
      match live_deadline {
        None => {
          if state.policy.delete(&key) {
            removed += 1;
          }
        }
        // Out of step with the item; put the real deadline back.
        Some(Some(at)) => state.expirations.schedule(key, at),
        Some(None) => {}
      }
    }

    if removed > 0 {
      tracing::debug!(removed, remaining = state.policy.len(), "purged expired items");
    }
    removed
  }

  /// Stops the janitor, if one is running, after its final sweep.
  pub(crate) fn stop_janitor(&self) {
    let janitor = self.janitor.lock().take();
    if let Some(janitor) = janitor {
      janitor.stop();
    }
  }

  pub(crate) fn is_janitor_running(&self) -> bool {
    self
      .janitor
      .lock()
      .as_ref()
      .map_or(false, |janitor| !janitor.is_stopped())
  }
}

impl<K, V> CacheShared<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Starts a janitor that sweeps this cache every `interval` until `token`
  /// is cancelled.
  pub(crate) fn attach_janitor(self: &Arc<Self>, interval: Duration, token: CancellationToken) -> io::Result<()> {
    let janitor = Janitor::spawn(Arc::downgrade(self), interval, token)?;
    *self.janitor.lock() = Some(janitor);
    Ok(())
  }
}

impl<K, V> Sweep for CacheShared<K, V>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn sweep(&self) -> usize {
    self.delete_expired()
  }
}
