use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A value in the cache together with its expiration metadata.
///
/// Timestamps are durations since the epoch of the cache's [`Clock`](crate::Clock).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item<V> {
  /// The user's value.
  pub value: V,
  /// When the item was written (or when its TTL was last reset).
  pub created_at: Duration,
  /// Time-to-live measured from `created_at`. `None` never expires.
  pub expiration: Option<Duration>,
}

impl<V> Item<V> {
  /// Creates a new `Item`. A zero expiration is normalized to "never".
  pub fn new(value: V, created_at: Duration, expiration: Option<Duration>) -> Self {
    Self {
      value,
      created_at,
      expiration: expiration.filter(|ttl| !ttl.is_zero()),
    }
  }

  /// Checks whether the item is past its TTL at `now`.
  ///
  /// The item is still valid at the exact expiration instant. A `now` that is
  /// earlier than `created_at` (a clock that went backwards) is never expired.
  #[inline]
  pub fn has_expired(&self, now: Duration) -> bool {
    match self.expiration {
      Some(ttl) => now
        .checked_sub(self.created_at)
        .map_or(false, |elapsed| elapsed > ttl),
      None => false,
    }
  }

  /// The instant after which the item is expired, if it has a TTL.
  ///
  /// Returns `None` for items that never expire and for deadlines that do not
  /// fit in a `Duration`.
  #[inline]
  pub fn deadline(&self) -> Option<Duration> {
    self
      .expiration
      .and_then(|ttl| self.created_at.checked_add(ttl))
  }

  /// Time left before the item expires, as of `now`.
  pub fn ttl_remaining(&self, now: Duration) -> Option<Duration> {
    self.deadline().map(|deadline| deadline.saturating_sub(now))
  }
}

/// Per-call options for `Cache::set_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemOptions {
  pub(crate) expiration: Option<Duration>,
  pub(crate) keep_ttl: bool,
}

impl ItemOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets a time-to-live for the item. `Duration::ZERO` means it never expires.
  pub fn with_expiration(mut self, ttl: Duration) -> Self {
    self.expiration = Some(ttl).filter(|ttl| !ttl.is_zero());
    self
  }

  /// Keeps the existing item's TTL when overwriting a key whose TTL is still
  /// live. If the key is absent, expired, or never expires, the expiration of
  /// this call applies.
  pub fn with_keep_ttl(mut self, keep: bool) -> Self {
    self.keep_ttl = keep;
    self
  }
}
