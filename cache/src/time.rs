use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// The single, static reference point for all system time readings.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// A source of "now" for expiration bookkeeping.
///
/// Timestamps are expressed as a `Duration` since an arbitrary epoch chosen
/// by the clock. Every read of the current time inside a cache goes through
/// its clock, so tests can freeze and move time with [`ManualClock`] instead
/// of sleeping.
pub trait Clock: Send + Sync + fmt::Debug {
  /// Returns the current time as a duration since the clock's epoch.
  fn now(&self) -> Duration;
}

/// The default clock, backed by the monotonic `Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  #[inline]
  fn now(&self) -> Duration {
    Instant::now().saturating_duration_since(*CACHE_EPOCH)
  }
}

/// A clock that only moves when told to.
///
/// Unlike `SystemClock` it can also be set backwards, which is how the
/// cache's tolerance to clock anomalies is exercised.
#[derive(Debug, Default)]
pub struct ManualClock {
  nanos: AtomicU64,
}

impl ManualClock {
  /// Creates a clock frozen at `start`.
  pub fn new(start: Duration) -> Self {
    Self {
      nanos: AtomicU64::new(duration_to_nanos(start)),
    }
  }

  /// Moves the clock forward by `by`.
  pub fn advance(&self, by: Duration) {
    let by = duration_to_nanos(by);
    let _ = self
      .nanos
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_add(by)));
  }

  /// Moves the clock backward by `by`, stopping at the epoch.
  pub fn rewind(&self, by: Duration) {
    let by = duration_to_nanos(by);
    let _ = self
      .nanos
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(by)));
  }

  /// Sets the clock to an absolute time.
  pub fn set(&self, to: Duration) {
    self.nanos.store(duration_to_nanos(to), Ordering::Release);
  }
}

impl Clock for ManualClock {
  #[inline]
  fn now(&self) -> Duration {
    Duration::from_nanos(self.nanos.load(Ordering::Acquire))
  }
}

#[inline]
fn duration_to_nanos(d: Duration) -> u64 {
  u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
