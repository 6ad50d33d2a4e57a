use crate::task::cancel::CancellationToken;

use std::io;
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

/// Something the janitor can periodically clean.
pub(crate) trait Sweep: Send + Sync {
  /// Purges expired entries and returns how many were removed.
  fn sweep(&self) -> usize;
}

/// The background task that periodically purges expired items.
///
/// The thread only holds a weak reference to its target, so a cache that is
/// dropped by its last user is freed even while the janitor is asleep. On
/// cancellation the janitor performs one final sweep before exiting.
#[derive(Debug)]
pub(crate) struct Janitor {
  token: CancellationToken,
  handle: Mutex<Option<JoinHandle<()>>>,
}

impl Janitor {
  /// Spawns a new janitor thread that sweeps `target` every `interval` until
  /// `token` is cancelled.
  pub(crate) fn spawn<S>(target: Weak<S>, interval: Duration, token: CancellationToken) -> io::Result<Self>
  where
    S: Sweep + 'static,
  {
    let thread_token = token.clone();
    let handle = thread::Builder::new()
      .name("kestrel-cache-janitor".into())
      .spawn(move || Self::run(target, interval, thread_token))?;

    tracing::debug!(?interval, "janitor started");
    Ok(Self {
      token,
      handle: Mutex::new(Some(handle)),
    })
  }

  fn run<S: Sweep>(target: Weak<S>, interval: Duration, token: CancellationToken) {
    loop {
      let cancelled = token.wait_timeout(interval);

      // The cache is gone; nothing left to clean.
      let Some(target) = target.upgrade() else {
        tracing::trace!("janitor target dropped, exiting");
        return;
      };

      let removed = target.sweep();
      if removed > 0 {
        tracing::trace!(removed, final_sweep = cancelled, "janitor purged expired items");
      }

      if cancelled {
        tracing::debug!("janitor stopped");
        return;
      }
    }
  }

  /// Signals the janitor to stop and waits for its final sweep to finish.
  ///
  /// Safe to call more than once. When called from the janitor thread itself
  /// (which happens if that thread held the last reference to the cache), the
  /// thread is signalled but not joined.
  pub(crate) fn stop(&self) {
    self.token.cancel();

    let Some(handle) = self.handle.lock().take() else {
      return;
    };
    if handle.thread().id() == thread::current().id() {
      return;
    }
    if handle.join().is_err() {
      tracing::error!("janitor thread panicked");
    }
  }

  pub(crate) fn is_stopped(&self) -> bool {
    self.token.is_cancelled()
  }
}
