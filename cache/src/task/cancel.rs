use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct State {
  cancelled: bool,
  children: Vec<Weak<Inner>>,
}

#[derive(Default)]
struct Inner {
  state: Mutex<State>,
  signal: Condvar,
}

impl Inner {
  fn cancel(&self) {
    let children = {
      let mut state = self.state.lock();
      if state.cancelled {
        return;
      }
      state.cancelled = true;
      std::mem::take(&mut state.children)
    };
    self.signal.notify_all();

    for child in children.iter().filter_map(Weak::upgrade) {
      child.cancel();
    }
  }
}

/// A blocking cancellation signal shared between threads.
///
/// Cloning a token yields a handle to the same signal. A token created with
/// [`child_token`](Self::child_token) is cancelled whenever its parent is, but
/// cancelling the child leaves the parent untouched. The cache uses a child of
/// any token supplied through the builder, so an application can stop many
/// janitors at once while each cache can still stop its own.
#[derive(Clone, Default)]
pub struct CancellationToken {
  inner: Arc<Inner>,
}

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a token that is cancelled together with `self`.
  pub fn child_token(&self) -> CancellationToken {
    let child = CancellationToken::new();
    let mut state = self.inner.state.lock();
    if state.cancelled {
      drop(state);
      child.cancel();
    } else {
      // Forget children that have already gone away.
      state.children.retain(|weak| weak.strong_count() > 0);
      state.children.push(Arc::downgrade(&child.inner));
    }
    child
  }

  /// Cancels this token and all of its children. Cancelling twice is a no-op.
  pub fn cancel(&self) {
    self.inner.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.inner.state.lock().cancelled
  }

  /// Blocks for up to `timeout` or until the token is cancelled, whichever
  /// comes first. Returns `true` if the token is cancelled.
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = Instant::now().checked_add(timeout);
    let mut state = self.inner.state.lock();
    while !state.cancelled {
      match deadline {
        Some(deadline) => {
          if self.inner.signal.wait_until(&mut state, deadline).timed_out() {
            break;
          }
        }
        None => self.inner.signal.wait(&mut state),
      }
    }
    state.cancelled
  }
}

impl fmt::Debug for CancellationToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancellationToken")
      .field("is_cancelled", &self.is_cancelled())
      .finish()
  }
}
