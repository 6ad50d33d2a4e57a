use std::hash::Hash;
use std::time::Duration;

use ahash::{HashMap, HashMapExt};

#[derive(Debug)]
struct Deadline<K> {
  at: Duration,
  key: K,
}

/// An indexed min-heap of expiration deadlines.
///
/// Each key appears at most once; `positions` records where it sits in
/// `heap` so that rescheduling and cancelling are `O(log n)`. The janitor
/// pops only the deadlines that have passed, so a sweep does not have to
/// visit every key in the cache.
#[derive(Debug)]
pub(crate) struct ExpirationQueue<K: Eq + Hash + Clone> {
  heap: Vec<Deadline<K>>,
  positions: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> ExpirationQueue<K> {
  pub(crate) fn new() -> Self {
    Self {
      heap: Vec::new(),
      positions: HashMap::new(),
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.heap.len()
  }

  /// Registers `key` to expire at `at`, replacing any earlier registration.
  pub(crate) fn schedule(&mut self, key: K, at: Duration) {
    if let Some(&index) = self.positions.get(&key) {
      let old = self.heap[index].at;
      self.heap[index].at = at;
      if at < old {
        self.sift_up(index);
      } else {
        self.sift_down(index);
      }
      return;
    }

    let index = self.heap.len();
    self.positions.insert(key.clone(), index);
    self.heap.push(Deadline { at, key });
    self.sift_up(index);
  }

  /// Forgets the deadline of `key`, if any.
  pub(crate) fn cancel(&mut self, key: &K) -> bool {
    match self.positions.remove(key) {
      Some(index) => {
        self.remove_at(index);
        true
      }
      None => false,
    }
  }

  /// Removes and returns every key whose deadline is strictly before `now`,
  /// earliest first.
  pub(crate) fn pop_expired(&mut self, now: Duration) -> Vec<K> {
    let mut expired = Vec::new();
    while let Some(top) = self.heap.first() {
      if top.at >= now {
        break;
      }
      let key = top.key.clone();
      self.positions.remove(&key);
      self.remove_at(0);
      expired.push(key);
    }
    expired
  }

  pub(crate) fn clear(&mut self) {
    self.heap.clear();
    self.positions.clear();
  }

  // Removes the heap node at `index`. The caller has already dropped it from
  // `positions`.
  fn remove_at(&mut self, index: usize) {
    let last = self.heap.len() - 1;
    if index != last {
      self.heap.swap(index, last);
      self.positions.insert(self.heap[index].key.clone(), index);
    }
    self.heap.pop();
    if index < self.heap.len() {
      let settled = self.sift_up(index);
      if settled == index {
        self.sift_down(index);
      }
    }
  }

  fn swap(&mut self, a: usize, b: usize) {
    self.heap.swap(a, b);
    if let Some(pos) = self.positions.get_mut(&self.heap[a].key) {
      *pos = a;
    }
    if let Some(pos) = self.positions.get_mut(&self.heap[b].key) {
      *pos = b;
    }
  }

  fn sift_up(&mut self, mut index: usize) -> usize {
    while index > 0 {
      let parent = (index - 1) / 2;
      if self.heap[index].at >= self.heap[parent].at {
        break;
      }
      self.swap(index, parent);
      index = parent;
    }
    index
  }

  fn sift_down(&mut self, mut index: usize) {
    let len = self.heap.len();
    loop {
      let left = 2 * index + 1;
      let right = left + 1;
      let mut smallest = index;
      if left < len && self.heap[left].at < self.heap[smallest].at {
        smallest = left;
      }
      if right < len && self.heap[right].at < self.heap[smallest].at {
        smallest = right;
      }
      if smallest == index {
        break;
      }
      self.swap(index, smallest);
      index = smallest;
    }
  }

  #[cfg(test)]
  fn assert_consistent(&self) {
    assert_eq!(self.heap.len(), self.positions.len());
    for (i, node) in self.heap.iter().enumerate() {
      assert_eq!(self.positions.get(&node.key), Some(&i));
      if i > 0 {
        assert!(self.heap[(i - 1) / 2].at <= node.at, "heap order violated");
      }
    }
  }
}
