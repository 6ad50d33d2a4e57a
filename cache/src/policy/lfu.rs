use super::{default_reference_count, Policy, ReferenceCounter};

use std::hash::Hash;

use ahash::{HashMap, HashMapExt};

#[derive(Debug)]
struct Entry<K, V> {
  key: K,
  value: V,
  count: u64,
  // Logical time of the last reference; breaks ties between equal counts.
  tick: u64,
}

impl<K, V> Entry<K, V> {
  fn precedes(&self, other: &Self) -> bool {
    (self.count, self.tick) < (other.count, other.tick)
  }
}

/// A Least Frequently Used eviction policy.
///
/// Entries sit in a binary min-heap ordered by reference count, then by how
/// long ago they were last referenced. Both `get` and `set` on an existing key
/// increment its count. When a new key arrives at capacity, the root (fewest
/// references, least recently referenced among those) is evicted.
#[derive(Debug)]
pub struct LfuPolicy<K, V> {
  heap: Vec<Entry<K, V>>,
  positions: HashMap<K, usize>,
  capacity: usize,
  tick: u64,
  initial_count: ReferenceCounter<V>,
}

impl<K: Eq + Hash + Clone, V> LfuPolicy<K, V> {
  pub fn new(capacity: usize) -> Self {
    Self::with_reference_counter(capacity, default_reference_count::<V>)
  }

  /// Creates a policy whose new entries start with the count returned by
  /// `initial_count` instead of 1.
  pub fn with_reference_counter(capacity: usize, initial_count: ReferenceCounter<V>) -> Self {
    Self {
      heap: Vec::with_capacity(capacity),
      positions: HashMap::with_capacity(capacity),
      capacity,
      tick: 0,
      initial_count,
    }
  }

  fn next_tick(&mut self) -> u64 {
    self.tick = self.tick.wrapping_add(1);
    self.tick
  }

  fn reference(&mut self, index: usize) -> usize {
    let tick = self.next_tick();
    let entry = &mut self.heap[index];
    entry.count = entry.count.saturating_add(1);
    entry.tick = tick;
    // Both keys only grew, so the entry can only move down.
    self.sift_down(index)
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
      if !self.heap[index].precedes(&self.heap[parent]) {
        break;
      }
      self.swap(index, parent);
      index = parent;
    }
    index
  }

  fn sift_down(&mut self, mut index: usize) -> usize {
    let len = self.heap.len();
    loop {
      let left = 2 * index + 1;
      let right = left + 1;
      let mut smallest = index;
      if left < len && self.heap[left].precedes(&self.heap[smallest]) {
        smallest = left;
      }
      if right < len && self.heap[right].precedes(&self.heap[smallest]) {
        smallest = right;
      }
      if smallest == index {
        return index;
      }
      self.swap(index, smallest);
      index = smallest;
    }
  }

  fn remove_at(&mut self, index: usize) -> Entry<K, V> {
    let last = self.heap.len() - 1;
    self.swap(index, last);
    let entry = self.heap.swap_remove(last);
    self.positions.remove(&entry.key);
    if index < self.heap.len() {
      let settled = self.sift_up(index);
      if settled == index {
        self.sift_down(index);
      }
    }
    entry
  }
}

impl<K, V> Policy<K, V> for LfuPolicy<K, V>
where
  K: Eq + Hash + Clone,
{
  fn get(&mut self, key: &K) -> Option<&V> {
    let index = *self.positions.get(key)?;
    let index = self.reference(index);
    Some(&self.heap[index].value)
  }

  fn peek(&self, key: &K) -> Option<&V> {
    let index = *self.positions.get(key)?;
    Some(&self.heap[index].value)
  }

  fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
    if let Some(&index) = self.positions.get(&key) {
      self.heap[index].value = value;
      self.reference(index);
      return None;
    }

    let evicted = if !self.heap.is_empty() && self.heap.len() >= self.capacity {
      let entry = self.remove_at(0);
      Some((entry.key, entry.value))
    } else {
      None
    };

    let count = (self.initial_count)(&value);
    let tick = self.next_tick();
    let index = self.heap.len();
    self.positions.insert(key.clone(), index);
    self.heap.push(Entry {
      key,
      value,
      count,
      tick,
    });
    self.sift_up(index);
    evicted
  }

  fn delete(&mut self, key: &K) -> bool {
    match self.positions.get(key) {
      Some(&index) => {
        self.remove_at(index);
        true
      }
      None => false,
    }
  }

  /// Keys in heap order; the first key is the next to be evicted.
  fn keys(&self) -> Vec<K> {
    self.heap.iter().map(|entry| entry.key.clone()).collect()
  }

  fn len(&self) -> usize {
    self.heap.len()
  }

  fn clear(&mut self) {
    self.heap.clear();
    self.positions.clear();
  }

  fn capacity(&self) -> Option<usize> {
    Some(self.capacity)
  }
}
