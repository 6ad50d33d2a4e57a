use super::list::OrderList;
use super::Policy;

use std::hash::Hash;

/// A First-In, First-Out eviction policy.
///
/// Reads never change the order. Writing a key, including an existing one,
/// puts it at the back of the queue, so an updated entry is treated as newly
/// inserted. When a new key arrives at capacity, the entry at the front of the
/// queue (the oldest write) is evicted.
#[derive(Debug)]
pub struct FifoPolicy<K: Eq + Hash + Clone, V> {
  // Head is the latest write, tail the oldest.
  queue: OrderList<K, V>,
  capacity: usize,
}

impl<K: Eq + Hash + Clone, V> FifoPolicy<K, V> {
  pub fn new(capacity: usize) -> Self {
    Self {
      queue: OrderList::with_capacity(capacity),
      capacity,
    }
  }
}

impl<K, V> Policy<K, V> for FifoPolicy<K, V>
where
  K: Eq + Hash + Clone,
{
  fn get(&mut self, key: &K) -> Option<&V> {
    self.queue.get(key)
  }

  fn peek(&self, key: &K) -> Option<&V> {
    self.queue.get(key)
  }

  fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
    let existed = self.queue.remove(&key).is_some();

    let evicted = if !existed && self.queue.len() >= self.capacity {
      self.queue.pop_back()
    } else {
      None
    };
    self.queue.push_front(key, value);
    evicted
  }

  fn delete(&mut self, key: &K) -> bool {
    self.queue.remove(key).is_some()
  }

  fn keys(&self) -> Vec<K> {
    self.queue.keys_oldest_first()
  }

  fn len(&self) -> usize {
    self.queue.len()
  }

  fn clear(&mut self) {
    self.queue.clear();
  }

  fn capacity(&self) -> Option<usize> {
    Some(self.capacity)
  }

  fn mutates_on_get(&self) -> bool {
    false
  }
}
