use super::list::OrderList;
use super::Policy;

use std::hash::Hash;

/// An eviction policy that evicts the least recently used entry.
///
/// Both `get` and `set` make an entry the most recently used one. When an
/// insert pushes the size over capacity, the least recently used entry is
/// dropped. `keys()` runs from least to most recently used.
#[derive(Debug)]
pub struct LruPolicy<K: Eq + Hash + Clone, V> {
  // Head is the most recently used entry, tail the least.
  list: OrderList<K, V>,
  capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruPolicy<K, V> {
  pub fn new(capacity: usize) -> Self {
    Self {
      list: OrderList::with_capacity(capacity),
      capacity,
    }
  }
}

impl<K, V> Policy<K, V> for LruPolicy<K, V>
where
  K: Eq + Hash + Clone,
{
  fn get(&mut self, key: &K) -> Option<&V> {
    self.list.touch(key)
  }

  fn peek(&self, key: &K) -> Option<&V> {
    self.list.get(key)
  }

  fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
    let value = match self.list.replace(&key, value) {
      Ok(()) => {
        self.list.touch(&key);
        return None;
      }
      Err(value) => value,
    };

    self.list.push_front(key, value);
    if self.list.len() > self.capacity {
      return self.list.pop_back();
    }
    None
  }

  fn delete(&mut self, key: &K) -> bool {
    self.list.remove(key).is_some()
  }

  fn keys(&self) -> Vec<K> {
    self.list.keys_oldest_first()
  }

  fn len(&self) -> usize {
    self.list.len()
  }

  fn clear(&mut self) {
    self.list.clear();
  }

  fn capacity(&self) -> Option<usize> {
    Some(self.capacity)
  }
}
