use super::list::OrderList;
use super::Policy;

use std::hash::Hash;

/// The "most recently used" policy.
///
/// It keeps the same recency list as [`LruPolicy`](super::lru::LruPolicy):
/// `get` and `set` move an entry to the recent end. When a new key arrives
/// and the cache is full, the victim is taken from the opposite end of that
/// list before the new entry is inserted, so the incoming key is never its
/// own victim. `keys()` runs from most to least recently used.
#[derive(Debug)]
pub struct MruPolicy<K: Eq + Hash + Clone, V> {
  // Head is the most recently used entry, tail the least.
  list: OrderList<K, V>,
  capacity: usize,
}

impl<K: Eq + Hash + Clone, V> MruPolicy<K, V> {
  pub fn new(capacity: usize) -> Self {
    Self {
      list: OrderList::with_capacity(capacity),
      capacity,
    }
  }
}

impl<K, V> Policy<K, V> for MruPolicy<K, V>
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

    let evicted = if self.list.len() >= self.capacity {
      self.list.pop_back()
    } else {
      None
    };
    self.list.push_front(key, value);
    evicted
  }

  fn delete(&mut self, key: &K) -> bool {
    self.list.remove(key).is_some()
  }

  fn keys(&self) -> Vec<K> {
    self.list.keys_newest_first()
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
