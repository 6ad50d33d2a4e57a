use super::Policy;

use std::hash::Hash;

use ahash::{HashMap, HashMapExt};

/// An unbounded, unordered map. It never evicts; entries leave only when they
/// are deleted or expire.
#[derive(Debug)]
pub struct SimplePolicy<K, V> {
  entries: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V> SimplePolicy<K, V> {
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }
}

impl<K: Eq + Hash + Clone, V> Default for SimplePolicy<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> Policy<K, V> for SimplePolicy<K, V>
where
  K: Eq + Hash + Clone,
{
  fn get(&mut self, key: &K) -> Option<&V> {
    self.entries.get(key)
  }

  fn peek(&self, key: &K) -> Option<&V> {
    self.entries.get(key)
  }

  fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
    self.entries.insert(key, value);
    None
  }

  fn delete(&mut self, key: &K) -> bool {
    self.entries.remove(key).is_some()
  }

  fn keys(&self) -> Vec<K> {
    self.entries.keys().cloned().collect()
  }

  fn len(&self) -> usize {
    self.entries.len()
  }

  fn clear(&mut self) {
    self.entries.clear();
  }

  fn capacity(&self) -> Option<usize> {
    None
  }

  fn mutates_on_get(&self) -> bool {
    false
  }
}
