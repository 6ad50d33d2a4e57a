use std::hash::Hash;

use ahash::{HashMap, HashMapExt};
use generational_arena::{Arena, Index};

#[derive(Debug)]
pub(crate) struct Node<K, V> {
  pub(crate) key: K,
  pub(crate) value: V,
  pub(crate) next: Option<Index>,
  pub(crate) prev: Option<Index>,
}

// A self-contained ordered list of key/value pairs.
// Shared by the recency (LRU/MRU) and insertion-order (FIFO) policies.
#[derive(Debug)]
pub(crate) struct OrderList<K: Eq + Hash + Clone, V> {
  // Arena stores all nodes contiguously.
  nodes: Arena<Node<K, V>>,
  // HashMap for O(1) lookup of a key to its node index in the arena.
  lookup: HashMap<K, Index>,
  // Head is the newest (most recently pushed or moved) entry.
  head: Option<Index>,
  // Tail is the oldest entry.
  tail: Option<Index>,
}

impl<K: Eq + Hash + Clone, V> OrderList<K, V> {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      nodes: Arena::with_capacity(capacity),
      lookup: HashMap::with_capacity(capacity),
      head: None,
      tail: None,
    }
  }

  // Helper to unlink a node from the list.
  // This doesn't handle arena/map removal.
  fn unlink(&mut self, index: Index) {
    let node = &self.nodes[index];
    let prev_node_idx = node.prev;
    let next_node_idx = node.next;

    if let Some(prev_idx) = prev_node_idx {
      self.nodes[prev_idx].next = next_node_idx;
    } else {
      // We are unlinking the head of the list.
      self.head = next_node_idx;
    }

    if let Some(next_idx) = next_node_idx {
      self.nodes[next_idx].prev = prev_node_idx;
    } else {
      // We are unlinking the tail of the list.
      self.tail = prev_node_idx;
    }
  }

  // Helper to link a node in at the front (making it the new head).
  // Assumes the node is already in the arena and unlinked.
  fn link_front(&mut self, index: Index) {
    let old_head_idx = self.head;
    self.nodes[index].next = old_head_idx;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old_head) = old_head_idx {
      self.nodes[old_head].prev = Some(index);
    }

    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  pub fn len(&self) -> usize {
    self.lookup.len()
  }

  pub fn contains(&self, key: &K) -> bool {
    self.lookup.contains_key(key)
  }

  pub fn get(&self, key: &K) -> Option<&V> {
    let index = *self.lookup.get(key)?;
    self.nodes.get(index).map(|node| &node.value)
  }

  /// Inserts a new key at the front. The key must not already be present.
  pub fn push_front(&mut self, key: K, value: V) {
    debug_assert!(!self.lookup.contains_key(&key));
    let index = self.nodes.insert(Node {
      key: key.clone(),
      value,
      next: None,
      prev: None,
    });
    self.lookup.insert(key, index);
    self.link_front(index);
  }

  /// Replaces the value of an existing key in place. Hands `value` back if
  /// the key is absent.
  pub fn replace(&mut self, key: &K, value: V) -> Result<(), V> {
    match self.lookup.get(key) {
      Some(&index) => {
        self.nodes[index].value = value;
        Ok(())
      }
      None => Err(value),
    }
  }

  /// Moves an existing key to the front and returns its value.
  pub fn touch(&mut self, key: &K) -> Option<&V> {
    let index = *self.lookup.get(key)?;
    // Only move if it's not already the head.
    if self.head != Some(index) {
      self.unlink(index);
      self.link_front(index);
    }
    self.nodes.get(index).map(|node| &node.value)
  }

  /// Removes and returns the newest entry.
  pub fn pop_front(&mut self) -> Option<(K, V)> {
    let index = self.head?;
    self.remove_index(index)
  }

  /// Removes and returns the oldest entry.
  pub fn pop_back(&mut self) -> Option<(K, V)> {
    let index = self.tail?;
    self.remove_index(index)
  }

  pub fn remove(&mut self, key: &K) -> Option<V> {
    let index = *self.lookup.get(key)?;
    self.remove_index(index).map(|(_, value)| value)
  }

  fn remove_index(&mut self, index: Index) -> Option<(K, V)> {
    self.unlink(index);
    let node = self.nodes.remove(index)?;
    self.lookup.remove(&node.key);
    Some((node.key, node.value))
  }

  pub fn clear(&mut self) {
    self.nodes.clear();
    self.lookup.clear();
    self.head = None;
    self.tail = None;
  }

  /// Keys from the head (newest) to the tail (oldest).
  pub fn keys_newest_first(&self) -> Vec<K> {
    let mut keys = Vec::with_capacity(self.len());
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].next;
    }
    keys
  }

  /// Keys from the tail (oldest) to the head (newest).
  pub fn keys_oldest_first(&self) -> Vec<K> {
    let mut keys = Vec::with_capacity(self.len());
    let mut current = self.tail;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].prev;
    }
    keys
  }
}
