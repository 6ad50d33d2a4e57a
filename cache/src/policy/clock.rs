use super::{default_reference_count, Policy, ReferenceCounter};

use std::hash::Hash;

use ahash::{HashMap, HashMapExt};

#[derive(Debug)]
struct Slot<K, V> {
  key: K,
  value: V,
  count: u64,
}

/// The Clock (second chance) eviction policy.
///
/// Entries live in a fixed ring of slots with a "hand" pointing at the next
/// candidate. When a new key arrives and the slot under the hand is taken,
/// the hand sweeps forward, decrementing every positive reference count it
/// passes, until it reaches a slot whose count is zero. That slot is reused
/// for the new entry and the hand moves one step past it.
///
/// `get` resets an entry's count to 1 rather than incrementing it, `set` on an
/// existing key increments it. `delete` is lazy: it unmaps the key and zeroes
/// the slot's count, leaving the slot for the next sweep to reclaim.
#[derive(Debug)]
pub struct ClockPolicy<K, V> {
  ring: Vec<Option<Slot<K, V>>>,
  slots: HashMap<K, usize>,
  hand: usize,
  initial_count: ReferenceCounter<V>,
}

impl<K: Eq + Hash + Clone, V> ClockPolicy<K, V> {
  pub fn new(capacity: usize) -> Self {
    Self::with_reference_counter(capacity, default_reference_count::<V>)
  }

  /// Creates a ring whose new entries start with the count returned by
  /// `initial_count` instead of 1.
  pub fn with_reference_counter(capacity: usize, initial_count: ReferenceCounter<V>) -> Self {
    // A ring needs at least one slot for the hand to point at.
    let capacity = capacity.max(1);
    let mut ring = Vec::with_capacity(capacity);
    ring.resize_with(capacity, || None);
    Self {
      ring,
      slots: HashMap::with_capacity(capacity),
      hand: 0,
      initial_count,
    }
  }

  fn advance(&mut self) {
    self.hand = (self.hand + 1) % self.ring.len();
  }

  // When every slot holds a positive count, the hand would go round whole
  // laps before anything reaches zero. Take `min - 1` of those laps in one
  // pass; the hand ends where it started, so the outcome is unchanged.
  fn skip_full_laps(&mut self) {
    let mut min = u64::MAX;
    for slot in &self.ring {
      match slot {
        Some(slot) if slot.count > 0 => min = min.min(slot.count),
        _ => return,
      }
    }
    let laps = min - 1;
    if laps == 0 {
      return;
    }
    for slot in self.ring.iter_mut().flatten() {
      slot.count -= laps;
    }
  }

  // Moves the hand to a reusable slot and empties it. Returns the entry it
  // held if that entry was still live.
  fn sweep(&mut self) -> Option<(K, V)> {
    self.skip_full_laps();
    loop {
      match self.ring[self.hand].as_mut() {
        Some(slot) if slot.count > 0 => {
          slot.count -= 1;
          self.advance();
        }
        _ => break,
      }
    }

    let slot = self.ring[self.hand].take()?;
    // The slot may belong to a key that was deleted and set again elsewhere.
    if self.slots.get(&slot.key) == Some(&self.hand) {
      self.slots.remove(&slot.key);
      Some((slot.key, slot.value))
    } else {
      None
    }
  }
}

impl<K, V> Policy<K, V> for ClockPolicy<K, V>
where
  K: Eq + Hash + Clone,
{
  fn get(&mut self, key: &K) -> Option<&V> {
    let index = *self.slots.get(key)?;
    let slot = self.ring[index].as_mut()?;
    slot.count = 1;
    Some(&slot.value)
  }

  fn peek(&self, key: &K) -> Option<&V> {
    let index = *self.slots.get(key)?;
    self.ring[index].as_ref().map(|slot| &slot.value)
  }

  fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
    if let Some(&index) = self.slots.get(&key) {
      if let Some(slot) = self.ring[index].as_mut() {
        slot.count = slot.count.saturating_add(1);
        slot.value = value;
        return None;
      }
    }

    let evicted = self.sweep();
    let count = (self.initial_count)(&value);
    self.slots.insert(key.clone(), self.hand);
    self.ring[self.hand] = Some(Slot { key, value, count });
    self.advance();
    evicted
  }

  fn delete(&mut self, key: &K) -> bool {
    match self.slots.remove(key) {
      Some(index) => {
        if let Some(slot) = self.ring[index].as_mut() {
          slot.count = 0;
        }
        true
      }
      None => false,
    }
  }

  /// Keys in ring order, starting from the first slot.
  fn keys(&self) -> Vec<K> {
    self
      .ring
      .iter()
      .enumerate()
      .filter_map(|(index, slot)| {
        let slot = slot.as_ref()?;
        (self.slots.get(&slot.key) == Some(&index)).then(|| slot.key.clone())
      })
      .collect()
  }

  fn len(&self) -> usize {
    self.slots.len()
  }

  fn clear(&mut self) {
    self.ring.iter_mut().for_each(|slot| *slot = None);
    self.slots.clear();
    self.hand = 0;
  }

  fn capacity(&self) -> Option<usize> {
    Some(self.ring.len())
  }
}
