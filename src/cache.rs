use {super::*, std::collections::HashMap};

/// A size-bounded memo table.
///
/// Entries live in two generations. Inserts go to the young generation; once
/// it holds `capacity` entries the old generation is dropped and the young
/// one takes its place. Hits in the old generation are promoted, so entries
/// that keep being used survive rotation. Memory is bounded by roughly twice
/// `capacity` entries.
pub(crate) struct GenerationalCache<K, V> {
  capacity: usize,
  old: HashMap<K, V>,
  young: HashMap<K, V>,
}

impl<K, V> GenerationalCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      capacity: capacity.max(1),
      old: HashMap::new(),
      young: HashMap::new(),
    }
  }

  pub(crate) fn get(&mut self, key: &K) -> Option<V>
  where
    K: Clone,
  {
    if let Some(value) = self.young.get(key) {
      return Some(value.clone());
    }

    let value = self.old.remove(key)?;
    self.insert(key.clone(), value.clone());
    Some(value)
  }

  pub(crate) fn insert(&mut self, key: K, value: V) {
    if self.young.len() >= self.capacity {
      self.old = mem::take(&mut self.young);
    }

    self.young.insert(key, value);
  }

  pub(crate) fn len(&self) -> usize {
    self.old.len() + self.young.len()
  }
}
