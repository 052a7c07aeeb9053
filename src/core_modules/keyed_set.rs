// THEORY:
// `KeyedSet` is a dedup container whose notion of equality comes from the caller: a
// key function maps each value to the key that identifies it. Two values with the
// same key can never both be stored.
//
// Inserting is split into two explicit operations. `put` only inserts when the key
// is absent and leaves an existing value untouched, while `upsert` always stores the
// new value. `difference` is a pure read that builds a fresh set and never mutates
// either operand. Values keep their first-insertion order so results are stable from
// run to run.

use std::collections::HashMap;
use std::hash::Hash;

/// A set of values deduplicated by a caller-supplied key function.
#[derive(Debug, Clone)]
pub struct KeyedSet<K, V> {
    key_fn: fn(&V) -> K,
    index: HashMap<K, usize>,
    values: Vec<V>,
}

impl<K, V> KeyedSet<K, V>
where
    K: Eq + Hash,
{
    pub fn new(key_fn: fn(&V) -> K) -> Self {
        Self {
            key_fn,
            index: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Builds a set from `values`; later duplicates of a key are dropped.
    pub fn from_values(key_fn: fn(&V) -> K, values: impl IntoIterator<Item = V>) -> Self {
        let mut set = Self::new(key_fn);
        for value in values {
            set.put(value);
        }
        set
    }

    /// Inserts `value` only if its key is not already present.
    /// Returns `true` when the value was inserted.
    pub fn put(&mut self, value: V) -> bool {
        let key = (self.key_fn)(&value);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.values.len());
        self.values.push(value);
        true
    }

    /// Inserts `value`, replacing any value stored under the same key in place.
    pub fn upsert(&mut self, value: V) {
        let key = (self.key_fn)(&value);
        match self.index.get(&key) {
            Some(&slot) => self.values[slot] = value,
            None => {
                self.index.insert(key, self.values.len());
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.values[slot])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Values of `self` whose key is absent from `other`, keyed like `self`.
    pub fn difference<W>(&self, other: &KeyedSet<K, W>) -> KeyedSet<K, V>
    where
        V: Clone,
    {
        let mut result = KeyedSet::new(self.key_fn);
        for value in &self.values {
            if !other.contains_key(&(self.key_fn)(value)) {
                result.put(value.clone());
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<V> {
        self.values
    }
}
