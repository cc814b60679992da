//! Fixed-capacity least-recently-used map.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Fixed-capacity map with least-recently-used eviction.
///
/// Recency is a monotonically increasing tick stamped on every `get` hit and
/// every `put`. The entry with the smallest tick is evicted first, so entries
/// never re-accessed leave in insertion order.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, Slot<V>>,
    order: BTreeMap<u64, K>,
}

#[derive(Debug)]
struct Slot<V> {
    value: V,
    tick: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LruCache capacity must be positive");
        Self {
            capacity,
            tick: 0,
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let tick = self.next_tick();
        let slot = self.entries.get_mut(key)?;
        self.order.remove(&slot.tick);
        slot.tick = tick;
        self.order.insert(tick, key.clone());
        Some(&slot.value)
    }

    /// Insert or replace `key`, marking it most-recently-used.
    ///
    /// Returns the displaced value: the previous value for an existing key,
    /// or the evicted least-recently-used value when a new key arrives at
    /// capacity. Returns `None` otherwise.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let tick = self.next_tick();

        if let Some(slot) = self.entries.get_mut(&key) {
            self.order.remove(&slot.tick);
            slot.tick = tick;
            self.order.insert(tick, key);
            return Some(std::mem::replace(&mut slot.value, value));
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.pop_lru().map(|(_, v)| v)
        } else {
            None
        };

        self.order.insert(tick, key.clone());
        self.entries.insert(key, Slot { value, tick });
        evicted
    }

    /// Remove `key` without touching recency of other entries.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.entries.remove(key)?;
        self.order.remove(&slot.tick);
        Some(slot.value)
    }

    /// Remove and return the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    /// Keys from least- to most-recently-used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }

    /// Entries from least- to most-recently-used.
    pub fn iter_by_recency(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .values()
            .filter_map(|key| self.entries.get(key).map(|slot| (key, &slot.value)))
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_up_to_capacity() {
        let mut cache = LruCache::new(3);
        assert_eq!(cache.put("a", 1), None);
        assert_eq!(cache.put("b", 2), None);
        assert_eq!(cache.put("c", 3), None);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn evicts_in_insertion_order_without_access() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.put("c", 3), Some(1));
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn get_promotes_entry() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");

        assert_eq!(cache.put("c", 3), Some(2));
        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
        assert!(cache.contains(&"c"));
    }

    #[test]
    fn put_existing_returns_previous_and_keeps_size() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.put("a", 10), Some(1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&10));

        // "a" was promoted by the replacing put.
        assert_eq!(cache.put("c", 3), Some(2));
    }

    #[test]
    fn miss_does_not_disturb_order() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get(&"zzz"), None);

        let order: Vec<_> = cache.keys_by_recency().copied().collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn remove_and_pop() {
        let mut cache = LruCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.remove(&"a"), None);
        assert_eq!(cache.pop_lru(), Some(("b", 2)));
        assert!(cache.is_empty());
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        let _ = LruCache::<&str, u32>::new(0);
    }
}
