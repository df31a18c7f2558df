use std::borrow::Borrow;
use std::{fmt, mem};

/// A map structure that stores data sorted by key as tuples in a [Vec], allowing for retrieval
/// using binary search.
///
/// Iteration always yields entries in ascending key order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct BSMap<K, V>(Vec<(K, V)>);

impl<K, V> BSMap<K, V> {
    pub fn new() -> BSMap<K, V> {
        BSMap(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.iter().map(|&(ref k, _)| k)
    }
}

impl<K: Ord, V> BSMap<K, V> {
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.0
            .binary_search_by_key(&key, |&(ref k, _)| k.borrow())
            .ok()
            .map(|i| &self.0[i].1)
    }

    /// Inserts a value, returning the one previously stored under the same key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.0.binary_search_by_key(&&key, |&(ref k, _)| k) {
            Ok(i) => Some(mem::replace(&mut self.0[i].1, value)),
            Err(i) => {
                self.0.insert(i, (key, value));
                None
            }
        }
    }

    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.0
            .binary_search_by_key(&key, |&(ref k, _)| k.borrow())
            .ok()
            .map(|i| self.0.remove(i).1)
    }
}

impl<K, V> Default for BSMap<K, V> {
    fn default() -> BSMap<K, V> {
        BSMap::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BSMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BSMap {{ ")?;
        for ((k, v), i) in self.0.iter().zip(0..) {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?} => {:?}", k, v)?;
        }
        if !self.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "}}")
    }
}

#[test]
fn bsmap_keeps_keys_sorted() {
    let mut map = BSMap::new();
    assert_eq!(map.insert(104, "c"), None);
    assert_eq!(map.insert(3, "a"), None);
    assert_eq!(map.insert(50, "b"), None);
    assert_eq!(map.insert(50, "B"), Some("b"));

    assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec![3, 50, 104]);
    assert_eq!(map.get(&50), Some(&"B"));
    assert_eq!(map.get(&4), None);
    assert_eq!(format!("{:?}", map), "BSMap { 3 => \"a\", 50 => \"B\", 104 => \"c\" }");

    assert_eq!(map.remove(&3), Some("a"));
    assert_eq!(map.remove(&3), None);
    assert_eq!(map.len(), 2);
}
