//! The public ordered-map type built on the AVL core.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use crate::arena::{Arena, NodeId};
use crate::base::Attach;

// =============================================================================
// AvlTreeMap Definition
// =============================================================================

/// An ordered map keyed by `K`, stored as a self-balancing AVL tree.
///
/// Entries are kept in binary-search-tree order over an arena of
/// index-linked nodes. Every insertion and removal runs an upward
/// rebalancing walk that keeps each node's subtree heights within one of
/// each other, so the depth of the tree, and with it the cost of every
/// lookup, stays logarithmic in the number of entries.
///
/// Keys must implement [`Ord`]. Keys are unique: inserting an existing key
/// overwrites its value in place without changing the tree shape.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log N)          |
/// | `insert`       | O(log N) depth    |
/// | `remove`       | O(log N) depth    |
/// | `contains_key` | O(log N)          |
/// | `min`/`max`    | O(log N)          |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// `insert` and `remove` locate their node in O(log N) comparisons and
/// apply at most a constant number of rotations per visited level. The
/// rebalancing walk recomputes subtree heights on demand instead of caching
/// them, so each visited node's factor is always derived from ground truth.
///
/// # Examples
///
/// ```rust
/// use avlmap::AvlTreeMap;
///
/// let mut map = AvlTreeMap::new();
/// map.insert(2, "two");
/// map.insert(1, "one");
/// map.insert(3, "three");
///
/// assert_eq!(map.get(&2), Some(&"two"));
/// assert_eq!(map.min(), Some((&1, &"one")));
///
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3]);
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    /// Node storage; freed slots are recycled.
    pub(crate) arena: Arena<K, V>,
    /// Root node of the tree, absent when empty.
    pub(crate) root: Option<NodeId>,
    /// Number of entries.
    pub(crate) length: usize,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, String> = AvlTreeMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            length: 0,
        }
    }

    /// Creates an empty map with room for `capacity` entries before the
    /// node arena reallocates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "one");
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.length = 0;
    }

    /// Height of the tree: 0 when empty, 1 for a single entry.
    ///
    /// The AVL balance guarantee bounds this by roughly 1.44 · log₂ N.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// for key in 1..=3 {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Returns the entry with the minimum key.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(3, "three");
    /// map.insert(1, "one");
    /// assert_eq!(map.min(), Some((&1, &"one")));
    /// ```
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.arena[self.leftmost(root)];
            (&node.key, &node.value)
        })
    }

    /// Returns the entry with the maximum key.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(3, "three");
    /// map.insert(1, "one");
    /// assert_eq!(map.max(), Some((&3, &"three")));
    /// ```
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.arena[self.rightmost(root)];
            (&node.key, &node.value)
        })
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator follows parent links from node to in-order successor,
    /// so it allocates nothing and yields each entry in O(1) amortized.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(3, "three");
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            cursor: self.root.map(|root| self.leftmost(root)),
            remaining: self.length,
        }
    }

    /// Returns an iterator over keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(3, "three");
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    ///
    /// let keys: Vec<&i32> = map.keys().collect();
    /// assert_eq!(keys, vec![&1, &2, &3]);
    /// ```
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, 10);
    /// map.insert(2, 20);
    /// map.insert(3, 30);
    ///
    /// let sum: i32 = map.values().sum();
    /// assert_eq!(sum, 60);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates a map containing a single key-value pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::singleton(42, "answer");
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get(&42), Some(&"answer"));
    /// ```
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        let mut map = Self::new();
        map.insert(key, value);
        map
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// ordering on the borrowed form must match the ordering on the key
    /// type.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|id| &self.arena[id].value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "one".to_string());
    /// if let Some(value) = map.get_mut(&1) {
    ///     value.make_ascii_uppercase();
    /// }
    /// assert_eq!(map.get(&1), Some(&"ONE".to_string()));
    /// ```
    #[must_use]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|id| &mut self.arena[id].value)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert("key".to_string(), 42);
    ///
    /// assert!(map.contains_key("key"));
    /// assert!(!map.contains_key("other"));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key is new, the entry is attached as a leaf and the
    /// rebalancing walk runs from it up to the root; `None` is returned.
    /// If the key already exists, its value is overwritten in place and the
    /// previous value is returned; the tree shape does not change and
    /// nothing is rebalanced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// assert_eq!(map.insert(1, "one"), None);
    /// assert_eq!(map.insert(1, "ONE"), Some("one"));
    /// assert_eq!(map.get(&1), Some(&"ONE"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.attach(key, value) {
            Attach::Inserted(id) => {
                self.length += 1;
                self.rebalance_from(Some(id));
                None
            }
            Attach::Replaced(old) => Some(old),
        }
    }

    /// Removes a key from the map, returning its value.
    ///
    /// Removing a key that is not present is a silent no-op returning
    /// `None`. When the removed node has two children it is first swapped
    /// with its in-order predecessor; the rebalancing walk then runs from
    /// the parent of the spliced-out position up to the root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "one");
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        let (value, rebalance_start) = self.detach(id);
        self.length -= 1;
        self.rebalance_from(rebalance_start);
        Some(value)
    }

    /// Asserts every structural invariant of the tree. Test support; not
    /// part of the public API surface.
    ///
    /// Checks binary-search-tree ordering, parent/child link consistency,
    /// agreement of every stored balance factor with the factor recomputed
    /// from subtree heights, the AVL bound on each factor, and the entry
    /// count.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        if let Some(root) = self.root {
            assert_eq!(self.arena[root].parent, None, "root must not have a parent");
        }
        let count = self.check_subtree(self.root, None, None);
        assert_eq!(count, self.length, "length disagrees with node count");
    }

    /// Validates the subtree rooted at `node` against the open key interval
    /// `(lower, upper)` and returns its node count.
    fn check_subtree(&self, node: Option<NodeId>, lower: Option<&K>, upper: Option<&K>) -> usize {
        let Some(id) = node else {
            return 0;
        };
        let current = &self.arena[id];

        assert!(
            lower.is_none_or(|bound| *bound < current.key),
            "key order violated on the left"
        );
        assert!(
            upper.is_none_or(|bound| *bound > current.key),
            "key order violated on the right"
        );

        for child in [current.left, current.right].into_iter().flatten() {
            assert_eq!(
                self.arena[child].parent,
                Some(id),
                "child does not point back at its parent"
            );
        }

        let factor = self.balance_factor(Some(id));
        assert!(
            (-1..=1).contains(&factor),
            "balance factor {factor} outside the AVL range"
        );
        assert_eq!(
            i64::from(current.balance),
            factor,
            "stored balance factor is stale"
        );

        let left_count = self.check_subtree(current.left, lower, Some(&current.key));
        let right_count = self.check_subtree(current.right, Some(&current.key), upper);
        left_count + right_count + 1
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of an [`AvlTreeMap`] in ascending key order.
pub struct Iter<'a, K, V> {
    map: &'a AvlTreeMap<K, V>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.map.successor(id);
        self.remaining = self.remaining.saturating_sub(1);
        let node = &self.map.arena[id];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An owning iterator over the entries of an [`AvlTreeMap`] in ascending
/// key order.
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for AvlTreeMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        // Record the in-order sequence first, then move the entries out of
        // their slots; freeing never disturbs other slots.
        let mut order = Vec::with_capacity(self.length);
        let mut cursor = self.root.map(|root| self.leftmost(root));
        while let Some(id) = cursor {
            order.push(id);
            cursor = self.successor(id);
        }

        let mut entries = Vec::with_capacity(order.len());
        for id in order {
            let node = self.arena.free(id);
            entries.push((node.key, node.value));
        }
        self.root = None;
        self.length = 0;

        IntoIter {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self
                .iter()
                .zip(other.iter())
                .all(|(mine, theirs)| mine == theirs)
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

/// Computes a hash value for this map.
///
/// The hash covers the length and then every (key, value) pair in key
/// order, so insertion order never affects the result and equal maps hash
/// equally.
impl<K: Hash, V: Hash> Hash for AvlTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for AvlTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
