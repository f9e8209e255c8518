use core::borrow::Borrow;
use core::ops::Add;

use alloc::vec::Vec;

use crate::delta::Delta;
use crate::error::{TreeError, TreeResult};
use crate::raw::RawAvlTree;

mod export;
mod order_statistic;

/// An ordered map based on an [AVL tree], with lazy range extras.
///
/// Keys must implement [`Ord`]. Besides the usual insert/remove/lookup, the tree
/// supports [`add_extra`](AvlTree::add_extra), which adds a delta to every key
/// less than or equal to a pivot in O(log n) regardless of how many keys that
/// covers. Reads through [`find`](AvlTree::find), [`get_min`](AvlTree::get_min),
/// [`get_max`](AvlTree::get_max) and the export functions report *effective*
/// values: the stored value plus every extra that applies to the key.
/// [`get`](AvlTree::get) returns the stored value alone.
///
/// Extras apply to the keys present when they were added. A key inserted later
/// starts with an extra of zero, and a key that is removed and re-inserted
/// loses the extras it had.
///
/// The third type parameter is the delta type and defaults to the value type.
/// Trees holding payloads with no additive structure can use `()`.
///
/// # Examples
///
/// ```
/// use lazy_avl::AvlTree;
///
/// let mut wins: AvlTree<u32, i64> = AvlTree::new();
/// wins.insert(7, 0).unwrap();
/// wins.insert(3, 0).unwrap();
/// wins.insert(12, 0).unwrap();
///
/// // Every team with an id up to 7 gets 2 wins.
/// wins.add_extra(&7, 2);
/// assert_eq!(wins.find(&3), Ok(2));
/// assert_eq!(wins.find(&7), Ok(2));
/// assert_eq!(wins.find(&12), Ok(0));
///
/// // New keys do not inherit earlier extras.
/// wins.insert(5, 0).unwrap();
/// assert_eq!(wins.get_path_extra(&5), Ok(0));
///
/// // The stored value is untouched.
/// assert_eq!(wins.get(&3), Ok(&0));
/// ```
///
/// A tree over opaque payloads:
///
/// ```
/// use lazy_avl::AvlTree;
///
/// struct Team {
///     name: &'static str,
/// }
///
/// let mut teams: AvlTree<u32, Team, ()> = AvlTree::default();
/// teams.insert(1, Team { name: "red" }).unwrap();
/// assert_eq!(teams.get(&1).map(|team| team.name), Ok("red"));
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
#[derive(Clone)]
pub struct AvlTree<K, V, D = V> {
    raw: RawAvlTree<K, V, D>,
}

impl<K, V> AvlTree<K, V> {
    /// Makes a new, empty `AvlTree` whose delta type is its value type.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, 10).unwrap();
    /// assert_eq!(tree.size(), 1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawAvlTree::new() }
    }
}

impl<K, V, D> AvlTree<K, V, D> {
    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1, 1).unwrap();
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns the number of elements in the tree. Same as [`len`](Self::len).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every element and every pending extra.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, 1).unwrap();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl<K: Ord, V, D: Delta> AvlTree<K, V, D> {
    /// Builds a tree from parallel arrays of keys and values, in linear time.
    ///
    /// `keys` must be sorted in strictly increasing order. This is not checked in release
    /// builds; a tree built from unsorted keys answers lookups incorrectly.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidInput`] if the arrays differ in length,
    /// [`TreeError::AllocationError`] if node storage cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::{AvlTree, TreeError};
    ///
    /// let tree: AvlTree<i32, i32> = AvlTree::from_sorted(vec![1, 2, 3], vec![10, 20, 30]).unwrap();
    /// assert!(tree.is_valid());
    /// assert_eq!(tree.to_sequence(), [(1, 10), (2, 20), (3, 30)]);
    ///
    /// let mismatched = AvlTree::<i32, i32>::from_sorted(vec![1, 2], vec![10]);
    /// assert!(matches!(mismatched, Err(TreeError::InvalidInput)));
    /// ```
    pub fn from_sorted(keys: Vec<K>, values: Vec<V>) -> TreeResult<Self> {
        if keys.len() != values.len() {
            return Err(TreeError::InvalidInput);
        }
        Self::from_sorted_iter(keys.into_iter().zip(values))
    }

    /// Builds a tree from `(key, value)` pairs sorted by strictly increasing key, in linear time.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidInput`] if the iterator's reported length is wrong,
    /// [`TreeError::AllocationError`] if node storage cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let tree: AvlTree<u32, u32> = AvlTree::from_sorted_iter((0..100).map(|key| (key, key * key))).unwrap();
    /// assert_eq!(tree.find(&9), Ok(81));
    /// ```
    pub fn from_sorted_iter<I>(entries: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        Ok(Self {
            raw: RawAvlTree::from_sorted_iter(entries.into_iter())?,
        })
    }

    /// Inserts a key-value pair.
    ///
    /// The new key has an extra of zero, whatever extras were added before.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] if the key is already present (the stored value is kept),
    /// [`TreeError::AllocationError`] if node storage cannot grow.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::{AvlTree, TreeError};
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.insert(37, 1), Ok(()));
    /// assert_eq!(tree.insert(37, 2), Err(TreeError::DuplicateKey));
    /// assert_eq!(tree.get(&37), Ok(&1));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> TreeResult<()> {
        self.raw.insert(key, value)
    }

    /// Removes a key, returning its stored value.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::{AvlTree, TreeError};
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, 10).unwrap();
    /// tree.add_extra(&1, 5);
    /// // The stored value comes back, without extras.
    /// assert_eq!(tree.remove(&1), Ok(10));
    /// assert_eq!(tree.remove(&1), Err(TreeError::NotFound));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> TreeResult<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).map(|(_, value)| value)
    }

    /// Removes a key, returning the stored key and value.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> TreeResult<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns a reference to the stored value, without extras.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    pub fn get<Q>(&self, key: &Q) -> TreeResult<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, _) = self.raw.search(key).ok_or(TreeError::NotFound)?;
        Ok(self.raw.entry(handle).1)
    }

    /// Returns a mutable reference to the stored value.
    ///
    /// Extras are kept separately, so writing the stored value does not disturb them.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, 10).unwrap();
    /// tree.add_extra(&1, 5);
    /// *tree.get_mut(&1).unwrap() = 20;
    /// assert_eq!(tree.find(&1), Ok(25));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> TreeResult<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, _) = self.raw.search(key).ok_or(TreeError::NotFound)?;
        Ok(self.raw.value_mut(handle))
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Adds `delta` to every key less than or equal to `pivot`, in O(log n).
    ///
    /// `pivot` does not have to be present. Keys inserted afterwards are not affected.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree: AvlTree<i32, i32> = AvlTree::from_sorted(vec![1, 2, 3, 4], vec![0; 4]).unwrap();
    /// tree.add_extra(&3, 4);
    /// tree.add_extra(&1, -3);
    /// assert_eq!(tree.to_sequence(), [(1, 1), (2, 4), (3, 4), (4, 0)]);
    /// ```
    pub fn add_extra<Q>(&mut self, pivot: &Q, delta: D)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.add_extra(pivot, delta);
    }

    /// Returns the sum of the extras that apply to `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    pub fn get_path_extra<Q>(&self, key: &Q) -> TreeResult<D>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.path_extra(key).ok_or(TreeError::NotFound)
    }

    /// Checks the structural invariants: every node is AVL-balanced, cached heights and sizes
    /// are consistent, and keys are strictly increasing in order.
    ///
    /// Runs in O(n). Intended for tests.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.raw.is_valid()
    }
}

impl<K, V, D> AvlTree<K, V, D>
where
    K: Ord,
    V: Clone + Add<D, Output = V>,
    D: Delta,
{
    /// Returns the effective value of `key`: its stored value plus every extra that applies.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::{AvlTree, TreeError};
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, 100).unwrap();
    /// tree.add_extra(&1, 5);
    /// assert_eq!(tree.find(&1), Ok(105));
    /// assert_eq!(tree.find(&2), Err(TreeError::NotFound));
    /// ```
    pub fn find<Q>(&self, key: &Q) -> TreeResult<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, extra) = self.raw.search(key).ok_or(TreeError::NotFound)?;
        Ok(self.raw.entry(handle).1.clone() + extra)
    }
}

impl<K, V, D> Default for AvlTree<K, V, D> {
    /// Creates an empty `AvlTree`.
    fn default() -> AvlTree<K, V, D> {
        Self { raw: RawAvlTree::new() }
    }
}
