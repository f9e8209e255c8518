use core::borrow::Borrow;
use core::ops::Add;

use super::AvlTree;
use crate::delta::Delta;
use crate::error::{TreeError, TreeResult};

impl<K, V, D> AvlTree<K, V, D>
where
    K: Ord,
    V: Clone + Add<D, Output = V>,
    D: Delta,
{
    /// Returns the effective value stored under the smallest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no elements.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::{AvlTree, TreeError};
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.get_min(), Err(TreeError::EmptyTree));
    /// tree.insert(5, 50).unwrap();
    /// tree.insert(2, 20).unwrap();
    /// tree.add_extra(&2, 1);
    /// assert_eq!(tree.get_min(), Ok(21));
    /// ```
    pub fn get_min(&self) -> TreeResult<V> {
        let (handle, extra) = self.raw.first().ok_or(TreeError::EmptyTree)?;
        Ok(self.raw.entry(handle).1.clone() + extra)
    }

    /// Returns the effective value stored under the largest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no elements.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::{AvlTree, TreeError};
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.get_max(), Err(TreeError::EmptyTree));
    /// tree.insert(5, 50).unwrap();
    /// tree.insert(2, 20).unwrap();
    /// assert_eq!(tree.get_max(), Ok(50));
    /// ```
    pub fn get_max(&self) -> TreeResult<V> {
        let (handle, extra) = self.raw.last().ok_or(TreeError::EmptyTree)?;
        Ok(self.raw.entry(handle).1.clone() + extra)
    }

    /// Returns the key and effective value at position `rank` in sorted order.
    ///
    /// The rank is zero-based.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if `rank >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert("a", 10).unwrap();
    /// tree.insert("c", 30).unwrap();
    /// tree.insert("b", 20).unwrap();
    ///
    /// assert_eq!(tree.get_by_rank(1), Ok((&"b", 20)));
    /// assert!(tree.get_by_rank(3).is_err());
    /// ```
    pub fn get_by_rank(&self, rank: usize) -> TreeResult<(&K, V)> {
        let (handle, extra) = self.raw.get_by_rank(rank).ok_or(TreeError::NotFound)?;
        let (key, value) = self.raw.entry(handle);
        Ok((key, value.clone() + extra))
    }
}

impl<K: Ord, V, D: Delta> AvlTree<K, V, D> {
    /// Returns the zero-based rank of `key` in sorted order.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(10, 1).unwrap();
    /// tree.insert(5, 2).unwrap();
    /// tree.insert(20, 3).unwrap();
    ///
    /// assert_eq!(tree.rank_of(&5), Ok(0));
    /// assert_eq!(tree.rank_of(&20), Ok(2));
    /// assert!(tree.rank_of(&7).is_err());
    /// ```
    pub fn rank_of<Q>(&self, key: &Q) -> TreeResult<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(key).ok_or(TreeError::NotFound)
    }
}
