use core::convert::Infallible;
use core::fmt;
use core::ops::Add;

use alloc::vec::Vec;

use super::AvlTree;
use crate::delta::Delta;

impl<K, V, D> AvlTree<K, V, D>
where
    V: Clone + Add<D, Output = V>,
    D: Delta,
{
    /// Returns every `(key, effective value)` pair in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(2, 20).unwrap();
    /// tree.insert(1, 10).unwrap();
    /// tree.add_extra(&1, 1);
    /// assert_eq!(tree.to_sequence(), [(1, 11), (2, 20)]);
    /// ```
    #[must_use]
    pub fn to_sequence(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        let mut sequence = Vec::with_capacity(self.len());
        self.raw
            .try_for_each(|key, value, extra| {
                sequence.push((key.clone(), value.clone() + extra));
                Ok::<(), Infallible>(())
            })
            .unwrap_or_else(|never| match never {});
        sequence
    }

    /// Writes `(key, value)` lines in ascending key order to `sink`, using effective values.
    ///
    /// An empty tree writes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `sink`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(2, 20).unwrap();
    /// tree.insert(1, 10).unwrap();
    ///
    /// let mut out = String::new();
    /// tree.inorder(&mut out).unwrap();
    /// assert_eq!(out, "(1, 10)\n(2, 20)\n");
    /// ```
    pub fn inorder<W>(&self, sink: &mut W) -> fmt::Result
    where
        K: fmt::Display,
        V: fmt::Display,
        W: fmt::Write + ?Sized,
    {
        self.raw.try_for_each(|key, value, extra| writeln!(sink, "({key}, {})", value.clone() + extra))
    }
}

impl<K, V, D> fmt::Debug for AvlTree<K, V, D>
where
    K: fmt::Debug,
    V: fmt::Debug + Clone + Add<D, Output = V>,
    D: Delta,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.raw
            .try_for_each(|key, value, extra| {
                map.entry(key, &(value.clone() + extra));
                Ok::<(), Infallible>(())
            })
            .unwrap_or_else(|never| match never {});
        map.finish()
    }
}
