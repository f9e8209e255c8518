use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;
use super::raw_avl_tree::RawAvlTree;
use crate::delta::Delta;
use crate::error::{TreeError, TreeResult};

impl<K: Ord, V, D: Delta> RawAvlTree<K, V, D> {
    /// Builds a balanced tree from entries already sorted by strictly increasing key, in O(n).
    ///
    /// Fails with [`TreeError::InvalidInput`] if the iterator yields a different number of entries
    /// than it reports, and with [`TreeError::AllocationError`] if node storage cannot be reserved.
    pub(crate) fn from_sorted_iter<I>(mut entries: I) -> TreeResult<Self>
    where
        I: ExactSizeIterator<Item = (K, V)>,
    {
        let len = entries.len();
        let mut tree = Self {
            nodes: Arena::try_with_capacity(len)?,
            root: None,
            len: 0,
        };

        tree.root = tree.build(&mut entries, len)?;
        if entries.next().is_some() {
            return Err(TreeError::InvalidInput);
        }
        tree.len = len;

        debug_assert!(tree.is_valid(), "bulk load input must be sorted by key without duplicates");
        tracing::debug!(len, height = tree.height(tree.root), "bulk loaded tree");
        Ok(tree)
    }

    // Consumes `count` entries in order: left half, subtree root, right half.
    fn build<I>(&mut self, entries: &mut I, count: usize) -> TreeResult<Option<Handle>>
    where
        I: Iterator<Item = (K, V)>,
    {
        if count == 0 {
            return Ok(None);
        }

        let left_count = count / 2;
        let left = self.build(entries, left_count)?;
        let (key, value) = entries.next().ok_or(TreeError::InvalidInput)?;
        let right = self.build(entries, count - left_count - 1)?;

        let mut node = Node::leaf(key, value, D::ZERO);
        node.left = left;
        node.right = right;
        let handle = self.nodes.alloc(node)?;
        self.update(handle);
        Ok(Some(handle))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    /// Iterator that reports a length it does not deliver.
    struct Lying<I> {
        inner: I,
        claimed: usize,
    }

    impl<I: Iterator> Iterator for Lying<I> {
        type Item = I::Item;

        fn next(&mut self) -> Option<Self::Item> {
            self.inner.next()
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            (self.claimed, Some(self.claimed))
        }
    }

    impl<I: Iterator> ExactSizeIterator for Lying<I> {}

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree: RawAvlTree<i32, i32, i32> = RawAvlTree::from_sorted_iter(core::iter::empty()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.is_valid());
    }

    #[test]
    fn short_input_is_rejected() {
        let entries = Lying {
            inner: [(1, 1), (2, 2)].into_iter(),
            claimed: 3,
        };
        assert!(matches!(RawAvlTree::<i32, i32, i32>::from_sorted_iter(entries), Err(TreeError::InvalidInput)));
    }

    #[test]
    fn long_input_is_rejected() {
        let entries = Lying {
            inner: [(1, 1), (2, 2), (3, 3)].into_iter(),
            claimed: 2,
        };
        assert!(matches!(RawAvlTree::<i32, i32, i32>::from_sorted_iter(entries), Err(TreeError::InvalidInput)));
    }

    #[test]
    fn bulk_load_has_minimal_height() {
        let tree: RawAvlTree<u32, u32, u32> = RawAvlTree::from_sorted_iter((0..1023).map(|key| (key, key))).unwrap();
        assert!(tree.is_valid());
        assert_eq!(tree.height(tree.root), 10);

        let tree: RawAvlTree<u32, u32, u32> = RawAvlTree::from_sorted_iter((0..1024).map(|key| (key, key))).unwrap();
        assert!(tree.is_valid());
        assert_eq!(tree.height(tree.root), 11);
    }

    #[test]
    fn bulk_load_beyond_handle_space_is_rejected() {
        let entries = (0..Handle::MAX + 2).map(|key| (key, key));
        assert!(matches!(
            RawAvlTree::<usize, usize, i32>::from_sorted_iter(entries),
            Err(TreeError::AllocationError)
        ));

        let full: RawAvlTree<usize, usize, i32> =
            RawAvlTree::from_sorted_iter((0..Handle::MAX + 1).map(|key| (key, key))).unwrap();
        assert_eq!(full.len(), Handle::MAX + 1);
        assert!(full.is_valid());
    }

    proptest! {
        #[test]
        fn bulk_load_matches_incremental(keys in prop::collection::btree_set(any::<i32>(), 0..300)) {
            let entries: Vec<(i32, i32)> = keys.iter().map(|&key| (key, key.wrapping_mul(3))).collect();
            let mut bulk: RawAvlTree<i32, i32, i32> =
                RawAvlTree::from_sorted_iter(entries.clone().into_iter()).unwrap();
            let mut incremental: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
            for &(key, value) in &entries {
                incremental.insert(key, value).unwrap();
            }

            prop_assert!(bulk.is_valid());
            prop_assert_eq!(bulk.len(), entries.len());
            for (rank, &(key, value)) in entries.iter().enumerate() {
                let (handle, extra) = bulk.get_by_rank(rank).unwrap();
                prop_assert_eq!(bulk.entry(handle), (&key, &value));
                prop_assert_eq!(extra, 0);
            }

            // Both shapes answer extras identically.
            if let Some(&(pivot, _)) = entries.get(entries.len() / 3) {
                bulk.add_extra(&pivot, 7);
                incremental.add_extra(&pivot, 7);
                for &(key, _) in &entries {
                    prop_assert_eq!(bulk.path_extra(&key), incremental.path_extra(&key));
                }
            }
        }
    }
}
