use core::borrow::Borrow;
use core::cmp::{Ordering, max};
use core::mem;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Direction, Node};
use crate::delta::Delta;
use crate::error::{TreeError, TreeResult};

/// The core AVL tree backing `AvlTree`.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K, V, D> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<K, V, D>>,
    /// Handle to the root node, if the tree is non-empty.
    pub(super) root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    pub(super) len: usize,
}

/// Path element for tracking traversal during mutations.
#[derive(Clone, Copy)]
pub(super) struct PathElement {
    /// Handle to the node at this level.
    pub(super) node: Handle,
    /// Child we descended into.
    pub(super) direction: Direction,
}

/// Stack of path elements from the root down. An AVL tree addressable by a `u32` handle is at most
/// 46 levels deep, so the path never spills.
pub(super) type Path = SmallVec<[PathElement; 64]>;

impl<K, V, D> RawAvlTree<K, V, D> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the key and stored value of a node.
    pub(crate) fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (&node.key, &node.value)
    }

    /// Returns the stored value of a node mutably.
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        &mut self.nodes.get_mut(handle).value
    }

    pub(super) fn height(&self, link: Option<Handle>) -> u8 {
        link.map_or(0, |handle| self.nodes.get(handle).height)
    }

    pub(super) fn subtree_size(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |handle| self.nodes.get(handle).size)
    }

    /// Recomputes the cached height and size of `handle` from its children.
    pub(super) fn update(&mut self, handle: Handle) {
        let (left, right) = {
            let node = self.nodes.get(handle);
            (node.left, node.right)
        };
        let height = 1 + max(self.height(left), self.height(right));
        let size = 1 + self.subtree_size(left) + self.subtree_size(right);
        let node = self.nodes.get_mut(handle);
        node.height = height;
        node.size = size;
    }

    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height(node.left)) - i16::from(self.height(node.right))
    }

    /// Points `parent` (or the root, for `None`) at `child`.
    pub(super) fn link(&mut self, parent: Option<PathElement>, child: Option<Handle>) {
        match parent {
            None => self.root = child,
            Some(parent) => self.nodes.get_mut(parent.node).set_child(parent.direction, child),
        }
    }
}

impl<K, V, D: Delta> RawAvlTree<K, V, D> {
    /// Rotates the subtree rooted at `handle` to the left and returns its new root.
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).right.expect("`RawAvlTree::rotate_left()` - node has no right child!");
        self.hand_off_extra(handle, pivot, Direction::Left);

        let inner = self.nodes.get(pivot).left;
        self.nodes.get_mut(handle).right = inner;
        self.nodes.get_mut(pivot).left = Some(handle);
        self.update(handle);
        self.update(pivot);

        tracing::trace!(?handle, ?pivot, "rotate_left");
        pivot
    }

    /// Rotates the subtree rooted at `handle` to the right and returns its new root.
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).left.expect("`RawAvlTree::rotate_right()` - node has no left child!");
        self.hand_off_extra(handle, pivot, Direction::Right);

        let inner = self.nodes.get(pivot).right;
        self.nodes.get_mut(handle).left = inner;
        self.nodes.get_mut(pivot).right = Some(handle);
        self.update(handle);
        self.update(pivot);

        tracing::trace!(?handle, ?pivot, "rotate_right");
        pivot
    }

    /// Refreshes `handle` and restores its balance with a single or double rotation.
    ///
    /// Returns the root of the subtree afterwards and whether a rotation happened.
    fn rebalance(&mut self, handle: Handle) -> (Handle, bool) {
        self.update(handle);
        let balance = self.balance_factor(handle);

        if balance > 1 {
            let left =
                self.nodes.get(handle).left.expect("`RawAvlTree::rebalance()` - left-heavy node has no left child!");
            // Left-right case.
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes.get_mut(handle).left = Some(left);
            }
            (self.rotate_right(handle), true)
        } else if balance < -1 {
            let right =
                self.nodes.get(handle).right.expect("`RawAvlTree::rebalance()` - right-heavy node has no right child!");
            // Right-left case.
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes.get_mut(handle).right = Some(right);
            }
            (self.rotate_left(handle), true)
        } else {
            (handle, false)
        }
    }

    /// Walks `path` bottom-up, refreshing heights and sizes and rotating where needed.
    ///
    /// Returns the number of nodes that had to be rebalanced.
    fn retrace(&mut self, path: &[PathElement]) -> usize {
        let mut rebalanced = 0;
        for depth in (0..path.len()).rev() {
            let (subtree, rotated) = self.rebalance(path[depth].node);
            if rotated {
                rebalanced += 1;
                let parent = depth.checked_sub(1).map(|above| path[above]);
                self.link(parent, Some(subtree));
            }
        }
        rebalanced
    }

    /// Moves the in-order successor's entry into `target` and frees the successor's node.
    ///
    /// `target` must have both children. Extends `path` down to the successor's parent and
    /// returns `target`'s former entry.
    fn replace_with_successor(
        &mut self,
        target: Handle,
        left: Handle,
        right: Handle,
        target_extra: D,
        path: &mut Path,
    ) -> (K, V) {
        // Extra that applies to `target` from above, excluding its own.
        let mut successor_extra = target_extra.difference(self.nodes.get(target).extra);
        path.push(PathElement {
            node: target,
            direction: Direction::Right,
        });

        let mut successor = right;
        loop {
            let node = self.nodes.get(successor);
            successor_extra = successor_extra.combine(node.extra);
            match node.left {
                Some(next) => {
                    path.push(PathElement {
                        node: successor,
                        direction: Direction::Left,
                    });
                    successor = next;
                }
                None => break,
            }
        }

        let inner = self.nodes.get(successor).right;
        self.link(path.last().copied(), inner);
        let Node { key, value, .. } = self.nodes.take(successor);

        // The successor's entry keeps its effective extra in the new slot; the left subtree keeps its own.
        let shift = successor_extra.difference(target_extra);
        let node = self.nodes.get_mut(target);
        node.extra = node.extra.combine(shift);
        let removed = (mem::replace(&mut node.key, key), mem::replace(&mut node.value, value));
        self.shift_right_spine(Some(left), shift.negate());

        removed
    }

    /// Returns the leftmost node and its effective extra.
    pub(crate) fn first(&self) -> Option<(Handle, D)> {
        let mut handle = self.root?;
        let mut effective = self.nodes.get(handle).extra;
        while let Some(left) = self.nodes.get(handle).left {
            handle = left;
            effective = effective.combine(self.nodes.get(left).extra);
        }
        Some((handle, effective))
    }

    /// Returns the rightmost node and its effective extra.
    pub(crate) fn last(&self) -> Option<(Handle, D)> {
        let mut handle = self.root?;
        while let Some(right) = self.nodes.get(handle).right {
            handle = right;
        }
        // Every step went right, so only the node's own extra applies.
        Some((handle, self.nodes.get(handle).extra))
    }

    /// Gets a node by its rank (0-indexed position in sorted order) along with its effective extra.
    pub(crate) fn get_by_rank(&self, rank: usize) -> Option<(Handle, D)> {
        if rank >= self.len {
            return None;
        }

        let mut current = self.root;
        let mut remaining = rank;
        let mut effective = D::ZERO;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let left_size = self.subtree_size(node.left);
            match remaining.cmp(&left_size) {
                Ordering::Less => {
                    effective = effective.combine(node.extra);
                    current = node.left;
                }
                Ordering::Equal => return Some((handle, effective.combine(node.extra))),
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    current = node.right;
                }
            }
        }
        None
    }

    /// Visits every entry in ascending key order together with its effective extra.
    ///
    /// Stops at the first error returned by `f`.
    pub(crate) fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&K, &V, D) -> Result<(), E>,
    {
        self.walk(self.root, D::ZERO, &mut f)
    }

    fn walk<E, F>(&self, link: Option<Handle>, inherited: D, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&K, &V, D) -> Result<(), E>,
    {
        let Some(handle) = link else {
            return Ok(());
        };
        let node = self.nodes.get(handle);
        let covered = inherited.combine(node.extra);
        self.walk(node.left, covered, f)?;
        f(&node.key, &node.value, covered)?;
        self.walk(node.right, inherited, f)
    }
}

impl<K: Ord, V, D: Delta> RawAvlTree<K, V, D> {
    /// Searches for a key and returns its node along with its effective extra.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, D)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut effective = D::ZERO;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    effective = effective.combine(node.extra);
                    current = node.left;
                }
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some((handle, effective.combine(node.extra))),
            }
        }
        None
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// Fails without touching the tree if the key is already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> TreeResult<()> {
        let mut path: Path = SmallVec::new();
        let mut inherited = D::ZERO;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let direction = match key.cmp(&node.key) {
                Ordering::Less => {
                    inherited = inherited.combine(node.extra);
                    Direction::Left
                }
                Ordering::Greater => Direction::Right,
                Ordering::Equal => return Err(TreeError::DuplicateKey),
            };
            path.push(PathElement { node: handle, direction });
            current = node.child(direction);
        }

        // A new key starts without any of the extras recorded before it existed.
        let leaf = self.nodes.alloc(Node::leaf(key, value, inherited.negate()))?;
        self.link(path.last().copied(), Some(leaf));
        self.len += 1;

        let rebalanced = self.retrace(&path);
        debug_assert!(rebalanced <= 1, "insert: {rebalanced} nodes rebalanced, expected at most one");
        Ok(())
    }

    /// Removes a key from the tree, returning the stored key and value.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> TreeResult<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path: Path = SmallVec::new();
        let mut effective = D::ZERO;
        let mut current = self.root;

        let target = loop {
            let handle = current.ok_or(TreeError::NotFound)?;
            let node = self.nodes.get(handle);
            let direction = match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    effective = effective.combine(node.extra);
                    Direction::Left
                }
                Ordering::Greater => Direction::Right,
                Ordering::Equal => {
                    effective = effective.combine(node.extra);
                    break handle;
                }
            };
            path.push(PathElement { node: handle, direction });
            current = node.child(direction);
        };

        // Freeing the node must not be the step that fails.
        self.nodes.reserve_free()?;

        let (left, right) = {
            let node = self.nodes.get(target);
            (node.left, node.right)
        };
        let removed = if let (Some(left), Some(right)) = (left, right) {
            self.replace_with_successor(target, left, right, effective, &mut path)
        } else {
            let node = self.nodes.take(target);
            // A left child leaves the removed node's coverage.
            self.shift_right_spine(node.left, node.extra);
            self.link(path.last().copied(), left.or(right));
            (node.key, node.value)
        };
        self.len -= 1;

        self.retrace(&path);
        Ok(removed)
    }

    /// Returns the rank (0-indexed position) of a key.
    pub(crate) fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut rank = 0;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => {
                    rank += self.subtree_size(node.left) + 1;
                    current = node.right;
                }
                Ordering::Equal => return Some(rank + self.subtree_size(node.left)),
            }
        }
        None
    }

    /// Checks every structural invariant: cached heights and sizes, AVL balance at every node,
    /// strictly increasing in-order keys, and the element count.
    pub(crate) fn is_valid(&self) -> bool {
        match self.check_subtree(self.root, None, None) {
            Some((_, size)) => size == self.len && self.nodes.len() == self.len,
            None => false,
        }
    }

    // Returns the verified (height, size) of the subtree, or `None` on the first violation.
    fn check_subtree<'a>(
        &'a self,
        link: Option<Handle>,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
    ) -> Option<(u8, usize)> {
        let Some(handle) = link else {
            return Some((0, 0));
        };
        let node = self.nodes.get(handle);
        if lower.is_some_and(|lower| *lower >= node.key) || upper.is_some_and(|upper| *upper <= node.key) {
            return None;
        }

        let (left_height, left_size) = self.check_subtree(node.left, lower, Some(&node.key))?;
        let (right_height, right_size) = self.check_subtree(node.right, Some(&node.key), upper)?;
        let height = 1 + max(left_height, right_height);
        let size = 1 + left_size + right_size;

        let balanced = left_height.abs_diff(right_height) <= 1;
        (balanced && node.height == height && node.size == size).then_some((height, size))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord + Clone, V: Clone, D: Delta> RawAvlTree<K, V, D> {
        fn entries(&self) -> Vec<(K, V, D)> {
            let mut entries = Vec::new();
            let _ = self.try_for_each(|key, value, extra| {
                entries.push((key.clone(), value.clone(), extra));
                Ok::<(), ()>(())
            });
            entries
        }
    }

    fn ascending(count: i32) -> RawAvlTree<i32, i32, i32> {
        let mut tree = RawAvlTree::new();
        for key in 0..count {
            tree.insert(key, key * 10).unwrap();
        }
        tree
    }

    #[test]
    fn empty_tree() {
        let tree: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
        assert!(tree.is_valid());
        assert!(tree.is_empty());
        assert!(tree.first().is_none());
        assert!(tree.last().is_none());
        assert!(tree.search(&0).is_none());
        assert!(tree.get_by_rank(0).is_none());
        assert_eq!(tree.rank_of(&0), None);
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let tree = ascending(1000);
        assert!(tree.is_valid());
        assert_eq!(tree.len(), 1000);
        // A perfectly balanced tree of 1000 nodes has height 10; AVL allows at most 1.44 log2(n).
        assert!(tree.height(tree.root) <= 14);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = ascending(10);
        assert_eq!(tree.insert(4, 99), Err(TreeError::DuplicateKey));
        assert_eq!(tree.len(), 10);
        let (handle, _) = tree.search(&4).unwrap();
        assert_eq!(tree.entry(handle), (&4, &40));
        assert!(tree.is_valid());
    }

    #[test]
    fn remove_missing_key() {
        let mut tree = ascending(10);
        assert_eq!(tree.remove(&42), Err(TreeError::NotFound));
        assert_eq!(tree.len(), 10);
        assert!(tree.is_valid());
    }

    #[test]
    fn remove_every_shape() {
        let mut tree = ascending(31);
        // Root with two children, then inner nodes, then leaves.
        let root_key = *tree.entry(tree.root.unwrap()).0;
        assert_eq!(tree.remove(&root_key), Ok((root_key, root_key * 10)));
        assert!(tree.is_valid());
        for key in (0..31).filter(|key| *key != root_key) {
            assert_eq!(tree.remove(&key), Ok((key, key * 10)));
            assert!(tree.is_valid());
            assert!(tree.search(&key).is_none());
        }
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
    }

    #[test]
    fn rotations_preserve_extras() {
        // 2 <- 1 <- 0 forces a right rotation on the third insert.
        let mut tree: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
        tree.insert(2, 0).unwrap();
        tree.add_extra(&2, 5);
        tree.insert(1, 0).unwrap();
        tree.add_extra(&1, 7);
        tree.insert(0, 0).unwrap();
        assert!(tree.is_valid());
        assert_eq!(tree.search(&0).map(|(_, extra)| extra), Some(0));
        assert_eq!(tree.search(&1).map(|(_, extra)| extra), Some(7));
        assert_eq!(tree.search(&2).map(|(_, extra)| extra), Some(5));

        // 0 -> 1 -> 2 forces a left rotation.
        let mut tree: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
        tree.insert(0, 0).unwrap();
        tree.add_extra(&0, 3);
        tree.insert(1, 0).unwrap();
        tree.add_extra(&1, 4);
        tree.insert(2, 0).unwrap();
        assert!(tree.is_valid());
        assert_eq!(tree.search(&0).map(|(_, extra)| extra), Some(7));
        assert_eq!(tree.search(&1).map(|(_, extra)| extra), Some(4));
        assert_eq!(tree.search(&2).map(|(_, extra)| extra), Some(0));
    }

    #[test]
    fn double_rotations_preserve_extras() {
        // 2, 0, 1 is the left-right case.
        let mut tree: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
        tree.insert(2, 0).unwrap();
        tree.insert(0, 0).unwrap();
        tree.add_extra(&2, 1);
        tree.add_extra(&0, 10);
        tree.insert(1, 0).unwrap();
        assert!(tree.is_valid());
        let extras: Vec<i32> = tree.entries().into_iter().map(|(_, _, extra)| extra).collect();
        assert_eq!(extras, [11, 0, 1]);

        // 0, 2, 1 is the right-left case.
        let mut tree: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
        tree.insert(0, 0).unwrap();
        tree.insert(2, 0).unwrap();
        tree.add_extra(&2, 1);
        tree.add_extra(&0, 10);
        tree.insert(1, 0).unwrap();
        assert!(tree.is_valid());
        let extras: Vec<i32> = tree.entries().into_iter().map(|(_, _, extra)| extra).collect();
        assert_eq!(extras, [11, 0, 1]);
    }

    #[test]
    fn two_child_removal_preserves_extras() {
        let mut tree = ascending(15);
        tree.add_extra(&7, 100);
        tree.add_extra(&3, 10);
        tree.add_extra(&11, 1);
        let expected = |key: i32| {
            let mut extra = 0;
            if key <= 7 {
                extra += 100;
            }
            if key <= 3 {
                extra += 10;
            }
            if key <= 11 {
                extra += 1;
            }
            extra
        };

        for removed in [7, 3, 11, 8, 0] {
            tree.remove(&removed).unwrap();
            assert!(tree.is_valid());
            for (key, _, extra) in tree.entries() {
                assert_eq!(extra, expected(key), "extra of {key} after removing {removed}");
            }
        }
    }

    #[test]
    fn first_last_and_ranks() {
        let mut tree = ascending(20);
        tree.add_extra(&9, 2);
        assert_eq!(tree.first().map(|(h, extra)| (*tree.entry(h).0, extra)), Some((0, 2)));
        assert_eq!(tree.last().map(|(h, extra)| (*tree.entry(h).0, extra)), Some((19, 0)));
        for rank in 0..20 {
            let (handle, extra) = tree.get_by_rank(rank).unwrap();
            let key = *tree.entry(handle).0;
            assert_eq!(key, rank as i32);
            assert_eq!(extra, if key <= 9 { 2 } else { 0 });
            assert_eq!(tree.rank_of(&key), Some(rank));
        }
        assert!(tree.get_by_rank(20).is_none());
    }

    #[test]
    fn clear_resets_tree() {
        let mut tree = ascending(50);
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.is_valid());
        tree.insert(1, 1).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_valid());
    }

    #[test]
    fn exhausted_handle_space_leaves_tree_intact() {
        // Even keys fill every handle; odd keys are free to insert.
        let mut tree: RawAvlTree<usize, usize, i32> =
            RawAvlTree::from_sorted_iter((0..Handle::MAX + 1).map(|index| (index * 2, index * 2))).unwrap();
        tree.add_extra(&100, 3);
        tree.add_extra(&5000, -1);
        let before = tree.entries();

        assert_eq!(tree.insert(1, 1), Err(TreeError::AllocationError));
        assert_eq!(tree.len(), Handle::MAX + 1);
        assert!(tree.is_valid());
        assert!(tree.search(&1).is_none());
        assert_eq!(tree.entries(), before);
        assert_eq!(tree.path_extra(&100), Some(2));
        assert_eq!(tree.path_extra(&102), Some(-1));
        assert_eq!(tree.path_extra(&5002), Some(0));

        // Removing a key frees a slot for the next insert.
        assert_eq!(tree.remove(&100), Ok((100, 100)));
        assert_eq!(tree.insert(1, 1), Ok(()));
        assert_eq!(tree.len(), Handle::MAX + 1);
        assert!(tree.is_valid());
        assert_eq!(tree.path_extra(&1), Some(0));
        assert_eq!(tree.path_extra(&0), Some(2));
        assert_eq!(tree.path_extra(&102), Some(-1));
        assert_eq!(tree.insert(3, 3), Err(TreeError::AllocationError));
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32, i32),
        Remove(i32),
        AddExtra(i32, i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..500, -1000i32..1000).prop_map(|(key, value)| Op::Insert(key, value)),
            3 => (0i32..500).prop_map(Op::Remove),
            2 => (-10i32..510, -50i32..50).prop_map(|(pivot, delta)| Op::AddExtra(pivot, delta)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_matches_model_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawAvlTree<i32, i32, i32> = RawAvlTree::new();
            // key -> (value, extra)
            let mut model: BTreeMap<i32, (i32, i32)> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key, value) => {
                        let expected = if model.contains_key(&key) {
                            Err(TreeError::DuplicateKey)
                        } else {
                            model.insert(key, (value, 0));
                            Ok(())
                        };
                        prop_assert_eq!(tree.insert(key, value), expected);
                    }
                    Op::Remove(key) => {
                        let expected = model.remove(&key).map(|(value, _)| (key, value)).ok_or(TreeError::NotFound);
                        prop_assert_eq!(tree.remove(&key), expected);
                    }
                    Op::AddExtra(pivot, delta) => {
                        tree.add_extra(&pivot, delta);
                        for (_, (_, extra)) in model.range_mut(..=pivot) {
                            *extra += delta;
                        }
                    }
                }

                prop_assert!(tree.is_valid());
                prop_assert_eq!(tree.len(), model.len());
            }

            let expected: Vec<(i32, i32, i32)> =
                model.iter().map(|(&key, &(value, extra))| (key, value, extra)).collect();
            prop_assert_eq!(tree.entries(), expected);
            for (rank, (&key, &(_, extra))) in model.iter().enumerate() {
                let (handle, found) = tree.search(&key).unwrap();
                prop_assert_eq!(found, extra);
                prop_assert_eq!(tree.entry(handle).0, &key);
                prop_assert_eq!(tree.rank_of(&key), Some(rank));
                prop_assert_eq!(tree.get_by_rank(rank).map(|(_, extra)| extra), Some(extra));
            }
        }
    }
}
