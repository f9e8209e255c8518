//! Lazy range extras.
//!
//! A node's `extra` applies to the node and to its whole left subtree. The
//! effective extra of a key is therefore the sum of the extras on the search
//! path at every node where the search turned left, plus the node's own.
//! Every structural change below moves extras so that sum stays the same for
//! every key.

use core::borrow::Borrow;
use core::cmp::Ordering;

use super::handle::Handle;
use super::node::Direction;
use super::raw_avl_tree::RawAvlTree;
use crate::delta::Delta;

impl<K, V, D: Delta> RawAvlTree<K, V, D> {
    /// Adjusts extras between a node and the child it is about to be rotated with.
    ///
    /// Must run before the rotation re-links anything. `rotation` names the rotation about to
    /// happen at `upper`; `lower` is the child moving up.
    pub(super) fn hand_off_extra(&mut self, upper: Handle, lower: Handle, rotation: Direction) {
        match rotation {
            // `lower` and its left subtree leave `upper`'s left subtree.
            Direction::Right => {
                let extra = self.nodes.get(upper).extra;
                let node = self.nodes.get_mut(lower);
                node.extra = node.extra.combine(extra);
            }
            // `upper` and its left subtree join `lower`'s left subtree.
            Direction::Left => {
                let extra = self.nodes.get(lower).extra;
                let node = self.nodes.get_mut(upper);
                node.extra = node.extra.difference(extra);
            }
        }
    }

    /// Adds `amount` to every key of the subtree at `start`.
    ///
    /// Walks the right spine only: each spine node's extra covers itself and its left subtree.
    pub(super) fn shift_right_spine(&mut self, start: Option<Handle>, amount: D) {
        let mut current = start;
        while let Some(handle) = current {
            let node = self.nodes.get_mut(handle);
            node.extra = node.extra.combine(amount);
            current = node.right;
        }
    }
}

impl<K: Ord, V, D: Delta> RawAvlTree<K, V, D> {
    /// Adds `delta` to the effective extra of every key `<= pivot` currently in the tree.
    pub(crate) fn add_extra<Q>(&mut self, pivot: &Q, delta: D)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut touched: usize = 0;

        while let Some(handle) = current {
            let node = self.nodes.get_mut(handle);
            let ordering = pivot.cmp(node.key.borrow());
            if ordering == Ordering::Less {
                current = node.left;
                continue;
            }

            // The node and its left subtree are all <= pivot.
            node.extra = node.extra.combine(delta);
            touched += 1;
            current = if ordering == Ordering::Equal { None } else { node.right };
        }

        tracing::trace!(touched, "add_extra");
    }

    /// Returns the effective extra of `key`, or `None` if it is absent.
    pub(crate) fn path_extra<Q>(&self, key: &Q) -> Option<D>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|(_, extra)| extra)
    }
}
