use super::handle::Handle;

/// Which child a descent moved into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Left,
    Right,
}

/// A single AVL node.
///
/// `extra` is a pending delta that applies to this node and to every node of
/// its left subtree, but to nothing in its right subtree.
#[derive(Clone)]
pub(crate) struct Node<K, V, D> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) extra: D,
    // Height of the subtree rooted here; a leaf has height 1.
    pub(crate) height: u8,
    // Number of nodes in the subtree rooted here.
    pub(crate) size: usize,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
}

impl<K, V, D> Node<K, V, D> {
    /// Creates a detached leaf.
    pub(crate) const fn leaf(key: K, value: V, extra: D) -> Self {
        Self {
            key,
            value,
            extra,
            height: 1,
            size: 1,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, direction: Direction) -> Option<Handle> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, direction: Direction, child: Option<Handle>) {
        match direction {
            Direction::Left => self.left = child,
            Direction::Right => self.right = child,
        }
    }
}
