mod arena;
mod bulk;
mod extra;
mod handle;
mod node;
mod raw_avl_tree;

pub(crate) use raw_avl_tree::RawAvlTree;
