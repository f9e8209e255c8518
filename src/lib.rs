//! AVL tree with order statistics, linear bulk loading and lazy range extras.
//!
//! This crate provides [`AvlTree`], an ordered map that supports, besides the usual
//! insert/remove/lookup:
//!
//! - [`add_extra`](AvlTree::add_extra) - Add a delta to every key `<=` a pivot in O(log n)
//! - [`get_path_extra`](AvlTree::get_path_extra) - Read the sum of the deltas that apply to a key
//! - [`get_min`](AvlTree::get_min) / [`get_max`](AvlTree::get_max) - O(log n) extremes
//! - [`get_by_rank`](AvlTree::get_by_rank) / [`rank_of`](AvlTree::rank_of) - O(log n) rank queries
//! - [`from_sorted`](AvlTree::from_sorted) - O(n) construction from sorted input
//!
//! # Example
//!
//! ```
//! use lazy_avl::{AvlTree, TreeError};
//!
//! let keys = vec![0, 1, 2, 4, 5, 6, 7, 8, 10, 11, 30];
//! let values = vec![5, 70, 70, 70, 70, 70, 70, 70, 50, 30, 13];
//! let mut tree: AvlTree<i32, i32> = AvlTree::from_sorted(keys, values)?;
//!
//! tree.add_extra(&8, 4);
//! tree.add_extra(&4, -3);
//! assert_eq!(tree.get_path_extra(&2)?, 1);
//! assert_eq!(tree.get_path_extra(&6)?, 4);
//! assert_eq!(tree.get_path_extra(&10)?, 0);
//! assert_eq!(tree.find(&0)?, 6);
//!
//! assert_eq!(tree.insert(3, 3), Ok(()));
//! assert_eq!(tree.get_path_extra(&3)?, 0);
//! assert_eq!(tree.insert(3, 9), Err(TreeError::DuplicateKey));
//! # Ok::<(), TreeError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Fallible allocation** - Running out of memory is reported as [`TreeError::AllocationError`]
//!   and leaves the tree untouched
//! - **Arena storage** - Nodes live in one contiguous arena and refer to each other by index
//!
//! # Implementation
//!
//! Every node carries a pending delta that applies to the node itself and to its whole left
//! subtree. [`add_extra`](AvlTree::add_extra) records the delta on the O(log n) nodes where the
//! search for the pivot turns right (and on the pivot itself); a read sums the deltas on the
//! nodes where its own search turns left. Rotations and removals move the pending deltas so
//! that this sum is unchanged for every key.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod delta;
mod error;
mod raw;

pub mod avl_tree;

pub use avl_tree::AvlTree;
pub use delta::Delta;
pub use error::{Status, TreeError, TreeResult};
