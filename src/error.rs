use core::fmt;

/// The ways an [`AvlTree`](crate::AvlTree) operation can fail.
///
/// A failed operation never leaves a partial mutation behind: the tree is in
/// the same state it was in before the call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum TreeError {
    /// `insert` was given a key that is already present.
    #[error("key is already present in the tree")]
    DuplicateKey,
    /// The requested key (or rank) is not present.
    #[error("key is not present in the tree")]
    NotFound,
    /// `get_min` / `get_max` on a tree with no elements.
    #[error("tree is empty")]
    EmptyTree,
    /// Malformed bulk-load arguments, e.g. key and value arrays of different lengths.
    #[error("invalid input")]
    InvalidInput,
    /// Node storage could not be grown.
    #[error("allocation failed")]
    AllocationError,
}

/// Result type returned by every fallible tree operation.
pub type TreeResult<T> = Result<T, TreeError>;

impl TreeError {
    /// Maps this error onto the coarse [`Status`] protocol.
    #[must_use]
    pub const fn status(self) -> Status {
        match self {
            TreeError::DuplicateKey | TreeError::NotFound | TreeError::EmptyTree => Status::Failure,
            TreeError::InvalidInput => Status::InvalidInput,
            TreeError::AllocationError => Status::AllocationError,
        }
    }
}

/// Coarse status code for collaborators that only distinguish success from
/// the broad failure classes.
///
/// # Examples
///
/// ```
/// use lazy_avl::{AvlTree, Status};
///
/// let mut tree: AvlTree<i32, i32> = AvlTree::new();
/// assert_eq!(Status::from(&tree.insert(1, 10)), Status::Success);
/// assert_eq!(Status::from(&tree.insert(1, 20)), Status::Failure);
/// assert_eq!(Status::Failure.to_string(), "Failure");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// The operation completed.
    Success,
    /// A duplicate key, a missing key or an empty tree.
    Failure,
    /// The arguments were malformed.
    InvalidInput,
    /// Node storage could not be grown.
    AllocationError,
}

impl Status {
    /// Returns the human readable name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Failure => "Failure",
            Status::InvalidInput => "Invalid Input",
            Status::AllocationError => "Allocation Error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TreeError> for Status {
    fn from(error: TreeError) -> Self {
        error.status()
    }
}

impl<T> From<&TreeResult<T>> for Status {
    fn from(result: &TreeResult<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(error) => error.status(),
        }
    }
}
