use alloc::vec::Vec;

use super::handle::Handle;
use crate::error::{TreeError, TreeResult};

#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Creates an arena with room for `capacity` elements, reporting allocation failure instead of aborting.
    pub(crate) fn try_with_capacity(capacity: usize) -> TreeResult<Self> {
        if capacity > Handle::MAX + 1 {
            return Err(TreeError::AllocationError);
        }
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|_| TreeError::AllocationError)?;
        Ok(Self {
            slots,
            free: Vec::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `element` and returns its handle.
    ///
    /// Fails with [`TreeError::AllocationError`] when the handle space is exhausted or the
    /// backing storage cannot grow; the arena is unchanged in that case.
    pub(crate) fn alloc(&mut self, element: T) -> TreeResult<Handle> {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            return Ok(h);
        }
        // Indices run 0..=Handle::MAX.
        if self.slots.len() > Handle::MAX {
            return Err(TreeError::AllocationError);
        }
        self.slots.try_reserve(1).map_err(|_| TreeError::AllocationError)?;
        self.slots.push(Some(element));
        Ok(Handle::from_index(self.slots.len() - 1))
    }

    /// Makes sure the next [`take`](Self::take) cannot fail to record the freed slot.
    pub(crate) fn reserve_free(&mut self) -> TreeResult<()> {
        self.free.try_reserve(1).map_err(|_| TreeError::AllocationError)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
