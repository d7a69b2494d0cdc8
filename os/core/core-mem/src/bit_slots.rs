//! Fixed-capacity free/used tracking over `N` slots.
//!
//! Used for the translation-table pool and for the context-region catalog.
//! Allocation is first-fit: the lowest free index is always handed out, which
//! keeps allocation order deterministic.

/// Free/used state for `N` slots, one flag per slot.
///
/// The type does no locking; owners wrap it in a
/// [`SpinLock`](core_sync::SpinLock).
#[derive(Clone)]
pub struct BitSlots<const N: usize> {
    used: [bool; N],
    in_use: usize,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SlotError {
    #[error("all {0} slots are in use")]
    OutOfCapacity(usize),
    #[error("slot {index} is out of bounds (capacity {capacity})")]
    OutOfBounds { index: usize, capacity: usize },
    #[error("slot {0} is not allocated")]
    NotAllocated(usize),
    #[error("slot {0} is already in use")]
    AlreadyUsed(usize),
}

impl<const N: usize> Default for BitSlots<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BitSlots<N> {
    /// All slots free.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            used: [false; N],
            in_use: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of slots currently in use.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.in_use
    }

    #[inline]
    #[must_use]
    pub const fn available(&self) -> usize {
        N - self.in_use
    }

    /// Whether `index` is in use; out-of-bounds indices are never in use.
    #[inline]
    #[must_use]
    pub fn is_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    /// Take the lowest free slot.
    ///
    /// # Errors
    /// [`SlotError::OutOfCapacity`] if every slot is in use.
    pub fn allocate(&mut self) -> Result<usize, SlotError> {
        let index = self
            .used
            .iter()
            .position(|used| !used)
            .ok_or(SlotError::OutOfCapacity(N))?;
        self.used[index] = true;
        self.in_use += 1;
        Ok(index)
    }

    /// Take a specific slot.
    ///
    /// # Errors
    /// [`SlotError::OutOfBounds`] or [`SlotError::AlreadyUsed`].
    pub fn reserve(&mut self, index: usize) -> Result<(), SlotError> {
        let slot = self.slot_mut(index)?;
        if *slot {
            return Err(SlotError::AlreadyUsed(index));
        }
        *slot = true;
        self.in_use += 1;
        Ok(())
    }

    /// Return a slot obtained from [`allocate`](Self::allocate) or
    /// [`reserve`](Self::reserve).
    ///
    /// # Errors
    /// [`SlotError::OutOfBounds`], or [`SlotError::NotAllocated`] when the
    /// slot is already free (double release).
    pub fn release(&mut self, index: usize) -> Result<(), SlotError> {
        let slot = self.slot_mut(index)?;
        if !*slot {
            return Err(SlotError::NotAllocated(index));
        }
        *slot = false;
        self.in_use -= 1;
        Ok(())
    }

    /// Indices of all used slots, ascending.
    pub fn iter_used(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter_map(|(index, used)| used.then_some(index))
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut bool, SlotError> {
        self.used.get_mut(index).ok_or(SlotError::OutOfBounds {
            index,
            capacity: N,
        })
    }
}

impl<const N: usize> core::fmt::Debug for BitSlots<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BitSlots")
            .field("capacity", &N)
            .field("used", &self.in_use)
            .finish()
    }
}
