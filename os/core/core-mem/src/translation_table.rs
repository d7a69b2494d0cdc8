//! Translation-table allocation from a fixed, page-aligned pool.
//!
//! Core builds its page tables before any general-purpose allocator exists,
//! so every table comes out of a [`TablePool`] reserved at build time. The
//! [`TableAllocator`] hands tables out one at a time, remembers which ones
//! are taken in a [`BitSlots`] tracker and translates between the virtual
//! address core uses to write a table and the physical address the MMU
//! needs in the next-higher table entry.
//!
//! ```rust
//! use core_mem::translation_table::{TableAllocator, TablePool};
//!
//! static POOL: TablePool<4> = TablePool::new();
//!
//! let tables = TableAllocator::new(&POOL).unwrap();
//! assert!(TableAllocator::new(&POOL).is_err());
//! let root = tables.alloc_table().unwrap();
//! assert_eq!(root.index(), 0);
//! assert_eq!(tables.phys_addr(root.virt()).unwrap(), root.phys());
//! tables.free_table(root).unwrap();
//! ```

mod pool;

pub use pool::{TABLE_SIZE, Table, TablePool};

use crate::allocator::{Allocator, CoreMemAlloc, TranslationTableAllocator};
use crate::bit_slots::{BitSlots, SlotError};
use core::ptr::NonNull;
use core_addresses::{
    AddressWindow, PhysicalAddress, Size4K, TranslateError, VirtualAddress,
};
use core_sync::SpinLock;
use log::{error, trace};

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("translation table pool exhausted ({0} tables)")]
    OutOfTables(usize),
    #[error("{0} does not point into the translation table pool")]
    ForeignAddress(VirtualAddress),
    #[error("{0} is not the start of a translation table")]
    Misaligned(VirtualAddress),
    #[error("translation table {0} is not allocated")]
    NotAllocated(usize),
    #[error("core memory has no physical address for the table pool at {0}")]
    NoPhysicalAddress(VirtualAddress),
    #[error("translation table pool at {0} is already administered by another allocator")]
    PoolClaimed(VirtualAddress),
}

/// One allocated translation table.
///
/// Not `Clone`: returning the handle to [`TableAllocator::free_table`]
/// consumes it.
#[derive(Debug, Eq, PartialEq)]
pub struct TableHandle {
    index: usize,
    virt: VirtualAddress,
    phys: PhysicalAddress,
    ptr: NonNull<u8>,
}

impl TableHandle {
    /// Position of the table inside the pool.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Address core writes the table through.
    #[inline]
    #[must_use]
    pub const fn virt(&self) -> VirtualAddress {
        self.virt
    }

    /// Address that goes into the next-higher table entry.
    #[inline]
    #[must_use]
    pub const fn phys(&self) -> PhysicalAddress {
        self.phys
    }

    /// Pointer to the table's [`TABLE_SIZE`] bytes.
    ///
    /// The memory is not zeroed on allocation; it holds whatever the previous
    /// owner left behind.
    #[inline]
    #[must_use]
    pub const fn as_mut_ptr(&self) -> NonNull<u8> {
        self.ptr
    }
}

// Safety: a handle is the exclusive token for its table.
unsafe impl Send for TableHandle {}

/// Hands out the tables of one [`TablePool`].
///
/// A pool is claimed by the first allocator built over it and can never be
/// administered by a second one. All bookkeeping sits behind a single spin
/// lock, so an allocator can be shared between threads by reference.
pub struct TableAllocator<'p, const TABLES: usize> {
    pool: &'p TablePool<TABLES>,
    slots: SpinLock<BitSlots<TABLES>>,
    window: AddressWindow,
}

impl<'p, const TABLES: usize> TableAllocator<'p, TABLES> {
    /// Administer `pool`, assuming core runs identity-mapped.
    ///
    /// # Errors
    /// [`TableError::PoolClaimed`] if another allocator already administers
    /// `pool`.
    pub fn new(pool: &'p TablePool<TABLES>) -> Result<Self, TableError> {
        let base = pool.base();
        Self::with_window(pool, AddressWindow::identity(base, TablePool::<TABLES>::BYTES))
    }

    /// Administer `pool`, which lives physically at `phys_base`.
    ///
    /// # Errors
    /// * [`TableError::NoPhysicalAddress`] if the pool would extend past the
    ///   end of the physical address space.
    /// * [`TableError::PoolClaimed`] if another allocator already administers
    ///   `pool`.
    pub fn with_phys_base(
        pool: &'p TablePool<TABLES>,
        phys_base: PhysicalAddress,
    ) -> Result<Self, TableError> {
        let window = AddressWindow::new(phys_base, pool.base(), TablePool::<TABLES>::BYTES);
        Self::with_window(pool, window)
    }

    /// Administer `pool`, asking core's memory allocator where it lives
    /// physically.
    ///
    /// # Errors
    /// [`TableError::NoPhysicalAddress`] if `cma` does not know the pool, and
    /// everything [`with_phys_base`](Self::with_phys_base) reports.
    pub fn with_core_mem(
        pool: &'p TablePool<TABLES>,
        cma: &impl CoreMemAlloc,
    ) -> Result<Self, TableError> {
        let base = pool.base();
        let phys = cma
            .phys_addr(base)
            .ok_or(TableError::NoPhysicalAddress(base))?;
        Self::with_phys_base(pool, phys)
    }

    fn with_window(pool: &'p TablePool<TABLES>, window: AddressWindow) -> Result<Self, TableError> {
        let base = pool.base();
        if TABLES > 0 && window.to_phys(base + (TablePool::<TABLES>::BYTES - 1)).is_err() {
            return Err(TableError::NoPhysicalAddress(base));
        }
        if !pool.claim() {
            error!("table pool: {base} already has an allocator");
            return Err(TableError::PoolClaimed(base));
        }
        trace!(
            "table pool: {TABLES} tables at {} (phys {})",
            window.virt_base(),
            window.phys_base()
        );
        Ok(Self {
            pool,
            slots: SpinLock::new(BitSlots::new()),
            window,
        })
    }

    /// Take the lowest-indexed free table.
    ///
    /// # Errors
    /// [`TableError::OutOfTables`] when every table is in use.
    pub fn alloc_table(&self) -> Result<TableHandle, TableError> {
        let index = self
            .slots
            .with_lock(BitSlots::allocate)
            .map_err(|_| TableError::OutOfTables(TABLES))?;
        trace!("table pool: allocated table {index}");
        Ok(self.handle(index))
    }

    /// Return a table.
    ///
    /// # Errors
    /// [`TableError::NotAllocated`] if the handle does not belong to this
    /// allocator's live tables.
    pub fn free_table(&self, table: TableHandle) -> Result<(), TableError> {
        self.free_addr(table.virt)
    }

    /// Return the table starting at `virt`.
    ///
    /// # Errors
    /// * [`TableError::ForeignAddress`] if `virt` is outside the pool.
    /// * [`TableError::Misaligned`] if `virt` is inside a table.
    /// * [`TableError::NotAllocated`] on a double free.
    pub fn free_addr(&self, virt: VirtualAddress) -> Result<(), TableError> {
        let index = self.index_of(virt)?;
        self.slots
            .with_lock(|slots| slots.release(index))
            .map_err(|e| match e {
                SlotError::NotAllocated(i) => TableError::NotAllocated(i),
                _ => TableError::ForeignAddress(virt),
            })?;
        trace!("table pool: released table {index}");
        Ok(())
    }

    /// # Errors
    /// [`TranslateError::VirtualOutOfRange`] outside the pool.
    #[inline]
    pub fn phys_addr(&self, virt: VirtualAddress) -> Result<PhysicalAddress, TranslateError> {
        self.window.to_phys(virt)
    }

    /// # Errors
    /// [`TranslateError::PhysicalOutOfRange`] outside the pool.
    #[inline]
    pub fn virt_addr(&self, phys: PhysicalAddress) -> Result<VirtualAddress, TranslateError> {
        self.window.to_virt(phys)
    }

    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &'p TablePool<TABLES> {
        self.pool
    }

    /// The pool's physical/virtual placement.
    #[inline]
    #[must_use]
    pub const fn window(&self) -> AddressWindow {
        self.window
    }

    #[must_use]
    pub fn tables_in_use(&self) -> usize {
        self.slots.with_lock(|slots| slots.used())
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        TABLES
    }

    fn handle(&self, index: usize) -> TableHandle {
        let ptr = self.pool.table_ptr(index);
        let virt = VirtualAddress::from_nonnull(ptr);
        let offset = virt.as_u64() - self.window.virt_base().as_u64();
        TableHandle {
            index,
            virt,
            phys: self.window.phys_base() + offset,
            ptr,
        }
    }

    fn index_of(&self, virt: VirtualAddress) -> Result<usize, TableError> {
        let offset = virt
            .checked_offset_from(self.window.virt_base())
            .filter(|off| *off < self.window.len())
            .ok_or(TableError::ForeignAddress(virt))?;
        if !virt.is_aligned::<Size4K>() {
            return Err(TableError::Misaligned(virt));
        }
        #[allow(clippy::cast_possible_truncation)]
        let index = (offset / TABLE_SIZE as u64) as usize;
        Ok(index)
    }
}

impl<const TABLES: usize> Allocator for TableAllocator<'_, TABLES> {
    fn alloc(&self, size: usize) -> Option<NonNull<u8>> {
        if size > TABLE_SIZE {
            error!("table pool: cannot allocate {size} bytes, tables are {TABLE_SIZE} bytes");
            return None;
        }
        match self.alloc_table() {
            Ok(table) => Some(table.as_mut_ptr()),
            Err(e) => {
                error!("table pool: {e}");
                None
            }
        }
    }

    fn free(&self, ptr: NonNull<u8>, _size: usize) {
        if let Err(e) = self.free_addr(VirtualAddress::from_nonnull(ptr)) {
            error!("table pool: invalid free: {e}");
        }
    }

    fn consumed(&self) -> usize {
        0
    }

    fn overhead(&self, _size: usize) -> usize {
        0
    }

    fn need_size_for_free(&self) -> bool {
        false
    }
}

impl<const TABLES: usize> TranslationTableAllocator for TableAllocator<'_, TABLES> {
    fn phys_addr(&self, virt: VirtualAddress) -> Result<PhysicalAddress, TranslateError> {
        Self::phys_addr(self, virt)
    }

    fn virt_addr(&self, phys: PhysicalAddress) -> Result<VirtualAddress, TranslateError> {
        Self::virt_addr(self, phys)
    }
}

impl<const TABLES: usize> core::fmt::Debug for TableAllocator<'_, TABLES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut f = f.debug_struct("TableAllocator");
        f.field("window", &self.window);
        match self.slots.try_lock() {
            Some(slots) => f.field("slots", &*slots),
            None => f.field("slots", &format_args!("<locked>")),
        };
        f.finish_non_exhaustive()
    }
}
