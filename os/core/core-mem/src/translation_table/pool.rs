use core::cell::UnsafeCell;
use core::mem::offset_of;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};
use core_addresses::{PageSize, Size4K, VirtualAddress};

/// Size of one translation table in bytes.
#[allow(clippy::cast_possible_truncation)]
pub const TABLE_SIZE: usize = Size4K::SIZE as usize;

/// Storage for one level of hardware page-table data.
///
/// Plain bytes; what lives inside is up to the page-table code.
#[repr(C, align(4096))]
pub struct Table {
    data: UnsafeCell<[u8; TABLE_SIZE]>,
}

impl Table {
    const fn new() -> Self {
        Self {
            data: UnsafeCell::new([0; TABLE_SIZE]),
        }
    }
}

/// `TABLES` translation tables back to back, page aligned, with nothing in
/// front of them.
///
/// Table pointers at the higher page-table levels only encode the aligned
/// base, so the first table must start exactly at the pool's address. The
/// only bookkeeping is a claim flag behind the last table; a
/// [`TableAllocator`](super::TableAllocator) administers the tables from the
/// outside, and at most one allocator can ever claim a pool.
///
/// Typically placed in a `static`:
///
/// ```rust
/// use core_mem::translation_table::TablePool;
///
/// static POOL: TablePool<16> = TablePool::new();
/// assert!(POOL.base().is_aligned::<core_addresses::Size4K>());
/// ```
#[repr(C, align(4096))]
pub struct TablePool<const TABLES: usize> {
    tables: [Table; TABLES],
    claimed: AtomicBool,
}

// Safety: the pool hands out raw pointers only; exclusive use of a table is
// arbitrated by the slot tracker of the one allocator that claimed the pool.
unsafe impl<const TABLES: usize> Sync for TablePool<TABLES> {}

const _: () = {
    assert!(size_of::<Table>() == TABLE_SIZE);
    assert!(align_of::<Table>() == TABLE_SIZE);
    assert!(align_of::<TablePool<1>>() == TABLE_SIZE);
    assert!(offset_of!(TablePool<3>, tables) == 0);
    assert!(offset_of!(TablePool<3>, claimed) == 3 * TABLE_SIZE);
};

impl<const TABLES: usize> Default for TablePool<TABLES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const TABLES: usize> TablePool<TABLES> {
    /// Required alignment of the pool.
    pub const ALIGN: usize = TABLE_SIZE;

    /// Number of tables in the pool.
    pub const TABLES: usize = TABLES;

    /// Size of the pool in bytes.
    #[allow(clippy::cast_possible_truncation)]
    pub const BYTES: u64 = (TABLES * TABLE_SIZE) as u64;

    /// A zero-filled pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: [const { Table::new() }; TABLES],
            claimed: AtomicBool::new(false),
        }
    }

    /// Virtual address of the first table.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> VirtualAddress {
        VirtualAddress::from_ptr(self.tables.as_ptr())
    }

    /// Hand the pool to an allocator. Succeeds once per pool.
    #[inline]
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    /// Raw pointer to table `index`.
    ///
    /// # Panics
    /// If `index >= TABLES`.
    #[inline]
    pub(crate) fn table_ptr(&self, index: usize) -> NonNull<u8> {
        let table = &self.tables[index];
        // SAFETY: UnsafeCell::get never returns null.
        unsafe { NonNull::new_unchecked(table.data.get().cast::<u8>()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_contiguous_and_page_aligned() {
        let pool = Box::new(TablePool::<4>::new());
        let base = pool.base();
        assert!(base.is_aligned::<Size4K>());
        for i in 0..4 {
            let va = VirtualAddress::from_nonnull(pool.table_ptr(i));
            assert_eq!(va, base + (i * TABLE_SIZE) as u64);
        }
        assert_eq!(TablePool::<4>::BYTES, 4 * 4096);
    }

    #[test]
    fn a_pool_is_claimed_once() {
        let pool = Box::new(TablePool::<1>::new());
        assert!(pool.claim());
        assert!(!pool.claim());
    }
}
