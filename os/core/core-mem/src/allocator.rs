//! Allocator interfaces core's page-table code programs against.

use core::ptr::NonNull;
use core_addresses::{PhysicalAddress, TranslateError, VirtualAddress};

/// Generic byte allocator contract.
pub trait Allocator {
    /// Allocate `size` bytes. `None` when the allocator cannot satisfy the
    /// request.
    fn alloc(&self, size: usize) -> Option<NonNull<u8>>;

    /// Return a block obtained from [`alloc`](Self::alloc).
    fn free(&self, ptr: NonNull<u8>, size: usize);

    /// Bytes consumed by allocations, including metadata.
    fn consumed(&self) -> usize;

    /// Per-allocation metadata cost for a block of `size` bytes.
    fn overhead(&self, size: usize) -> usize;

    /// Whether [`free`](Self::free) needs the original size.
    fn need_size_for_free(&self) -> bool;
}

/// An [`Allocator`] for translation tables that also knows where its tables
/// live physically.
///
/// Higher-level table entries store physical addresses, while core walks
/// tables through their virtual addresses; page-table code converts between
/// the two with these methods.
pub trait TranslationTableAllocator: Allocator {
    /// Physical address of a virtual address inside the table pool.
    ///
    /// # Errors
    /// [`TranslateError::VirtualOutOfRange`] outside the pool.
    fn phys_addr(&self, virt: VirtualAddress) -> Result<PhysicalAddress, TranslateError>;

    /// Virtual address of a physical address inside the table pool.
    ///
    /// # Errors
    /// [`TranslateError::PhysicalOutOfRange`] outside the pool.
    fn virt_addr(&self, phys: PhysicalAddress) -> Result<VirtualAddress, TranslateError>;
}

/// Core's own memory allocator, as far as the table pool is concerned: it
/// knows the physical address behind a core-local virtual address.
///
/// Platforms where core runs with address translation enabled use this to
/// find the physical base of the statically allocated table pool.
pub trait CoreMemAlloc {
    fn phys_addr(&self, virt: VirtualAddress) -> Option<PhysicalAddress>;
}
