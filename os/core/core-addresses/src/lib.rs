//! # Physical and Virtual Address Types for Core
//!
//! Strongly typed wrappers for the raw addresses core juggles while it builds
//! translation tables and maps its own thread-context area.
//!
//! ## Overview
//!
//! Core constantly has to hold two views of the same memory: the physical
//! address that ends up in a page-table entry and the virtual address core
//! itself dereferences. Mixing the two corrupts address translation silently,
//! so every address in this workspace travels as one of:
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`MemoryAddress`] | A raw 64-bit address, kind unknown. |
//! | [`PhysicalAddress`] | Physical memory as seen by the MMU and the kernel. |
//! | [`VirtualAddress`] | An address in core's own (translated) address space. |
//! | [`PhysicalRange`] | A physical base plus a length, e.g. a chunk of untyped memory. |
//! | [`AddressWindow`] | A span mapped at a fixed physical/virtual offset, with checked translation. |
//!
//! ## Page Sizes
//!
//! The page granule is modelled by the [`PageSize`] marker trait. Core only
//! deals in base pages, so [`Size4K`] is the sole implementation; the trait
//! keeps the page size visible in signatures such as
//! [`PageSize::page_count`].
//!
//! ## Translation Windows
//!
//! Wherever core knows that a region is mapped linearly (the translation
//! table pool, a freshly mapped context), it describes that with an
//! [`AddressWindow`]. Translation is an affine offset and fails with
//! [`TranslateError`] instead of producing a bogus address when the input
//! lies outside the window:
//!
//! ```rust
//! # use core_addresses::*;
//! let window = AddressWindow::new(
//!     PhysicalAddress::new(0x8000_0000),
//!     VirtualAddress::new(0xFFFF_8000_0010_0000),
//!     4 * Size4K::SIZE,
//! );
//! let va = VirtualAddress::new(0xFFFF_8000_0010_1234);
//! let pa = window.to_phys(va).unwrap();
//! assert_eq!(pa.as_u64(), 0x8000_1234);
//! assert_eq!(window.to_virt(pa).unwrap(), va);
//! assert!(window.to_phys(VirtualAddress::new(0x1000)).is_err());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code, clippy::inline_always)]

mod memory_address;
mod page_size;
mod physical_address;
mod physical_range;
mod virtual_address;
mod window;

pub use memory_address::MemoryAddress;
pub use page_size::{PageSize, Size4K};
pub use physical_address::PhysicalAddress;
pub use physical_range::PhysicalRange;
pub use virtual_address::VirtualAddress;
pub use window::{AddressWindow, TranslateError};

/// Align `x` down to the nearest multiple of `a`.
///
/// `a` must be a non-zero power of two.
///
/// ```rust
/// # use core_addresses::align_down;
/// assert_eq!(align_down(4095, 4096), 0);
/// assert_eq!(align_down(8191, 4096), 4096);
/// ```
#[inline(always)]
#[must_use]
pub const fn align_down(x: u64, a: u64) -> u64 {
    x & !(a - 1)
}

/// Align `x` up to the nearest multiple of `a`.
///
/// `a` must be a non-zero power of two and `x + (a - 1)` must not overflow.
///
/// ```rust
/// # use core_addresses::align_up;
/// assert_eq!(align_up(1, 4096), 4096);
/// assert_eq!(align_up(4096, 4096), 4096);
/// assert_eq!(align_up(4097, 4096), 8192);
/// ```
#[inline(always)]
#[must_use]
pub const fn align_up(x: u64, a: u64) -> u64 {
    (x + a - 1) & !(a - 1)
}

/// Round a byte count up to whole 4 KiB pages.
#[inline]
#[must_use]
pub const fn round_page(size: u64) -> u64 {
    align_up(size, Size4K::SIZE)
}
