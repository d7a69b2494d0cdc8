//! # Thread-Context Area Bootstrap
//!
//! Every thread in core gets its context (stack and thread-local
//! bookkeeping) inside one reserved virtual window, the *context area*. In a
//! regular component the context area is a managed dataspace: RAM is
//! allocated through a RAM session and then attached through a region-manager
//! session. Core cannot do that while it is still bringing up the very
//! services those sessions depend on, so it uses a pair of stand-ins:
//!
//! * [`ContextAreaRm`] allocates *and* maps in one step. Attaching a region
//!   takes untyped memory, converts it to page frames and maps it into core's
//!   address space at the requested offset.
//! * [`ContextAreaRam`] is a quota session that does nothing. Backing store
//!   comes straight from untyped memory and is never charged to an account.
//!
//! Session operations the bootstrap has no use for keep their place in the
//! interface and report [`ContextAreaError::Unsupported`].
//!
//! ```text
//!  attach(size, local_addr)
//!        │  round up to pages, reserve [local_addr, +size) in the catalog
//!        ▼
//!  UntypedMemory::alloc ──► convert_to_page_frames
//!        │
//!        ▼
//!  LocalMapper::map_local(phys, base + local_addr, pages)
//!        │  on failure: unmap, release frames, drop reservation
//!        ▼
//!  commit descriptor, return local_addr
//! ```

mod catalog;
mod ram;
mod region;
mod rm;

pub use ram::ContextAreaRam;
pub use region::{CacheAttribute, ContextRegion, RegionAttributes, RegionState};
pub use rm::{ContextAreaRm, FaultKind, RmState};

use crate::map_local::LocalMapper;
use crate::untyped::{UntypedError, UntypedMemory};
use core_addresses::{PhysicalAddress, VirtualAddress};
use core_info::memory::{CONTEXT_AREA_VIRTUAL_BASE, CONTEXT_AREA_VIRTUAL_SIZE, MAX_THREAD_CONTEXTS};

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ContextAreaError {
    #[error("zero-sized context region requested")]
    ZeroSize,
    #[error("context region at {local_addr:#x} with {size:#x} bytes leaves the context area")]
    OutsideWindow { local_addr: u64, size: u64 },
    #[error("context region offset {0:#x} is not page aligned")]
    Misaligned(u64),
    #[error("context region at {local_addr:#x} overlaps the region at {existing:#x}")]
    Overlap { local_addr: u64, existing: u64 },
    #[error("dataspace for core context does not exist (all {0} descriptors in use)")]
    CatalogExhausted(usize),
    #[error("untyped memory exhausted, {0:#x} bytes requested")]
    PhysicalMemoryExhausted(u64),
    #[error("converting {frames} frames at {base} to page frames was rejected")]
    ConversionRejected { base: PhysicalAddress, frames: u64 },
    /// The first page the mapper refused.
    #[error("could not map phys {phys} at local {virt}")]
    MappingFailed {
        phys: PhysicalAddress,
        virt: VirtualAddress,
    },
    #[error("{0:?} is not implemented for the context area")]
    Unsupported(SessionOp),
}

impl From<UntypedError> for ContextAreaError {
    fn from(e: UntypedError) -> Self {
        match e {
            UntypedError::Exhausted(size) => Self::PhysicalMemoryExhausted(size),
            UntypedError::RetypeRejected { base, frames } => {
                Self::ConversionRejected { base, frames }
            }
        }
    }
}

/// Session operations the context area only carries for interface
/// compatibility.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SessionOp {
    Detach,
    AddClient,
    RemoveClient,
    FaultHandler,
    RamAlloc,
    RamFree,
}

/// Opaque kernel object reference as passed through session interfaces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Capability(u64);

impl Capability {
    /// The capability that names nothing.
    pub const INVALID: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Placement of the context area in core's address space.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ContextAreaLayout {
    base: VirtualAddress,
    size: u64,
}

impl Default for ContextAreaLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ContextAreaLayout {
    /// The platform layout from [`core_info::memory`].
    pub const DEFAULT: Self = Self::new(
        VirtualAddress::new(CONTEXT_AREA_VIRTUAL_BASE),
        CONTEXT_AREA_VIRTUAL_SIZE,
    );

    #[must_use]
    pub const fn new(base: VirtualAddress, size: u64) -> Self {
        Self { base, size }
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> VirtualAddress {
        self.base
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Core-local address of `size` bytes placed at offset `local_addr`.
    ///
    /// # Errors
    /// [`ContextAreaError::OutsideWindow`] unless the whole range lies inside
    /// the area and inside the address space.
    pub const fn locate(&self, local_addr: u64, size: u64) -> Result<VirtualAddress, ContextAreaError> {
        let outside = ContextAreaError::OutsideWindow { local_addr, size };
        let Some(end) = local_addr.checked_add(size) else {
            return Err(outside);
        };
        if end > self.size || self.base.checked_add(end).is_none() {
            return Err(outside);
        }
        match self.base.checked_add(local_addr) {
            Some(virt) => Ok(virt),
            None => Err(outside),
        }
    }
}

/// The RM/RAM session pair core uses for its thread contexts.
pub struct ContextArea<U, M, const REGIONS: usize = MAX_THREAD_CONTEXTS> {
    rm: ContextAreaRm<U, M, REGIONS>,
    ram: ContextAreaRam,
}

impl<U: UntypedMemory, M: LocalMapper, const REGIONS: usize> ContextArea<U, M, REGIONS> {
    /// Context area at the platform's default location.
    #[must_use]
    pub const fn new(untyped: U, mapper: M) -> Self {
        Self::with_layout(ContextAreaLayout::DEFAULT, untyped, mapper)
    }

    #[must_use]
    pub const fn with_layout(layout: ContextAreaLayout, untyped: U, mapper: M) -> Self {
        Self {
            rm: ContextAreaRm::new(layout, untyped, mapper),
            ram: ContextAreaRam::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn rm(&self) -> &ContextAreaRm<U, M, REGIONS> {
        &self.rm
    }

    #[inline]
    #[must_use]
    pub const fn ram(&self) -> &ContextAreaRam {
        &self.ram
    }
}
