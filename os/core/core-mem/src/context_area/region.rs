//! Descriptors for backing store handed out to the context area.

use bitfield_struct::bitfield;
use core_addresses::{PhysicalAddress, VirtualAddress};

/// Cache policy of a region's mapping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum CacheAttribute {
    #[default]
    Cached = 0,
    WriteCombined = 1,
    Uncached = 2,
}

impl CacheAttribute {
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    /// Unknown encodings fall back to [`CacheAttribute::Cached`].
    #[must_use]
    pub const fn from_bits(value: u8) -> Self {
        match value {
            1 => Self::WriteCombined,
            2 => Self::Uncached,
            _ => Self::Cached,
        }
    }
}

/// Packed attributes of a context region.
///
/// Layout (LSB→MSB):
/// - bits 0..1: cache policy
/// - bit 2: writable
/// - bit 3: executable
/// - bit 4: owned by core
/// - bits 5..7: reserved
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct RegionAttributes {
    #[bits(2)]
    pub cache: CacheAttribute,
    pub writable: bool,
    pub executable: bool,
    pub core_owned: bool,
    #[bits(3)]
    __: u8,
}

impl RegionAttributes {
    /// Attributes of thread-context backing store: cached, writable, not
    /// executable, owned by core.
    #[must_use]
    pub const fn context() -> Self {
        Self::new()
            .with_cache(CacheAttribute::Cached)
            .with_writable(true)
            .with_core_owned(true)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegionState {
    /// The virtual range is claimed; backing store is being set up.
    Reserved,
    /// Backing store is mapped at [`ContextRegion::virt`].
    Attached,
}

/// One allocation inside the context area.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ContextRegion {
    pub(crate) local_addr: u64,
    pub(crate) size: u64,
    pub(crate) virt: VirtualAddress,
    pub(crate) phys: PhysicalAddress,
    pub(crate) attributes: RegionAttributes,
    pub(crate) state: RegionState,
}

impl ContextRegion {
    pub(crate) const fn reserved(local_addr: u64, size: u64, virt: VirtualAddress) -> Self {
        Self {
            local_addr,
            size,
            virt,
            phys: PhysicalAddress::zero(),
            attributes: RegionAttributes::context(),
            state: RegionState::Reserved,
        }
    }

    /// Offset of the region from the context-area base.
    #[inline]
    #[must_use]
    pub const fn local_addr(&self) -> u64 {
        self.local_addr
    }

    /// Page-rounded size in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Core-local virtual address of the region.
    #[inline]
    #[must_use]
    pub const fn virt(&self) -> VirtualAddress {
        self.virt
    }

    /// Physical base of the backing store; zero while reserved.
    #[inline]
    #[must_use]
    pub const fn phys(&self) -> PhysicalAddress {
        self.phys
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> RegionAttributes {
        self.attributes
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> RegionState {
        self.state
    }

    /// Whether `[local_addr, local_addr + size)` intersects this region.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, local_addr: u64, size: u64) -> bool {
        local_addr < self.local_addr + self.size && self.local_addr < local_addr + size
    }
}
