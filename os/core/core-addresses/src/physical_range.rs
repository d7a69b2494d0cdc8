use crate::PhysicalAddress;
use core::fmt;

/// A contiguous range of physical memory, `[base, base + size)`.
///
/// This is what the untyped memory source hands out: a physical base and a
/// byte count, before or after conversion into page frames.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct PhysicalRange {
    base: PhysicalAddress,
    size: u64,
}

impl PhysicalRange {
    #[inline]
    #[must_use]
    pub const fn new(base: PhysicalAddress, size: u64) -> Self {
        Self { base, size }
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}

impl fmt::Debug for PhysicalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalRange({}+{:#x})", self.base, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_shows_base_and_size() {
        let r = PhysicalRange::new(PhysicalAddress::new(0x1000), 0x2000);
        assert_eq!(format!("{r:?}"), "PhysicalRange(0x0000000000001000+0x2000)");
    }
}
