use super::ContextAreaError;
use super::region::{ContextRegion, RegionState};
use crate::bit_slots::BitSlots;
use core_addresses::PhysicalAddress;
use log::{error, trace};

/// Fixed-capacity store of context region descriptors.
///
/// Slot indices are only meaningful inside the catalog; callers look regions
/// up by their local address.
pub(crate) struct RegionCatalog<const N: usize> {
    slots: BitSlots<N>,
    regions: [Option<ContextRegion>; N],
}

impl<const N: usize> RegionCatalog<N> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: BitSlots::new(),
            regions: [None; N],
        }
    }

    /// Claim a slot for `region` unless it collides with a reserved or
    /// attached region.
    pub(crate) fn reserve(&mut self, region: ContextRegion) -> Result<usize, ContextAreaError> {
        if let Some(other) = self
            .iter()
            .find(|r| r.overlaps(region.local_addr, region.size))
        {
            return Err(ContextAreaError::Overlap {
                local_addr: region.local_addr,
                existing: other.local_addr,
            });
        }
        let slot = self
            .slots
            .allocate()
            .map_err(|_| ContextAreaError::CatalogExhausted(N))?;
        self.regions[slot] = Some(region);
        trace!("context catalog: slot {slot} reserved for {:#x}", region.local_addr);
        Ok(slot)
    }

    pub(crate) fn commit(&mut self, slot: usize, phys: PhysicalAddress) -> Option<ContextRegion> {
        let region = self.regions.get_mut(slot)?.as_mut()?;
        region.phys = phys;
        region.state = RegionState::Attached;
        Some(*region)
    }

    pub(crate) fn cancel(&mut self, slot: usize) {
        if let Err(e) = self.slots.release(slot) {
            error!("context catalog: cannot cancel reservation: {e}");
            return;
        }
        self.regions[slot] = None;
        trace!("context catalog: slot {slot} cancelled");
    }

    /// The attached region starting at `local_addr`.
    pub(crate) fn find(&self, local_addr: u64) -> Option<ContextRegion> {
        self.iter()
            .find(|r| r.local_addr == local_addr && r.state == RegionState::Attached)
            .copied()
    }

    pub(crate) fn attached(&self) -> impl Iterator<Item = &ContextRegion> {
        self.iter().filter(|r| r.state == RegionState::Attached)
    }

    fn iter(&self) -> impl Iterator<Item = &ContextRegion> {
        self.slots
            .iter_used()
            .filter_map(|slot| self.regions[slot].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_addresses::VirtualAddress;

    fn region(local_addr: u64, size: u64) -> ContextRegion {
        ContextRegion::reserved(local_addr, size, VirtualAddress::new(0x4000_0000 + local_addr))
    }

    #[test]
    fn reserved_regions_block_overlaps_until_cancelled() {
        let mut catalog = RegionCatalog::<4>::new();
        let slot = catalog.reserve(region(0x1000, 0x2000)).unwrap();
        assert_eq!(
            catalog.reserve(region(0x2000, 0x1000)),
            Err(ContextAreaError::Overlap {
                local_addr: 0x2000,
                existing: 0x1000
            })
        );
        assert_eq!(catalog.find(0x1000), None);

        catalog.cancel(slot);
        assert!(catalog.reserve(region(0x2000, 0x1000)).is_ok());
    }

    #[test]
    fn commit_makes_a_region_visible() {
        let mut catalog = RegionCatalog::<2>::new();
        let slot = catalog.reserve(region(0, 0x1000)).unwrap();
        let committed = catalog.commit(slot, PhysicalAddress::new(0x8000)).unwrap();
        assert_eq!(committed.state(), RegionState::Attached);
        assert_eq!(catalog.find(0).map(|r| r.phys()), Some(PhysicalAddress::new(0x8000)));
        assert_eq!(catalog.attached().count(), 1);
    }

    #[test]
    fn commit_needs_a_live_reservation() {
        let mut catalog = RegionCatalog::<2>::new();
        let slot = catalog.reserve(region(0, 0x1000)).unwrap();
        catalog.cancel(slot);
        assert_eq!(catalog.commit(slot, PhysicalAddress::new(0x8000)), None);
        assert_eq!(catalog.commit(7, PhysicalAddress::new(0x8000)), None);
        assert_eq!(catalog.attached().count(), 0);
    }

    #[test]
    fn capacity_is_fixed() {
        let mut catalog = RegionCatalog::<2>::new();
        catalog.reserve(region(0, 0x1000)).unwrap();
        catalog.reserve(region(0x1000, 0x1000)).unwrap();
        assert_eq!(
            catalog.reserve(region(0x2000, 0x1000)),
            Err(ContextAreaError::CatalogExhausted(2))
        );
    }
}
