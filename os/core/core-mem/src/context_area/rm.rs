use super::catalog::RegionCatalog;
use super::region::ContextRegion;
use super::{Capability, ContextAreaError, ContextAreaLayout, SessionOp};
use crate::map_local::LocalMapper;
use crate::untyped::UntypedMemory;
use core_addresses::{PageSize, PhysicalAddress, Size4K, VirtualAddress, round_page};
use core_info::memory::MAX_THREAD_CONTEXTS;
use core_sync::SpinLock;
use log::{debug, error, warn};

/// Kind of the last fault reported to a region manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FaultKind {
    #[default]
    Ready,
    ReadFault,
    WriteFault,
    ExecFault,
}

/// Fault state of a region manager. The context area never faults, so
/// this is always the default.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct RmState {
    pub kind: FaultKind,
    pub addr: u64,
}

/// Region manager of the context area.
///
/// Attaching a region allocates its backing store; there is no separate
/// dataspace. Up to `REGIONS` regions can be attached.
pub struct ContextAreaRm<U, M, const REGIONS: usize = MAX_THREAD_CONTEXTS> {
    layout: ContextAreaLayout,
    untyped: U,
    mapper: M,
    catalog: SpinLock<RegionCatalog<REGIONS>>,
}

impl<U: UntypedMemory, M: LocalMapper, const REGIONS: usize> ContextAreaRm<U, M, REGIONS> {
    pub const fn new(layout: ContextAreaLayout, untyped: U, mapper: M) -> Self {
        Self {
            layout,
            untyped,
            mapper,
            catalog: SpinLock::new(RegionCatalog::new()),
        }
    }

    /// Allocate backing store for `size` bytes and map it at offset
    /// `local_addr` of the context area.
    ///
    /// The size is rounded up to whole pages. On success the caller's
    /// `local_addr` is handed back. A failed request leaves nothing behind:
    /// the pages it installed are removed, mappings it did not install are
    /// left alone, the memory goes back to the untyped source and the offset
    /// can be attached again.
    ///
    /// # Errors
    /// * [`ContextAreaError::ZeroSize`], [`ContextAreaError::Misaligned`],
    ///   [`ContextAreaError::OutsideWindow`], [`ContextAreaError::Overlap`]
    ///   and [`ContextAreaError::CatalogExhausted`] before any memory is
    ///   touched.
    /// * [`ContextAreaError::PhysicalMemoryExhausted`],
    ///   [`ContextAreaError::ConversionRejected`] or
    ///   [`ContextAreaError::MappingFailed`] from the backing-store setup.
    pub fn attach(&self, size: u64, local_addr: u64) -> Result<u64, ContextAreaError> {
        self.try_attach(size, local_addr).inspect_err(|e| {
            error!("context area: attach of {size:#x} bytes at {local_addr:#x} failed: {e}");
        })
    }

    fn try_attach(&self, size: u64, local_addr: u64) -> Result<u64, ContextAreaError> {
        if size == 0 {
            return Err(ContextAreaError::ZeroSize);
        }
        if !local_addr.is_multiple_of(Size4K::SIZE) {
            return Err(ContextAreaError::Misaligned(local_addr));
        }
        if size > self.layout.size() {
            return Err(ContextAreaError::OutsideWindow { local_addr, size });
        }

        let size = round_page(size);
        let virt = self.layout.locate(local_addr, size)?;
        let slot = self
            .catalog
            .with_lock(|catalog| catalog.reserve(ContextRegion::reserved(local_addr, size, virt)))?;

        // The catalog slot keeps the range ours while the lock is dropped.
        match self.back(size, virt) {
            Ok(phys) => {
                match self.catalog.with_lock(|catalog| catalog.commit(slot, phys)) {
                    Some(region) => debug!(
                        "context area: core_local_addr = {}, phys_addr = {}, size = {:#x}",
                        region.virt(),
                        region.phys(),
                        region.size()
                    ),
                    None => error!(
                        "context area: reservation {slot} for {local_addr:#x} vanished, \
                         {virt} stays mapped to {phys} without a descriptor"
                    ),
                }
                Ok(local_addr)
            }
            Err(e) => {
                self.catalog.with_lock(|catalog| catalog.cancel(slot));
                Err(e)
            }
        }
    }

    fn back(&self, size: u64, virt: VirtualAddress) -> Result<PhysicalAddress, ContextAreaError> {
        let frames = Size4K::page_count(size);
        let range = self.untyped.alloc(size)?;
        let phys = range.base();

        if let Err(e) = self.untyped.convert_to_page_frames(phys, frames) {
            self.untyped.release(range);
            return Err(e.into());
        }

        let mapped = self.map_pages(phys, virt, frames);
        if mapped < frames {
            if mapped > 0 {
                self.mapper.unmap_local(virt, mapped);
            }
            self.untyped.release(range);
            let offset = mapped * Size4K::SIZE;
            return Err(ContextAreaError::MappingFailed {
                phys: phys + offset,
                virt: virt + offset,
            });
        }

        Ok(phys)
    }

    /// Map `frames` pages one at a time and return how many were installed
    /// before the first refusal.
    fn map_pages(&self, phys: PhysicalAddress, virt: VirtualAddress, frames: u64) -> u64 {
        let mut mapped = 0;
        while mapped < frames {
            let offset = mapped * Size4K::SIZE;
            if !self.mapper.map_local(phys + offset, virt + offset, 1) {
                break;
            }
            mapped += 1;
        }
        mapped
    }

    /// # Errors
    /// Always [`ContextAreaError::Unsupported`]; context regions are never
    /// detached.
    #[allow(clippy::unused_self)]
    pub fn detach(&self, local_addr: u64) -> Result<(), ContextAreaError> {
        warn!("context area: detach of {local_addr:#x} not implemented");
        Err(ContextAreaError::Unsupported(SessionOp::Detach))
    }

    /// # Errors
    /// Always [`ContextAreaError::Unsupported`].
    #[allow(clippy::unused_self)]
    pub fn add_client(&self, _thread: Capability) -> Result<Capability, ContextAreaError> {
        warn!("context area: add_client not implemented");
        Err(ContextAreaError::Unsupported(SessionOp::AddClient))
    }

    /// # Errors
    /// Always [`ContextAreaError::Unsupported`].
    #[allow(clippy::unused_self)]
    pub fn remove_client(&self, _pager: Capability) -> Result<(), ContextAreaError> {
        warn!("context area: remove_client not implemented");
        Err(ContextAreaError::Unsupported(SessionOp::RemoveClient))
    }

    /// # Errors
    /// Always [`ContextAreaError::Unsupported`].
    #[allow(clippy::unused_self)]
    pub fn fault_handler(&self, _handler: Capability) -> Result<(), ContextAreaError> {
        warn!("context area: fault_handler not implemented");
        Err(ContextAreaError::Unsupported(SessionOp::FaultHandler))
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn state(&self) -> RmState {
        RmState::default()
    }

    /// The context area is not backed by a dataspace.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn dataspace(&self) -> Capability {
        Capability::INVALID
    }

    /// The attached region at `local_addr`.
    #[must_use]
    pub fn region(&self, local_addr: u64) -> Option<ContextRegion> {
        self.catalog.with_lock(|catalog| catalog.find(local_addr))
    }

    /// Visit every attached region. Runs with the catalog locked.
    pub fn for_each_region(&self, mut f: impl FnMut(&ContextRegion)) {
        self.catalog
            .with_lock(|catalog| catalog.attached().for_each(|region| f(region)));
    }

    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.catalog.with_lock(|catalog| catalog.attached().count())
    }

    #[inline]
    #[must_use]
    pub const fn layout(&self) -> ContextAreaLayout {
        self.layout
    }

    #[inline]
    #[must_use]
    pub const fn untyped(&self) -> &U {
        &self.untyped
    }

    #[inline]
    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_area::RegionAttributes;
    use crate::untyped::UntypedError;
    use core_addresses::PhysicalRange;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Bump(Mutex<u64>);

    impl UntypedMemory for Bump {
        fn alloc(&self, size: u64) -> Result<PhysicalRange, UntypedError> {
            let mut next = self.0.lock().unwrap();
            let base = PhysicalAddress::new(0x10_0000 + *next);
            *next += size;
            Ok(PhysicalRange::new(base, size))
        }

        fn convert_to_page_frames(&self, _: PhysicalAddress, _: u64) -> Result<(), UntypedError> {
            Ok(())
        }

        fn release(&self, _: PhysicalRange) {}
    }

    struct Always(bool);

    impl LocalMapper for Always {
        fn map_local(&self, _: PhysicalAddress, _: VirtualAddress, _: u64) -> bool {
            self.0
        }

        fn unmap_local(&self, _: VirtualAddress, _: u64) {}
    }

    fn rm(maps: bool) -> ContextAreaRm<Bump, Always, 4> {
        ContextAreaRm::new(ContextAreaLayout::DEFAULT, Bump::default(), Always(maps))
    }

    #[test]
    fn attach_records_a_cached_core_owned_region() {
        let rm = rm(true);
        assert_eq!(rm.attach(0x1800, 0x10_0000), Ok(0x10_0000));

        let region = rm.region(0x10_0000).unwrap();
        assert_eq!(region.size(), 0x2000);
        assert_eq!(region.virt(), VirtualAddress::new(0x4010_0000));
        assert_eq!(region.phys(), PhysicalAddress::new(0x10_0000));
        assert_eq!(region.attributes(), RegionAttributes::context());
        assert_eq!(rm.attached_count(), 1);
    }

    #[test]
    fn rejects_bad_requests_up_front() {
        let rm = rm(true);
        assert_eq!(rm.attach(0, 0), Err(ContextAreaError::ZeroSize));
        assert_eq!(rm.attach(1, 0x10), Err(ContextAreaError::Misaligned(0x10)));
        assert_eq!(
            rm.attach(u64::MAX, 0),
            Err(ContextAreaError::OutsideWindow {
                local_addr: 0,
                size: u64::MAX
            })
        );
        assert_eq!(*rm.untyped.0.lock().unwrap(), 0);
    }

    #[test]
    fn failed_mapping_leaves_no_region() {
        let rm = rm(false);
        assert!(matches!(
            rm.attach(0x1000, 0),
            Err(ContextAreaError::MappingFailed { .. })
        ));
        assert_eq!(rm.region(0), None);
        assert_eq!(rm.attached_count(), 0);
    }

    #[test]
    fn placeholders_report_unsupported() {
        let rm = rm(true);
        assert_eq!(
            rm.detach(0),
            Err(ContextAreaError::Unsupported(SessionOp::Detach))
        );
        assert_eq!(rm.state(), RmState::default());
        assert_eq!(rm.dataspace(), Capability::INVALID);
    }
}
