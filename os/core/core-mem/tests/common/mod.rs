//! In-process stand-ins for the kernel's untyped memory and core's page
//! tables.

#![allow(dead_code)]

use core_addresses::{PhysicalAddress, PhysicalRange, VirtualAddress};
use core_mem::map_local::LocalMapper;
use core_mem::untyped::{UntypedError, UntypedMemory};
use std::collections::BTreeMap;
use std::sync::Mutex;

const PAGE: u64 = 4096;

#[derive(Default)]
struct UntypedState {
    next: u64,
    end: u64,
    requests: Vec<u64>,
    converted: Vec<(PhysicalAddress, u64)>,
    released: Vec<PhysicalRange>,
    reject_conversion: bool,
}

/// Bump allocator over a fake physical range. Released memory is recorded,
/// not reused, so every allocation gets a fresh address.
pub struct FakeUntyped {
    state: Mutex<UntypedState>,
}

impl FakeUntyped {
    pub fn new(base: u64, bytes: u64) -> Self {
        Self {
            state: Mutex::new(UntypedState {
                next: base,
                end: base + bytes,
                ..UntypedState::default()
            }),
        }
    }

    pub fn reject_conversion(&self, reject: bool) {
        self.state.lock().unwrap().reject_conversion = reject;
    }

    /// Sizes passed to `alloc`, in call order, including failed calls.
    pub fn requests(&self) -> Vec<u64> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn converted(&self) -> Vec<(PhysicalAddress, u64)> {
        self.state.lock().unwrap().converted.clone()
    }

    pub fn released(&self) -> Vec<PhysicalRange> {
        self.state.lock().unwrap().released.clone()
    }
}

impl UntypedMemory for FakeUntyped {
    fn alloc(&self, size: u64) -> Result<PhysicalRange, UntypedError> {
        let mut s = self.state.lock().unwrap();
        s.requests.push(size);
        if s.next + size > s.end {
            return Err(UntypedError::Exhausted(size));
        }
        let range = PhysicalRange::new(PhysicalAddress::new(s.next), size);
        s.next += size;
        Ok(range)
    }

    fn convert_to_page_frames(&self, base: PhysicalAddress, frames: u64) -> Result<(), UntypedError> {
        let mut s = self.state.lock().unwrap();
        if s.reject_conversion {
            return Err(UntypedError::RetypeRejected { base, frames });
        }
        s.converted.push((base, frames));
        Ok(())
    }

    fn release(&self, range: PhysicalRange) {
        self.state.lock().unwrap().released.push(range);
    }
}

/// Page-granular map of core's address space.
///
/// Refuses to map over an existing page, like a real page-table walker.
/// `fail_after(Some(k))` lets `k` more pages be installed; every page after
/// that is refused until `fail_after(None)`.
#[derive(Default)]
pub struct FakeMapper {
    pages: Mutex<BTreeMap<u64, u64>>,
    fail_after: Mutex<Option<u64>>,
}

impl FakeMapper {
    pub fn fail_after(&self, pages: Option<u64>) {
        *self.fail_after.lock().unwrap() = pages;
    }

    pub fn lookup(&self, virt: VirtualAddress) -> Option<PhysicalAddress> {
        let page = virt.as_u64() & !(PAGE - 1);
        self.pages
            .lock()
            .unwrap()
            .get(&page)
            .map(|phys| PhysicalAddress::new(phys + (virt.as_u64() - page)))
    }

    pub fn mapped_pages(&self) -> usize {
        self.pages.lock().unwrap().len()
    }
}

impl LocalMapper for FakeMapper {
    fn map_local(&self, phys: PhysicalAddress, virt: VirtualAddress, pages: u64) -> bool {
        let mut budget = self.fail_after.lock().unwrap();
        let mut map = self.pages.lock().unwrap();
        for i in 0..pages {
            let va = virt.as_u64() + i * PAGE;
            if *budget == Some(0) || map.contains_key(&va) {
                return false;
            }
            map.insert(va, phys.as_u64() + i * PAGE);
            if let Some(left) = budget.as_mut() {
                *left -= 1;
            }
        }
        true
    }

    fn unmap_local(&self, virt: VirtualAddress, pages: u64) {
        let mut map = self.pages.lock().unwrap();
        for i in 0..pages {
            map.remove(&(virt.as_u64() + i * PAGE));
        }
    }
}
