//! Installing mappings into core's own address space.

use core_addresses::{PhysicalAddress, VirtualAddress};

/// Maps page frames into core's local address space.
pub trait LocalMapper: Sync {
    /// Map `pages` consecutive page frames starting at `phys` to `virt`.
    ///
    /// Returns `false` if any page could not be mapped, for instance because
    /// something is already mapped there. Which pages of a failed request
    /// were installed is not reported, so callers that must undo exactly
    /// their own pages map one page per call.
    fn map_local(&self, phys: PhysicalAddress, virt: VirtualAddress, pages: u64) -> bool;

    /// Remove the mappings of `pages` pages starting at `virt`.
    /// Unmapped pages in the range are skipped.
    fn unmap_local(&self, virt: VirtualAddress, pages: u64);
}
