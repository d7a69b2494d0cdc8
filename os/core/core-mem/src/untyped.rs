//! Core's source of raw physical memory.

use core_addresses::{PhysicalAddress, PhysicalRange};

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum UntypedError {
    #[error("no untyped memory left for {0} bytes")]
    Exhausted(u64),
    #[error("kernel rejected retyping {frames} frames at {base}")]
    RetypeRejected { base: PhysicalAddress, frames: u64 },
}

/// Untyped physical memory as handed to core by the kernel at boot.
///
/// Memory obtained here cannot be used as-is: before it can be mapped it has
/// to be converted into page frames, which is a separate kernel operation.
pub trait UntypedMemory: Sync {
    /// Allocate `size` bytes (a multiple of the page size) of untyped memory.
    ///
    /// # Errors
    /// [`UntypedError::Exhausted`] when nothing large enough is left.
    fn alloc(&self, size: u64) -> Result<PhysicalRange, UntypedError>;

    /// Turn `frames` pages of untyped memory starting at `base` into page
    /// frames.
    ///
    /// # Errors
    /// [`UntypedError::RetypeRejected`] if the kernel refuses.
    fn convert_to_page_frames(&self, base: PhysicalAddress, frames: u64)
    -> Result<(), UntypedError>;

    /// Give a range from [`alloc`](Self::alloc) back, converted or not.
    fn release(&self, range: PhysicalRange);
}
