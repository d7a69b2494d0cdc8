use crate::{PhysicalAddress, VirtualAddress};

/// A linearly mapped span: `len` bytes that live at `phys_base` physically
/// and at `virt_base` in core's address space.
///
/// Translation in either direction is a constant offset. Addresses outside
/// the span, or whose translation would run past the end of the address
/// space, are rejected with [`TranslateError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AddressWindow {
    phys_base: PhysicalAddress,
    virt_base: VirtualAddress,
    len: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("virtual address {0} is outside the translation window")]
    VirtualOutOfRange(VirtualAddress),
    #[error("physical address {0} is outside the translation window")]
    PhysicalOutOfRange(PhysicalAddress),
}

impl AddressWindow {
    #[inline]
    #[must_use]
    pub const fn new(phys_base: PhysicalAddress, virt_base: VirtualAddress, len: u64) -> Self {
        Self {
            phys_base,
            virt_base,
            len,
        }
    }

    /// A window whose physical and virtual bases coincide.
    #[inline]
    #[must_use]
    pub const fn identity(virt_base: VirtualAddress, len: u64) -> Self {
        Self::new(PhysicalAddress::new(virt_base.as_u64()), virt_base, len)
    }

    #[inline]
    #[must_use]
    pub const fn phys_base(&self) -> PhysicalAddress {
        self.phys_base
    }

    #[inline]
    #[must_use]
    pub const fn virt_base(&self) -> VirtualAddress {
        self.virt_base
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Translate a virtual address inside the window to its physical address.
    ///
    /// # Errors
    /// [`TranslateError::VirtualOutOfRange`] if `va` is not inside the window.
    #[inline]
    pub const fn to_phys(&self, va: VirtualAddress) -> Result<PhysicalAddress, TranslateError> {
        match va.checked_offset_from(self.virt_base) {
            Some(off) if off < self.len => match self.phys_base.checked_add(off) {
                Some(pa) => Ok(pa),
                None => Err(TranslateError::VirtualOutOfRange(va)),
            },
            _ => Err(TranslateError::VirtualOutOfRange(va)),
        }
    }

    /// Translate a physical address inside the window to its virtual address.
    ///
    /// # Errors
    /// [`TranslateError::PhysicalOutOfRange`] if `pa` is not inside the window.
    #[inline]
    pub const fn to_virt(&self, pa: PhysicalAddress) -> Result<VirtualAddress, TranslateError> {
        match pa.checked_offset_from(self.phys_base) {
            Some(off) if off < self.len => match self.virt_base.checked_add(off) {
                Some(va) => Ok(va),
                None => Err(TranslateError::PhysicalOutOfRange(pa)),
            },
            _ => Err(TranslateError::PhysicalOutOfRange(pa)),
        }
    }
}
