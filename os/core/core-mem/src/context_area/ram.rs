use super::region::CacheAttribute;
use super::{Capability, ContextAreaError, SessionOp};
use log::warn;

/// RAM session of the context area.
///
/// Intentionally unmetered: context backing store is taken from untyped
/// memory by [`ContextAreaRm`](super::ContextAreaRm) before any RAM account
/// exists, so there is nothing to allocate from or charge against here.
#[derive(Debug, Default)]
pub struct ContextAreaRam {
    _private: (),
}

#[allow(clippy::unused_self)]
impl ContextAreaRam {
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// # Errors
    /// Always [`ContextAreaError::Unsupported`].
    pub const fn alloc(&self, _size: u64, _cache: CacheAttribute) -> Result<Capability, ContextAreaError> {
        Err(ContextAreaError::Unsupported(SessionOp::RamAlloc))
    }

    /// # Errors
    /// Always [`ContextAreaError::Unsupported`].
    pub fn free(&self, _ds: Capability) -> Result<(), ContextAreaError> {
        warn!("context area RAM: free not implemented");
        Err(ContextAreaError::Unsupported(SessionOp::RamFree))
    }

    /// Accepted and ignored.
    ///
    /// # Errors
    /// Never fails.
    pub const fn ref_account(&self, _account: Capability) -> Result<(), ContextAreaError> {
        Ok(())
    }

    /// Accepted and ignored.
    ///
    /// # Errors
    /// Never fails.
    pub const fn transfer_quota(&self, _to: Capability, _amount: u64) -> Result<(), ContextAreaError> {
        Ok(())
    }

    #[must_use]
    pub const fn quota(&self) -> u64 {
        0
    }

    #[must_use]
    pub const fn used(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_accounts_nothing() {
        let ram = ContextAreaRam::new();
        assert_eq!(
            ram.alloc(0x1000, CacheAttribute::Cached),
            Err(ContextAreaError::Unsupported(SessionOp::RamAlloc))
        );
        assert_eq!(
            ram.free(Capability::new(7)),
            Err(ContextAreaError::Unsupported(SessionOp::RamFree))
        );
        assert_eq!(ram.ref_account(Capability::INVALID), Ok(()));
        assert_eq!(ram.transfer_quota(Capability::new(1), 0x1_0000), Ok(()));
        assert_eq!(ram.quota(), 0);
        assert_eq!(ram.used(), 0);
    }
}
