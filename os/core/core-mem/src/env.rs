//! Process-wide access to core's bootstrap allocators.
//!
//! Core reaches the table allocator and the context area from many threads
//! and long before anything could pass them around explicitly. [`CoreEnv`]
//! is meant to live in a `static`; each part is installed exactly once during
//! early init and only handed out by shared reference afterwards.
//!
//! ```rust
//! use core_addresses::{PhysicalAddress, PhysicalRange, VirtualAddress};
//! use core_mem::context_area::ContextArea;
//! use core_mem::env::{CoreEnv, EnvError};
//! use core_mem::map_local::LocalMapper;
//! use core_mem::translation_table::{TableAllocator, TablePool};
//! use core_mem::untyped::{UntypedError, UntypedMemory};
//!
//! struct NoUntyped;
//! impl UntypedMemory for NoUntyped {
//!     fn alloc(&self, size: u64) -> Result<PhysicalRange, UntypedError> {
//!         Err(UntypedError::Exhausted(size))
//!     }
//!     fn convert_to_page_frames(&self, _: PhysicalAddress, _: u64) -> Result<(), UntypedError> {
//!         Ok(())
//!     }
//!     fn release(&self, _: PhysicalRange) {}
//! }
//!
//! struct NoMapper;
//! impl LocalMapper for NoMapper {
//!     fn map_local(&self, _: PhysicalAddress, _: VirtualAddress, _: u64) -> bool {
//!         false
//!     }
//!     fn unmap_local(&self, _: VirtualAddress, _: u64) {}
//! }
//!
//! static POOL: TablePool<8> = TablePool::new();
//! static ENV: CoreEnv<NoUntyped, NoMapper, 8> = CoreEnv::new();
//!
//! assert_eq!(ENV.context_area_rm().err(), Some(EnvError::NotInitialized("context area")));
//!
//! ENV.install_tables(TableAllocator::new(&POOL).unwrap()).unwrap();
//! ENV.install(ContextArea::new(NoUntyped, NoMapper)).unwrap();
//! assert_eq!(ENV.context_area_ram().unwrap().quota(), 0);
//! ```

use crate::context_area::{ContextArea, ContextAreaRam, ContextAreaRm};
use crate::map_local::LocalMapper;
use crate::translation_table::TableAllocator;
use crate::untyped::UntypedMemory;
use core_info::memory::{MAX_THREAD_CONTEXTS, TRANSLATION_TABLES};
use core_sync::SyncOnceCell;
use log::debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EnvError {
    #[error("{0} is already installed")]
    AlreadyInitialized(&'static str),
    #[error("{0} is not installed yet")]
    NotInitialized(&'static str),
}

const TABLES_NAME: &str = "translation table allocator";
const CONTEXT_AREA_NAME: &str = "context area";

/// Install-once holder for the table allocator and the context area.
pub struct CoreEnv<
    U,
    M,
    const TABLES: usize = TRANSLATION_TABLES,
    const REGIONS: usize = MAX_THREAD_CONTEXTS,
> {
    tables: SyncOnceCell<TableAllocator<'static, TABLES>>,
    context_area: SyncOnceCell<ContextArea<U, M, REGIONS>>,
}

impl<U, M, const TABLES: usize, const REGIONS: usize> Default for CoreEnv<U, M, TABLES, REGIONS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U, M, const TABLES: usize, const REGIONS: usize> CoreEnv<U, M, TABLES, REGIONS> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: SyncOnceCell::new(),
            context_area: SyncOnceCell::new(),
        }
    }

    /// Install core's translation-table allocator.
    ///
    /// # Errors
    /// [`EnvError::AlreadyInitialized`] on a second call; the rejected
    /// allocator is dropped.
    pub fn install_tables(
        &self,
        tables: TableAllocator<'static, TABLES>,
    ) -> Result<&TableAllocator<'static, TABLES>, EnvError> {
        let tables = self
            .tables
            .set(tables)
            .map_err(|_| EnvError::AlreadyInitialized(TABLES_NAME))?;
        debug!("core env: {TABLES} translation tables at {}", tables.window().virt_base());
        Ok(tables)
    }

    /// # Errors
    /// [`EnvError::NotInitialized`] before [`install_tables`](Self::install_tables).
    pub fn tables(&self) -> Result<&TableAllocator<'static, TABLES>, EnvError> {
        self.tables.get().ok_or(EnvError::NotInitialized(TABLES_NAME))
    }
}

impl<U: UntypedMemory, M: LocalMapper, const TABLES: usize, const REGIONS: usize>
    CoreEnv<U, M, TABLES, REGIONS>
{
    /// Install the context area.
    ///
    /// # Errors
    /// [`EnvError::AlreadyInitialized`] on a second call.
    pub fn install(
        &self,
        area: ContextArea<U, M, REGIONS>,
    ) -> Result<&ContextArea<U, M, REGIONS>, EnvError> {
        let area = self
            .context_area
            .set(area)
            .map_err(|_| EnvError::AlreadyInitialized(CONTEXT_AREA_NAME))?;
        debug!(
            "core env: context area at {} ({:#x} bytes)",
            area.rm().layout().base(),
            area.rm().layout().size()
        );
        Ok(area)
    }

    /// # Errors
    /// [`EnvError::NotInitialized`] before [`install`](Self::install).
    pub fn context_area(&self) -> Result<&ContextArea<U, M, REGIONS>, EnvError> {
        self.context_area
            .get()
            .ok_or(EnvError::NotInitialized(CONTEXT_AREA_NAME))
    }

    /// # Errors
    /// [`EnvError::NotInitialized`] before [`install`](Self::install).
    pub fn context_area_rm(&self) -> Result<&ContextAreaRm<U, M, REGIONS>, EnvError> {
        self.context_area().map(ContextArea::rm)
    }

    /// # Errors
    /// [`EnvError::NotInitialized`] before [`install`](Self::install).
    pub fn context_area_ram(&self) -> Result<&ContextAreaRam, EnvError> {
        self.context_area().map(ContextArea::ram)
    }
}
