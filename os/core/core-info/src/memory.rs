//! # Core Memory Layout

/// Base page size; the granule of translation tables and of context mappings.
pub const PAGE_SIZE: u64 = 4096;

/// Start of the virtual window reserved for thread contexts in core's own
/// address space.
///
/// Every thread's context (stack plus thread-local bookkeeping) is placed at
/// `CONTEXT_AREA_VIRTUAL_BASE + n * CONTEXT_VIRTUAL_SIZE`.
pub const CONTEXT_AREA_VIRTUAL_BASE: u64 = 0x4000_0000;

/// Size of the thread-context window.
pub const CONTEXT_AREA_VIRTUAL_SIZE: u64 = 0x1000_0000; // 256 MiB

/// Virtual space reserved for a single thread context.
pub const CONTEXT_VIRTUAL_SIZE: u64 = 0x10_0000; // 1 MiB

/// Upper bound on the number of thread contexts the window can hold.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_THREAD_CONTEXTS: usize = (CONTEXT_AREA_VIRTUAL_SIZE / CONTEXT_VIRTUAL_SIZE) as usize;

/// Number of translation tables in core's statically reserved table pool.
pub const TRANSLATION_TABLES: usize = 256;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(CONTEXT_AREA_VIRTUAL_BASE.is_multiple_of(PAGE_SIZE));
    assert!(CONTEXT_AREA_VIRTUAL_SIZE.is_multiple_of(CONTEXT_VIRTUAL_SIZE));
    assert!(CONTEXT_VIRTUAL_SIZE.is_multiple_of(PAGE_SIZE));
    assert!(CONTEXT_AREA_VIRTUAL_BASE.checked_add(CONTEXT_AREA_VIRTUAL_SIZE).is_some());
    assert!(MAX_THREAD_CONTEXTS > 0);
    assert!(TRANSLATION_TABLES > 0);
};
