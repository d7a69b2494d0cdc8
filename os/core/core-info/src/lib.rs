//! # Core Memory Configuration
//!
//! Platform constants shared by everything in core that touches memory
//! layout before the general session machinery exists: the page granule,
//! the size of the static translation-table pool, and the placement of the
//! thread-context area.
//!
//! ## Virtual Address Layout
//!
//! ```text
//! CONTEXT_AREA_VIRTUAL_BASE ┌─────────────────────────────────┐ 0x4000_0000
//!                           │ context 0                       │
//!                           ├─────────────────────────────────┤ + CONTEXT_VIRTUAL_SIZE
//!                           │ context 1                       │
//!                           ├─────────────────────────────────┤
//!                           │ ...                             │
//!                           │ (MAX_THREAD_CONTEXTS slots)     │
//!                           └─────────────────────────────────┘ + CONTEXT_AREA_VIRTUAL_SIZE
//! ```
//!
//! Only the parts of a context slot that are actually attached are backed by
//! memory; the rest of the window stays unmapped.
//!
//! ## Configuration Management
//!
//! All values are `const` and validated with compile-time assertions, so a
//! bad layout fails the build instead of corrupting page tables at runtime.
//! Consumers that need a different window (tests, other boards) pass an
//! explicit layout to the context area instead of patching these values.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
