//! # Core Memory Bootstrap
//!
//! Core has to build its own page tables and give its first threads a stack
//! before any of the regular memory services exist. This crate holds the two
//! allocators that make that possible without depending on the services they
//! help bring up.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────────┐
//! │   Translation Table Allocator │   │      Context Area (RM + RAM)     │
//! │  • one table per allocation   │   │  • attach = allocate + map       │
//! │  • phys ↔ virt translation    │   │  • descriptor catalog            │
//! │  • generic Allocator trait    │   │  • degenerate session stubs      │
//! └──────┬───────────────┬────────┘   └───────┬───────────────┬──────────┘
//!        │               │                    │               │
//! ┌──────▼──────┐ ┌──────▼──────┐     ┌───────▼──────┐ ┌──────▼──────┐
//! │  TablePool  │ │  BitSlots   │     │ UntypedMemory│ │ LocalMapper │
//! │ static, page│ │ first-fit   │     │  (kernel)    │ │ (platform)  │
//! │ aligned     │ │ tracker     │     └──────────────┘ └─────────────┘
//! └─────────────┘ └─────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Bit Slot Tracker ([`bit_slots`])
//!
//! Fixed-capacity free/used tracking. Always hands out the lowest free slot
//! and reports double or out-of-bounds releases.
//!
//! ### Translation Tables ([`translation_table`])
//!
//! A [`TablePool`](translation_table::TablePool) is a page-aligned array of
//! page-sized tables without any header, so the first table sits exactly at
//! the pool's address. A separate
//! [`TableAllocator`](translation_table::TableAllocator) administers it and
//! implements the [`Allocator`](allocator::Allocator) and
//! [`TranslationTableAllocator`](allocator::TranslationTableAllocator)
//! interfaces page-table code is written against.
//!
//! ### Context Area ([`context_area`])
//!
//! Backing store for thread contexts. Attaching a region takes memory from
//! [`UntypedMemory`](untyped::UntypedMemory), converts it to page frames and
//! maps it through [`LocalMapper`](map_local::LocalMapper). A request either
//! succeeds completely or leaves no trace.
//!
//! ### Environment ([`env`])
//!
//! [`CoreEnv`](env::CoreEnv) gives the rest of core install-once access to
//! both allocators.
//!
//! ## Concurrency
//!
//! Each allocator serializes its bookkeeping with one
//! [`SpinLock`](core_sync::SpinLock). The context area never holds the lock
//! while the kernel or the mapper run; it reserves the virtual range first
//! and commits or rolls back afterwards.
//!
//! ## Logging
//!
//! Failures are logged at `error`, calls to unimplemented session operations
//! at `warn`, each new mapping at `debug` and slot bookkeeping at `trace`,
//! all through the [`log`] facade.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod allocator;
pub mod bit_slots;
pub mod context_area;
pub mod env;
pub mod map_local;
pub mod translation_table;
pub mod untyped;

pub use allocator::{Allocator, CoreMemAlloc, TranslationTableAllocator};
pub use bit_slots::{BitSlots, SlotError};
pub use context_area::{ContextArea, ContextAreaError, ContextAreaLayout};
pub use env::{CoreEnv, EnvError};
pub use map_local::LocalMapper;
pub use translation_table::{TableAllocator, TableError, TableHandle, TablePool};
pub use untyped::{UntypedError, UntypedMemory};
