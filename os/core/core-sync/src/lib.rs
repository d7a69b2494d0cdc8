//! # Core synchronization primitives
//!
//! Core runs its bootstrap allocators in a single mutual-exclusion domain:
//! [`SpinLock`] serializes mutations of allocator bookkeeping, and
//! [`SyncOnceCell`] holds process-wide state that is installed once and read
//! afterwards. Neither needs an allocator or an OS, so both are usable before
//! anything else in core is up.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod raw_spin;
mod spin_lock;
mod sync_once_cell;

pub use raw_spin::RawSpin;
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
