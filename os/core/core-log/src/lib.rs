//! # Core Logging Backend
//!
//! The crates in this workspace log exclusively through the [`log`] facade.
//! This crate provides the backend that core installs during early init:
//! [`CoreLogger`] formats each record as a single line and hands it to a
//! platform-provided [`LogSink`] (a serial port, a kernel debug console, or a
//! capture buffer in tests).
//!
//! ## Usage
//! ```rust,no_run
//! use core_log::{CoreLogger, LogSink};
//! use log::LevelFilter;
//!
//! struct DebugConsole;
//!
//! impl LogSink for DebugConsole {
//!     fn write_str(&self, _s: &str) {
//!         // push bytes to the kernel debug console
//!     }
//! }
//!
//! static CONSOLE: DebugConsole = DebugConsole;
//!
//! CoreLogger::new(LevelFilter::Debug, &CONSOLE)
//!     .init()
//!     .expect("logger installed twice");
//! log::info!("core memory bootstrap starting");
//! ```
//!
//! ## Level conventions
//!
//! * `error`: a request failed and the caller gets an error back.
//! * `warn`: an interface member without an implementation was called.
//! * `debug`: per-request tracing (addresses and sizes of new mappings).
//! * `trace`: slot-level bookkeeping.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod logger;

pub use logger::{CoreLogger, LogSink, LoggerError};
