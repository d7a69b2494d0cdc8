use core::fmt::{self, Write};
use core_sync::SyncOnceCell;
use log::{LevelFilter, Log, Metadata, Record};

/// Byte sink for log output, typically the platform's debug console.
///
/// Implementations must be callable from any thread; output of concurrent
/// records may interleave.
pub trait LogSink: Sync {
    fn write_str(&self, s: &str);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LoggerError {
    #[error("a logger is already installed")]
    AlreadyInstalled,
}

/// `log::Log` implementation for core.
///
/// Records are written as `[LEVEL] target: message` lines into a
/// [`LogSink`]. No allocation takes place, so the logger works before any
/// heap exists.
pub struct CoreLogger {
    max_level: LevelFilter,
    sink: &'static dyn LogSink,
}

static LOGGER: SyncOnceCell<CoreLogger> = SyncOnceCell::new();

impl CoreLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter, sink: &'static dyn LogSink) -> Self {
        Self { max_level, sink }
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Install the logger process-wide. Call this once during early init.
    ///
    /// # Errors
    /// [`LoggerError::AlreadyInstalled`] if this or any other `log` backend
    /// was installed before.
    pub fn init(self) -> Result<(), LoggerError> {
        let max_level = self.max_level;
        let logger = LOGGER
            .set(self)
            .map_err(|_| LoggerError::AlreadyInstalled)?;
        log::set_logger(logger).map_err(|_| LoggerError::AlreadyInstalled)?;
        log::set_max_level(max_level);
        Ok(())
    }
}

/// Adapter so `core::fmt` can write straight into the sink.
struct SinkWriter<'a>(&'a dyn LogSink);

impl Write for SinkWriter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

impl Log for CoreLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // sink errors are dropped
        let _ = writeln!(
            SinkWriter(self.sink),
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        // sinks are unbuffered
    }
}
