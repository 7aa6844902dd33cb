//! Desktop Platform Services

use bridge_traits::{error::Result, LogEntry, LogLevel, LoggerSink, PlatformApi};
use parking_lot::Mutex;
use std::sync::Arc;

/// Host API version reported by [`DesktopPlatform`].
pub const DESKTOP_PLATFORM_VERSION: u32 = 1;

/// [`PlatformApi`] for in-process desktop embedders.
#[derive(Clone, Default)]
pub struct DesktopPlatform {
    logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl DesktopPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror decoder logs into `sink`.
    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }
}

impl PlatformApi for DesktopPlatform {
    fn version(&self) -> u32 {
        DESKTOP_PLATFORM_VERSION
    }

    fn logger_sink(&self) -> Option<Arc<dyn LoggerSink>> {
        self.logger_sink.clone()
    }
}

/// [`LoggerSink`] keeping entries in memory.
#[derive(Debug)]
pub struct MemoryLoggerSink {
    min_level: LogLevel,
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLoggerSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl Default for MemoryLoggerSink {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl LoggerSink for MemoryLoggerSink {
    fn log(&self, entry: LogEntry) -> Result<()> {
        self.entries.lock().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_without_sink() {
        let platform = DesktopPlatform::new();
        assert_eq!(platform.version(), DESKTOP_PLATFORM_VERSION);
        assert!(platform.logger_sink().is_none());
    }

    #[test]
    fn test_platform_exposes_sink() {
        let sink = Arc::new(MemoryLoggerSink::new(LogLevel::Debug));
        let platform = DesktopPlatform::new().with_logger_sink(sink.clone());

        let exposed = platform.logger_sink().unwrap();
        assert_eq!(exposed.min_level(), LogLevel::Debug);
        exposed
            .log(LogEntry::new(LogLevel::Warn, "core_decoder", "hello"))
            .unwrap();
        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.entries()[0].message, "hello");
    }
}
