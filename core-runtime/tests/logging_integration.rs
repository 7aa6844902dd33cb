//! Integration tests for the logging system
//!
//! A global subscriber can be installed once per process, so everything that
//! needs an installed subscriber lives in a single test.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::log::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl CollectingSink {
    fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LoggerSink for CollectingSink {
    fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

#[test]
fn test_installed_subscriber_forwards_to_sink() {
    let sink = Arc::new(CollectingSink::default());

    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_filter("logging_integration=debug")
        .with_logger_sink(sink.clone());
    init_logging(config).unwrap();

    let span = tracing::info_span!("decode", session = "7f3c");
    span.in_scope(|| {
        tracing::debug!(samples = 2048u64, "frame decoded");
        tracing::trace!("filtered out");
    });
    tracing::warn!("outside any span");

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].level, LogLevel::Debug);
    assert_eq!(entries[0].message, "frame decoded");
    assert_eq!(entries[0].target, "logging_integration");
    assert_eq!(entries[0].fields.get("samples"), Some(&"2048".to_string()));
    assert_eq!(entries[0].span_id.as_deref(), Some("decode"));
    assert_eq!(entries[0].fields.get("session"), Some(&"7f3c".to_string()));

    assert_eq!(entries[1].level, LogLevel::Warn);
    assert!(entries[1].span_id.is_none());
    assert!(entries[1].fields.is_empty());

    // The global subscriber is already set
    assert!(init_logging(LoggingConfig::default()).is_err());
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
