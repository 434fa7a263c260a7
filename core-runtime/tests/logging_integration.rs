//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

// Global subscriber can only be installed once per process, so everything
// that depends on it lives in this one test.
#[test]
fn test_logging_initializes_once_and_mirrors_to_sink() {
    let sink = Arc::new(CollectingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first initialization succeeds");

    tracing::info!(target: "core_session", media_id = "track-7", "Foreground started");
    tracing::debug!(target: "hyper", "filtered out by default directives");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Foreground started");
        assert_eq!(entries[0].fields.get("media_id").map(String::as_str), Some("track-7"));
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
    assert!(config.enable_spans);
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/user/music/catalog.json"), "catalog.json");
    assert_eq!(strip_path("D:\\data\\file.flac"), "file.flac");
    assert_eq!(strip_path("filename.txt"), "filename.txt");
    assert_eq!(strip_path(""), "");
}
