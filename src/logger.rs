use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, Sink, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Log, LogLevel};

const KEPT_LOG_FILES: usize = 30;

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

// Warnings and errors go to stderr, the rest to stdout
fn console_sinks() -> spdlog::Result<Vec<Arc<dyn Sink>>> {
    let stdout = StdStreamSink::builder()
        .std_stream(StdStream::Stdout)
        .level_filter(LevelFilter::MoreVerbose(Level::Warn))
        .build()?;

    let stderr = StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
        .build()?;

    Ok(vec![Arc::new(stdout), Arc::new(stderr)])
}

fn log_sinks(log: &Log) -> spdlog::Result<Vec<Arc<dyn Sink>>> {
    let mut sinks: Vec<Arc<dyn Sink>> = vec![];

    if let Some(ref location) = log.location {
        let daily_sink = RotatingFileSink::builder()
            .base_path(location)
            .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
            .max_files(KEPT_LOG_FILES)
            .rotate_on_open(false)
            .build()?;
        sinks.push(Arc::new(daily_sink));
    }

    // Records always need somewhere to go
    if log.log_to_console || sinks.is_empty() {
        sinks.extend(console_sinks()?);
    }

    Ok(sinks)
}

/// Replaces spdlog's default logger with one honoring `[log]`: the level,
/// a daily rotating file at `location`, and console output.
pub fn configure_logger(log: &Log) -> spdlog::Result<()> {
    let mut builder = Logger::builder();
    for sink in log_sinks(log)? {
        builder.sink(sink);
    }

    let logger = Arc::new(builder.build()?);
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));
    if log.location.is_some() {
        logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn));
        logger.set_flush_period(Some(Duration::from_secs(2)));
    }

    spdlog::set_default_logger(logger);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(Level::from(LogLevel::Critical), Level::Critical);
        assert_eq!(Level::from(LogLevel::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevel::Trace), Level::Trace);
    }

    #[test]
    fn test_log_sinks() {
        let tmp = TempDir::new().unwrap();
        let file_log = |log_to_console| Log {
            level: LogLevel::Info,
            log_to_console,
            location: Some(tmp.path().join("server.log")),
        };

        assert_eq!(log_sinks(&file_log(false)).unwrap().len(), 1);
        assert_eq!(log_sinks(&file_log(true)).unwrap().len(), 3);

        let console_only = Log { level: LogLevel::Debug, log_to_console: false, location: None };
        assert_eq!(log_sinks(&console_only).unwrap().len(), 2);
    }
}
