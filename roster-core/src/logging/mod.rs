//! Process-wide logging on top of the `log` facade.
//!
//! ```rust,no_run
//! use roster_core::config::LoggingConfig;
//!
//! roster_core::logging::init_logging(&LoggingConfig::default()).unwrap();
//! log::info!("Server starting on port {}", 8080);
//! ```

pub mod formatter;

pub use formatter::{LogEntry, LogFormat};

use crate::config::LoggingConfig;
use anyhow::{anyhow, Context};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

/// Install the global logger. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = init_logging_internal(config);
    });
    result
}

fn init_logging_internal(config: &LoggingConfig) -> anyhow::Result<()> {
    if config.format == "env" {
        env_logger::Builder::from_default_env()
            .format_timestamp_millis()
            .format_module_path(false)
            .try_init()?;
        return Ok(());
    }

    let level: log::LevelFilter =
        config.level.parse().map_err(|_| anyhow!("Invalid log level '{}'", config.level))?;
    let format = LogFormat::parse(&config.format)
        .ok_or_else(|| anyhow!("Invalid log format '{}'", config.format))?;
    let sink = match config.output.as_str() {
        "stdout" => Sink::Stdout,
        "file" => Sink::File(Mutex::new(open_log_file(&config.file_path)?)),
        _ => Sink::Stderr,
    };

    log::set_boxed_logger(Box::new(RosterLogger { level, format, sink }))?;
    log::set_max_level(level);
    Ok(())
}

fn open_log_file(path: &str) -> anyhow::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path))
}

enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

struct RosterLogger {
    level: log::LevelFilter,
    format: LogFormat,
    sink: Sink,
}

impl log::Log for RosterLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format.format_entry(&LogEntry::from_record(record));
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Stderr => eprintln!("{}", line),
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{}", line);
                }
            }
        }
    }

    fn flush(&self) {
        match &self.sink {
            Sink::Stdout => {
                let _ = std::io::stdout().flush();
            }
            Sink::Stderr => {
                let _ = std::io::stderr().flush();
            }
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = file.flush();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_logger_respects_level() {
        let logger = RosterLogger {
            level: log::LevelFilter::Warn,
            format: LogFormat::Json,
            sink: Sink::Stderr,
        };
        let info = log::Metadata::builder().level(log::Level::Info).build();
        let error = log::Metadata::builder().level(log::Level::Error).build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }

    #[test]
    fn test_file_sink_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("roster.log");
        let file = open_log_file(path.to_str().unwrap()).unwrap();
        let logger = RosterLogger {
            level: log::LevelFilter::Info,
            format: LogFormat::Logfmt,
            sink: Sink::File(Mutex::new(file)),
        };

        logger.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .target("roster_core::ingest")
                .args(format_args!("Ingested {} rows", 3))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        let expected = "level=INFO target=roster_core::ingest message=\"Ingested 3 rows\"";
        assert!(content.contains(expected));
    }
}
