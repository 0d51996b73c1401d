//! Log line formats.

use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// {"timestamp":"2024-01-15T10:30:00Z","level":"INFO","target":"...","message":"..."}
    Json,
    /// 2024-01-15 10:30:00.000 INFO  [roster_core::ingest] ...
    Human,
    /// timestamp=2024-01-15T10:30:00Z level=INFO target=roster_core::ingest message="..."
    Logfmt,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "json" => Some(LogFormat::Json),
            "human" => Some(LogFormat::Human),
            "logfmt" => Some(LogFormat::Logfmt),
            _ => None,
        }
    }

    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json => format_json(entry),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
        }
    }
}

/// One captured log record.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: log::Level, message: impl Into<String>, target: impl Into<String>) -> Self {
        Self { timestamp: Utc::now(), level, target: target.into(), message: message.into() }
    }

    pub fn from_record(record: &log::Record) -> Self {
        Self::new(record.level(), record.args().to_string(), record.target())
    }
}

fn format_json(entry: &LogEntry) -> String {
    serde_json::json!({
        "timestamp": entry.timestamp.to_rfc3339(),
        "level": entry.level.as_str(),
        "target": entry.target,
        "message": entry.message,
    })
    .to_string()
}

fn format_human(entry: &LogEntry) -> String {
    format!(
        "{} {:5} [{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        entry.level.as_str(),
        entry.target,
        entry.message
    )
}

fn format_logfmt(entry: &LogEntry) -> String {
    format!(
        "timestamp={} level={} target={} message=\"{}\"",
        entry.timestamp.to_rfc3339(),
        entry.level.as_str(),
        entry.target,
        entry.message.replace('"', "\\\"")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LogEntry {
        LogEntry::new(log::Level::Warn, "Skipping row \"7\"", "roster_core::employee")
    }

    #[test]
    fn test_json_format() {
        let line = LogFormat::Json.format_entry(&entry());
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["message"], "Skipping row \"7\"");
        assert_eq!(parsed["target"], "roster_core::employee");
    }

    #[test]
    fn test_human_format() {
        let line = LogFormat::Human.format_entry(&entry());
        assert!(line.contains("WARN  [roster_core::employee] Skipping row"));
    }

    #[test]
    fn test_logfmt_escapes_quotes() {
        let line = LogFormat::Logfmt.format_entry(&entry());
        assert!(line.ends_with("message=\"Skipping row \\\"7\\\"\""));
    }

    #[test]
    fn test_parse() {
        assert_eq!(LogFormat::parse("logfmt"), Some(LogFormat::Logfmt));
        assert_eq!(LogFormat::parse("xml"), None);
    }
}
