//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variables`

use chrono::{DateTime, Local};
use serde::Serialize;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Parsed `logging.access_log_format`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Combined,
    Common,
    Json,
    Custom(String),
}

impl LogFormat {
    pub fn parse(format: &str) -> Self {
        match format {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

/// One handled request, as recorded in the access log
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry stamped with the current time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &LogFormat) -> String {
        match format {
            LogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.common_line(),
                dash(self.referer.as_deref()),
                dash(self.user_agent.as_deref()),
            ),
            LogFormat::Common => self.common_line(),
            LogFormat::Json => serde_json::to_string(self)
                .unwrap_or_else(|e| format!(r#"{{"error":"unserializable access log entry: {e}"}}"#)),
            LogFormat::Custom(pattern) => self.format_custom(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.request_uri(), self.http_version)
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn common_line(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// Substitute `$variables` in a custom pattern
    ///
    /// Longer names are listed before their prefixes (`$request_time`
    /// before `$request`) so a shorter name never eats part of a longer one.
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        let variables = [
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", format!("{request_time:.3}")),
            ("$request_method", self.method.clone()),
            ("$request_uri", self.request_uri()),
            ("$request", self.request_line()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$http_referer", dash(self.referer.as_deref()).to_string()),
            ("$http_user_agent", dash(self.user_agent.as_deref()).to_string()),
        ];

        variables
            .iter()
            .fold(pattern.to_string(), |line, (name, value)| line.replace(name, value))
    }
}

fn dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "10.0.0.7".to_string(),
            "PUT".to_string(),
            "/movies/1".to_string(),
        );
        entry.query = Some("pretty=1".to_string());
        entry.status = 404;
        entry.body_bytes = 37;
        entry.user_agent = Some("curl/8.5.0".to_string());
        entry.request_time_us = 2600;
        entry
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(
            LogFormat::parse("$status"),
            LogFormat::Custom("$status".to_string())
        );
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format(&LogFormat::Common);
        assert!(log.starts_with("10.0.0.7 - - ["));
        assert!(log.ends_with("\"PUT /movies/1?pretty=1 HTTP/1.1\" 404 37"));
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format(&LogFormat::Combined);
        assert!(log.contains("\"PUT /movies/1?pretty=1 HTTP/1.1\" 404 37"));
        assert!(log.ends_with("\"-\" \"curl/8.5.0\""));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format(&LogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["method"], "PUT");
        assert_eq!(value["status"], 404);
        assert_eq!(value["referer"], serde_json::Value::Null);
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry()
            .format(&LogFormat::parse("$request_method $request_uri $status $request_time"));
        assert_eq!(log, "PUT /movies/1?pretty=1 404 0.003");
    }
}
