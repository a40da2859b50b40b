//! Access log format module
//!
//! Renders access log entries as Apache/Nginx `combined` lines, `common`
//! (CLF) lines, or structured JSON.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Access log entry covering one request/response pair
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: DateTime<Local>,
    /// HTTP method (GET, HEAD, etc.)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: u64,
    /// Referer header
    pub referer: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
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

    /// Format the log entry according to the configured format.
    /// Unknown format names fall back to `combined`.
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    /// The quoted request line: `METHOD /path?query HTTP/version`
    fn request_line(&self) -> String {
        match &self.query {
            Some(q) => format!("{} {}?{} HTTP/{}", self.method, self.path, q, self.http_version),
            None => format!("{} {} HTTP/{}", self.method, self.path, self.http_version),
        }
    }

    /// Apache/Nginx Combined Log Format
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {} \"{}\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// JSON structured log format
    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.format_common())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.1".to_string(),
            "GET".to_string(),
            "/listing".to_string(),
        );
        entry.query = Some("page=1".to_string());
        entry.status = 200;
        entry.body_bytes = 1234;
        entry.referer = Some("https://example.com".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.request_time_us = 1500;
        entry
    }

    #[test]
    fn combined_format_carries_the_full_line() {
        let log = create_test_entry().format("combined");
        assert!(log.contains("192.168.1.1"));
        assert!(log.contains("\"GET /listing?page=1 HTTP/1.1\""));
        assert!(log.contains("200 1234"));
        assert!(log.contains("\"https://example.com\""));
        assert!(log.contains("\"Mozilla/5.0\""));
    }

    #[test]
    fn common_format_omits_referer_and_user_agent() {
        let log = create_test_entry().format("common");
        assert!(log.contains("192.168.1.1"));
        assert!(log.contains("\"GET /listing?page=1 HTTP/1.1\""));
        assert!(log.contains("200 1234"));
        assert!(!log.contains("example.com"));
        assert!(!log.contains("Mozilla"));
    }

    #[test]
    fn json_format_is_parseable_with_expected_fields() {
        let log = create_test_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).expect("valid json");
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["path"], "/listing");
        assert_eq!(value["query"], "page=1");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 1234);
        assert_eq!(value["request_time_us"], 1500);
    }

    #[test]
    fn missing_headers_render_as_dashes() {
        let entry = AccessLogEntry::new("10.0.0.1".to_string(), "GET".to_string(), "/".to_string());
        let log = entry.format("combined");
        assert!(log.contains("\"GET / HTTP/1.1\""));
        assert!(log.ends_with("\"-\" \"-\""));
    }

    #[test]
    fn unknown_format_falls_back_to_combined() {
        let entry = create_test_entry();
        assert_eq!(entry.format("no-such-format"), entry.format("combined"));
    }
}
