//! Utility functions for Model Fetcher
//!
//! This module provides formatting helpers used by log lines and the run summary.

use std::time::Duration;
use bytesize::ByteSize;

/// Formats a byte size into a human-readable string
///
/// # Examples
///
/// ```
/// use common::utils::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string_as(true)
}

/// Formats a duration into a human-readable string
///
/// # Examples
///
/// ```
/// use common::utils::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs == 0 {
        return format!("{}ms", duration.subsec_millis());
    }

    let hours = total_secs / (60 * 60);
    let minutes = (total_secs % (60 * 60)) / 60;
    let seconds = total_secs % 60;

    let mut result = String::new();

    if hours > 0 {
        result.push_str(&format!("{}h ", hours));
    }

    if minutes > 0 || !result.is_empty() {
        result.push_str(&format!("{}m ", minutes));
    }

    result.push_str(&format!("{}s", seconds));

    result
}

/// Formats a download position as a percentage of the expected total
///
/// Returns `None` when the total is unknown.
pub fn format_progress(downloaded: u64, total: Option<u64>) -> Option<String> {
    match total {
        Some(total) if total > 0 => {
            let percent = downloaded as f64 / total as f64 * 100.0;
            Some(format!("{:.1}%", percent.min(100.0)))
        }
        _ => None,
    }
}

/// Truncates a string to a maximum length, adding an ellipsis if truncated
///
/// # Examples
///
/// ```
/// use common::utils::truncate_string;
///
/// assert_eq!(truncate_string("Hello, world!", 5), "Hello...");
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// ```
pub fn truncate_string(s: &str, max_length: usize) -> String {
    if s.chars().count() <= max_length {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_length).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(3605)), "1h 0m 5s");
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(50, Some(200)).as_deref(), Some("25.0%"));
        assert_eq!(format_progress(50, None), None);
        assert_eq!(format_progress(50, Some(0)), None);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_string("模型下载失败", 2), "模型...");
    }
}
