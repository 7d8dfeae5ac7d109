//! Human-readable rendering of durations and information sizes.

use std::time::Duration;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count as a human-readable size.
///
/// Negative input is clamped to zero; sizes beyond the terabyte range
/// stay in terabytes. Values are rounded to `precision` decimal places
/// and rendered without trailing zero padding: `0 B`, `1 KB`, `1.5 KB`.
pub fn format_bytes(bytes: i64, precision: u32) -> String {
    let bytes = bytes.max(0) as f64;
    let power = if bytes > 0.0 {
        // log2(x) / 10 == log1024(x)
        ((bytes.log2() / 10.0).floor() as i32).clamp(0, BYTE_UNITS.len() as i32 - 1)
    } else {
        0
    };
    let scale = 10f64.powi(precision as i32);
    let value = (bytes / 1024f64.powi(power) * scale).round() / scale;
    format!("{} {}", value, BYTE_UNITS[power as usize])
}

/// Converts a duration into milliseconds, rounded to two decimal places.
pub(crate) fn duration_to_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}
