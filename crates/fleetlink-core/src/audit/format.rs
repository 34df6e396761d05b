//! Audit line formatting.

use chrono::{DateTime, Utc};

use super::severity::Severity;

/// Render one audit line: `"[<initial>] <HH:MM:SS>: <message>\n"`.
///
/// Pure function. Embedded newlines in `message` are preserved untouched;
/// only the trailing newline is appended.
pub fn format_line(severity: Severity, time: DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] {}: {}\n",
        severity.initial(),
        time.format("%H:%M:%S"),
        message
    )
}
