//! Small shared helpers.

use chrono::Utc;

/// Returns the current millisecond timestamp, strictly greater than `last`.
///
/// Each store keeps its own `last` so ids stay unique within a session even
/// when several records are created in the same millisecond.
pub fn next_unique_millis(last: &mut i64) -> i64 {
    let mut millis = Utc::now().timestamp_millis();
    if millis <= *last {
        millis = *last + 1;
    }
    *last = millis;
    millis
}
