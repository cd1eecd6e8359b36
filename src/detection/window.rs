//! Sliding-window primitives over sorted timestamp sequences
//!
//! Both scans use two pointers: the right edge walks every timestamp, the
//! left edge advances until the span fits inside the window. Runs in O(n)
//! on input that is already sorted ascending.

/// True if some window of at most `window_ms` holds more than `threshold` timestamps
///
/// Stops at the first window over the threshold.
pub fn has_high_rate(timestamps: &[i64], window_ms: i64, threshold: usize) -> bool {
    let mut left = 0;
    for (right, &ts) in timestamps.iter().enumerate() {
        while ts - timestamps[left] > window_ms {
            left += 1;
        }
        if right - left + 1 > threshold {
            return true;
        }
    }
    false
}

/// Largest number of timestamps that fit inside one window of `window_ms`
pub fn count_within_window(timestamps: &[i64], window_ms: i64) -> usize {
    let mut max = 0;
    let mut left = 0;
    for (right, &ts) in timestamps.iter().enumerate() {
        while ts - timestamps[left] > window_ms {
            left += 1;
        }
        max = max.max(right - left + 1);
    }
    max
}
