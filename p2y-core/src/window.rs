//! Fetch-window math: the date range handed to the aggregator.

use chrono::{DateTime, Duration, Utc};

/// Inclusive `[from, to]` range for a transaction fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl FetchWindow {
    /// Window ending at `now` and reaching `lookback` into the past.
    pub fn ending_at(now: DateTime<Utc>, lookback: Duration) -> Self {
        Self {
            from: now - lookback,
            to: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_spans_lookback() {
        let now = Utc::now();
        for days in [1, 7, 30] {
            let lookback = Duration::days(days);
            let window = FetchWindow::ending_at(now, lookback);
            assert_eq!(window.to, now);
            assert_eq!(window.to - window.from, lookback);
        }
    }
}
