//! Wall-clock helpers
//!
//! Account and session timestamps are Unix epoch seconds. Fact-check records
//! are stamped in Unix epoch milliseconds so history can order checks made
//! within the same second.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds in one day
pub const DAY_SECS: u64 = 24 * 60 * 60;

/// Seconds in one week; the default session lifetime and credit period
pub const WEEK_SECS: u64 = 7 * DAY_SECS;

static LAST_RECORD_MILLIS: AtomicU64 = AtomicU64::new(0);

fn since_epoch() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Current Unix time in seconds
///
/// A clock set before 1970 reads as 0 rather than failing.
pub fn now_secs() -> u64 {
    since_epoch().as_secs()
}

/// Current Unix time in milliseconds
pub fn now_millis() -> u64 {
    since_epoch().as_millis() as u64
}

/// Creation stamp for a new fact-check record, in Unix milliseconds
///
/// Strictly increasing within the process: a call in the same millisecond as
/// the previous one, or after the clock stepped back, gets the previous
/// stamp plus one.
pub fn record_millis() -> u64 {
    let now = now_millis();
    let previous = LAST_RECORD_MILLIS
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(previous + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_is_seven_days() {
        assert_eq!(WEEK_SECS, 604_800);
    }

    #[test]
    fn test_now_is_after_2020() {
        assert!(now_secs() > 1_577_836_800);
        assert!(now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_record_millis_strictly_increase() {
        let stamps: Vec<u64> = (0..1_000).map(|_| record_millis()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert!(stamps[0] >= now_millis() - 1_000);
    }

    #[test]
    fn test_record_millis_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| record_millis()).collect::<Vec<_>>()))
            .collect();

        let mut stamps: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = stamps.len();
        stamps.sort_unstable();
        stamps.dedup();
        assert_eq!(stamps.len(), total);
    }
}
