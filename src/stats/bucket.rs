//! Per-bucket pass/fail accumulator.

use crate::record::RunRecord;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Pass/fail tally with a running availability ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub availability: f64,
    pub passes: u64,
    pub failures: u64,
    pub total: u64,
}

impl Counter {
    fn add(&mut self, passes: u64, failures: u64) {
        self.passes += passes;
        self.failures += failures;
        self.total = self.passes + self.failures;
        // Empty counters report 0 rather than NaN
        self.availability = if self.total == 0 {
            0.0
        } else {
            self.passes as f64 / self.total as f64
        };
    }
}

/// Aggregated run and test outcomes over one time span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub start: DateTime<Utc>,
    /// Inclusive: the last millisecond of the span.
    pub end: DateTime<Utc>,
    pub runs: Counter,
    pub tests: Counter,
}

impl StatsResult {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            runs: Counter::default(),
            tests: Counter::default(),
        }
    }

    /// First instant after the span.
    pub fn exclusive_end(&self) -> DateTime<Utc> {
        self.end + TimeDelta::milliseconds(1)
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.exclusive_end()
    }

    /// Fold one run into the bucket. Records without test stats are skipped.
    ///
    /// Runs are counted by outcome (`passed` or not); tests by their counts.
    pub fn update(&mut self, record: &RunRecord) -> &mut Self {
        let Some(stats) = record.stats else {
            return self;
        };

        if record.is_passed() {
            self.runs.add(1, 0);
        } else {
            self.runs.add(0, 1);
        }
        self.tests.add(stats.passes, stats.failures);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RunStatus, TestStats};
    use chrono::TimeZone;

    fn day_bucket() -> StatsResult {
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        StatsResult::new(start, start + TimeDelta::days(1))
    }

    fn record(status: RunStatus, stats: Option<TestStats>) -> RunRecord {
        RunRecord {
            id: "rs-run-id".into(),
            status,
            stats,
            completed_at: None,
            timeout_type: None,
        }
    }

    #[test]
    fn test_new_bucket_is_zeroed() {
        let bucket = day_bucket();
        assert_eq!(bucket.runs, Counter::default());
        assert_eq!(bucket.tests, Counter::default());
        assert_eq!(bucket.runs.availability, 0.0);
    }

    #[test]
    fn test_update_with_failure() {
        let mut bucket = day_bucket();
        bucket.update(&record(RunStatus::Failed, Some(TestStats::new(3, 2))));

        assert_eq!(
            bucket.runs,
            Counter { availability: 0.0, passes: 0, failures: 1, total: 1 }
        );
        assert_eq!(
            bucket.tests,
            Counter { availability: 0.6, passes: 3, failures: 2, total: 5 }
        );
    }

    #[test]
    fn test_update_with_success() {
        let mut bucket = day_bucket();
        bucket.update(&record(RunStatus::Passed, Some(TestStats::new(3, 0))));

        assert_eq!(
            bucket.runs,
            Counter { availability: 1.0, passes: 1, failures: 0, total: 1 }
        );
        assert_eq!(
            bucket.tests,
            Counter { availability: 1.0, passes: 3, failures: 0, total: 3 }
        );
    }

    #[test]
    fn test_update_without_stats_is_noop() {
        let mut bucket = day_bucket();
        bucket.update(&record(RunStatus::Passed, None));
        assert_eq!(bucket, day_bucket());
    }

    #[test]
    fn test_zero_test_run_still_counts_as_run() {
        let mut bucket = day_bucket();
        bucket
            .update(&record(RunStatus::Passed, Some(TestStats::new(0, 0))))
            .update(&record(RunStatus::Failed, Some(TestStats::new(0, 0))));
        assert_eq!(bucket.runs.total, 2);
        assert_eq!(bucket.runs.availability, 0.5);
        assert_eq!(bucket.tests.total, 0);
        assert_eq!(bucket.tests.availability, 0.0);
    }

    #[test]
    fn test_contains_includes_last_millisecond() {
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        let bucket = StatsResult::new(start, start + TimeDelta::days(1) - TimeDelta::milliseconds(1));
        assert!(bucket.contains(start));
        assert!(bucket.contains(bucket.end));
        assert!(!bucket.contains(start + TimeDelta::days(1)));
        assert!(!bucket.contains(start - TimeDelta::milliseconds(1)));
    }
}
