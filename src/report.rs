//! Human-readable rendering of buckets and timeline events.

use crate::stats::{Counter, StatsResult};
use crate::timeline::TimelineEvent;
use chrono::{DateTime, SecondsFormat, Utc};

fn stamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn percent(counter: &Counter) -> String {
    if counter.total == 0 {
        "-".to_string()
    } else {
        format!("{:.2}%", counter.availability * 100.0)
    }
}

/// Compact duration: `45s`, `12m 5s`, `3h 20m`, `2d 4h`.
pub fn format_duration(secs: u64) -> String {
    let (days, hours, mins, s) = (secs / 86_400, secs % 86_400 / 3600, secs % 3600 / 60, secs % 60);
    match (days, hours, mins) {
        (0, 0, 0) => format!("{}s", s),
        (0, 0, _) => format!("{}m {}s", mins, s),
        (0, _, _) => format!("{}h {}m", hours, mins),
        _ => format!("{}d {}h", days, hours),
    }
}

/// One table row for a bucket.
pub fn format_bucket(bucket: &StatsResult) -> String {
    format!(
        "{:<20} | {:<20} | {:>5}/{:<5} | {:>8} | {:>6}/{:<6} | {:>8}",
        stamp(bucket.start),
        stamp(bucket.end),
        bucket.runs.passes,
        bucket.runs.total,
        percent(&bucket.runs),
        bucket.tests.passes,
        bucket.tests.total,
        percent(&bucket.tests),
    )
}

pub fn bucket_header() -> String {
    format!(
        "{:<20} | {:<20} | {:>11} | {:>8} | {:>13} | {:>8}\n{:-<20}-|-{:-<20}-|-{:-<11}-|-{:-<8}-|-{:-<13}-|-{:-<8}",
        "Start", "End", "Runs", "Avail", "Tests", "Avail", "", "", "", "", "", ""
    )
}

/// One line for a timeline event.
pub fn format_event(event: &TimelineEvent) -> String {
    let runs = event.records.len();
    format!(
        "{:<8} {} -> {} ({}, {} run{})",
        event.status.to_string().to_uppercase(),
        stamp(event.start),
        stamp(event.end),
        format_duration(event.duration_sec),
        runs,
        if runs == 1 { "" } else { "s" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RunRecord, RunStatus, TestStats};
    use crate::timeline::EventStatus;
    use chrono::TimeDelta;
    use std::collections::VecDeque;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2018-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(725), "12m 5s");
        assert_eq!(format_duration(3 * 3600 + 20 * 60 + 7), "3h 20m");
        assert_eq!(format_duration(2 * 86_400 + 4 * 3600), "2d 4h");
    }

    #[test]
    fn test_format_bucket() {
        let mut bucket = StatsResult::new(t0(), t0() + TimeDelta::hours(1));
        let record = RunRecord::completed("r", RunStatus::Passed, Some(TestStats::new(3, 1)), t0());
        bucket.update(&record);

        let line = format_bucket(&bucket);
        assert!(line.contains("2018-01-01T00:00:00Z"));
        assert!(line.contains("100.00%"));
        assert!(line.contains("75.00%"));
    }

    #[test]
    fn test_format_empty_bucket() {
        let bucket = StatsResult::new(t0(), t0() + TimeDelta::hours(1));
        assert!(format_bucket(&bucket).contains(" - "));
    }

    #[test]
    fn test_format_event() {
        let record = RunRecord::completed("r", RunStatus::Failed, Some(TestStats::new(0, 2)), t0());
        let event = TimelineEvent {
            start: t0(),
            end: t0() + TimeDelta::minutes(10),
            status: EventStatus::Down,
            duration_sec: 600,
            records: VecDeque::from([record]),
        };
        let line = format_event(&event);
        assert!(line.starts_with("DOWN"));
        assert!(line.contains("10m 0s"));
        assert!(line.contains("1 run)"));
    }
}
