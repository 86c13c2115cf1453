//! Range and bucket boundary arithmetic.
//!
//! Two framing modes:
//! - absolute: every edge snaps to a calendar unit (`2018-01-01` .. `2018-01-31T23:59:59.999`).
//! - relative: rolling windows of a fixed length measured in the lower unit,
//!   ending at the requested end. A relative "month" is 30 days.
//!
//! Bucket ends are inclusive and fall on the last millisecond of the period.

use super::{BucketSize, LowerUnit};
use chrono::{DateTime, Datelike, Months, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use serde::Serialize;

/// Frame for a bucketing pass: the full range plus the first bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Boundaries {
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
    pub bucket_start: DateTime<Utc>,
    pub bucket_end: DateTime<Utc>,
}

/// Calendar units edges are snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl From<BucketSize> for Unit {
    fn from(size: BucketSize) -> Self {
        match size {
            BucketSize::Hour => Unit::Hour,
            BucketSize::Day => Unit::Day,
            BucketSize::Week => Unit::Week,
            BucketSize::Month => Unit::Month,
        }
    }
}

impl From<LowerUnit> for Unit {
    fn from(lower: LowerUnit) -> Self {
        match lower {
            LowerUnit::Minute => Unit::Minute,
            LowerUnit::Hour => Unit::Hour,
            LowerUnit::Day => Unit::Day,
        }
    }
}

impl Unit {
    fn start_of(self, t: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = Utc.from_utc_datetime(&t.date_naive().and_time(NaiveTime::default()));
        match self {
            Unit::Minute => {
                midnight + TimeDelta::hours(t.hour() as i64) + TimeDelta::minutes(t.minute() as i64)
            }
            Unit::Hour => midnight + TimeDelta::hours(t.hour() as i64),
            Unit::Day => midnight,
            // ISO weeks start on Monday
            Unit::Week => midnight - TimeDelta::days(t.weekday().num_days_from_monday() as i64),
            Unit::Month => midnight - TimeDelta::days(t.day0() as i64),
        }
    }

    /// Last millisecond of the unit containing `t`.
    fn end_of(self, t: DateTime<Utc>) -> DateTime<Utc> {
        self.add_one(self.start_of(t)) - TimeDelta::milliseconds(1)
    }

    /// Calendar addition of one unit. Month addition clamps to the last day
    /// of shorter months (Jan 31 + 1 month = Feb 28).
    fn add_one(self, t: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Unit::Minute => t + TimeDelta::minutes(1),
            Unit::Hour => t + TimeDelta::hours(1),
            Unit::Day => t + TimeDelta::days(1),
            Unit::Week => t + TimeDelta::weeks(1),
            Unit::Month => t
                .checked_add_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Number of whole-or-partial units between `start` and `end`, using the
/// fixed unit length. Zero for empty or inverted ranges.
pub fn bucket_count(start: DateTime<Utc>, end: DateTime<Utc>, size: BucketSize) -> i32 {
    let span = (end - start).num_milliseconds();
    if span <= 0 {
        return 0;
    }
    let unit = size.fixed_duration().num_milliseconds();
    let count = (span + unit - 1) / unit;
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Compute the aligned range and the first bucket for a bucketing pass.
pub fn compute_boundaries(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    size: BucketSize,
    relative: bool,
) -> Boundaries {
    let unit = Unit::from(size);
    let lower = Unit::from(size.lower());
    let lower_step = size.lower().duration();

    if relative {
        let count = bucket_count(start, end, size);
        let range_end = lower.end_of(end);
        let range_start = lower.start_of(range_end - size.fixed_duration() * count + lower_step);
        let bucket_start = range_start;
        let bucket_end = lower.end_of(bucket_start + size.fixed_duration() - lower_step);

        Boundaries {
            range_start,
            range_end,
            bucket_start,
            bucket_end,
        }
    } else {
        let range_start = unit.start_of(start);
        let range_end = unit.end_of(end);

        Boundaries {
            range_start,
            range_end,
            bucket_start: range_start,
            bucket_end: unit.end_of(range_start),
        }
    }
}

/// Advance a bucket span by one unit.
pub fn next_bucket(
    bucket_start: DateTime<Utc>,
    bucket_end: DateTime<Utc>,
    size: BucketSize,
    relative: bool,
) -> (DateTime<Utc>, DateTime<Utc>) {
    if relative {
        let step = size.fixed_duration();
        (bucket_start + step, bucket_end + step)
    } else {
        let unit = Unit::from(size);
        (
            unit.start_of(unit.add_one(bucket_start)),
            unit.end_of(unit.add_one(bucket_end)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_snap_edges() {
        let t = iso("2018-01-03T13:47:21.250Z");
        assert_eq!(Unit::Minute.start_of(t), iso("2018-01-03T13:47:00Z"));
        assert_eq!(Unit::Hour.end_of(t), iso("2018-01-03T13:59:59.999Z"));
        assert_eq!(Unit::Day.start_of(t), iso("2018-01-03T00:00:00Z"));
        assert_eq!(Unit::Week.start_of(t), iso("2018-01-01T00:00:00Z"));
        assert_eq!(Unit::Week.end_of(t), iso("2018-01-07T23:59:59.999Z"));
        assert_eq!(Unit::Month.start_of(t), iso("2018-01-01T00:00:00Z"));
        assert_eq!(Unit::Month.end_of(iso("2018-02-10T00:00:00Z")), iso("2018-02-28T23:59:59.999Z"));
        assert_eq!(Unit::Month.end_of(iso("2016-02-10T00:00:00Z")), iso("2016-02-29T23:59:59.999Z"));
    }

    #[test]
    fn test_bucket_count() {
        let start = iso("2018-01-02T00:00:00Z");
        assert_eq!(bucket_count(start, start + TimeDelta::days(35), BucketSize::Month), 2);
        assert_eq!(bucket_count(start, start + TimeDelta::days(7), BucketSize::Week), 1);
        assert_eq!(bucket_count(start, start + TimeDelta::minutes(61), BucketSize::Hour), 2);
        assert_eq!(bucket_count(start, start, BucketSize::Day), 0);
        assert_eq!(bucket_count(start, start - TimeDelta::days(3), BucketSize::Day), 0);
    }

    #[test]
    fn test_relative_month_boundaries() {
        let start = iso("2018-01-02T00:00:00Z");
        let b = compute_boundaries(start, start + TimeDelta::days(35), BucketSize::Month, true);

        // two 30-day windows ending on the requested day
        assert_eq!(b.range_start, iso("2017-12-09T00:00:00Z"));
        assert_eq!(b.range_end, iso("2018-02-06T23:59:59.999Z"));
        assert_eq!(b.bucket_start, iso("2017-12-09T00:00:00Z"));
        assert_eq!(b.bucket_end, iso("2018-01-07T23:59:59.999Z"));

        let (next_start, next_end) = next_bucket(b.bucket_start, b.bucket_end, BucketSize::Month, true);
        assert_eq!(next_start, iso("2018-01-08T00:00:00Z"));
        assert_eq!(next_end, b.range_end);
    }

    #[test]
    fn test_absolute_month_boundaries() {
        let start = iso("2018-01-02T00:00:00Z");
        let b = compute_boundaries(start, start + TimeDelta::days(35), BucketSize::Month, false);

        assert_eq!(b.range_start, iso("2018-01-01T00:00:00Z"));
        assert_eq!(b.range_end, iso("2018-02-28T23:59:59.999Z"));
        assert_eq!(b.bucket_start, iso("2018-01-01T00:00:00Z"));
        assert_eq!(b.bucket_end, iso("2018-01-31T23:59:59.999Z"));

        let (next_start, next_end) = next_bucket(b.bucket_start, b.bucket_end, BucketSize::Month, false);
        assert_eq!(next_start, iso("2018-02-01T00:00:00Z"));
        assert_eq!(next_end, b.range_end);
    }

    #[test]
    fn test_next_relative_month() {
        let start = iso("2018-01-04T00:00:00Z");
        let end = iso("2018-02-02T23:59:59.999Z");
        let (s, e) = next_bucket(start, end, BucketSize::Month, true);
        assert_eq!(s, iso("2018-02-03T00:00:00Z"));
        assert_eq!(e, iso("2018-03-04T23:59:59.999Z"));
    }

    #[test]
    fn test_next_absolute_month_clamps() {
        let (s, e) = next_bucket(
            iso("2018-01-01T00:00:00Z"),
            iso("2018-01-31T23:59:59.999Z"),
            BucketSize::Month,
            false,
        );
        assert_eq!(s, iso("2018-02-01T00:00:00Z"));
        assert_eq!(e, iso("2018-02-28T23:59:59.999Z"));

        let (s, e) = next_bucket(s, e, BucketSize::Month, false);
        assert_eq!(s, iso("2018-03-01T00:00:00Z"));
        assert_eq!(e, iso("2018-03-31T23:59:59.999Z"));
    }

    #[test]
    fn test_relative_day_window() {
        let end = iso("2018-03-10T12:30:00Z");
        let b = compute_boundaries(end - TimeDelta::days(1), end, BucketSize::Day, true);
        assert_eq!(b.range_end, iso("2018-03-10T12:59:59.999Z"));
        assert_eq!(b.range_start, iso("2018-03-09T13:00:00Z"));
        assert_eq!(b.bucket_end, b.range_end);
    }

    #[test]
    fn test_zero_width_relative_range_is_empty() {
        let t = iso("2018-03-10T12:30:00Z");
        let b = compute_boundaries(t, t, BucketSize::Hour, true);
        assert!(b.range_start > b.range_end);
    }

    #[test]
    fn test_absolute_week_starts_monday() {
        let b = compute_boundaries(
            iso("2018-01-03T00:00:00Z"),
            iso("2018-01-03T00:00:00Z"),
            BucketSize::Week,
            false,
        );
        assert_eq!(b.range_start, iso("2018-01-01T00:00:00Z"));
        assert_eq!(b.range_end, iso("2018-01-07T23:59:59.999Z"));
        assert_eq!(b.bucket_end, b.range_end);
    }
}
