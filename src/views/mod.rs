//! Composed views over a routine's run records: summary, current, status.

use crate::config::WindowConfig;
use crate::record::{AscendingRecords, RunRecord};
use crate::stats::{bucket_view, BucketRequest, BucketSize, StatsError, StatsResult};
use crate::timeline::{timeline_view, TimelineEvent};
use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Latest status, latest downtime and rolling day/week/month snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub latest_status: Option<TimelineEvent>,
    pub latest_downtime: Option<TimelineEvent>,
    pub day: Option<StatsResult>,
    pub week: Option<StatsResult>,
    pub month: Option<StatsResult>,
}

/// Recent timeline and fine-grained buckets for a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineStats {
    pub latest_record: Option<RunRecord>,
    pub timeline: Vec<TimelineEvent>,
    pub buckets: Vec<StatsResult>,
    pub bucket_size: BucketSize,
}

/// Newest status over the last day plus the records behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub latest_status: Option<TimelineEvent>,
    /// Newest first.
    pub records: Vec<RunRecord>,
}

/// View builder carrying the trailing-window configuration.
#[derive(Debug, Clone, Default)]
pub struct Views {
    windows: WindowConfig,
}

impl Views {
    pub fn new(windows: WindowConfig) -> Self {
        Self { windows }
    }

    /// Summarize the trailing window ending at `now`.
    pub fn summarize(&self, records: &[RunRecord], now: DateTime<Utc>) -> Result<SummaryResult, StatsError> {
        let view = AscendingRecords::new(records)?;

        let start = now - TimeDelta::days(self.windows.summary_days as i64);
        let events = timeline_view(&view, start, now);

        let latest_status = events.first().cloned();
        let latest_downtime = events.iter().find(|e| e.status.is_downtime()).cloned();

        let month_start = now
            .checked_sub_months(Months::new(1))
            .unwrap_or(now - BucketSize::Month.fixed_duration());

        let day = current_bucket(&view, BucketSize::Day, now - TimeDelta::days(1), now);
        let week = current_bucket(&view, BucketSize::Week, now - TimeDelta::weeks(1), now);
        let month = current_bucket(&view, BucketSize::Month, month_start, now);

        debug!(events = events.len(), %start, %now, "Summarized run records");

        Ok(SummaryResult {
            start,
            end: now,
            latest_status,
            latest_downtime,
            day,
            week,
            month,
        })
    }

    /// Timeline and relative buckets over the current window.
    pub fn current(&self, records: &[RunRecord], now: DateTime<Utc>) -> Result<RoutineStats, StatsError> {
        let view = AscendingRecords::new(records)?;

        let start = now - TimeDelta::days(self.windows.current_days as i64);
        let timeline = timeline_view(&view, start, now);
        let request = BucketRequest {
            bucket_size: self.windows.current_bucket_size,
            start,
            end: now,
        };
        let result = bucket_view(&view, &request, true);

        Ok(RoutineStats {
            latest_record: view.latest().cloned(),
            timeline,
            buckets: result.buckets,
            bucket_size: result.bucket_size,
        })
    }

    /// Newest status within the status window, with every record newest-first.
    pub fn status(&self, records: &[RunRecord], now: DateTime<Utc>) -> Result<StatusResult, StatsError> {
        let view = AscendingRecords::new(records)?;

        let start = now - TimeDelta::hours(self.windows.status_hours as i64);
        let latest_status = timeline_view(&view, start, now).into_iter().next();

        Ok(StatusResult {
            start,
            end: now,
            latest_status,
            records: view.iter_newest_first().cloned().collect(),
        })
    }
}

/// The most recent relative bucket of `size` over `[start, end]`.
fn current_bucket(
    view: &AscendingRecords<'_>,
    size: BucketSize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<StatsResult> {
    let request = BucketRequest {
        bucket_size: size,
        start,
        end,
    };
    bucket_view(view, &request, true).buckets.pop()
}

/// [`Views::summarize`] with default windows.
pub fn summarize_records(records: &[RunRecord], now: DateTime<Utc>) -> Result<SummaryResult, StatsError> {
    Views::default().summarize(records, now)
}

/// [`Views::current`] with default windows.
pub fn current(records: &[RunRecord], now: DateTime<Utc>) -> Result<RoutineStats, StatsError> {
    Views::default().current(records, now)
}

/// [`Views::status`] with default windows.
pub fn status(records: &[RunRecord], now: DateTime<Utc>) -> Result<StatusResult, StatsError> {
    Views::default().status(records, now)
}
