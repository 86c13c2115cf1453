//! Status timeline -- run-length encoding of consecutive same-status runs.
//!
//! Events are kept newest-first. Each event spans from its first run to the
//! run that started the next event, so consecutive events share an edge.

use crate::record::{AscendingRecords, RunRecord};
use crate::stats::StatsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Health of a routine derived from a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Up,
    Down,
    Impaired,
    Timeout,
    Unknown,
}

impl EventStatus {
    /// Down, impaired and timed-out periods count as downtime.
    pub fn is_downtime(self) -> bool {
        !matches!(self, EventStatus::Up | EventStatus::Unknown)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Up => write!(f, "up"),
            EventStatus::Down => write!(f, "down"),
            EventStatus::Impaired => write!(f, "impaired"),
            EventStatus::Timeout => write!(f, "timeout"),
            EventStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a run's health from its timeout marker and test counts.
pub fn classify(record: &RunRecord) -> EventStatus {
    if record.timeout_type.is_some() {
        return EventStatus::Timeout;
    }
    let Some(stats) = record.stats else {
        return EventStatus::Unknown;
    };

    match (stats.passes > 0, stats.failures > 0) {
        (true, true) => EventStatus::Impaired,
        (false, true) => EventStatus::Down,
        (true, false) => EventStatus::Up,
        (false, false) => EventStatus::Unknown,
    }
}

/// A maximal stretch of runs sharing the same status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: EventStatus,
    pub duration_sec: u64,
    /// Newest first.
    pub records: VecDeque<RunRecord>,
}

impl TimelineEvent {
    fn open(record: &RunRecord, completed_at: DateTime<Utc>) -> Self {
        Self {
            start: completed_at,
            end: completed_at,
            status: classify(record),
            duration_sec: 0,
            records: VecDeque::from([record.clone()]),
        }
    }

    fn extend_to(&mut self, end: DateTime<Utc>) {
        self.end = end;
        let millis = (self.end - self.start).num_milliseconds().max(0) as u64;
        self.duration_sec = (millis + 500) / 1000;
    }
}

/// Merge one run into a newest-first event list.
///
/// Runs at or before the newest event's end are ignored, so redelivered or
/// late records leave the timeline unchanged.
pub fn increment_timeline_event(
    events: &mut VecDeque<TimelineEvent>,
    record: &RunRecord,
) -> Result<(), StatsError> {
    let completed_at = record
        .completed_at
        .ok_or_else(|| StatsError::InvalidRecord { id: record.id.clone() })?;
    merge(events, record, completed_at);
    Ok(())
}

fn merge(events: &mut VecDeque<TimelineEvent>, record: &RunRecord, completed_at: DateTime<Utc>) {
    let Some(newest) = events.front_mut() else {
        events.push_front(TimelineEvent::open(record, completed_at));
        return;
    };

    if newest.end >= completed_at {
        trace!(id = %record.id, %completed_at, "Ignoring out-of-order run record");
        return;
    }

    newest.extend_to(completed_at);

    let status = classify(record);
    if newest.status != status {
        events.push_front(TimelineEvent::open(record, completed_at));
    } else {
        newest.records.push_front(record.clone());
    }
}

/// Build the timeline for runs completed in `[start, end)`, newest event first.
///
/// Fails if any record has no completion time.
pub fn timeline_records(
    records: &[RunRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<TimelineEvent>, StatsError> {
    let view = AscendingRecords::new(records)?;
    Ok(timeline_view(&view, start, end))
}

/// Timeline over an already-ordered view.
pub fn timeline_view(
    view: &AscendingRecords<'_>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<TimelineEvent> {
    let mut events = VecDeque::new();
    let mut cursor = view.cursor();

    while let Some(next) = cursor.peek() {
        if next.completed_at >= end {
            break;
        }
        if next.completed_at >= start {
            merge(&mut events, next.record, next.completed_at);
        }
        cursor.advance();
    }

    debug!(events = events.len(), %start, %end, "Built status timeline");
    events.into()
}
