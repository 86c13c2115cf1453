//! Bucketing engine: partition ordered run records into consecutive buckets.

use super::boundary::{compute_boundaries, next_bucket};
use super::bucket::StatsResult;
use super::{BucketSize, StatsError};
use crate::record::{AscendingRecords, RunRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Parameters for a bucketing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRequest {
    pub bucket_size: BucketSize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Buckets covering a range, plus one bucket aggregating all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketResult {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bucket_size: BucketSize,
    pub overall: StatsResult,
    pub buckets: Vec<StatsResult>,
}

/// Bucket run records across the requested range.
///
/// Records may be supplied in any order. Fails if any record has no
/// completion time.
pub fn bucket_records(
    records: &[RunRecord],
    request: &BucketRequest,
    relative: bool,
) -> Result<BucketResult, StatsError> {
    let view = AscendingRecords::new(records)?;
    Ok(bucket_view(&view, request, relative))
}

/// Bucket an already-ordered view.
///
/// Records before the range start are skipped; records after the range end
/// are left unread.
pub fn bucket_view(view: &AscendingRecords<'_>, request: &BucketRequest, relative: bool) -> BucketResult {
    let size = request.bucket_size;
    let frame = compute_boundaries(request.start, request.end, size, relative);

    let mut overall = StatsResult::new(frame.range_start, frame.range_end);
    let mut buckets = Vec::new();
    let mut cursor = view.cursor();
    let mut skipped = 0usize;

    let (mut bucket_start, mut bucket_end) = (frame.bucket_start, frame.bucket_end);

    while bucket_start < frame.range_end {
        let mut bucket = StatsResult::new(bucket_start, bucket_end);

        while let Some(next) = cursor.peek() {
            // Belongs to a later bucket
            if next.completed_at >= bucket.exclusive_end() {
                break;
            }
            if next.completed_at >= bucket.start {
                bucket.update(next.record);
                overall.update(next.record);
            } else {
                skipped += 1;
            }
            cursor.advance();
        }

        buckets.push(bucket);
        (bucket_start, bucket_end) = next_bucket(bucket_start, bucket_end, size, relative);
    }

    debug!(
        bucket_size = %size,
        relative,
        buckets = buckets.len(),
        skipped,
        unread = cursor.remaining(),
        range_start = %frame.range_start,
        range_end = %frame.range_end,
        "Bucketed run records"
    );

    BucketResult {
        start: frame.range_start,
        end: frame.range_end,
        bucket_size: size,
        overall,
        buckets,
    }
}

/// Fold one record into a newest-first list of absolute buckets.
///
/// Extends the head bucket when the record falls before its end, otherwise
/// pushes a new calendar bucket for the record's own instant to the front.
pub fn increment_buckets(
    buckets: &mut VecDeque<StatsResult>,
    record: &RunRecord,
    bucket_size: BucketSize,
) -> Result<(), StatsError> {
    let completed_at = record
        .completed_at
        .ok_or_else(|| StatsError::InvalidRecord { id: record.id.clone() })?;

    if let Some(head) = buckets.front_mut() {
        if head.exclusive_end() > completed_at {
            head.update(record);
            return Ok(());
        }
    }

    let frame = compute_boundaries(completed_at, completed_at, bucket_size, false);
    let mut bucket = StatsResult::new(frame.bucket_start, frame.bucket_end);
    bucket.update(record);
    debug!(bucket_size = %bucket_size, start = %bucket.start, "Opened new bucket");
    buckets.push_front(bucket);

    Ok(())
}
