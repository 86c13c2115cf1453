//! runstats -- availability buckets and status timelines for monitoring runs.
//!
//! This crate turns a routine's completed run records into pass/fail
//! availability buckets (hour/day/week/month, calendar or rolling) and a
//! run-length-encoded status timeline, plus summary views composed from both.
//! All aggregation is pure: no I/O outside the `record` loaders and the CLI.

pub mod config;
pub mod record;
pub mod report;
pub mod stats;
pub mod timeline;
pub mod views;

pub use record::{AscendingRecords, RunRecord, RunStatus, TestStats, TimeoutType};
pub use stats::{
    bucket_records, compute_boundaries, increment_buckets, BucketRequest, BucketResult, BucketSize,
    Counter, StatsError, StatsResult,
};
pub use timeline::{classify, increment_timeline_event, timeline_records, EventStatus, TimelineEvent};
pub use views::{current, status, summarize_records, RoutineStats, StatusResult, SummaryResult, Views};
