//! Chronologically ordered views over run records.
//!
//! The bucketing and timeline engines walk records oldest-first. Rather than
//! trusting callers to hand over a pre-sorted slice, every entry point builds
//! an [`AscendingRecords`] view first. Building the view is also where records
//! without a completion instant are rejected.

use super::RunRecord;
use crate::stats::StatsError;
use chrono::{DateTime, Utc};
use tracing::debug;

/// A record paired with its (known) completion instant.
#[derive(Debug, Clone, Copy)]
pub struct CompletedRecord<'a> {
    pub completed_at: DateTime<Utc>,
    pub record: &'a RunRecord,
}

/// Borrowed run records sorted ascending by completion instant.
#[derive(Debug, Clone)]
pub struct AscendingRecords<'a> {
    records: Vec<CompletedRecord<'a>>,
}

impl<'a> AscendingRecords<'a> {
    /// Build the ordered view. Fails with [`StatsError::InvalidRecord`] on the
    /// first record that has no completion instant.
    ///
    /// Records may arrive in any order; equal instants keep their input order.
    pub fn new(records: &'a [RunRecord]) -> Result<Self, StatsError> {
        let mut completed = Vec::with_capacity(records.len());
        for record in records {
            let completed_at = record
                .completed_at
                .ok_or_else(|| StatsError::InvalidRecord { id: record.id.clone() })?;
            completed.push(CompletedRecord { completed_at, record });
        }

        let sorted = completed
            .windows(2)
            .all(|w| w[0].completed_at <= w[1].completed_at);
        if !sorted {
            debug!(count = completed.len(), "Reordering run records by completion time");
            completed.sort_by_key(|c| c.completed_at);
        }

        Ok(Self { records: completed })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CompletedRecord<'a>> + '_ {
        self.records.iter()
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &'a RunRecord> + '_ {
        self.records.iter().rev().map(|c| c.record)
    }

    /// The chronologically latest record, if any.
    pub fn latest(&self) -> Option<&'a RunRecord> {
        self.records.last().map(|c| c.record)
    }

    pub fn cursor(&self) -> RecordCursor<'_, 'a> {
        RecordCursor {
            records: &self.records,
            pos: 0,
        }
    }
}

/// Forward-only position within an [`AscendingRecords`] view.
#[derive(Debug, Clone)]
pub struct RecordCursor<'v, 'a> {
    records: &'v [CompletedRecord<'a>],
    pos: usize,
}

impl<'v, 'a> RecordCursor<'v, 'a> {
    pub fn peek(&self) -> Option<CompletedRecord<'a>> {
        self.records.get(self.pos).copied()
    }

    pub fn advance(&mut self) {
        if self.pos < self.records.len() {
            self.pos += 1;
        }
    }

    /// Records not yet consumed.
    pub fn remaining(&self) -> usize {
        self.records.len() - self.pos
    }
}
