//! Availability bucketing -- boundary arithmetic, per-bucket accumulation,
//! and the bucketing engine.

pub mod boundary;
pub mod bucket;
pub mod engine;

pub use self::boundary::{compute_boundaries, next_bucket, Boundaries};
pub use self::bucket::{Counter, StatsResult};
pub use self::engine::{bucket_records, bucket_view, increment_buckets, BucketRequest, BucketResult};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("cannot place incomplete run record '{id}': no completion time")]
    InvalidRecord { id: String },

    #[error("unexpected bucket size: {0}")]
    InvalidBucketUnit(String),
}

/// Width of one aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketSize {
    Hour,
    Day,
    Week,
    Month,
}

/// The finer unit rolling windows are measured and snapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerUnit {
    Minute,
    Hour,
    Day,
}

impl BucketSize {
    pub const ALL: [BucketSize; 4] = [
        BucketSize::Hour,
        BucketSize::Day,
        BucketSize::Week,
        BucketSize::Month,
    ];

    /// Next lower unit, used for rolling-window arithmetic.
    pub fn lower(self) -> LowerUnit {
        match self {
            BucketSize::Month => LowerUnit::Day,
            BucketSize::Week => LowerUnit::Day,
            BucketSize::Day => LowerUnit::Hour,
            BucketSize::Hour => LowerUnit::Minute,
        }
    }

    /// Fixed length of one unit. A month counts as 30 days.
    pub fn fixed_duration(self) -> TimeDelta {
        match self {
            BucketSize::Month => TimeDelta::days(30),
            BucketSize::Week => TimeDelta::days(7),
            BucketSize::Day => TimeDelta::hours(24),
            BucketSize::Hour => TimeDelta::minutes(60),
        }
    }
}

impl LowerUnit {
    pub fn duration(self) -> TimeDelta {
        match self {
            LowerUnit::Minute => TimeDelta::minutes(1),
            LowerUnit::Hour => TimeDelta::hours(1),
            LowerUnit::Day => TimeDelta::days(1),
        }
    }
}

impl std::fmt::Display for BucketSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketSize::Hour => write!(f, "hour"),
            BucketSize::Day => write!(f, "day"),
            BucketSize::Week => write!(f, "week"),
            BucketSize::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for BucketSize {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(BucketSize::Hour),
            "day" => Ok(BucketSize::Day),
            "week" => Ok(BucketSize::Week),
            "month" => Ok(BucketSize::Month),
            _ => Err(StatsError::InvalidBucketUnit(s.to_string())),
        }
    }
}
