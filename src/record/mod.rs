//! Run records -- the completed routine executions the engine aggregates.

pub mod ordering;

pub use self::ordering::{AscendingRecords, RecordCursor};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Lifecycle state of a run as reported by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Created,
    Running,
    Passed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Created => write!(f, "created"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Passed => write!(f, "passed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Which limit a run hit when it did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutType {
    /// The whole run exceeded its time budget.
    Run,
    /// A single test exceeded its time budget.
    Test,
}

/// Test counts reported by a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStats {
    pub passes: u64,
    pub failures: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub tests: u64,
    #[serde(default)]
    pub suites: u64,
}

impl TestStats {
    pub fn new(passes: u64, failures: u64) -> Self {
        Self {
            passes,
            failures,
            tests: passes + failures,
            ..Self::default()
        }
    }
}

/// One execution of a monitored routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    #[serde(default)]
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub stats: Option<TestStats>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timeout_type: Option<TimeoutType>,
}

impl RunRecord {
    /// A completed record with the given outcome and test counts.
    pub fn completed(
        id: impl Into<String>,
        status: RunStatus,
        stats: Option<TestStats>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            stats,
            completed_at: Some(completed_at),
            timeout_type: None,
        }
    }

    pub fn with_timeout(mut self, timeout_type: TimeoutType) -> Self {
        self.timeout_type = Some(timeout_type);
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status == RunStatus::Passed
    }
}

/// Parse a JSON array of run records.
pub fn parse_records(json: &str) -> Result<Vec<RunRecord>> {
    serde_json::from_str(json).context("Failed to parse run records JSON")
}

/// Load run records from a JSON file, or from stdin when `path` is `-`.
pub fn load_records(path: &Path) -> Result<Vec<RunRecord>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read run records from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run records file: {}", path.display()))?
    };

    let records = parse_records(&content)?;
    info!(count = records.len(), "Loaded run records");
    Ok(records)
}
