//! TOML configuration for runstats.
//!
//! Every section has compiled-in defaults, so an empty (or missing) file is
//! a valid configuration. The file is located from an explicit path, the
//! `RUNSTATS_CONFIG` environment variable, or `./runstats.toml`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::stats::BucketSize;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "RUNSTATS_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "runstats.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunstatsConfig {
    #[serde(default)]
    pub windows: WindowConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunstatsConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded runstats configuration");
        Ok(config)
    }

    /// Resolve configuration, in order:
    /// 1. `explicit`, when given. Errors here are fatal.
    /// 2. The path in `RUNSTATS_CONFIG`.
    /// 3. `./runstats.toml`.
    /// 4. Compiled-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "RUNSTATS_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Trailing windows used by the summary, current and status views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Timeline window for the summary view, in days.
    pub summary_days: u32,
    /// Timeline and bucket window for the current view, in days.
    pub current_days: u32,
    /// Bucket width for the current view.
    pub current_bucket_size: BucketSize,
    /// Timeline window for the status view, in hours.
    pub status_hours: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            summary_days: 31,
            current_days: 7,
            current_bucket_size: BucketSize::Hour,
            status_hours: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit JSON instead of text tables.
    pub json: bool,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            pretty: true,
        }
    }
}
