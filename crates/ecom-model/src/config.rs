//! Pipeline configuration.
//!
//! Loaded once from a TOML file and handed to each component as an explicit
//! section. Every field has a default, so an empty or absent file yields a
//! working local setup:
//!
//! ```toml
//! [database]
//! path = "data/ecommerce.db"
//!
//! [quality]
//! target = "production"
//!
//! [retention]
//! days = 14
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entity::Layer;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub paths: PathsConfig,
    pub quality: QualityConfig,
    pub monitor: MonitorConfig,
    pub retention: RetentionConfig,
}

impl PipelineConfig {
    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/ecommerce.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding the generator's CSV output.
    pub raw_dir: PathBuf,
    pub ingestion_summary: PathBuf,
    pub transformation_summary: PathBuf,
    pub quality_report: PathBuf,
    pub monitoring_report: PathBuf,
    /// Advisory run marker.
    pub lock_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            ingestion_summary: PathBuf::from("data/staging/ingestion_summary.json"),
            transformation_summary: PathBuf::from("data/processed/transformation_summary.json"),
            quality_report: PathBuf::from("data/quality/data_quality_report.json"),
            monitoring_report: PathBuf::from("data/processed/monitoring_report.json"),
            lock_file: PathBuf::from("pipeline.lock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Which relations the checks run against.
    pub target: Layer,
    /// Allowed absolute difference between stored and recomputed line totals.
    pub line_total_tolerance: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            target: Layer::Staging,
            line_total_tolerance: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub freshness_max_lag_hours: f64,
    pub volume_window_days: i64,
    /// Minimum fact-table quality score before a warning is raised.
    pub quality_threshold: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            freshness_max_lag_hours: 24.0,
            volume_window_days: 30,
            quality_threshold: 95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionConfig {
    pub days: u64,
    pub directories: Vec<PathBuf>,
    /// Files whose lowercase name contains any of these are never deleted.
    pub preserve_keywords: Vec<String>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: 7,
            directories: vec![
                PathBuf::from("data/raw"),
                PathBuf::from("data/staging"),
                PathBuf::from("logs"),
            ],
            preserve_keywords: vec![
                "summary".to_string(),
                "report".to_string(),
                "metadata".to_string(),
            ],
        }
    }
}
