use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLoadStatus {
    Success,
    Failed,
}

/// Per-table outcome of a staging ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLoad {
    pub rows_loaded: u64,
    pub status: TableLoadStatus,
    pub error_message: Option<String>,
    /// SHA-256 of the source CSV, when it could be read.
    pub source_sha256: Option<String>,
}

/// Ingestion summary artifact. Written on success and on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub ingestion_timestamp: String,
    /// Keyed by qualified table name, e.g. `staging.customers`.
    pub tables_loaded: BTreeMap<String, TableLoad>,
    pub total_execution_time_seconds: f64,
}

impl IngestionSummary {
    pub fn succeeded(&self) -> bool {
        self.tables_loaded
            .values()
            .all(|table| table.status == TableLoadStatus::Success)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables_loaded.values().map(|t| t.rows_loaded).sum()
    }
}
