use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Per-loader accounting. `input == output + filtered` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadCounts {
    pub input: u64,
    pub output: u64,
    pub filtered: u64,
    pub rejected_reasons: BTreeMap<String, u64>,
}

impl LoadCounts {
    /// Count a row that was written to the destination.
    pub fn record_output(&mut self) {
        self.input += 1;
        self.output += 1;
    }

    /// Count a row that was rejected, keyed by the failing rule's name.
    pub fn record_rejection(&mut self, reason: &str) {
        self.input += 1;
        self.filtered += 1;
        *self.rejected_reasons.entry(reason.to_string()).or_default() += 1;
    }

    pub fn is_balanced(&self) -> bool {
        self.input == self.output + self.filtered
            && self.rejected_reasons.values().sum::<u64>() == self.filtered
    }
}

/// Quick post-load snapshot taken inside the ETL unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostTransformQuality {
    pub production_row_counts: BTreeMap<Entity, u64>,
    pub total_filtered: u64,
    pub rejection_rate_percent: f64,
}

/// Output artifact of one successful ETL run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationSummary {
    pub transformation_timestamp: String,
    pub records_processed: BTreeMap<Entity, LoadCounts>,
    pub transformations_applied: Vec<String>,
    pub data_quality_post_transform: PostTransformQuality,
}

impl TransformationSummary {
    pub fn counts(&self, entity: Entity) -> Option<&LoadCounts> {
        self.records_processed.get(&entity)
    }

    pub fn total_output(&self) -> u64 {
        self.records_processed.values().map(|c| c.output).sum()
    }

    pub fn total_filtered(&self) -> u64 {
        self.records_processed.values().map(|c| c.filtered).sum()
    }
}
