//! Data quality scoring.
//!
//! Six check categories run against one layer (staging by default):
//!
//! - **null_checks**: missing emails, totals, prices and quantities
//! - **duplicate_checks**: repeated customer identifiers and emails
//! - **referential_integrity**: orphaned transactions and items
//! - **range_checks**: non-positive prices and quantities, out-of-range discounts
//! - **data_consistency**: stored line totals that disagree with their parts
//! - **accuracy_business_rules**: future-dated transactions and purchases
//!   made before the customer registered
//!
//! Checks are isolated: one that cannot run is reported with status
//! `error` and scored as failed, and the rest still run.

pub mod checks;
pub mod score;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use ecom_model::{
    CheckCategory, CheckResult, Grade, ModelError, QualityConfig, QualityReport,
    artifact_timestamp, write_json_artifact,
};
use ecom_store::Store;
use tracing::{info, info_span, warn};

pub use checks::{CheckContext, Details, run_check, tables_checked};
#[allow(deprecated)]
pub use score::linear_violation_score;
pub use score::weighted_score;

pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, store: &Store, as_of: NaiveDate) -> QualityReport {
        self.run_at(store, as_of, Utc::now())
    }

    /// Run all six categories and grade the result. Never fails as a whole.
    pub fn run_at(&self, store: &Store, as_of: NaiveDate, now: DateTime<Utc>) -> QualityReport {
        let layer = self.config.target;
        let _span = info_span!("quality", layer = %layer).entered();
        let ctx = CheckContext {
            conn: store.connection(),
            layer,
            as_of,
            line_total_tolerance: self.config.line_total_tolerance,
        };

        let mut checks_performed = BTreeMap::new();
        for category in CheckCategory::ALL {
            let tables = tables_checked(category, layer);
            let result = match run_check(category, &ctx) {
                Ok(details) => CheckResult::from_details(tables, details),
                Err(err) => {
                    warn!(check = %category, error = %err, "check could not run");
                    CheckResult::errored(tables, err.to_string())
                }
            };
            info!(
                check = %category,
                status = ?result.status,
                violations = result.violations,
                "check complete"
            );
            checks_performed.insert(category, result);
        }

        let overall_quality_score = weighted_score(&checks_performed);
        let quality_grade = Grade::from_score(overall_quality_score);
        info!(score = overall_quality_score, grade = %quality_grade, "quality scored");
        QualityReport {
            check_timestamp: artifact_timestamp(now),
            target_layer: layer,
            checks_performed,
            overall_quality_score,
            quality_grade,
        }
    }
}

/// Write the quality report artifact, replacing any previous report.
pub fn write_report(report: &QualityReport, path: &Path) -> Result<(), ModelError> {
    write_json_artifact(report, path)
}
