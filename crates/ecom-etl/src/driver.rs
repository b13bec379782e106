//! Runs the loaders as one unit of work.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use ecom_model::{
    Entity, Layer, PostTransformQuality, TransformationSummary, artifact_timestamp, round2,
    write_json_artifact,
};
use ecom_store::{Store, count_rows};
use rusqlite::Connection;
use tracing::{error, info, info_span};

use crate::error::{EtlError, Result};
use crate::loaders::{
    CustomerLoader, LoadContext, Loader, ProductLoader, TransactionItemLoader, TransactionLoader,
};

/// Labels of the transformations the standard loaders apply, in order.
pub const TRANSFORMATIONS_APPLIED: [&str; 8] = [
    "text_normalization",
    "email_normalization",
    "phone_normalization",
    "title_case_names",
    "profit_margin_calculation",
    "price_category_enrichment",
    "line_total_recalculation",
    "business_rule_validation",
];

/// Ordered set of loaders executed inside a single transaction.
pub struct EtlDriver {
    loaders: Vec<Box<dyn Loader>>,
}

impl EtlDriver {
    /// Customers, products, transactions, then items.
    pub fn standard() -> Self {
        Self::with_loaders(vec![
            Box::new(CustomerLoader),
            Box::new(ProductLoader),
            Box::new(TransactionLoader),
            Box::new(TransactionItemLoader),
        ])
    }

    pub fn with_loaders(loaders: Vec<Box<dyn Loader>>) -> Self {
        Self { loaders }
    }

    pub fn run(&self, store: &mut Store) -> Result<TransformationSummary> {
        self.run_at(store, Utc::now())
    }

    /// Run every loader in order, committing only if all succeed.
    ///
    /// On a loader fault the transaction is rolled back before the error is
    /// returned, so production is left exactly as it was.
    pub fn run_at(&self, store: &mut Store, now: DateTime<Utc>) -> Result<TransformationSummary> {
        let _span = info_span!("etl").entered();
        let timestamp = artifact_timestamp(now);
        let tx = store.connection_mut().transaction()?;

        let mut records_processed = BTreeMap::new();
        for loader in &self.loaders {
            let entity = loader.entity();
            let ctx = LoadContext {
                conn: &tx,
                loaded_at: &timestamp,
            };
            match loader.load(&ctx) {
                Ok(counts) => {
                    info!(
                        entity = %entity,
                        strategy = ?loader.strategy(),
                        input = counts.input,
                        output = counts.output,
                        filtered = counts.filtered,
                        "loader complete"
                    );
                    records_processed.insert(entity, counts);
                }
                Err(source) => {
                    error!(entity = %entity, error = %source, "loader failed, rolling back");
                    if let Err(rollback) = tx.rollback() {
                        error!(error = %rollback, "rollback failed");
                    }
                    return Err(EtlError::Loader { entity, source });
                }
            }
        }

        let total_input: u64 = records_processed.values().map(|c| c.input).sum();
        let total_filtered: u64 = records_processed.values().map(|c| c.filtered).sum();
        let data_quality_post_transform = PostTransformQuality {
            production_row_counts: production_row_counts(&tx)?,
            total_filtered,
            rejection_rate_percent: rejection_rate(total_filtered, total_input),
        };
        tx.commit()?;

        let summary = TransformationSummary {
            transformation_timestamp: timestamp,
            records_processed,
            transformations_applied: TRANSFORMATIONS_APPLIED
                .iter()
                .map(ToString::to_string)
                .collect(),
            data_quality_post_transform,
        };
        info!(
            output = summary.total_output(),
            filtered = summary.total_filtered(),
            "etl committed"
        );
        Ok(summary)
    }
}

/// Write the transformation summary artifact.
pub fn write_summary(summary: &TransformationSummary, path: &Path) -> Result<()> {
    write_json_artifact(summary, path)?;
    Ok(())
}

fn production_row_counts(conn: &Connection) -> Result<BTreeMap<Entity, u64>> {
    let mut counts = BTreeMap::new();
    for entity in Entity::LOAD_ORDER {
        counts.insert(entity, count_rows(conn, Layer::Production.table(entity))?);
    }
    Ok(counts)
}

fn rejection_rate(filtered: u64, input: u64) -> f64 {
    if input == 0 {
        0.0
    } else {
        round2(filtered as f64 / input as f64 * 100.0)
    }
}
