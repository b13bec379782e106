use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use ecom_cli::cleanup::{CleanupReport, cleanup};
use ecom_cli::lock::{LockAttempt, RunLock};
use ecom_etl::EtlDriver;
use ecom_ingest::Ingestor;
use ecom_model::{
    IngestionSummary, MonitoringReport, PipelineConfig, QualityReport, TransformationSummary,
};
use ecom_monitor::HealthMonitor;
use ecom_quality::QualityScorer;
use ecom_store::Store;
use ecom_warehouse::{WarehouseLoader, WarehouseSummary};

use crate::summary::{
    print_cleanup, print_ingestion, print_monitoring, print_quality, print_transformation,
    print_warehouse,
};

fn open_store(config: &PipelineConfig) -> Result<Store> {
    Store::open(&config.database)
        .with_context(|| format!("open database {}", config.database.path.display()))
}

pub fn run_ingest(config: &PipelineConfig) -> Result<IngestionSummary> {
    let mut store = open_store(config)?;
    let summary = Ingestor::new(&config.paths.raw_dir)
        .run(&mut store, &config.paths.ingestion_summary)
        .with_context(|| format!("ingest {}", config.paths.raw_dir.display()))?;
    print_ingestion(&summary);
    Ok(summary)
}

pub fn run_transform(config: &PipelineConfig) -> Result<TransformationSummary> {
    let mut store = open_store(config)?;
    let summary = EtlDriver::standard()
        .run(&mut store)
        .context("load staging into production")?;
    ecom_etl::write_summary(&summary, &config.paths.transformation_summary)
        .with_context(|| format!("write {}", config.paths.transformation_summary.display()))?;
    print_transformation(&summary);
    Ok(summary)
}

pub fn run_validate(config: &PipelineConfig, as_of: Option<NaiveDate>) -> Result<QualityReport> {
    let store = open_store(config)?;
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let report = QualityScorer::new(config.quality.clone()).run(&store, as_of);
    ecom_quality::write_report(&report, &config.paths.quality_report)
        .with_context(|| format!("write {}", config.paths.quality_report.display()))?;
    print_quality(&report);
    Ok(report)
}

pub fn run_warehouse(config: &PipelineConfig) -> Result<WarehouseSummary> {
    let mut store = open_store(config)?;
    let summary = WarehouseLoader.run(&mut store).context("load warehouse")?;
    print_warehouse(&summary);
    Ok(summary)
}

pub fn run_monitor(config: &PipelineConfig) -> Result<MonitoringReport> {
    let report = HealthMonitor::new(config.monitor.clone())
        .run(|| Store::open(&config.database), Utc::now());
    ecom_monitor::write_report(&report, &config.paths.monitoring_report)
        .with_context(|| format!("write {}", config.paths.monitoring_report.display()))?;
    print_monitoring(&report);
    Ok(report)
}

/// Outcome of a full run.
pub enum RunOutcome {
    Completed,
    /// Another run holds the lock.
    Skipped { pid: Option<u32> },
}

/// Every stage in order under the run lock, then retention cleanup. The
/// first failing stage stops the run and skips cleanup; the lock is released
/// on every path.
pub fn run_all(config: &PipelineConfig, break_lock: bool) -> Result<RunOutcome> {
    let lock_path = &config.paths.lock_file;
    if break_lock {
        RunLock::break_lock(lock_path)
            .with_context(|| format!("remove run lock {}", lock_path.display()))?;
    }
    let _lock = match RunLock::acquire(lock_path)
        .with_context(|| format!("acquire run lock {}", lock_path.display()))?
    {
        LockAttempt::Acquired(lock) => lock,
        LockAttempt::Held { pid } => {
            match pid {
                Some(pid) => warn!(pid, "pipeline already running, skipping"),
                None => warn!(path = %lock_path.display(), "run lock present, skipping"),
            }
            return Ok(RunOutcome::Skipped { pid });
        }
    };

    run_ingest(config)?;
    run_transform(config)?;
    run_validate(config, None)?;
    run_warehouse(config)?;
    run_monitor(config)?;
    run_cleanup(config, false)?;
    info!("pipeline run complete");
    Ok(RunOutcome::Completed)
}

pub fn run_cleanup(config: &PipelineConfig, dry_run: bool) -> Result<CleanupReport> {
    let report = cleanup(&config.retention, Utc::now(), dry_run).context("retention cleanup")?;
    print_cleanup(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    use ecom_model::{DatabaseConfig, PathsConfig, RetentionConfig};

    use super::*;

    const MONTH: Duration = Duration::from_secs(30 * 24 * 60 * 60);

    fn write_raw(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("customers.csv"),
            "customer_id,first_name,last_name,email,phone,registration_date,city,state,country,age_group\n\
             C1,Asha,Rao,asha@example.com,9876543210,2024-01-15,Pune,MH,India,25-34\n",
        )
        .unwrap();
        fs::write(
            dir.join("products.csv"),
            "product_id,product_name,category,sub_category,price,cost,brand,stock_quantity,supplier_id\n\
             P1,Desk Lamp,Home,Lighting,40.00,25.00,Lumo,12,S1\n",
        )
        .unwrap();
        fs::write(
            dir.join("transactions.csv"),
            "transaction_id,customer_id,transaction_date,transaction_time,payment_method,shipping_address,total_amount\n\
             T1,C1,2024-03-01,10:15:00,UPI,Pune,72.00\n",
        )
        .unwrap();
        fs::write(
            dir.join("transaction_items.csv"),
            "item_id,transaction_id,product_id,quantity,unit_price,discount_percentage,line_total\n\
             I1,T1,P1,2,40.00,10,72.00\n",
        )
        .unwrap();
    }

    fn expired(path: &Path) {
        fs::write(path, b"stale").unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - MONTH).unwrap();
    }

    fn config(root: &Path) -> PipelineConfig {
        PipelineConfig {
            database: DatabaseConfig {
                path: root.join("db").join("ecommerce.db"),
                ..DatabaseConfig::default()
            },
            paths: PathsConfig {
                raw_dir: root.join("raw"),
                ingestion_summary: root.join("out").join("ingestion_summary.json"),
                transformation_summary: root.join("out").join("transformation_summary.json"),
                quality_report: root.join("out").join("data_quality_report.json"),
                monitoring_report: root.join("out").join("monitoring_report.json"),
                lock_file: root.join("pipeline.lock"),
            },
            retention: RetentionConfig {
                directories: vec![root.join("scratch")],
                ..RetentionConfig::default()
            },
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn successful_run_ends_with_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        write_raw(&config.paths.raw_dir);
        let scratch = root.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        expired(&scratch.join("old.csv"));
        expired(&scratch.join("run_summary.json"));

        let outcome = run_all(&config, false).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed));
        assert!(!scratch.join("old.csv").exists());
        assert!(scratch.join("run_summary.json").exists());
        assert!(config.paths.monitoring_report.exists());
        assert!(!config.paths.lock_file.exists());
    }

    #[test]
    fn failed_stage_skips_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        let scratch = root.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        expired(&scratch.join("old.csv"));

        assert!(run_all(&config, false).is_err());

        assert!(scratch.join("old.csv").exists());
        assert!(!config.paths.lock_file.exists());
    }
}
