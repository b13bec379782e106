//! Pipeline health monitoring.
//!
//! Four checks run against the warehouse, each deducting a fixed penalty
//! from a score of 100 when it fails:
//!
//! | check                    | failure                               | severity | penalty |
//! |--------------------------|---------------------------------------|----------|---------|
//! | `database_connectivity`  | store cannot be opened or queried     | critical | 30      |
//! | `data_freshness`         | newest fact older than the max lag    | critical | 20      |
//! | `data_volume_anomalies`  | no facts in the window                | critical | 25      |
//! |                          | latest day outside the 3-sigma band   | warning  | 15      |
//! | `data_quality`           | null dimension keys push quality down | warning  | 10      |
//!
//! When connectivity fails the other checks are skipped.

pub mod volume;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use ecom_model::{
    Alert, AlertSeverity, CheckHealth, HealthStatus, ModelError, MonitorConfig, MonitoringReport,
    artifact_timestamp, round2, write_json_artifact,
};
use ecom_store::{Store, StoreError};
use rusqlite::Connection;
use serde_json::{Value, json};
use tracing::{info, info_span, warn};

pub use volume::{AnomalyKind, VolumeAssessment, assess};

pub const CONNECTIVITY: &str = "database_connectivity";
pub const FRESHNESS: &str = "data_freshness";
pub const VOLUME: &str = "data_volume_anomalies";
pub const QUALITY: &str = "data_quality";

const CONNECTIVITY_PENALTY: i64 = 30;
const FRESHNESS_PENALTY: i64 = 20;
const NO_DATA_PENALTY: i64 = 25;
const ANOMALY_PENALTY: i64 = 15;
const QUALITY_PENALTY: i64 = 10;

/// Format of `fact_sales.created_at`.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Result of one check before it is folded into the report.
struct Outcome {
    body: Value,
    alert: Option<(AlertSeverity, String)>,
    penalty: i64,
}

impl Outcome {
    fn ok(body: Value) -> Self {
        Self {
            body,
            alert: None,
            penalty: 0,
        }
    }

    fn failed(body: Value, severity: AlertSeverity, message: String, penalty: i64) -> Self {
        Self {
            body,
            alert: Some((severity, message)),
            penalty,
        }
    }

    /// A check whose query could not run counts as a critical failure.
    fn errored(err: &rusqlite::Error, penalty: i64) -> Self {
        let message = err.to_string();
        Self::failed(
            json!({ "status": CheckHealth::Error, "message": message }),
            AlertSeverity::Critical,
            message,
            penalty,
        )
    }
}

pub struct HealthMonitor {
    config: MonitorConfig,
}

impl HealthMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Run every check. `open` is called once to obtain the store; its failure
    /// is reported rather than returned.
    pub fn run<F>(&self, open: F, now: DateTime<Utc>) -> MonitoringReport
    where
        F: FnOnce() -> Result<Store, StoreError>,
    {
        let _span = info_span!("monitor").entered();
        let timestamp = artifact_timestamp(now);
        let mut report = ReportBuilder::new(timestamp.clone());

        let started = Instant::now();
        let store = open().and_then(|store| store.ping().map(|()| store));
        let store = match store {
            Ok(store) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                report.record(
                    CONNECTIVITY,
                    Outcome::ok(json!({
                        "status": CheckHealth::Ok,
                        "response_time_ms": round2(elapsed_ms),
                    })),
                );
                store
            }
            Err(err) => {
                let message = format!("database connection failed: {err}");
                report.record(
                    CONNECTIVITY,
                    Outcome::failed(
                        json!({ "status": CheckHealth::Error, "message": err.to_string() }),
                        AlertSeverity::Critical,
                        message,
                        CONNECTIVITY_PENALTY,
                    ),
                );
                return report.finish();
            }
        };

        let conn = store.connection();
        report.record(FRESHNESS, self.freshness(conn, now));
        report.record(VOLUME, self.volume(conn, now));
        report.record(QUALITY, self.fact_quality(conn));
        report.finish()
    }

    fn freshness(&self, conn: &Connection, now: DateTime<Utc>) -> Outcome {
        let max_lag = self.config.freshness_max_lag_hours;
        let latest: Option<String> =
            match conn.query_row("SELECT MAX(created_at) FROM fact_sales", [], |row| row.get(0)) {
                Ok(latest) => latest,
                Err(err) => return Outcome::errored(&err, FRESHNESS_PENALTY),
            };
        let Some(latest) = latest else {
            return Outcome::failed(
                json!({
                    "status": CheckHealth::Critical,
                    "warehouse_latest_record": null,
                    "max_lag_hours": null,
                }),
                AlertSeverity::Critical,
                "no records in fact_sales".to_string(),
                FRESHNESS_PENALTY,
            );
        };
        let lag_hours = match NaiveDateTime::parse_from_str(&latest, CREATED_AT_FORMAT) {
            Ok(at) => (now.naive_utc() - at).num_milliseconds() as f64 / 3_600_000.0,
            Err(err) => {
                return Outcome::failed(
                    json!({ "status": CheckHealth::Error, "message": err.to_string() }),
                    AlertSeverity::Critical,
                    format!("unreadable fact_sales.created_at {latest:?}: {err}"),
                    FRESHNESS_PENALTY,
                );
            }
        };
        let lag_hours = round2(lag_hours);
        if lag_hours >= max_lag {
            Outcome::failed(
                json!({
                    "status": CheckHealth::Critical,
                    "warehouse_latest_record": latest,
                    "max_lag_hours": lag_hours,
                }),
                AlertSeverity::Critical,
                format!("warehouse data is {lag_hours} hours old (limit {max_lag})"),
                FRESHNESS_PENALTY,
            )
        } else {
            Outcome::ok(json!({
                "status": CheckHealth::Ok,
                "warehouse_latest_record": latest,
                "max_lag_hours": lag_hours,
            }))
        }
    }

    fn volume(&self, conn: &Connection, now: DateTime<Utc>) -> Outcome {
        let window_days = self.config.volume_window_days;
        let Some(since) = TimeDelta::try_days(window_days)
            .and_then(|window| now.date_naive().checked_sub_signed(window))
        else {
            let message = format!("volume window of {window_days} days is out of range");
            return Outcome::failed(
                json!({ "status": CheckHealth::Error, "message": message }),
                AlertSeverity::Critical,
                message,
                NO_DATA_PENALTY,
            );
        };
        let counts = match daily_fact_counts(conn, since) {
            Ok(counts) => counts,
            Err(err) => return Outcome::errored(&err, NO_DATA_PENALTY),
        };
        let Some(assessment) = assess(&counts) else {
            return Outcome::failed(
                json!({
                    "status": CheckHealth::Critical,
                    "expected_range": null,
                    "actual_count": 0,
                    "anomaly_detected": true,
                    "anomaly_type": "no_data",
                }),
                AlertSeverity::Critical,
                format!("no sales facts since {since}"),
                NO_DATA_PENALTY,
            );
        };

        let expected_range = assessment.expected_range();
        let status = if assessment.anomaly.is_some() {
            CheckHealth::AnomalyDetected
        } else {
            CheckHealth::Ok
        };
        let body = json!({
            "status": status,
            "expected_range": expected_range,
            "actual_count": assessment.actual,
            "anomaly_detected": assessment.anomaly.is_some(),
            "anomaly_type": assessment.anomaly.map(AnomalyKind::as_str),
        });
        match assessment.anomaly {
            Some(kind) => Outcome::failed(
                body,
                AlertSeverity::Warning,
                format!(
                    "volume {} detected: {} rows, expected {expected_range}",
                    kind.as_str(),
                    assessment.actual
                ),
                ANOMALY_PENALTY,
            ),
            None => Outcome::ok(body),
        }
    }

    fn fact_quality(&self, conn: &Connection) -> Outcome {
        let nulls: i64 = match conn.query_row(
            "SELECT COALESCE(SUM(customer_key IS NULL), 0) + COALESCE(SUM(product_key IS NULL), 0) \
             FROM fact_sales",
            [],
            |row| row.get(0),
        ) {
            Ok(nulls) => nulls,
            Err(err) => return Outcome::errored(&err, QUALITY_PENALTY),
        };
        let quality_score = (100 - nulls).max(0);
        let threshold = self.config.quality_threshold;
        if quality_score < threshold {
            Outcome::failed(
                json!({
                    "status": CheckHealth::Degraded,
                    "quality_score": quality_score,
                    "null_violations": nulls,
                }),
                AlertSeverity::Warning,
                format!("fact quality {quality_score} below threshold {threshold}"),
                QUALITY_PENALTY,
            )
        } else {
            Outcome::ok(json!({
                "status": CheckHealth::Ok,
                "quality_score": quality_score,
                "null_violations": nulls,
            }))
        }
    }
}

/// Fact rows per calendar day from `since` onward, oldest first.
fn daily_fact_counts(conn: &Connection, since: NaiveDate) -> rusqlite::Result<Vec<u64>> {
    let mut stmt = conn.prepare(
        "SELECT d.full_date, COUNT(*) FROM fact_sales f \
         JOIN dim_date d ON d.date_key = f.date_key \
         WHERE d.full_date >= ?1 \
         GROUP BY d.full_date ORDER BY d.full_date",
    )?;
    let rows = stmt.query_map([since], |row| row.get::<_, i64>(1))?;
    rows.map(|count| count.map(|c| c.max(0) as u64)).collect()
}

struct ReportBuilder {
    timestamp: String,
    checks: BTreeMap<String, Value>,
    alerts: Vec<Alert>,
    score: i64,
}

impl ReportBuilder {
    fn new(timestamp: String) -> Self {
        Self {
            timestamp,
            checks: BTreeMap::new(),
            alerts: Vec::new(),
            score: 100,
        }
    }

    fn record(&mut self, check: &str, outcome: Outcome) {
        if let Some((severity, message)) = outcome.alert {
            warn!(check, ?severity, %message, "health alert");
            self.alerts.push(Alert {
                severity,
                check: check.to_string(),
                message,
                timestamp: self.timestamp.clone(),
            });
        }
        self.score -= outcome.penalty;
        self.checks.insert(check.to_string(), outcome.body);
    }

    fn finish(self) -> MonitoringReport {
        let overall_health_score = self.score.max(0);
        let pipeline_health = HealthStatus::from_score(overall_health_score);
        info!(
            score = overall_health_score,
            health = ?pipeline_health,
            alerts = self.alerts.len(),
            "health check complete"
        );
        MonitoringReport {
            monitoring_timestamp: self.timestamp,
            checks: self.checks,
            alerts: self.alerts,
            overall_health_score,
            pipeline_health,
        }
    }
}

/// Write the monitoring report artifact.
pub fn write_report(report: &MonitoringReport, path: &Path) -> Result<(), ModelError> {
    write_json_artifact(report, path)
}
