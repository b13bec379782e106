use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub check: String,
    pub message: String,
    pub timestamp: String,
}

/// Status of a single health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckHealth {
    Ok,
    Error,
    Critical,
    Degraded,
    AnomalyDetected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: i64) -> Self {
        if score >= 85 {
            Self::Healthy
        } else if score >= 60 {
            Self::Degraded
        } else {
            Self::Critical
        }
    }
}

/// Monitoring report artifact.
///
/// Check bodies differ per check, so they are kept as JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringReport {
    pub monitoring_timestamp: String,
    pub checks: BTreeMap<String, serde_json::Value>,
    pub alerts: Vec<Alert>,
    pub overall_health_score: i64,
    pub pipeline_health: HealthStatus,
}
