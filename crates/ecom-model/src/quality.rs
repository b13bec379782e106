use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Layer;

/// The six scored check categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckCategory {
    #[serde(rename = "null_checks")]
    Completeness,
    #[serde(rename = "duplicate_checks")]
    Uniqueness,
    #[serde(rename = "referential_integrity")]
    Referential,
    #[serde(rename = "range_checks")]
    Validity,
    #[serde(rename = "data_consistency")]
    Consistency,
    #[serde(rename = "accuracy_business_rules")]
    Accuracy,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 6] = [
        CheckCategory::Completeness,
        CheckCategory::Uniqueness,
        CheckCategory::Referential,
        CheckCategory::Validity,
        CheckCategory::Consistency,
        CheckCategory::Accuracy,
    ];

    /// Fraction of the score lost when this category does not pass. Sums to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Self::Completeness => 0.20,
            Self::Uniqueness => 0.15,
            Self::Referential => 0.30,
            Self::Validity => 0.15,
            Self::Consistency => 0.10,
            Self::Accuracy => 0.10,
        }
    }

    /// Key used under `checks_performed` in the report.
    pub fn report_key(self) -> &'static str {
        match self {
            Self::Completeness => "null_checks",
            Self::Uniqueness => "duplicate_checks",
            Self::Referential => "referential_integrity",
            Self::Validity => "range_checks",
            Self::Consistency => "data_consistency",
            Self::Accuracy => "accuracy_business_rules",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// The check could not run; scored like a failure.
    Error,
}

/// Outcome of one quality check category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub violations: u64,
    pub tables_checked: Vec<String>,
    pub details: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    /// Build a result from per-detail violation counts.
    pub fn from_details(tables_checked: Vec<String>, details: BTreeMap<String, u64>) -> Self {
        let violations = details.values().sum();
        Self {
            status: if violations == 0 {
                CheckStatus::Passed
            } else {
                CheckStatus::Failed
            },
            violations,
            tables_checked,
            details,
            message: None,
        }
    }

    pub fn errored(tables_checked: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            violations: 0,
            tables_checked,
            details: BTreeMap::new(),
            message: Some(message.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality report artifact, regenerated in full on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub check_timestamp: String,
    pub target_layer: Layer,
    pub checks_performed: BTreeMap<CheckCategory, CheckResult>,
    pub overall_quality_score: f64,
    pub quality_grade: Grade,
}

impl QualityReport {
    pub fn check(&self, category: CheckCategory) -> Option<&CheckResult> {
        self.checks_performed.get(&category)
    }

    pub fn failed_categories(&self) -> Vec<CheckCategory> {
        self.checks_performed
            .iter()
            .filter(|(_, result)| !result.passed())
            .map(|(category, _)| *category)
            .collect()
    }
}
