use std::collections::BTreeMap;

use ecom_model::{CheckCategory, CheckResult, round2};

/// Start from 100 and subtract each non-passing category's weight.
///
/// A category missing from `checks` counts as not passed.
pub fn weighted_score(checks: &BTreeMap<CheckCategory, CheckResult>) -> f64 {
    let lost: f64 = CheckCategory::ALL
        .iter()
        .filter(|category| !checks.get(*category).is_some_and(CheckResult::passed))
        .map(|category| category.weight() * 100.0)
        .sum();
    round2((100.0 - lost).max(0.0))
}

/// One point per violation. Superseded by [`weighted_score`].
#[deprecated(note = "use weighted_score; violation counts are not comparable across checks")]
pub fn linear_violation_score(checks: &BTreeMap<CheckCategory, CheckResult>) -> f64 {
    let violations: u64 = checks.values().map(|result| result.violations).sum();
    (100.0 - violations as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecom_model::CheckStatus;

    fn results(failing: &[CheckCategory], violations: u64) -> BTreeMap<CheckCategory, CheckResult> {
        CheckCategory::ALL
            .iter()
            .map(|category| {
                let failed = failing.contains(category);
                let result = CheckResult {
                    status: if failed {
                        CheckStatus::Failed
                    } else {
                        CheckStatus::Passed
                    },
                    violations: if failed { violations } else { 0 },
                    tables_checked: Vec::new(),
                    details: BTreeMap::new(),
                    message: None,
                };
                (*category, result)
            })
            .collect()
    }

    #[test]
    fn all_passing_scores_one_hundred() {
        assert_eq!(weighted_score(&results(&[], 0)), 100.0);
    }

    #[test]
    fn referential_failure_costs_thirty() {
        assert_eq!(weighted_score(&results(&[CheckCategory::Referential], 5)), 70.0);
    }

    #[test]
    fn everything_failing_floors_at_zero() {
        assert_eq!(weighted_score(&results(&CheckCategory::ALL, 1)), 0.0);
    }

    #[test]
    fn errored_category_is_scored_as_failed() {
        let mut checks = results(&[], 0);
        checks.insert(
            CheckCategory::Consistency,
            CheckResult::errored(vec![], "no such table"),
        );
        assert_eq!(weighted_score(&checks), 90.0);
    }

    #[test]
    fn missing_category_is_scored_as_failed() {
        let mut checks = results(&[], 0);
        checks.remove(&CheckCategory::Uniqueness);
        assert_eq!(weighted_score(&checks), 85.0);
    }

    #[test]
    #[allow(deprecated)]
    fn linear_model_subtracts_violations() {
        assert_eq!(linear_violation_score(&results(&[], 0)), 100.0);
        assert_eq!(
            linear_violation_score(&results(&[CheckCategory::Validity], 12)),
            88.0
        );
        assert_eq!(
            linear_violation_score(&results(&[CheckCategory::Accuracy], 250)),
            0.0
        );
    }
}
