//! Daily volume anomaly detection.
//!
//! The latest day is compared against a three-sigma band built from the
//! days before it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    Spike,
    Drop,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spike => "spike",
            Self::Drop => "drop",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeAssessment {
    pub lower: f64,
    pub upper: f64,
    pub actual: u64,
    pub anomaly: Option<AnomalyKind>,
}

impl VolumeAssessment {
    /// Band rendered with both bounds truncated to whole rows, e.g. `12-30`.
    pub fn expected_range(&self) -> String {
        format!("{}-{}", self.lower as i64, self.upper as i64)
    }
}

/// Assess the last of `daily_counts` (oldest first). `None` when empty.
///
/// With no history the latest day is its own mean; with fewer than two
/// history days the deviation is zero.
pub fn assess(daily_counts: &[u64]) -> Option<VolumeAssessment> {
    let (&actual, history) = daily_counts.split_last()?;
    let mean = if history.is_empty() {
        actual as f64
    } else {
        history.iter().sum::<u64>() as f64 / history.len() as f64
    };
    let deviation = sample_std_dev(history, mean);
    let upper = mean + 3.0 * deviation;
    let lower = (mean - 3.0 * deviation).max(0.0);

    let actual_f = actual as f64;
    let anomaly = if actual_f > upper {
        Some(AnomalyKind::Spike)
    } else if actual_f < lower {
        Some(AnomalyKind::Drop)
    } else {
        None
    };
    Some(VolumeAssessment {
        lower,
        upper,
        actual,
        anomaly,
    })
}

fn sample_std_dev(values: &[u64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let squares: f64 = values
        .iter()
        .map(|v| {
            let delta = *v as f64 - mean;
            delta * delta
        })
        .sum();
    (squares / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_days_means_no_assessment() {
        assert_eq!(assess(&[]), None);
    }

    #[test]
    fn single_day_is_never_anomalous() {
        let only = assess(&[42]).unwrap();
        assert_eq!(only.anomaly, None);
        assert_eq!(only.expected_range(), "42-42");
    }

    #[test]
    fn steady_history_flags_a_spike() {
        let spike = assess(&[10, 12, 11, 9, 10, 80]).unwrap();
        assert_eq!(spike.anomaly, Some(AnomalyKind::Spike));
        assert_eq!(spike.actual, 80);
    }

    #[test]
    fn steady_history_flags_a_drop() {
        let drop = assess(&[100, 102, 98, 101, 99, 3]).unwrap();
        assert_eq!(drop.anomaly, Some(AnomalyKind::Drop));
    }

    #[test]
    fn lower_bound_is_floored_at_zero() {
        let noisy = assess(&[1, 50, 2, 60, 0]).unwrap();
        assert_eq!(noisy.lower, 0.0);
        assert_eq!(noisy.anomaly, None);
    }

    #[test]
    fn identical_history_has_zero_width_band() {
        let flat = assess(&[5, 5, 5, 5]).unwrap();
        assert_eq!(flat.expected_range(), "5-5");
        assert_eq!(flat.anomaly, None);
        assert_eq!(assess(&[5, 5, 5, 6]).unwrap().anomaly, Some(AnomalyKind::Spike));
    }
}
