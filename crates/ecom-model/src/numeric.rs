//! Rounding shared by every reported figure.

/// Scales by 100, rounds half away from zero, and scales back.
///
/// The scaling is done in binary floating point, so a value such as `1.005`
/// (stored as `1.00499999...`) rounds down to `1.0`.
///
/// ```
/// use ecom_model::round2;
///
/// assert_eq!(round2(66.666), 66.67);
/// assert_eq!(round2(-2.345_1), -2.35);
/// ```
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_at_two_decimals() {
        assert_eq!(round2(39.984), 39.98);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(12.0), 12.0);
    }

    #[test]
    fn binary_representation_decides_near_ties() {
        assert_eq!(round2(1.005), 1.0);
    }
}
